//! Booking: appointments, patients, doctor notes and payments.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use super::entity;

entity! {
    /// A booked visit; `order_number` comes from a sequence
    Appointment as "appointment" in "appointments",
    id: Uuid => Uuid (Client) {
        department_id: Uuid => Uuid,
        doctor_id: Uuid => Uuid,
        patient_id: Uuid => Uuid,
        doctor_service_id: Uuid => Uuid,
        appointment_date: NaiveDate => Date,
        appointment_time: NaiveTime => Time,
        duration: i32 => Integer,
        key: String => Text,
        expires_at: Option<DateTime<Utc>> => Timestamp,
        patient_problem: Option<String> => Text,
        status: String => Text,
        payment_type: String => Text,
        payment_amount: f64 => Float,
    }
    generated {
        order_number: i64 => BigInt,
    }
}

entity! {
    DoctorNote as "doctor note" in "doctor_notes",
    id: Uuid => Uuid (Client) {
        appointment_id: Uuid => Uuid,
        doctor_id: Uuid => Uuid,
        patient_id: Uuid => Uuid,
        prescription: String => Text,
    }
}

entity! {
    Patient as "patient" in "patients",
    id: Uuid => Uuid (Client) {
        first_name: String => Text,
        last_name: String => Text,
        birth_date: Option<NaiveDate> => Date,
        gender: String => Text,
        phone_number: String => Text,
        email: Option<String> => Text,
        address: Option<String> => Text,
        city: Option<String> => Text,
        country: Option<String> => Text,
        patient_problem: Option<String> => Text,
    }
}

entity! {
    PatientPayment as "patient payment" in "patient_payments",
    id: Uuid => Uuid (Client) {
        appointment_id: Uuid => Uuid,
        patient_id: Uuid => Uuid,
        amount: f64 => Float,
        status: String => Text,
        payment_method: String => Text,
        payment_date: Option<DateTime<Utc>> => Timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Entity;
    use crate::models::tests::assert_layout;

    #[test]
    fn descriptors_match_fields() {
        assert_layout::<Appointment>();
        assert_layout::<DoctorNote>();
        assert_layout::<Patient>();
        assert_layout::<PatientPayment>();
    }

    #[test]
    fn order_number_is_read_back_not_inserted() {
        let d = Appointment::DESCRIPTOR;
        assert!(!d.insert_columns().contains(&"order_number"));
        assert!(d.select_columns().contains(&"order_number"));
        assert!(d.writable("order_number").is_err());
        assert_eq!(d.order_column("order_number").unwrap(), Some("order_number"));
    }

    #[test]
    fn patient_json_uses_snake_case() {
        let patient = Patient {
            first_name: "Ali".into(),
            phone_number: "+998950230605".into(),
            ..Patient::default()
        };
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["phone_number"], "+998950230605");
        assert!(json["deleted_at"].is_null());
    }
}
