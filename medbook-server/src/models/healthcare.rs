//! Healthcare directory: departments, specializations, doctors and what
//! doctors offer.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use super::entity;

entity! {
    /// A hospital department
    Department as "department" in "departments",
    id: Uuid => Uuid (Client) {
        name: String => Text,
        description: Option<String> => Text,
        image_url: Option<String> => Text,
        floor_number: i32 => Integer,
    }
}

entity! {
    Specialization as "specialization" in "specializations",
    id: Uuid => Uuid (Client) {
        name: String => Text,
        description: Option<String> => Text,
        department_id: Uuid => Uuid,
    }
}

entity! {
    /// A doctor, with the name of their specialization filled in on reads
    Doctor as "doctor" in "doctors",
    id: Uuid => Uuid (Client) {
        first_name: String => Text,
        last_name: String => Text,
        gender: String => Text,
        birth_date: Option<NaiveDate> => Date,
        phone_number: String => Text,
        email: Option<String> => Text,
        address: Option<String> => Text,
        city: Option<String> => Text,
        country: Option<String> => Text,
        salary: Option<f64> => Float,
        bio: Option<String> => Text,
        start_work_date: Option<NaiveDate> => Date,
        end_work_date: Option<NaiveDate> => Date,
        work_years: i32 => Integer,
        department_id: Uuid => Uuid,
        specialization_id: Option<Uuid> => Uuid,
        room_number: Option<String> => Text,
        image_url: Option<String> => Text,
    }
    extra {
        specialization_name: Option<String>,
    }
}

entity! {
    /// A weekly slot; ids come from an identity column
    DoctorWorkingHours as "doctor working hours" in "doctor_working_hours",
    id: i64 => BigInt (Database) {
        doctor_id: Uuid => Uuid,
        day_of_week: String => Text,
        start_time: NaiveTime => Time,
        finish_time: NaiveTime => Time,
    }
}

entity! {
    /// A bookable service and its prices
    DoctorService as "doctor service" in "doctor_services",
    id: Uuid => Uuid (Client) {
        doctor_id: Uuid => Uuid,
        department_id: Uuid => Uuid,
        specialization_id: Option<Uuid> => Uuid,
        online_price: f64 => Float,
        offline_price: f64 => Float,
        name: String => Text,
        duration: i32 => Integer,
    }
}

entity! {
    /// Why a patient visits, grouped under a specialization
    Reason as "reason" in "reasons",
    id: Uuid => Uuid (Client) {
        name: String => Text,
        specialization_id: Uuid => Uuid,
        image_url: Option<String> => Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Entity;
    use crate::models::tests::assert_layout;
    use medbook_core::IdSource;

    #[test]
    fn descriptors_match_fields() {
        assert_layout::<Department>();
        assert_layout::<Specialization>();
        assert_layout::<Doctor>();
        assert_layout::<DoctorWorkingHours>();
        assert_layout::<DoctorService>();
        assert_layout::<Reason>();
    }

    #[test]
    fn create_payload_needs_business_fields_only() {
        let dept: Department =
            serde_json::from_str(r#"{"name": "Cardiology", "floor_number": 2}"#).unwrap();
        assert!(dept.id.is_nil());
        assert_eq!(dept.description, None);
        assert_eq!(dept.updated_at, None);
    }

    #[test]
    fn working_hours_parse_times() {
        let hours: DoctorWorkingHours = serde_json::from_str(
            r#"{"doctor_id": "550e8400-e29b-41d4-a716-446655440000",
                "day_of_week": "monday", "start_time": "09:00:00", "finish_time": "17:00:00"}"#,
        )
        .unwrap();
        assert_eq!(hours.id, 0);
        assert_eq!(hours.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(DoctorWorkingHours::DESCRIPTOR.id_source, IdSource::Database);
    }

    #[test]
    fn doctor_specialization_name_is_not_a_column() {
        assert!(Doctor::DESCRIPTOR.resolve("specialization_name").is_err());

        let doctor = Doctor {
            specialization_name: Some("Cardiologist".into()),
            ..Doctor::default()
        };
        let json = serde_json::to_value(&doctor).unwrap();
        assert_eq!(json["specialization_name"], "Cardiologist");
    }
}
