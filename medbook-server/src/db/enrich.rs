//! Post-fetch enrichment
//!
//! Some entities carry fields that are not columns of their own table. An
//! [`Enrich`] step fills them after the generic repository has fetched the
//! rows, with one extra query for the whole batch.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo::{DbError, Entity};
use crate::models::Doctor;

/// A batch step run over every row a service handle returns
#[async_trait]
pub trait Enrich<E: Entity>: Send + Sync {
    async fn enrich(&self, pool: &PgPool, rows: &mut [E]) -> Result<(), DbError>;
}

/// Resolves `Doctor::specialization_id` to the specialization's name.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoctorSpecializations;

impl DoctorSpecializations {
    fn wanted(rows: &[Doctor]) -> Vec<Uuid> {
        let ids: HashSet<Uuid> = rows.iter().filter_map(|d| d.specialization_id).collect();
        ids.into_iter().collect()
    }

    fn apply(rows: &mut [Doctor], names: &HashMap<Uuid, String>) {
        for doctor in rows {
            doctor.specialization_name = doctor
                .specialization_id
                .and_then(|id| names.get(&id).cloned());
        }
    }
}

#[async_trait]
impl Enrich<Doctor> for DoctorSpecializations {
    async fn enrich(&self, pool: &PgPool, rows: &mut [Doctor]) -> Result<(), DbError> {
        let ids = Self::wanted(rows);
        if ids.is_empty() {
            return Ok(());
        }

        let names: HashMap<Uuid, String> =
            sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM specializations WHERE id = ANY($1)")
                .bind(&ids)
                .fetch_all(pool)
                .await?
                .into_iter()
                .collect();

        tracing::debug!(requested = ids.len(), resolved = names.len(), "doctor specializations");
        Self::apply(rows, &names);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(specialization_id: Option<Uuid>) -> Doctor {
        Doctor {
            first_name: "Aziz".into(),
            last_name: "Karimov".into(),
            specialization_id,
            ..Doctor::default()
        }
    }

    #[test]
    fn wanted_deduplicates_and_skips_unset() {
        let cardio = Uuid::new_v4();
        let rows = vec![doctor(Some(cardio)), doctor(Some(cardio)), doctor(None)];
        assert_eq!(DoctorSpecializations::wanted(&rows), vec![cardio]);
    }

    #[test]
    fn apply_fills_known_names_only() {
        let cardio = Uuid::new_v4();
        let unknown = Uuid::new_v4();
        let mut rows = vec![doctor(Some(cardio)), doctor(Some(unknown)), doctor(None)];
        let names = HashMap::from([(cardio, "Cardiologist".to_string())]);

        DoctorSpecializations::apply(&mut rows, &names);

        assert_eq!(rows[0].specialization_name.as_deref(), Some("Cardiologist"));
        assert_eq!(rows[1].specialization_name, None);
        assert_eq!(rows[2].specialization_name, None);
    }
}
