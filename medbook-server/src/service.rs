//! Service handles
//!
//! Each logical service (booking, healthcare, user) is a bundle of
//! per-entity handles sharing one pool and one deadline. A handle does no
//! validation or business logic of its own: it bounds each repository call
//! by the deadline and runs it inside a span, then hands the result back.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use medbook_core::config::ServicesConfig;
use medbook_core::{DeleteQuery, FieldValueQuery, ListQuery, Listed, ServiceConfig, SqlValue};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

use crate::db::{DbError, DoctorSpecializations, Enrich, Entity, EntityRepo, SurrogateId};
use crate::models::*;

/// Deadline-bounded access to one entity type
pub struct EntityService<E: Entity> {
    inner: Arc<EntityServiceInner<E>>,
}

struct EntityServiceInner<E: Entity> {
    pool: PgPool,
    deadline: Duration,
    enrich: Option<Box<dyn Enrich<E>>>,
}

impl<E: Entity> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Entity> fmt::Debug for EntityService<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityService")
            .field("entity", &E::DESCRIPTOR.name)
            .field("deadline", &self.inner.deadline)
            .field("enriched", &self.inner.enrich.is_some())
            .finish()
    }
}

impl<E: Entity> EntityService<E> {
    pub fn new(pool: PgPool, deadline: Duration) -> Self {
        Self::build(pool, deadline, None)
    }

    /// A handle that runs `step` over every row it returns.
    pub fn enriched(pool: PgPool, deadline: Duration, step: impl Enrich<E> + 'static) -> Self {
        Self::build(pool, deadline, Some(Box::new(step)))
    }

    fn build(pool: PgPool, deadline: Duration, enrich: Option<Box<dyn Enrich<E>>>) -> Self {
        Self {
            inner: Arc::new(EntityServiceInner {
                pool,
                deadline,
                enrich,
            }),
        }
    }

    pub fn deadline(&self) -> Duration {
        self.inner.deadline
    }

    fn repo(&self) -> EntityRepo<'_, E> {
        EntityRepo::new(&self.inner.pool)
    }

    async fn enrich(&self, rows: &mut [E]) -> Result<(), DbError> {
        match &self.inner.enrich {
            Some(step) => step.enrich(&self.inner.pool, rows).await,
            None => Ok(()),
        }
    }

    async fn enriched_one(&self, mut row: E) -> Result<E, DbError> {
        self.enrich(std::slice::from_mut(&mut row)).await?;
        Ok(row)
    }

    /// Run `fut` under the service deadline, inside a span naming the call.
    async fn bounded<T, F>(
        &self,
        operation: &'static str,
        field: &str,
        value: &str,
        fut: F,
    ) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, DbError>>,
    {
        let entity = E::DESCRIPTOR.name;
        let span = tracing::info_span!("repo", entity, operation, field, value);
        let deadline = self.inner.deadline;

        match tokio::time::timeout(deadline, fut).instrument(span).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(entity, operation, field, value, ?deadline, "deadline exceeded");
                Err(DbError::Timeout {
                    resource: entity,
                    operation,
                    seconds: deadline.as_secs(),
                })
            }
        }
    }

    /// Insert `entity`, generating a UUID first when the id is unset.
    pub async fn create(&self, mut entity: E) -> Result<E, DbError> {
        entity.id_mut().fill_if_unset();
        let id = entity.id().to_string();
        self.bounded("create", "id", &id, async {
            let row = self.repo().create(&entity).await?;
            self.enriched_one(row).await
        })
        .await
    }

    pub async fn get(&self, lookup: FieldValueQuery) -> Result<E, DbError> {
        self.bounded("get", &lookup.field, &lookup.value, async {
            let row = self.repo().get(&lookup).await?;
            self.enriched_one(row).await
        })
        .await
    }

    pub async fn list(&self, list: ListQuery) -> Result<Listed<E>, DbError> {
        self.bounded("list", &list.field, &list.value, async {
            let mut listed = self.repo().list(&list).await?;
            self.enrich(&mut listed.items).await?;
            Ok(listed)
        })
        .await
    }

    /// Replace every business column of the row `target` selects.
    pub async fn update(&self, target: FieldValueQuery, patch: E) -> Result<E, DbError> {
        self.bounded("update", &target.field, &target.value, async {
            let row = self.repo().update(&target, &patch).await?;
            self.enriched_one(row).await
        })
        .await
    }

    pub async fn patch(
        &self,
        target: FieldValueQuery,
        assignments: Vec<(String, SqlValue)>,
    ) -> Result<E, DbError> {
        self.bounded("patch", &target.field, &target.value, async {
            let row = self.repo().patch(&target, assignments).await?;
            self.enriched_one(row).await
        })
        .await
    }

    pub async fn delete(&self, delete: DeleteQuery) -> Result<bool, DbError> {
        self.bounded("delete", &delete.field, &delete.value, async {
            self.repo().delete(&delete).await
        })
        .await
    }
}

/// Departments, specializations, doctors and their schedules and services
#[derive(Debug, Clone)]
pub struct HealthcareService {
    pub departments: EntityService<Department>,
    pub specializations: EntityService<Specialization>,
    pub doctors: EntityService<Doctor>,
    pub working_hours: EntityService<DoctorWorkingHours>,
    pub doctor_services: EntityService<DoctorService>,
    pub reasons: EntityService<Reason>,
}

impl HealthcareService {
    pub fn new(pool: PgPool, config: &ServiceConfig) -> Self {
        let deadline = config.context_timeout();
        Self {
            departments: EntityService::new(pool.clone(), deadline),
            specializations: EntityService::new(pool.clone(), deadline),
            doctors: EntityService::enriched(pool.clone(), deadline, DoctorSpecializations),
            working_hours: EntityService::new(pool.clone(), deadline),
            doctor_services: EntityService::new(pool.clone(), deadline),
            reasons: EntityService::new(pool, deadline),
        }
    }
}

/// Appointments, patients, notes and payments
#[derive(Debug, Clone)]
pub struct BookingService {
    pub appointments: EntityService<Appointment>,
    pub doctor_notes: EntityService<DoctorNote>,
    pub patients: EntityService<Patient>,
    pub patient_payments: EntityService<PatientPayment>,
}

impl BookingService {
    pub fn new(pool: PgPool, config: &ServiceConfig) -> Self {
        let deadline = config.context_timeout();
        Self {
            appointments: EntityService::new(pool.clone(), deadline),
            doctor_notes: EntityService::new(pool.clone(), deadline),
            patients: EntityService::new(pool.clone(), deadline),
            patient_payments: EntityService::new(pool, deadline),
        }
    }

    /// Change a live patient's phone number and nothing else.
    pub async fn update_patient_phone(
        &self,
        id: Uuid,
        phone_number: String,
    ) -> Result<Patient, DbError> {
        self.patients
            .patch(
                FieldValueQuery::by_id(id),
                vec![("phone_number".to_owned(), SqlValue::from(phone_number))],
            )
            .await
    }
}

/// Accounts and sessions
#[derive(Debug, Clone)]
pub struct UserService {
    pub users: EntityService<User>,
    pub sessions: EntityService<Session>,
}

impl UserService {
    pub fn new(pool: PgPool, config: &ServiceConfig) -> Self {
        let deadline = config.context_timeout();
        Self {
            users: EntityService::new(pool.clone(), deadline),
            sessions: EntityService::new(pool, deadline),
        }
    }
}

/// The three service handles the gateway talks to
#[derive(Debug, Clone)]
pub struct Services {
    pub booking: BookingService,
    pub healthcare: HealthcareService,
    pub user: UserService,
}

impl Services {
    pub fn new(pool: PgPool, config: &ServicesConfig) -> Self {
        Self {
            booking: BookingService::new(pool.clone(), &config.booking),
            healthcare: HealthcareService::new(pool.clone(), &config.healthcare),
            user: UserService::new(pool, &config.user),
        }
    }
}
