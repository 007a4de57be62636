//! Schema for the clinic tables
//!
//! Idempotent: every statement is `CREATE ... IF NOT EXISTS`, so `serve`
//! can run it on each start.

use sqlx::PgPool;

/// One table per entity, in dependency order.
const TABLES: &[(&str, &str)] = &[
    (
        "departments",
        r#"
        CREATE TABLE IF NOT EXISTS departments (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            image_url TEXT,
            floor_number INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ,
            deleted_at TIMESTAMPTZ
        )
        "#,
    ),
    (
        "specializations",
        r#"
        CREATE TABLE IF NOT EXISTS specializations (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            department_id UUID NOT NULL REFERENCES departments(id),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ,
            deleted_at TIMESTAMPTZ
        )
        "#,
    ),
    (
        "doctors",
        r#"
        CREATE TABLE IF NOT EXISTS doctors (
            id UUID PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            gender TEXT NOT NULL,
            birth_date DATE,
            phone_number TEXT NOT NULL,
            email TEXT,
            address TEXT,
            city TEXT,
            country TEXT,
            salary DOUBLE PRECISION,
            bio TEXT,
            start_work_date DATE,
            end_work_date DATE,
            work_years INTEGER NOT NULL DEFAULT 0,
            department_id UUID NOT NULL REFERENCES departments(id),
            specialization_id UUID REFERENCES specializations(id),
            room_number TEXT,
            image_url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ,
            deleted_at TIMESTAMPTZ
        )
        "#,
    ),
    (
        "doctor_working_hours",
        r#"
        CREATE TABLE IF NOT EXISTS doctor_working_hours (
            id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
            doctor_id UUID NOT NULL REFERENCES doctors(id),
            day_of_week TEXT NOT NULL,
            start_time TIME NOT NULL,
            finish_time TIME NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ,
            deleted_at TIMESTAMPTZ
        )
        "#,
    ),
    (
        "doctor_services",
        r#"
        CREATE TABLE IF NOT EXISTS doctor_services (
            id UUID PRIMARY KEY,
            doctor_id UUID NOT NULL REFERENCES doctors(id),
            department_id UUID NOT NULL REFERENCES departments(id),
            specialization_id UUID REFERENCES specializations(id),
            online_price DOUBLE PRECISION NOT NULL DEFAULT 0,
            offline_price DOUBLE PRECISION NOT NULL DEFAULT 0,
            name TEXT NOT NULL,
            duration INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ,
            deleted_at TIMESTAMPTZ
        )
        "#,
    ),
    (
        "reasons",
        r#"
        CREATE TABLE IF NOT EXISTS reasons (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            specialization_id UUID NOT NULL REFERENCES specializations(id),
            image_url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ,
            deleted_at TIMESTAMPTZ
        )
        "#,
    ),
    (
        "patients",
        r#"
        CREATE TABLE IF NOT EXISTS patients (
            id UUID PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            birth_date DATE,
            gender TEXT NOT NULL,
            phone_number TEXT NOT NULL,
            email TEXT,
            address TEXT,
            city TEXT,
            country TEXT,
            patient_problem TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ,
            deleted_at TIMESTAMPTZ
        )
        "#,
    ),
    (
        "appointments",
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY,
            department_id UUID NOT NULL,
            doctor_id UUID NOT NULL,
            patient_id UUID NOT NULL,
            doctor_service_id UUID NOT NULL,
            appointment_date DATE NOT NULL,
            appointment_time TIME NOT NULL,
            duration INTEGER NOT NULL DEFAULT 0,
            key TEXT NOT NULL,
            expires_at TIMESTAMPTZ,
            patient_problem TEXT,
            status TEXT NOT NULL,
            payment_type TEXT NOT NULL,
            payment_amount DOUBLE PRECISION NOT NULL DEFAULT 0,
            order_number BIGSERIAL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ,
            deleted_at TIMESTAMPTZ
        )
        "#,
    ),
    (
        "doctor_notes",
        r#"
        CREATE TABLE IF NOT EXISTS doctor_notes (
            id UUID PRIMARY KEY,
            appointment_id UUID NOT NULL,
            doctor_id UUID NOT NULL,
            patient_id UUID NOT NULL,
            prescription TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ,
            deleted_at TIMESTAMPTZ
        )
        "#,
    ),
    (
        "patient_payments",
        r#"
        CREATE TABLE IF NOT EXISTS patient_payments (
            id UUID PRIMARY KEY,
            appointment_id UUID NOT NULL,
            patient_id UUID NOT NULL,
            amount DOUBLE PRECISION NOT NULL,
            status TEXT NOT NULL,
            payment_method TEXT NOT NULL,
            payment_date TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ,
            deleted_at TIMESTAMPTZ
        )
        "#,
    ),
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            phone_number TEXT,
            role TEXT NOT NULL,
            is_verified BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ,
            deleted_at TIMESTAMPTZ
        )
        "#,
    ),
    (
        "sessions",
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id),
            ip_address TEXT,
            user_agent TEXT,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            expires_at TIMESTAMPTZ NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ,
            deleted_at TIMESTAMPTZ
        )
        "#,
    ),
];

/// Lookup columns used by list filters and the phone search.
const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_patients_phone ON patients (phone_number)",
    "CREATE INDEX IF NOT EXISTS idx_doctors_department ON doctors (department_id)",
    "CREATE INDEX IF NOT EXISTS idx_working_hours_doctor ON doctor_working_hours (doctor_id, day_of_week)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments (patient_id)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions (user_id)",
];

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running medbook migrations...");

    for (table, ddl) in TABLES {
        sqlx::query(ddl).execute(pool).await?;
        tracing::debug!(table, "table ready");
    }
    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    tracing::info!(tables = TABLES.len(), "Migrations complete");
    Ok(())
}
