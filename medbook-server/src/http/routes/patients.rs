//! Patient endpoints beyond plain CRUD

use axum::extract::State;
use axum::routing::put;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use medbook_core::ValidationError;

use crate::http::error::ApiError;
use crate::http::extractors::ValidJson;
use crate::models::Patient;
use crate::service::BookingService;

/// Update phone request
#[derive(Debug, Deserialize)]
pub struct UpdatePhoneRequest {
    pub id: Uuid,
    pub phone_number: String,
}

/// PUT /v1/patients/phone - change only the phone number
async fn update_phone(
    State(booking): State<BookingService>,
    ValidJson(req): ValidJson<UpdatePhoneRequest>,
) -> Result<Json<Patient>, ApiError> {
    if req.phone_number.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: "phone_number",
        }
        .into());
    }
    let patient = booking.update_patient_phone(req.id, req.phone_number).await?;
    Ok(Json(patient))
}

/// Patient routes
pub fn router(booking: BookingService) -> Router {
    Router::new()
        .route("/v1/patients/phone", put(update_phone))
        .with_state(booking)
}
