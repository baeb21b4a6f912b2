use axum::{
    extract::{Extension, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use stripe::{EventObject, EventType};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Booking, Payment},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct CreatePaymentDto {
    pub booking_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment: Payment,
    pub booking: Booking,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(dto): Json<CreatePaymentDto>,
) -> Result<(StatusCode, Json<PaymentResponse>)> {
    let (payment, booking) = state
        .service_context
        .payment_service
        .pay_booking(&current.user, dto.booking_id)
        .await?;

    Ok((StatusCode::CREATED, Json(PaymentResponse { payment, booking })))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>> {
    let payment = state
        .service_context
        .payment_service
        .get_payment(&current.user, id)
        .await?;

    Ok(Json(payment))
}

/// Manual reconciliation against the processor's record.
pub async fn verify(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>> {
    let payment = state
        .service_context
        .payment_service
        .verify_payment(&current.user, id)
        .await?;

    Ok(Json(payment))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Payment>>> {
    let payments = state
        .service_context
        .payment_service
        .list_for_actor(&current.user)
        .await?;

    Ok(Json(payments))
}

/// Stripe webhook endpoint. Unauthenticated; trust comes from the
/// signature check against the shared webhook secret.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode> {
    let gateway = state
        .stripe_gateway
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Stripe is not configured".to_string()))?;

    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    let event = gateway.verify_event(&body, signature)?;

    match event.type_ {
        EventType::PaymentIntentSucceeded => {
            if let EventObject::PaymentIntent(intent) = event.data.object {
                state
                    .service_context
                    .payment_service
                    .apply_gateway_event(&intent.id.to_string(), true)
                    .await?;
            }
        }
        EventType::PaymentIntentPaymentFailed => {
            if let EventObject::PaymentIntent(intent) = event.data.object {
                state
                    .service_context
                    .payment_service
                    .apply_gateway_event(&intent.id.to_string(), false)
                    .await?;
            }
        }
        _ => {
            tracing::debug!("Unhandled webhook event type: {:?}", event.type_);
        }
    }

    Ok(StatusCode::OK)
}
