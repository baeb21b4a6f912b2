use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

pub mod stripe_gateway;
pub use stripe_gateway::StripeGateway;

#[cfg(any(test, feature = "test-utils"))]
pub mod fake_gateway;
#[cfg(any(test, feature = "test-utils"))]
pub use fake_gateway::FakePaymentGateway;

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount_cents: i64,
    pub currency: String,
    pub metadata: HashMap<String, String>,
    /// Passed through to the processor so transport retries cannot double
    /// charge.
    pub idempotency_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    Succeeded,
    Pending,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ChargeOutcome {
    pub charge_id: String,
    pub status: GatewayStatus,
}

#[derive(Debug, Clone)]
pub struct RefundOutcome {
    pub refund_id: String,
    pub status: GatewayStatus,
}

/// Capability interface over the payment processor. The rest of the system
/// only ever sees charge ids and statuses.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeOutcome>;
    async fn refund(&self, charge_id: &str, amount_cents: i64) -> Result<RefundOutcome>;
    async fn retrieve(&self, charge_id: &str) -> Result<ChargeOutcome>;
}

/// Stand-in used when no processor is configured. Booking flows keep
/// working; anything that moves money reports the gap to the caller.
pub struct DisabledGateway;

#[async_trait]
impl PaymentGateway for DisabledGateway {
    async fn charge(&self, _request: ChargeRequest) -> Result<ChargeOutcome> {
        Err(crate::error::AppError::Payment(
            "Payment processing is not configured".to_string(),
        ))
    }

    async fn refund(&self, _charge_id: &str, _amount_cents: i64) -> Result<RefundOutcome> {
        Err(crate::error::AppError::Payment(
            "Payment processing is not configured".to_string(),
        ))
    }

    async fn retrieve(&self, _charge_id: &str) -> Result<ChargeOutcome> {
        Err(crate::error::AppError::Payment(
            "Payment processing is not configured".to_string(),
        ))
    }
}
