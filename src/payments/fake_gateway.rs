use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    error::{AppError, Result},
    payments::{ChargeOutcome, ChargeRequest, GatewayStatus, PaymentGateway, RefundOutcome},
};

/// In-memory gateway for tests. Every charge succeeds unless `fail_next`
/// has been armed.
#[derive(Default)]
pub struct FakePaymentGateway {
    counter: AtomicU64,
    fail_next: AtomicBool,
    pub charges: Mutex<Vec<ChargeRequest>>,
    pub refunds: Mutex<Vec<(String, i64)>>,
}

impl FakePaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}_{}", prefix, n)
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeOutcome> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::Payment("card declined".to_string()));
        }

        let charge_id = self.next_id("fake_pi");
        self.charges.lock().unwrap().push(request);

        Ok(ChargeOutcome {
            charge_id,
            status: GatewayStatus::Succeeded,
        })
    }

    async fn refund(&self, charge_id: &str, amount_cents: i64) -> Result<RefundOutcome> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::Payment("refund rejected".to_string()));
        }

        self.refunds
            .lock()
            .unwrap()
            .push((charge_id.to_string(), amount_cents));

        Ok(RefundOutcome {
            refund_id: self.next_id("fake_re"),
            status: GatewayStatus::Succeeded,
        })
    }

    async fn retrieve(&self, charge_id: &str) -> Result<ChargeOutcome> {
        Ok(ChargeOutcome {
            charge_id: charge_id.to_string(),
            status: GatewayStatus::Succeeded,
        })
    }
}
