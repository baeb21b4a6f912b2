use async_trait::async_trait;
use stripe::{
    Client, CreatePaymentIntent, CreatePaymentIntentAutomaticPaymentMethods, CreateRefund,
    Currency, Event, PaymentIntent, PaymentIntentId, PaymentIntentStatus, Refund,
    RequestStrategy, Webhook, WebhookError,
};

use crate::{
    error::{AppError, Result},
    payments::{ChargeOutcome, ChargeRequest, GatewayStatus, PaymentGateway, RefundOutcome},
};

pub struct StripeGateway {
    client: Client,
    webhook_secret: String,
}

impl StripeGateway {
    pub fn new(api_key: String, webhook_secret: String) -> Self {
        Self {
            client: Client::new(api_key),
            webhook_secret,
        }
    }

    /// Verifies the webhook signature and parses the event payload.
    pub fn verify_event(&self, payload: &str, signature: &str) -> Result<Event> {
        Webhook::construct_event(payload, signature, &self.webhook_secret).map_err(|e| match e {
            WebhookError::BadSignature => AppError::BadRequest("Invalid signature".to_string()),
            _ => AppError::External(format!("Webhook error: {}", e)),
        })
    }

    fn parse_currency(currency: &str) -> Result<Currency> {
        serde_json::from_str(&format!("\"{}\"", currency.to_lowercase()))
            .map_err(|_| AppError::BadRequest(format!("Unsupported currency: {}", currency)))
    }

    fn intent_status(status: PaymentIntentStatus) -> GatewayStatus {
        match status {
            PaymentIntentStatus::Succeeded => GatewayStatus::Succeeded,
            PaymentIntentStatus::Canceled => GatewayStatus::Failed,
            _ => GatewayStatus::Pending,
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeOutcome> {
        let currency = Self::parse_currency(&request.currency)?;

        let mut params = CreatePaymentIntent::new(request.amount_cents, currency);
        params.metadata = Some(request.metadata.into_iter().collect());
        params.automatic_payment_methods = Some(CreatePaymentIntentAutomaticPaymentMethods {
            enabled: true,
            ..Default::default()
        });

        let client = self
            .client
            .clone()
            .with_strategy(RequestStrategy::Idempotent(request.idempotency_key));

        let intent = PaymentIntent::create(&client, params)
            .await
            .map_err(|e| AppError::Payment(format!("Payment processing failed: {}", e)))?;

        Ok(ChargeOutcome {
            charge_id: intent.id.to_string(),
            status: Self::intent_status(intent.status),
        })
    }

    async fn refund(&self, charge_id: &str, amount_cents: i64) -> Result<RefundOutcome> {
        let intent_id: PaymentIntentId = charge_id
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid charge id: {}", charge_id)))?;

        let mut params = CreateRefund::new();
        params.payment_intent = Some(intent_id);
        params.amount = Some(amount_cents);

        let refund = Refund::create(&self.client, params)
            .await
            .map_err(|e| AppError::Payment(format!("Refund processing failed: {}", e)))?;

        let status = match refund.status.as_deref() {
            Some("succeeded") => GatewayStatus::Succeeded,
            Some("pending") | Some("requires_action") => GatewayStatus::Pending,
            _ => GatewayStatus::Failed,
        };

        Ok(RefundOutcome {
            refund_id: refund.id.to_string(),
            status,
        })
    }

    async fn retrieve(&self, charge_id: &str) -> Result<ChargeOutcome> {
        let intent_id: PaymentIntentId = charge_id
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid charge id: {}", charge_id)))?;

        let intent = PaymentIntent::retrieve(&self.client, &intent_id, &[])
            .await
            .map_err(|e| AppError::External(format!("Stripe error: {}", e)))?;

        Ok(ChargeOutcome {
            charge_id: intent.id.to_string(),
            status: Self::intent_status(intent.status),
        })
    }
}
