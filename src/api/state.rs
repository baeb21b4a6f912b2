use std::sync::Arc;

use crate::{config::Settings, payments::StripeGateway, service::ServiceContext};

#[derive(Clone)]
pub struct AppState {
    pub service_context: Arc<ServiceContext>,
    /// Present only when Stripe is configured; the webhook route needs it
    /// for signature verification.
    pub stripe_gateway: Option<Arc<StripeGateway>>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        stripe_gateway: Option<Arc<StripeGateway>>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            service_context,
            stripe_gateway,
            settings,
        }
    }
}
