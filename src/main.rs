use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier::{
    api,
    config::Settings,
    notify::Mailer,
    payments::{DisabledGateway, PaymentGateway, StripeGateway},
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!(
        "Starting atelier server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // Initialize the payment gateway
    let stripe_gateway = if settings.stripe.enabled {
        match (
            settings.stripe.secret_key.clone(),
            settings.stripe.webhook_secret.clone(),
        ) {
            (Some(api_key), Some(webhook_secret)) => {
                tracing::info!("Stripe payment processing enabled");
                Some(Arc::new(StripeGateway::new(api_key, webhook_secret)))
            }
            _ => {
                anyhow::bail!("Stripe enabled but missing secret_key or webhook_secret");
            }
        }
    } else {
        tracing::warn!("Stripe payment processing disabled; charges will be rejected");
        None
    };

    let gateway: Arc<dyn PaymentGateway> = match stripe_gateway.clone() {
        Some(gw) => gw,
        None => Arc::new(DisabledGateway),
    };

    // Optional SMTP sender for artist application notices
    let mailer = Mailer::from_config(&settings.email).map(Arc::new);
    if mailer.is_none() {
        tracing::info!("Email notices disabled");
    }

    // Create service context (repositories + services over one pool)
    let service_context = Arc::new(ServiceContext::new(
        db_pool.clone(),
        gateway,
        mailer,
        &settings,
    ));

    // Create API app
    let app = api::create_app(
        service_context,
        stripe_gateway,
        Arc::new(settings.clone()),
    );

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
