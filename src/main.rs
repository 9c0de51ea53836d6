//! Subscription Events service entry point.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subscription_events::adapters::http::{app_router, BillingAppState, BillingSettings, WebhookAuth};
use subscription_events::adapters::postgres::{
    PostgresBillingEventStore, PostgresChargeRepository, PostgresJobRunStore,
    PostgresPlanRepository, PostgresUserRepository, MIGRATOR,
};
use subscription_events::adapters::redis::{RedisEventPublisher, RedisJobQueue};
use subscription_events::adapters::{RevenueCatAttributeClient, TracingDiagnosticReporter};
use subscription_events::config::{AppConfig, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);

    tracing::info!(
        environment = %config.server.environment,
        referral_groups = config.coupons.referral_groups().len(),
        "Starting subscription events service"
    );

    let pool = config.database.pool_options().connect(&config.database.url).await?;
    if config.database.run_migrations {
        tracing::info!("Running database migrations");
        MIGRATOR.run(&pool).await?;
    }

    let redis = redis::Client::open(config.redis.url.as_str())?
        .get_multiplexed_tokio_connection()
        .await?;
    let mut job_queue = RedisJobQueue::new(redis.clone());
    let mut event_publisher = RedisEventPublisher::new(redis);
    if let Some(prefix) = config.redis.key_prefix() {
        job_queue = job_queue.with_key_prefix(prefix);
        event_publisher = event_publisher.with_channel_prefix(prefix);
    }
    let job_queue = Arc::new(job_queue);

    let state = BillingAppState {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        plans: Arc::new(PostgresPlanRepository::new(pool.clone())),
        charges: Arc::new(PostgresChargeRepository::new(pool.clone())),
        billing_events: Arc::new(PostgresBillingEventStore::new(pool.clone())),
        job_runs: Arc::new(PostgresJobRunStore::new(pool)),
        crm: job_queue.clone(),
        coupon_usage_queue: job_queue,
        event_publisher: Arc::new(event_publisher),
        subscriber_attributes: Arc::new(RevenueCatAttributeClient::from_config(&config.billing)?),
        diagnostics: Arc::new(TracingDiagnosticReporter::new()),
        settings: Arc::new(BillingSettings::from(&config)),
    };

    let auth = WebhookAuth::new(config.billing.webhook_auth_token.clone());
    let app = app_router(
        state,
        auth,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if server.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
