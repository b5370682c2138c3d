use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use coursepay::config::AppConfig;
use coursepay::gateways::razorpay::RazorpayGateway;
use coursepay::gateways::CheckoutGateway;
use coursepay::http::middleware::rate_limit::RateLimitState;
use coursepay::repo::courses_repo::CoursesRepo;
use coursepay::repo::enrollments_repo::EnrollmentsRepo;
use coursepay::repo::payments_repo::PaymentsRepo;
use coursepay::repo::{CourseCatalog, EnrollmentLedger, PaymentStore};
use coursepay::service::order_service::OrderService;
use coursepay::service::verify_service::VerifyService;
use coursepay::service::webhook_service::WebhookService;
use coursepay::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis_client = redis::Client::open(cfg.redis_url.clone())?;

    let catalog: Arc<dyn CourseCatalog> = Arc::new(CoursesRepo { pool: pool.clone() });
    let ledger: Arc<dyn EnrollmentLedger> = Arc::new(EnrollmentsRepo { pool: pool.clone() });
    let payments: Arc<dyn PaymentStore> = Arc::new(PaymentsRepo { pool: pool.clone() });
    let gateway: Arc<dyn CheckoutGateway> = Arc::new(RazorpayGateway {
        base_url: cfg.razorpay_base_url.clone(),
        key_id: cfg.razorpay_key_id.clone(),
        key_secret: cfg.razorpay_key_secret.clone(),
        timeout_ms: cfg.gateway_timeout_ms,
        client: reqwest::Client::new(),
    });

    let order_service = OrderService {
        catalog,
        ledger: ledger.clone(),
        payments: payments.clone(),
        gateway: gateway.clone(),
        key_id: cfg.razorpay_key_id.clone(),
        currency: cfg.currency.clone(),
        min_order_amount: cfg.min_order_amount,
    };
    let verify_service = VerifyService {
        payments: payments.clone(),
        ledger,
        gateway,
        key_secret: cfg.razorpay_key_secret.clone(),
    };
    let webhook_service = WebhookService {
        payments: payments.clone(),
        webhook_secret: cfg.webhook_secret.clone(),
    };

    let state = AppState {
        order_service,
        verify_service,
        webhook_service,
        payments,
        pool,
        redis_client: redis::Client::open(cfg.redis_url.clone())?,
    };

    let session_routes = Router::new()
        .route(
            "/payment/create-order",
            post(coursepay::http::handlers::payments::create_order),
        )
        .route(
            "/payment/verify",
            post(coursepay::http::handlers::payments::verify),
        )
        .route(
            "/payment/history",
            get(coursepay::http::handlers::payments::history),
        )
        .layer(from_fn_with_state(
            cfg.session_secret.clone(),
            coursepay::http::middleware::auth::require_session,
        ));

    let app = Router::new()
        .route("/health", get(coursepay::http::handlers::payments::health))
        .route(
            "/payment/webhook",
            post(coursepay::http::handlers::webhook::receive),
        )
        .route("/ops/readiness", get(coursepay::http::handlers::ops::readiness))
        .route("/ops/liveness", get(coursepay::http::handlers::ops::liveness))
        .merge(session_routes)
        .layer(from_fn_with_state(
            RateLimitState {
                redis_client: redis::Client::open(cfg.redis_url.clone())?,
                max_per_minute: cfg.rate_limit_per_minute,
            },
            coursepay::http::middleware::rate_limit::enforce,
        ))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
