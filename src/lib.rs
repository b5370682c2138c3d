use std::sync::Arc;

pub mod config;
pub mod domain {
    pub mod enrollment;
    pub mod payment;
    pub mod webhook;
}
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod ops;
        pub mod payments;
        pub mod webhook;
    }
    pub mod middleware {
        pub mod auth;
        pub mod rate_limit;
    }
}
pub mod repo;
pub mod service {
    pub mod order_service;
    pub mod verify_service;
    pub mod webhook_service;
}
pub mod signature;

#[derive(Clone)]
pub struct AppState {
    pub order_service: service::order_service::OrderService,
    pub verify_service: service::verify_service::VerifyService,
    pub webhook_service: service::webhook_service::WebhookService,
    pub payments: Arc<dyn repo::PaymentStore>,
    pub pool: sqlx::PgPool,
    pub redis_client: redis::Client,
}
