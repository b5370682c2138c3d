use anyhow::Result;
use uuid::Uuid;

pub mod mock;
pub mod razorpay;

#[derive(Debug, Clone)]
pub struct CreateOrderParams {
    pub amount_minor: i64,
    pub currency: String,
    pub receipt: String,
    pub user_id: Uuid,
    pub course_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// Authoritative payment state as reported by the gateway, in minor
/// currency units.
#[derive(Debug, Clone)]
pub struct FetchedPayment {
    pub payment_id: String,
    pub order_id: Option<String>,
    pub status: String,
    pub amount_minor: i64,
    pub currency: String,
    pub method: Option<String>,
}

#[async_trait::async_trait]
pub trait CheckoutGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_order(&self, params: CreateOrderParams) -> Result<GatewayOrder>;

    async fn fetch_payment(&self, payment_id: &str) -> Result<FetchedPayment>;
}
