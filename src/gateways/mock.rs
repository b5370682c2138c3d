use crate::gateways::{CheckoutGateway, CreateOrderParams, FetchedPayment, GatewayOrder};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-process stand-in for the gateway. Orders are assigned sequential ids
/// and payments must be staged before they can be fetched, so tests control
/// exactly what the gateway reports.
#[derive(Default)]
pub struct MockGateway {
    orders: Mutex<Vec<CreateOrderParams>>,
    payments: Mutex<HashMap<String, FetchedPayment>>,
    fail_order_create: AtomicBool,
    fail_payment_fetch: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage_payment(&self, payment: FetchedPayment) {
        self.payments
            .lock()
            .expect("mock gateway lock poisoned")
            .insert(payment.payment_id.clone(), payment);
    }

    pub fn set_order_create_unavailable(&self, unavailable: bool) {
        self.fail_order_create.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_payment_fetch_unavailable(&self, unavailable: bool) {
        self.fail_payment_fetch.store(unavailable, Ordering::SeqCst);
    }

    pub fn created_orders(&self) -> Vec<CreateOrderParams> {
        self.orders
            .lock()
            .expect("mock gateway lock poisoned")
            .clone()
    }
}

#[async_trait::async_trait]
impl CheckoutGateway for MockGateway {
    fn name(&self) -> &'static str {
        "razorpay"
    }

    async fn create_order(&self, params: CreateOrderParams) -> Result<GatewayOrder> {
        if self.fail_order_create.load(Ordering::SeqCst) {
            anyhow::bail!("mock gateway unreachable");
        }

        let mut orders = self.orders.lock().expect("mock gateway lock poisoned");
        let order = GatewayOrder {
            order_id: format!("order_mock_{}", orders.len() + 1),
            amount_minor: params.amount_minor,
            currency: params.currency.clone(),
        };
        orders.push(params);
        Ok(order)
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<FetchedPayment> {
        if self.fail_payment_fetch.load(Ordering::SeqCst) {
            anyhow::bail!("mock gateway unreachable");
        }

        self.payments
            .lock()
            .expect("mock gateway lock poisoned")
            .get(payment_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("mock gateway has no payment {payment_id}"))
    }
}
