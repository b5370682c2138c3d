use crate::gateways::{CheckoutGateway, CreateOrderParams, FetchedPayment, GatewayOrder};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;

pub struct RazorpayGateway {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    id: String,
    order_id: Option<String>,
    status: String,
    amount: i64,
    currency: String,
    method: Option<String>,
}

#[async_trait::async_trait]
impl CheckoutGateway for RazorpayGateway {
    fn name(&self) -> &'static str {
        "razorpay"
    }

    async fn create_order(&self, params: CreateOrderParams) -> Result<GatewayOrder> {
        let url = format!("{}/v1/orders", self.base_url);
        let body = json!({
            "amount": params.amount_minor,
            "currency": params.currency,
            "receipt": params.receipt,
            "payment_capture": 1,
            "notes": {
                "user_id": params.user_id,
                "course_id": params.course_id,
            }
        });

        let resp = self
            .client
            .post(url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .context("razorpay order request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "razorpay order create returned HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            );
        }

        let order: OrderResponse = resp
            .json()
            .await
            .context("razorpay order response was not valid JSON")?;

        Ok(GatewayOrder {
            order_id: order.id,
            amount_minor: order.amount,
            currency: order.currency,
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<FetchedPayment> {
        let url = format!("{}/v1/payments/{}", self.base_url, payment_id);

        let resp = self
            .client
            .get(url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .context("razorpay payment fetch failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "razorpay payment fetch returned HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            );
        }

        let payment: PaymentResponse = resp
            .json()
            .await
            .context("razorpay payment response was not valid JSON")?;

        Ok(FetchedPayment {
            payment_id: payment.id,
            order_id: payment.order_id,
            status: payment.status,
            amount_minor: payment.amount,
            currency: payment.currency,
            method: payment.method,
        })
    }
}
