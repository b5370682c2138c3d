#![allow(dead_code)]

use anyhow::Result;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use coursepay::domain::enrollment::{CourseListing, Enrollment};
use coursepay::domain::payment::{PaymentRecord, PaymentStatus, VerifyRequest};
use coursepay::gateways::mock::MockGateway;
use coursepay::gateways::FetchedPayment;
use coursepay::repo::{
    CommitOutcome, CompletedCheckout, CourseCatalog, EnrollmentLedger, NewPaymentRecord,
    PaymentStore,
};
use coursepay::service::order_service::OrderService;
use coursepay::service::verify_service::VerifyService;
use coursepay::service::webhook_service::WebhookService;
use coursepay::signature;

pub const KEY_ID: &str = "rzp_test_key";
pub const KEY_SECRET: &str = "rzp_test_key_secret";
pub const WEBHOOK_SECRET: &str = "whsec_test";

struct StoredPayment {
    record: PaymentRecord,
    signature: Option<String>,
}

struct StoredCourse {
    listing: CourseListing,
    is_active: bool,
    enrolled_count: i64,
}

#[derive(Default)]
struct Inner {
    payments: Vec<StoredPayment>,
    enrollments: HashMap<(Uuid, Uuid), Enrollment>,
    courses: HashMap<Uuid, StoredCourse>,
}

/// In-memory stand-in for the Postgres stores. One mutex over the whole
/// state makes each store operation atomic, which is exactly the guarantee
/// the transactional Postgres implementation provides.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn add_course(&self, title: &str, price: i64) -> Uuid {
        self.insert_course(title, price, true)
    }

    pub fn add_inactive_course(&self, title: &str, price: i64) -> Uuid {
        self.insert_course(title, price, false)
    }

    fn insert_course(&self, title: &str, price: i64, is_active: bool) -> Uuid {
        let course_id = Uuid::new_v4();
        self.inner.lock().unwrap().courses.insert(
            course_id,
            StoredCourse {
                listing: CourseListing {
                    course_id,
                    title: title.to_string(),
                    price,
                },
                is_active,
                enrolled_count: 0,
            },
        );
        course_id
    }

    pub fn enroll(&self, user_id: Uuid, course_id: Uuid, payment_id: &str) {
        self.inner.lock().unwrap().enrollments.insert(
            (user_id, course_id),
            Enrollment {
                course_id,
                payment_id: payment_id.to_string(),
                enrolled_at: Utc::now(),
            },
        );
    }

    pub fn payment_count(&self) -> usize {
        self.inner.lock().unwrap().payments.len()
    }

    pub fn payment_status(&self, order_id: &str) -> Option<PaymentStatus> {
        self.inner
            .lock()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.record.order_id == order_id)
            .map(|p| p.record.status)
    }

    pub fn payment_record(&self, order_id: &str) -> Option<PaymentRecord> {
        self.inner
            .lock()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.record.order_id == order_id)
            .map(|p| p.record.clone())
    }

    pub fn stored_signature(&self, order_id: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.record.order_id == order_id)
            .and_then(|p| p.signature.clone())
    }

    pub fn enrollment(&self, user_id: Uuid, course_id: Uuid) -> Option<Enrollment> {
        self.inner
            .lock()
            .unwrap()
            .enrollments
            .get(&(user_id, course_id))
            .cloned()
    }

    pub fn enrollment_count(&self) -> usize {
        self.inner.lock().unwrap().enrollments.len()
    }

    pub fn enrolled_count(&self, course_id: Uuid) -> i64 {
        self.inner
            .lock()
            .unwrap()
            .courses
            .get(&course_id)
            .map(|c| c.enrolled_count)
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl PaymentStore for MemoryStore {
    async fn insert_pending(&self, record: NewPaymentRecord) -> Result<()> {
        self.inner.lock().unwrap().payments.push(StoredPayment {
            record: PaymentRecord {
                order_id: record.order_id,
                payment_id: None,
                user_id: record.user_id,
                course_id: record.course_id,
                amount: record.amount,
                currency: record.currency,
                gateway: record.gateway,
                status: PaymentStatus::Pending,
                payment_method: None,
                created_at: Utc::now(),
                payment_date: None,
            },
            signature: None,
        });
        Ok(())
    }

    async fn find_by_order(&self, order_id: &str, user_id: Uuid) -> Result<Option<PaymentRecord>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.record.order_id == order_id && p.record.user_id == user_id)
            .map(|p| p.record.clone()))
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<PaymentRecord>> {
        Ok(self.payment_record(order_id))
    }

    async fn complete_checkout(&self, checkout: CompletedCheckout) -> Result<CommitOutcome> {
        let mut inner = self.inner.lock().unwrap();

        let position = inner
            .payments
            .iter()
            .position(|p| {
                p.record.order_id == checkout.order_id && p.record.user_id == checkout.user_id
            })
            .ok_or_else(|| anyhow::anyhow!("no payment record for order {}", checkout.order_id))?;

        if inner.payments[position].record.status.is_terminal() {
            return Ok(CommitOutcome::AlreadyCompleted);
        }
        if inner
            .enrollments
            .contains_key(&(checkout.user_id, checkout.course_id))
        {
            return Ok(CommitOutcome::AlreadyEnrolled);
        }

        let payment = &mut inner.payments[position];
        payment.record.status = PaymentStatus::Completed;
        payment.record.payment_id = Some(checkout.payment_id.clone());
        payment.record.payment_method = checkout.payment_method.clone();
        payment.record.payment_date = Some(Utc::now());
        payment.signature = Some(checkout.signature.clone());

        inner.enrollments.insert(
            (checkout.user_id, checkout.course_id),
            Enrollment {
                course_id: checkout.course_id,
                payment_id: checkout.payment_id,
                enrolled_at: Utc::now(),
            },
        );
        if let Some(course) = inner.courses.get_mut(&checkout.course_id) {
            course.enrolled_count += 1;
        }

        Ok(CommitOutcome::Enrolled)
    }

    async fn mark_captured(
        &self,
        order_id: &str,
        payment_id: &str,
        method: Option<&str>,
    ) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let Some(payment) = inner
            .payments
            .iter_mut()
            .find(|p| p.record.order_id == order_id)
        else {
            return Ok(false);
        };

        if payment.record.status != PaymentStatus::Pending {
            return Ok(false);
        }
        payment.record.status = PaymentStatus::Completed;
        payment.record.payment_id = Some(payment_id.to_string());
        payment.record.payment_method = method.map(str::to_string);
        payment.record.payment_date = Some(Utc::now());
        Ok(true)
    }

    async fn mark_failed(&self, order_id: &str) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let Some(payment) = inner
            .payments
            .iter_mut()
            .find(|p| p.record.order_id == order_id)
        else {
            return Ok(false);
        };

        if payment.record.status != PaymentStatus::Pending {
            return Ok(false);
        }
        payment.record.status = PaymentStatus::Failed;
        Ok(true)
    }

    async fn history(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<PaymentRecord>> {
        let mut records: Vec<PaymentRecord> = self
            .inner
            .lock()
            .unwrap()
            .payments
            .iter()
            .filter(|p| p.record.user_id == user_id)
            .map(|p| p.record.clone())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

#[async_trait::async_trait]
impl EnrollmentLedger for MemoryStore {
    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>> {
        Ok(self.enrollment(user_id, course_id))
    }
}

#[async_trait::async_trait]
impl CourseCatalog for MemoryStore {
    async fn find_active(&self, course_id: Uuid) -> Result<Option<CourseListing>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .courses
            .get(&course_id)
            .filter(|c| c.is_active)
            .map(|c| c.listing.clone()))
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<MockGateway>,
    pub orders: OrderService,
    pub verify: VerifyService,
    pub webhook: WebhookService,
}

pub fn harness() -> Harness {
    harness_with_min_amount(1)
}

pub fn harness_with_min_amount(min_order_amount: i64) -> Harness {
    let store = Arc::new(MemoryStore::default());
    let gateway = Arc::new(MockGateway::new());

    let orders = OrderService {
        catalog: store.clone(),
        ledger: store.clone(),
        payments: store.clone(),
        gateway: gateway.clone(),
        key_id: KEY_ID.to_string(),
        currency: "INR".to_string(),
        min_order_amount,
    };
    let verify = VerifyService {
        payments: store.clone(),
        ledger: store.clone(),
        gateway: gateway.clone(),
        key_secret: KEY_SECRET.to_string(),
    };
    let webhook = WebhookService {
        payments: store.clone(),
        webhook_secret: WEBHOOK_SECRET.to_string(),
    };

    Harness {
        store,
        gateway,
        orders,
        verify,
        webhook,
    }
}

pub fn sign(order_id: &str, payment_id: &str) -> String {
    signature::payment_signature(KEY_SECRET, order_id, payment_id)
        .expect("HMAC can take key of any size")
}

pub fn verify_request(
    payment_id: &str,
    order_id: &str,
    signature: &str,
    course_id: Uuid,
) -> VerifyRequest {
    VerifyRequest {
        razorpay_payment_id: Some(payment_id.to_string()),
        razorpay_order_id: Some(order_id.to_string()),
        razorpay_signature: Some(signature.to_string()),
        course_id: Some(course_id),
    }
}

pub fn stage_captured(
    gateway: &MockGateway,
    payment_id: &str,
    order_id: &str,
    amount_minor: i64,
    method: &str,
) {
    gateway.stage_payment(FetchedPayment {
        payment_id: payment_id.to_string(),
        order_id: Some(order_id.to_string()),
        status: "captured".to_string(),
        amount_minor,
        currency: "INR".to_string(),
        method: Some(method.to_string()),
    });
}

pub fn webhook_body(event: &str, payment_id: &str, order_id: &str, amount: i64) -> Vec<u8> {
    serde_json::json!({
        "event": event,
        "payload": {
            "payment": {
                "entity": {
                    "id": payment_id,
                    "order_id": order_id,
                    "amount": amount,
                    "method": "upi",
                    "status": if event == "payment.failed" { "failed" } else { "captured" }
                }
            }
        }
    })
    .to_string()
    .into_bytes()
}

pub fn webhook_signature(body: &[u8]) -> String {
    sign_webhook(body, WEBHOOK_SECRET)
}

pub fn sign_webhook(body: &[u8], secret: &str) -> String {
    type HmacSha256 = Hmac<Sha256>;
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
