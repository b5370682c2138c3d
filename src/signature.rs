use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Expected checkout signature: hex HMAC-SHA256 of `"{order_id}|{payment_id}"`
/// under the gateway key secret.
pub fn payment_signature(key_secret: &str, order_id: &str, payment_id: &str) -> Option<String> {
    hmac_hex(key_secret, format!("{order_id}|{payment_id}").as_bytes())
}

pub fn verify_payment_signature(
    key_secret: &str,
    order_id: &str,
    payment_id: &str,
    provided: &str,
) -> bool {
    match payment_signature(key_secret, order_id, payment_id) {
        Some(expected) => constant_time_eq(&expected, provided),
        None => false,
    }
}

/// Webhook signatures cover the raw request body under a secret distinct
/// from the checkout key secret.
pub fn verify_webhook_signature(webhook_secret: &str, raw_body: &[u8], provided: &str) -> bool {
    match hmac_hex(webhook_secret, raw_body) {
        Some(expected) => constant_time_eq(&expected, provided),
        None => false,
    }
}

/// Session tokens minted by the auth service: `"{user_id}.{hex hmac}"`.
pub fn session_token(session_secret: &str, user_id: Uuid) -> Option<String> {
    let id = user_id.to_string();
    hmac_hex(session_secret, id.as_bytes()).map(|sig| format!("{id}.{sig}"))
}

pub fn verify_session_token(session_secret: &str, token: &str) -> Option<Uuid> {
    let (id_part, provided) = token.split_once('.')?;
    let user_id = Uuid::parse_str(id_part).ok()?;
    let expected = hmac_hex(session_secret, id_part.as_bytes())?;
    constant_time_eq(&expected, provided).then_some(user_id)
}

fn hmac_hex(secret: &str, data: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(data);
    Some(hex::encode(mac.finalize().into_bytes()))
}

// Length is not secret (always 64 hex chars for SHA-256), so the early
// length check does not weaken the constant-time comparison.
fn constant_time_eq(expected: &str, provided: &str) -> bool {
    let expected = expected.as_bytes();
    let provided = provided.as_bytes();
    expected.len() == provided.len() && bool::from(expected.ct_eq(provided))
}
