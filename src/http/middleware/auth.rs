use crate::signature;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct AuthedUser {
    pub user_id: Uuid,
}

/// Sessions are minted by the auth service as `{user_id}.{hex hmac}` over
/// the shared session secret; this middleware only checks the seal.
pub async fn require_session(
    State(session_secret): State<String>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    match signature::verify_session_token(&session_secret, token) {
        Some(user_id) => {
            request.extensions_mut().insert(AuthedUser { user_id });
            next.run(request).await
        }
        None => Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .body(Body::from("unauthorized"))
            .unwrap_or_else(|_| Response::new(Body::from("unauthorized"))),
    }
}
