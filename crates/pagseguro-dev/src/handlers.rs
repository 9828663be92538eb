//! # Request Handlers
//!
//! Axum request handlers for the developer stub gateway and the sample
//! notification receiver.

use crate::state::AppState;
use crate::stub::{self, CheckoutForm, UNAUTHORIZED_BODY, UNKNOWN_NOTIFICATION_CODE};
use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use pagseguro_client::{
    dispatch_notification, InboundNotification, LoggingNotificationHandler,
};
use pagseguro_core::{LookupCredentials, PaymentError};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query of the buyer payment page
#[derive(Debug, Deserialize)]
pub struct PaymentQuery {
    pub code: Option<String>,
}

/// Query of a notification lookup
#[derive(Debug, Deserialize)]
pub struct CredentialsQuery {
    pub email: Option<String>,
    pub token: Option<String>,
}

/// Answer of the sample notification receiver
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub handled: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

fn payment_error_to_response(err: PaymentError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if err.is_transport_failure() {
        response = response.with_details("gateway unreachable or answered garbage");
    }
    (StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), Json(response))
}

fn xml(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/xml; charset=UTF-8")],
        body,
    )
        .into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::CONTENT_TYPE, "text/plain; charset=UTF-8")],
        UNAUTHORIZED_BODY,
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "pagseguro-dev",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a checkout, as `POST /v2/checkout` would
#[instrument(skip(state, pairs), fields(params = pairs.len()))]
pub async fn create_checkout(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let form = CheckoutForm::from_pairs(pairs);

    if !state.account.accepts(form.get("email"), form.get("token")) {
        warn!("Checkout with bad credentials");
        return unauthorized();
    }

    let errors = form.errors();
    if !errors.is_empty() {
        info!("Rejecting checkout: {:?}", errors);
        return xml(StatusCode::BAD_REQUEST, stub::errors_xml(&errors));
    }

    let code = stub::checkout_code(form.get("reference").unwrap_or_default());
    let pending = form.into_pending(code.clone());
    let date = pending.created_at.clone();

    info!(
        "Created checkout: code={}, reference={}, {} items",
        code,
        pending.reference,
        pending.items.len()
    );

    state.store.write().await.checkouts.insert(code.clone(), pending);

    xml(StatusCode::OK, stub::checkout_xml(&code, &date))
}

/// The buyer pays: settle the checkout and announce it
#[instrument(skip(state, query))]
pub async fn pay_checkout(
    State(state): State<AppState>,
    Query(query): Query<PaymentQuery>,
) -> Result<Html<String>, (StatusCode, Json<ErrorResponse>)> {
    let code = query.code.unwrap_or_default();

    let pending = state.store.write().await.checkouts.remove(&code).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("Checkout not found: {}", code), 404)),
        )
    })?;

    let redirect_url = pending.redirect_url.clone();
    let transaction = stub::pay(pending);
    let notification_code = transaction.notification_code.clone();
    let reference = transaction.reference.clone();

    info!(
        "Checkout {} paid: transaction={}, notification={}",
        code, transaction.code, notification_code
    );

    state
        .store
        .write()
        .await
        .transactions
        .insert(notification_code.clone(), transaction);

    if let Some(ref notify_url) = state.config.notify_url {
        let result = state
            .http_client
            .post(notify_url)
            .form(&[
                ("notificationCode", notification_code.as_str()),
                ("notificationType", "transaction"),
            ])
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                info!("Notified {}: {}", notify_url, resp.status())
            }
            Ok(resp) => error!("Notification to {} failed: {}", notify_url, resp.status()),
            // The payment itself stands; the store can look it up later.
            Err(e) => error!("Failed to notify {}: {}", notify_url, e),
        }
    }

    let back = redirect_url
        .map(|url| format!(r#"<p><a href="{}">Back to the store</a></p>"#, escape(url.as_str())))
        .unwrap_or_default();

    Ok(Html(format!(
        r#"
<!DOCTYPE html>
<html>
<head><title>Payment Confirmed</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0;">
    <div style="padding: 60px; text-align: center;">
        <h1>Payment Confirmed</h1>
        <p>Order: <code>{}</code></p>
        <p>Notification: <code>{}</code></p>
        {}
    </div>
</body>
</html>
"#,
        escape(reference.as_str()),
        notification_code,
        back
    )))
}

/// Transaction lookup, as `GET /v2/transactions/notifications/{code}` would
#[instrument(skip(state, query))]
pub async fn get_notification(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<CredentialsQuery>,
) -> Response {
    if !state
        .account
        .accepts(query.email.as_deref(), query.token.as_deref())
    {
        warn!("Notification lookup with bad credentials");
        return unauthorized();
    }

    match state.store.read().await.transactions.get(&code) {
        Some(transaction) => xml(StatusCode::OK, stub::transaction_xml(transaction)),
        None => xml(
            StatusCode::NOT_FOUND,
            stub::errors_xml(&[(
                UNKNOWN_NOTIFICATION_CODE,
                format!("invalid notification code value: {code}"),
            )]),
        ),
    }
}

/// Sample store endpoint receiving gateway notifications
#[instrument(skip(state, params))]
pub async fn pagseguro_webhook(
    State(state): State<AppState>,
    method: Method,
    Form(params): Form<Vec<(String, String)>>,
) -> Result<Json<WebhookResponse>, (StatusCode, Json<ErrorResponse>)> {
    let inbound = InboundNotification::from_params(method, params);

    let handled = dispatch_notification(
        state.gateway.as_ref(),
        &LoggingNotificationHandler,
        &inbound,
        &LookupCredentials::default(),
    )
    .await
    .map_err(|e| {
        error!("Notification handling failed: {}", e);
        payment_error_to_response(e)
    })?;

    Ok(Json(WebhookResponse { handled }))
}
