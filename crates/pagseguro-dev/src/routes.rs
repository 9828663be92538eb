//! # Routes
//!
//! Axum router for the developer stub gateway.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{any, get, post},
    Router,
};
use pagseguro_client::config::{
    DEVELOPER_CHECKOUT_PATH, DEVELOPER_NOTIFICATION_PATH, DEVELOPER_PAYMENT_PATH,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Stub gateway (the paths a developer-mode client calls):
///   - POST /pagseguro_developer/checkout - Create checkout
///   - GET  /pagseguro_developer/payment?code= - Buyer pays
///   - GET  /pagseguro_developer_notification/{code} - Transaction lookup
///
/// - Sample store:
///   - POST /webhook/pagseguro - Notification receiver
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let gateway_routes = Router::new()
        .route(DEVELOPER_CHECKOUT_PATH, post(handlers::create_checkout))
        .route(DEVELOPER_PAYMENT_PATH, get(handlers::pay_checkout))
        .route(
            &format!("{DEVELOPER_NOTIFICATION_PATH}/{{code}}"),
            get(handlers::get_notification),
        );

    let webhook_routes = Router::new()
        .route("/pagseguro", any(handlers::pagseguro_webhook));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .merge(gateway_routes)
        .nest("/webhook", webhook_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use pagseguro_client::GatewayConfig;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EMAIL: &str = "john@doe.com";
    const TOKEN: &str = "9CA8D46AF0C6177CB4C23D76CAF5E4B0";

    fn app_config(notify_url: Option<String>) -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            notify_url,
            environment: "test".to_string(),
        }
    }

    fn state_with(notify_url: Option<String>, gateway: GatewayConfig) -> AppState {
        AppState::with_gateway_config(app_config(notify_url), gateway).unwrap()
    }

    fn server(state: AppState) -> TestServer {
        TestServer::new(create_router(state)).unwrap()
    }

    fn checkout_form(token: &str) -> Vec<(&'static str, String)> {
        vec![
            ("email", EMAIL.to_string()),
            ("token", token.to_string()),
            ("currency", "BRL".to_string()),
            ("reference", "I1001".to_string()),
            ("itemId1", "1001".to_string()),
            ("itemDescription1", "Rails 3 e-Book".to_string()),
            ("itemAmount1", "10.00".to_string()),
            ("itemQuantity1", "1".to_string()),
        ]
    }

    async fn paid_notification_code(state: &AppState, server: &TestServer) -> String {
        let response = server
            .post(DEVELOPER_CHECKOUT_PATH)
            .form(&checkout_form(TOKEN))
            .await;
        response.assert_status_ok();

        let code = state.store.read().await.checkouts.keys().next().unwrap().clone();
        server
            .get(DEVELOPER_PAYMENT_PATH)
            .add_query_param("code", &code)
            .await
            .assert_status_ok();

        let store = state.store.read().await;
        let notification_code = store.transactions.keys().next().unwrap().clone();
        notification_code
    }

    #[tokio::test]
    async fn test_health() {
        let server = server(state_with(None, GatewayConfig::new(EMAIL, TOKEN)));
        let response = server.get("/health").await;
        response.assert_status_ok();
        assert!(response.text().contains("healthy"));
    }

    #[tokio::test]
    async fn test_checkout_created() {
        let state = state_with(None, GatewayConfig::new(EMAIL, TOKEN));
        let server = server(state.clone());

        let response = server
            .post(DEVELOPER_CHECKOUT_PATH)
            .form(&checkout_form(TOKEN))
            .await;

        response.assert_status_ok();
        let body = response.text();
        assert!(body.contains("<checkout><code>"));
        assert!(body.contains("<date>"));

        let store = state.store.read().await;
        let (code, pending) = store.checkouts.iter().next().unwrap();
        assert_eq!(code.len(), 32);
        assert!(body.contains(code.as_str()));
        assert_eq!(pending.reference, "I1001");
    }

    #[tokio::test]
    async fn test_checkout_bad_token_is_unauthorized() {
        let server = server(state_with(None, GatewayConfig::new(EMAIL, TOKEN)));

        let response = server
            .post(DEVELOPER_CHECKOUT_PATH)
            .form(&checkout_form("WRONG"))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.text(), "Unauthorized");
    }

    #[tokio::test]
    async fn test_checkout_errors() {
        let server = server(state_with(None, GatewayConfig::new(EMAIL, TOKEN)));

        let response = server
            .post(DEVELOPER_CHECKOUT_PATH)
            .form(&[("email", EMAIL), ("token", TOKEN), ("currency", "USD")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.text();
        assert!(body.contains("<code>11005</code>"));
        assert!(body.contains("<code>11024</code>"));
    }

    #[tokio::test]
    async fn test_unknown_checkout_payment_is_not_found() {
        let server = server(state_with(None, GatewayConfig::new(EMAIL, TOKEN)));

        server
            .get(DEVELOPER_PAYMENT_PATH)
            .add_query_param("code", "NOPE")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_payment_posts_notification() {
        let store = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notifications"))
            .and(body_string_contains("notificationType=transaction"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&store)
            .await;

        let state = state_with(
            Some(format!("{}/notifications", store.uri())),
            GatewayConfig::new(EMAIL, TOKEN),
        );
        let server = server(state.clone());

        let notification_code = paid_notification_code(&state, &server).await;

        let requests = store.received_requests().await.unwrap();
        let body = String::from_utf8(requests[0].body.clone()).unwrap();
        assert!(body.contains(&format!("notificationCode={notification_code}")));
        assert!(state.store.read().await.checkouts.is_empty());
    }

    #[tokio::test]
    async fn test_notification_lookup() {
        let state = state_with(None, GatewayConfig::new(EMAIL, TOKEN));
        let server = server(state.clone());
        let code = paid_notification_code(&state, &server).await;
        let lookup = format!("{DEVELOPER_NOTIFICATION_PATH}/{code}");

        let response = server
            .get(&lookup)
            .add_query_param("email", EMAIL)
            .add_query_param("token", TOKEN)
            .await;
        response.assert_status_ok();
        let body = response.text();
        assert!(body.contains("<reference>I1001</reference>"));
        assert!(body.contains("<status>3</status>"));
        assert!(body.contains("<grossAmount>10.00</grossAmount>"));

        server
            .get(&lookup)
            .add_query_param("email", EMAIL)
            .add_query_param("token", "WRONG")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        server
            .get(&format!("{DEVELOPER_NOTIFICATION_PATH}/UNKNOWN"))
            .add_query_param("email", EMAIL)
            .add_query_param("token", TOKEN)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_webhook_looks_up_notification() {
        let gateway = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pagseguro_developer_notification/766B9C"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<transaction><code>T1</code><reference>REF1234</reference><status>3</status></transaction>",
            ))
            .expect(1)
            .mount(&gateway)
            .await;

        let state = state_with(
            None,
            GatewayConfig::new(EMAIL, TOKEN).with_developer_base(gateway.uri()),
        );
        let server = server(state);

        let response = server
            .post("/webhook/pagseguro")
            .form(&[("notificationCode", "766B9C"), ("notificationType", "transaction")])
            .await;

        response.assert_status_ok();
        assert!(response.json::<handlers::WebhookResponse>().handled);
    }

    #[tokio::test]
    async fn test_webhook_without_code_is_bad_request() {
        let server = server(state_with(None, GatewayConfig::new(EMAIL, TOKEN)));

        server
            .post("/webhook/pagseguro")
            .form(&[("notificationType", "transaction")])
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_webhook_ignores_get() {
        let server = server(state_with(None, GatewayConfig::new(EMAIL, TOKEN)));

        let response = server
            .get("/webhook/pagseguro")
            .add_query_param("notificationCode", "766B9C")
            .await;

        response.assert_status_ok();
        assert!(!response.json::<handlers::WebhookResponse>().handled);
    }
}
