//! Gateway client against a mocked PagSeguro API.

use pagseguro_client::{
    dispatch_notification, GatewayConfig, InboundNotification, PagSeguroClient,
    FORM_CONTENT_TYPE,
};
use pagseguro_core::{
    Billing, BillingField, LineItem, LookupCredentials, Notification, Order, OrderField,
    PaymentError, PaymentGateway, PaymentResult, ShippingType, TransactionStatus,
};
use reqwest::Method;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMAIL: &str = "john@doe.com";
const TOKEN: &str = "9CA8D46AF0C6177CB4C23D76CAF5E4B0";
const NOTIFICATION_CODE: &str = "766B9C-AD4B044B04DA-77742F5FA653-E1AB24";

const CHECKOUT_XML: &str = r#"<?xml version="1.0" encoding="ISO-8859-1" standalone="yes"?>
<checkout>
    <code>8CF4BE7DCECEF0F004A6DFA0A8243412</code>
    <date>2010-12-02T10:11:28.000-02:00</date>
</checkout>"#;

const TRANSACTION_XML: &str = r#"<?xml version="1.0" encoding="ISO-8859-1" standalone="yes"?>
<transaction>
    <date>2011-02-10T16:13:41.000-03:00</date>
    <code>9E884542-81B3-4419-9A75-BCC6FB495EF1</code>
    <reference>REF1234</reference>
    <type>1</type>
    <status>3</status>
    <paymentMethod><type>1</type><code>101</code></paymentMethod>
    <grossAmount>49900.00</grossAmount>
    <items>
        <itemCount>2</itemCount>
        <item><id>0001</id><description>Notebook</description><quantity>1</quantity><amount>24300.00</amount></item>
        <item><id>0002</id><description>Mochila</description><quantity>1</quantity><amount>25600.00</amount></item>
    </items>
    <sender><name>José Comprador</name><email>comprador@uol.com.br</email></sender>
</transaction>"#;

fn client_for(server: &MockServer) -> PagSeguroClient {
    let config = GatewayConfig::new(EMAIL, TOKEN)
        .with_checkout_url(format!("{}/v2/checkout", server.uri()))
        .with_notification_url(format!("{}/v2/transactions/notifications", server.uri()));
    PagSeguroClient::new(config).unwrap()
}

fn sample_order() -> Order {
    Order::new("I1001")
        .with_shipping_type(ShippingType::Express)
        .with_extra_amount("-35.20".parse().unwrap())
        .with_item(LineItem::new("1001", "Rails 3 e-Book", "10.00".parse().unwrap()))
        .with_item(
            LineItem::new("1002", "T-Shirt", "17.23".parse().unwrap())
                .with_quantity(2)
                .with_weight(300),
        )
        .with_billing(Billing::new().with(BillingField::Name, "John Doe"))
}

async fn posted_form(server: &MockServer) -> HashMap<String, String> {
    let requests = server.received_requests().await.unwrap();
    let body = &requests.last().unwrap().body;
    serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
        .unwrap()
        .into_iter()
        .collect()
}

#[tokio::test]
async fn test_successful_checkout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/checkout"))
        .and(header("content-type", FORM_CONTENT_TYPE))
        .and(body_string_contains("currency=BRL"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CHECKOUT_XML))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut order = sample_order();

    assert!(order.submit(&client).await.unwrap());
    assert_eq!(order.checkout_code(), Some("8CF4BE7DCECEF0F004A6DFA0A8243412"));
    assert_eq!(
        order.checkout_date().unwrap().to_rfc3339(),
        "2010-12-02T10:11:28-02:00"
    );
    assert!(order.errors().is_empty());

    let form = posted_form(&server).await;
    assert_eq!(form["email"], EMAIL);
    assert_eq!(form["token"], TOKEN);
    assert_eq!(form["reference"], "I1001");
    assert_eq!(form["shippingType"], "2");
    assert_eq!(form["extraAmount"], "-35.20");
    assert_eq!(form["itemAmount1"], "10.00");
    assert_eq!(form["itemQuantity2"], "2");
    assert_eq!(form["itemWeight2"], "300");
    assert_eq!(form["senderName"], "John Doe");
    assert!(!form.contains_key("itemWeight1"));
    assert!(!form.contains_key("maxUses"));
}

#[tokio::test]
async fn test_gateway_errors_on_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/checkout"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            "<?xml version=\"1.0\" encoding=\"ISO-8859-1\" standalone=\"yes\"?>\
             <errors>\
             <error><code>11004</code><message>Currency is required.</message></error>\
             <error><code>11005</code><message>Currency invalid value: 100</message></error>\
             <error><code>11024</code><message>Items invalid quantity.</message></error>\
             </errors>",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut order = sample_order();

    assert!(!order.submit(&client).await.unwrap());
    assert_eq!(order.checkout_code(), None);
    assert_eq!(
        order.errors_on(OrderField::Currency),
        ["Currency is required.", "Currency invalid value: 100"]
    );
    assert_eq!(order.errors_on(OrderField::Base), ["Items invalid quantity."]);
}

#[tokio::test]
async fn test_unauthorized_checkout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/checkout"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let submission = client.create_checkout(&sample_order()).await.unwrap();

    assert!(!submission.is_valid());
    assert_eq!(submission.errors.len(), 1);
    assert_eq!(submission.errors.base(), ["Unauthorized"]);
    assert!(submission.checkout.is_none());
}

#[tokio::test]
async fn test_localized_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            "<errors><error><code>11004</code><message>Currency is required.</message></error></errors>",
        ))
        .mount(&server)
        .await;

    let config = GatewayConfig::new(EMAIL, TOKEN)
        .with_checkout_url(format!("{}/v2/checkout", server.uri()))
        .with_messages(HashMap::from([(11004, "Moeda é obrigatória.".to_string())]));
    let client = PagSeguroClient::new(config).unwrap();

    let submission = client.create_checkout(&sample_order()).await.unwrap();
    assert_eq!(
        submission.errors.get(OrderField::Currency),
        ["Moeda é obrigatória."]
    );
}

#[tokio::test]
async fn test_malformed_body_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html><body>Bad Gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut order = sample_order();
    let err = order.submit(&client).await.unwrap_err();

    assert!(matches!(err, PaymentError::MalformedResponse(_)));
    assert!(order.submission().is_none());
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(CHECKOUT_XML)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = GatewayConfig::new(EMAIL, TOKEN)
        .with_checkout_url(format!("{}/v2/checkout", server.uri()))
        .with_timeout(Duration::from_millis(200));
    let client = PagSeguroClient::new(config).unwrap();

    let err = client.create_checkout(&sample_order()).await.unwrap_err();
    assert!(matches!(err, PaymentError::NetworkError(_)));
    assert!(err.is_transport_failure());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let config = GatewayConfig::new(EMAIL, TOKEN).with_checkout_url("http://127.0.0.1:9/v2/checkout");
    let client = PagSeguroClient::new(config).unwrap();

    let err = client.create_checkout(&sample_order()).await.unwrap_err();
    assert!(matches!(err, PaymentError::NetworkError(_)));
}

#[tokio::test]
async fn test_fetch_notification_with_default_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v2/transactions/notifications/{NOTIFICATION_CODE}")))
        .and(query_param("email", EMAIL))
        .and(query_param("token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRANSACTION_XML))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let notification = client
        .fetch_notification(NOTIFICATION_CODE, &LookupCredentials::default())
        .await
        .unwrap();

    assert_eq!(notification.code, NOTIFICATION_CODE);
    assert_eq!(notification.reference(), Some("REF1234"));
    assert_eq!(notification.status(), Some(TransactionStatus::Paid));
    assert_eq!(notification.gross_amount(), Some("49900.00".parse().unwrap()));
    assert_eq!(notification.get_str("payment_method/code"), Some("101"));
    assert_eq!(notification.get("items/item").unwrap().as_array().unwrap().len(), 2);
    assert_eq!(notification.sender_email(), Some("comprador@uol.com.br"));
}

#[tokio::test]
async fn test_fetch_notification_with_custom_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("email", "other@example.com"))
        .and(query_param("token", "B4E5FAC67D32C4BC7716C0FA"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRANSACTION_XML))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let credentials = LookupCredentials::default()
        .with_email("other@example.com")
        .with_token("B4E5FAC67D32C4BC7716C0FA");

    client
        .fetch_notification(NOTIFICATION_CODE, &credentials)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_fetch_notification_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/transactions/notifications/UNAUTH"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/transactions/notifications/BAD"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            "<errors><error><code>13001</code><message>invalid notification code value</message></error></errors>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/transactions/notifications/EMPTY"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<result/>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let none = LookupCredentials::default();

    assert!(matches!(
        client.fetch_notification("UNAUTH", &none).await,
        Err(PaymentError::Unauthorized)
    ));
    assert!(matches!(
        client.fetch_notification("BAD", &none).await,
        Err(PaymentError::ProviderError { ref message, .. }) if message.contains("13001")
    ));
    assert!(matches!(
        client.fetch_notification("EMPTY", &none).await,
        Err(PaymentError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_notification_code_cannot_redirect_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRANSACTION_XML))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);

    for code in ["../../checkout", "ABC/../../checkout?x=1", "ABC#frag", "ABC?token=x"] {
        let err = client
            .fetch_notification(code, &LookupCredentials::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidRequest(_)), "{code:?}");
    }

    let inbound = InboundNotification::post("../../checkout");
    let handler = |_n: Notification| -> PaymentResult<()> { Ok(()) };
    let err = dispatch_notification(&client, &handler, &inbound, &LookupCredentials::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_dispatch_notification_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v2/transactions/notifications/{NOTIFICATION_CODE}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRANSACTION_XML))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let received = Mutex::new(None);
    let handler = |n: Notification| -> PaymentResult<()> {
        *received.lock().unwrap() = n.status();
        Ok(())
    };

    let get = InboundNotification::new(Method::GET, Some(NOTIFICATION_CODE.to_string()));
    assert!(!dispatch_notification(&client, &handler, &get, &LookupCredentials::default())
        .await
        .unwrap());

    let body = format!("notificationCode={NOTIFICATION_CODE}&notificationType=transaction");
    let post = InboundNotification::from_form(Method::POST, &body).unwrap();
    assert!(dispatch_notification(&client, &handler, &post, &LookupCredentials::default())
        .await
        .unwrap());

    assert_eq!(*received.lock().unwrap(), Some(TransactionStatus::Paid));
}
