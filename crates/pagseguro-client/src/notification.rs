//! # Notification Handling
//!
//! The gateway posts `notificationCode=...` to the store whenever a
//! transaction changes. The store then looks the transaction up. This module
//! does that round trip without depending on any web framework: the caller
//! describes the inbound request with an [`InboundNotification`] and gets the
//! resulting [`Notification`] through a [`NotificationHandler`].
//!
//! ```rust,ignore
//! let inbound = InboundNotification::from_form(Method::POST, &body)?;
//! dispatch_notification(&client, &|n: Notification| {
//!     println!("{:?} is now {:?}", n.reference(), n.status());
//!     Ok(())
//! }, &inbound, &LookupCredentials::default()).await?;
//! ```

use pagseguro_core::{
    LookupCredentials, Notification, PaymentError, PaymentGateway, PaymentResult,
};
use reqwest::Method;
use tracing::{debug, info};

/// Form field carrying the code
pub const NOTIFICATION_CODE_FIELD: &str = "notificationCode";

/// What the store received from the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundNotification {
    pub method: Method,
    pub notification_code: Option<String>,
}

impl InboundNotification {
    pub fn new(method: Method, notification_code: Option<String>) -> Self {
        Self {
            method,
            notification_code,
        }
    }

    /// Inbound POST carrying `code`
    pub fn post(code: impl Into<String>) -> Self {
        Self::new(Method::POST, Some(code.into()))
    }

    /// Build from request parameters
    pub fn from_params<I, K, V>(method: Method, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let notification_code = params
            .into_iter()
            .find(|(key, _)| key.as_ref() == NOTIFICATION_CODE_FIELD)
            .map(|(_, value)| value.into());
        Self::new(method, notification_code)
    }

    /// Build from a url-encoded request body
    pub fn from_form(method: Method, body: &str) -> PaymentResult<Self> {
        let params: Vec<(String, String)> = serde_urlencoded::from_str(body)
            .map_err(|e| PaymentError::InvalidRequest(format!("invalid form body: {e}")))?;
        Ok(Self::from_params(method, params))
    }
}

/// Receives fetched notifications
pub trait NotificationHandler: Send + Sync {
    fn on_notification(&self, notification: Notification) -> PaymentResult<()>;
}

impl<F> NotificationHandler for F
where
    F: Fn(Notification) -> PaymentResult<()> + Send + Sync,
{
    fn on_notification(&self, notification: Notification) -> PaymentResult<()> {
        self(notification)
    }
}

/// Handler that only logs
pub struct LoggingNotificationHandler;

impl NotificationHandler for LoggingNotificationHandler {
    fn on_notification(&self, notification: Notification) -> PaymentResult<()> {
        info!(
            "Notification {}: reference={:?}, status={:?}",
            notification.code,
            notification.reference(),
            notification.status()
        );
        Ok(())
    }
}

/// Look up an inbound notification and hand it to `handler`.
///
/// Only POST requests are acted on; anything else returns `Ok(false)`
/// without contacting the gateway. A POST without a code is an
/// `InvalidRequest`. Lookup failures are returned as they are.
pub async fn dispatch_notification(
    gateway: &dyn PaymentGateway,
    handler: &dyn NotificationHandler,
    inbound: &InboundNotification,
    credentials: &LookupCredentials,
) -> PaymentResult<bool> {
    if inbound.method != Method::POST {
        debug!("Ignoring {} notification request", inbound.method);
        return Ok(false);
    }

    let code = inbound
        .notification_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| {
            PaymentError::InvalidRequest(format!("missing {NOTIFICATION_CODE_FIELD}"))
        })?;

    let notification = gateway.fetch_notification(code, credentials).await?;
    handler.on_notification(notification)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pagseguro_core::{Order, Submission};
    use serde_json::json;
    use std::sync::Mutex;

    /// Records lookups and answers with a fixed transaction
    #[derive(Default)]
    struct RecordingGateway {
        lookups: Mutex<Vec<(String, LookupCredentials)>>,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_checkout(&self, _order: &Order) -> PaymentResult<Submission> {
            unimplemented!()
        }

        async fn fetch_notification(
            &self,
            notification_code: &str,
            credentials: &LookupCredentials,
        ) -> PaymentResult<Notification> {
            self.lookups
                .lock()
                .unwrap()
                .push((notification_code.to_string(), credentials.clone()));
            Ok(Notification::new(
                notification_code,
                json!({ "reference": "REF1234", "status": "3" }),
            ))
        }

        fn payment_url(&self, checkout_code: &str) -> String {
            format!("http://localhost/payment?code={checkout_code}")
        }

        fn notification_url(&self, notification_code: &str) -> String {
            format!("http://localhost/notification/{notification_code}")
        }
    }

    const CODE: &str = "766B9C-AD4B044B04DA-77742F5FA653-E1AB24";

    #[test]
    fn test_from_form() {
        let inbound = InboundNotification::from_form(
            Method::POST,
            "notificationCode=766B9C-AD4B044B04DA-77742F5FA653-E1AB24&notificationType=transaction",
        )
        .unwrap();
        assert_eq!(inbound, InboundNotification::post(CODE));

        let missing = InboundNotification::from_form(Method::POST, "notificationType=transaction").unwrap();
        assert_eq!(missing.notification_code, None);
    }

    #[tokio::test]
    async fn test_post_is_looked_up_and_handled() {
        let gateway = RecordingGateway::default();
        let seen = Mutex::new(Vec::new());
        let handler = |n: Notification| -> PaymentResult<()> {
            seen.lock().unwrap().push(n.reference().map(String::from));
            Ok(())
        };

        let handled = dispatch_notification(
            &gateway,
            &handler,
            &InboundNotification::post(CODE),
            &LookupCredentials::default(),
        )
        .await
        .unwrap();

        assert!(handled);
        assert_eq!(*seen.lock().unwrap(), vec![Some("REF1234".to_string())]);
        assert_eq!(gateway.lookups.lock().unwrap()[0].0, CODE);
    }

    #[tokio::test]
    async fn test_credentials_are_passed_through() {
        let gateway = RecordingGateway::default();
        let credentials = LookupCredentials::default().with_email("other@example.com");

        dispatch_notification(
            &gateway,
            &LoggingNotificationHandler,
            &InboundNotification::post(CODE),
            &credentials,
        )
        .await
        .unwrap();

        let lookups = gateway.lookups.lock().unwrap();
        assert_eq!(lookups[0].1.email.as_deref(), Some("other@example.com"));
        assert_eq!(lookups[0].1.token, None);
    }

    #[tokio::test]
    async fn test_non_post_is_ignored() {
        let gateway = RecordingGateway::default();
        let inbound = InboundNotification::new(Method::GET, Some(CODE.to_string()));

        let handled = dispatch_notification(
            &gateway,
            &LoggingNotificationHandler,
            &inbound,
            &LookupCredentials::default(),
        )
        .await
        .unwrap();

        assert!(!handled);
        assert!(gateway.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_post_without_code_is_rejected() {
        let gateway = RecordingGateway::default();
        let inbound = InboundNotification::new(Method::POST, Some("  ".to_string()));

        let err = dispatch_notification(
            &gateway,
            &LoggingNotificationHandler,
            &inbound,
            &LookupCredentials::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PaymentError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_handler_errors_propagate() {
        let gateway = RecordingGateway::default();
        let failing = |_n: Notification| -> PaymentResult<()> {
            Err(PaymentError::InvalidRequest("order not found".into()))
        };

        let result = dispatch_notification(
            &gateway,
            &failing,
            &InboundNotification::post(CODE),
            &LookupCredentials::default(),
        )
        .await;

        assert!(result.is_err());
    }
}
