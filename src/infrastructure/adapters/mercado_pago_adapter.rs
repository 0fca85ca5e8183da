use crate::domain::errors::DomainResult;
use crate::domain::Order;
use crate::infrastructure::config::MercadoPagoConfig;
use crate::ports::{PaymentGatewayPort, QrCodeIssue, WebhookNotification};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Mercado Pago instore QR adapter.
///
/// Issues dynamic QR orders against the seller's point of sale and maps
/// merchant-order webhook callbacks into normalized notifications.
#[derive(Clone)]
pub struct MercadoPagoAdapter {
    config: Arc<MercadoPagoConfig>,
    client: Client,
}

impl MercadoPagoAdapter {
    pub fn new(config: Arc<MercadoPagoConfig>) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn qr_order_body(&self, order: &Order, description: &str) -> DomainResult<Value> {
        let items = order
            .items
            .iter()
            .map(|item| {
                Ok(json!({
                    "title": item.name,
                    "unit_price": cents_to_units(item.unit_price.to_cents()),
                    "quantity": item.quantity.value(),
                    "unit_measure": "unit",
                    "total_amount": cents_to_units(item.total()?.to_cents()),
                }))
            })
            .collect::<DomainResult<Vec<Value>>>()?;

        Ok(json!({
            "external_reference": order.id,
            "title": description,
            "description": description,
            "notification_url": self.config.notification_url,
            "total_amount": cents_to_units(order.total.to_cents()),
            "items": items,
        }))
    }

    /// Map a fetched merchant order into a notification.
    ///
    /// Only orders the gateway reports as `closed` are final; anything else
    /// maps to the empty notification so reconciliation skips it.
    fn notification_from_merchant_order(merchant_order: &Value) -> WebhookNotification {
        if merchant_order["status"].as_str() != Some("closed") {
            return WebhookNotification::empty();
        }

        let reference = match &merchant_order["id"] {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return WebhookNotification::empty(),
        };

        let raw_status = merchant_order["order_status"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let paid = raw_status == "paid";

        WebhookNotification {
            gateway_reference: reference,
            raw_status,
            paid,
        }
    }

    async fn fetch_webhook_resource(&self, raw_payload: &str) -> DomainResult<WebhookNotification> {
        let payload: Value = serde_json::from_str(raw_payload)?;

        let topic = payload["topic"].as_str().unwrap_or_default();
        let resource = payload["resource"].as_str().unwrap_or_default();
        if resource.is_empty() || !matches!(topic, "payment" | "merchant_order") {
            debug!(topic = %topic, "webhook payload carries no usable resource");
            return Ok(WebhookNotification::empty());
        }

        let response = self
            .client
            .get(resource)
            .bearer_auth(&self.config.access_token)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let merchant_order: Value = response.json().await?;
        debug!("merchant order fetched: {merchant_order}");

        Ok(Self::notification_from_merchant_order(&merchant_order))
    }
}

#[async_trait]
impl PaymentGatewayPort for MercadoPagoAdapter {
    async fn issue_qr_code(&self, order: &Order, description: &str) -> DomainResult<QrCodeIssue> {
        let url = format!(
            "{}/instore/orders/qr/seller/collectors/{}/pos/{}/qrs",
            self.config.base_url, self.config.user_id, self.config.pos_id
        );

        let body = self.qr_order_body(order, description)?;
        debug!(order_id = %order.id, "issuing qr order: {body}");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .header("X-Idempotency-Key", uuid::Uuid::new_v4().to_string())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(order_id = %order.id, "qr issuance refused: {status} - {error_text}");
            return Ok(QrCodeIssue::declined());
        }

        let resp_json: Value = response.json().await?;
        match (
            resp_json["in_store_order_id"].as_str(),
            resp_json["qr_data"].as_str(),
        ) {
            (Some(reference), Some(qr_data)) if !reference.is_empty() && !qr_data.is_empty() => {
                Ok(QrCodeIssue {
                    gateway_reference: reference.to_string(),
                    qr_code: qr_data.to_string(),
                })
            }
            _ => {
                warn!(order_id = %order.id, "gateway response carries no qr order");
                Ok(QrCodeIssue::declined())
            }
        }
    }

    async fn parse_webhook(&self, raw_payload: &str) -> WebhookNotification {
        match self.fetch_webhook_resource(raw_payload).await {
            Ok(notification) => notification,
            Err(e) => {
                // Contract with the webhook boundary: never raise. The
                // warning is what monitoring alerts on.
                warn!("webhook payload could not be resolved, mapping to no-op: {e}");
                WebhookNotification::empty()
            }
        }
    }
}

fn cents_to_units(cents: i64) -> f64 {
    cents as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Money, OrderItem, Quantity};

    fn adapter() -> MercadoPagoAdapter {
        MercadoPagoAdapter::new(Arc::new(MercadoPagoConfig {
            access_token: "token".to_string(),
            user_id: "123".to_string(),
            pos_id: "POS1".to_string(),
            notification_url: "https://example.com/payment/webhook".to_string(),
            base_url: "https://api.mercadopago.com".to_string(),
        }))
    }

    fn order() -> Order {
        Order {
            id: "1".to_string(),
            total: Money::from_cents(1000).unwrap(),
            items: vec![OrderItem {
                name: "Burger".to_string(),
                quantity: Quantity::new(2).unwrap(),
                unit_price: Money::from_cents(500).unwrap(),
            }],
            customer: None,
        }
    }

    #[test]
    fn qr_order_body_carries_reference_and_totals() {
        let body = adapter().qr_order_body(&order(), "Snack bar order").unwrap();

        assert_eq!(body["external_reference"], "1");
        assert_eq!(body["total_amount"], 10.0);
        assert_eq!(
            body["notification_url"],
            "https://example.com/payment/webhook"
        );
        assert_eq!(body["items"][0]["title"], "Burger");
        assert_eq!(body["items"][0]["quantity"], 2);
        assert_eq!(body["items"][0]["total_amount"], 10.0);
    }

    #[test]
    fn closed_paid_merchant_order_maps_to_paid_notification() {
        let merchant_order = json!({
            "id": 12345,
            "status": "closed",
            "order_status": "paid",
        });

        let notification =
            MercadoPagoAdapter::notification_from_merchant_order(&merchant_order);

        assert_eq!(notification.gateway_reference, "12345");
        assert_eq!(notification.raw_status, "paid");
        assert!(notification.paid);
    }

    #[test]
    fn closed_expired_merchant_order_maps_to_unpaid_notification() {
        let merchant_order = json!({
            "id": "12345",
            "status": "closed",
            "order_status": "expired",
        });

        let notification =
            MercadoPagoAdapter::notification_from_merchant_order(&merchant_order);

        assert_eq!(notification.gateway_reference, "12345");
        assert!(!notification.paid);
    }

    #[test]
    fn open_merchant_order_is_not_final() {
        let merchant_order = json!({
            "id": 12345,
            "status": "opened",
            "order_status": "payment_required",
        });

        let notification =
            MercadoPagoAdapter::notification_from_merchant_order(&merchant_order);

        assert!(notification.is_empty());
    }

    #[tokio::test]
    async fn unparseable_webhook_payload_maps_to_empty_notification() {
        let notification = adapter().parse_webhook("not even json").await;
        assert!(notification.is_empty());
    }

    #[tokio::test]
    async fn webhook_without_resource_maps_to_empty_notification() {
        let notification = adapter()
            .parse_webhook(r#"{"resource":"","topic":"payment"}"#)
            .await;
        assert!(notification.is_empty());
    }

    #[tokio::test]
    async fn webhook_with_unknown_topic_maps_to_empty_notification() {
        let notification = adapter()
            .parse_webhook(r#"{"resource":"https://x/1","topic":"test"}"#)
            .await;
        assert!(notification.is_empty());
    }
}
