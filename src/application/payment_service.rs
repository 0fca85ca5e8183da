use crate::domain::errors::DomainResult;
use crate::domain::{Order, OrderStatusEvent, Payment};
use crate::ports::{PaymentGatewayPort, PaymentStorePort, StatusNotifierPort};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Description attached to every QR order sent to the gateway.
const QR_CODE_DESCRIPTION: &str = "Snack bar order";

/// Payment lifecycle orchestrator.
///
/// Coordinates the store, the gateway and the notifier; never talks to
/// transport or persistence protocols directly. The orchestrator holds no
/// mutable state of its own and performs no locking; operations for
/// different orders proceed fully in parallel, and the store provides the
/// only atomicity (per update call).
pub struct PaymentService<S, G, N> {
    store: Arc<S>,
    gateway: Arc<G>,
    notifier: Arc<N>,
}

impl<S, G, N> PaymentService<S, G, N>
where
    S: PaymentStorePort,
    G: PaymentGatewayPort,
    N: StatusNotifierPort + 'static,
{
    pub fn new(store: Arc<S>, gateway: Arc<G>, notifier: Arc<N>) -> Self {
        Self {
            store,
            gateway,
            notifier,
        }
    }

    /// Start a payment lifecycle for an order.
    ///
    /// Creates the pending record, announces the order to the queue and
    /// requests a QR code. When the gateway declines to issue a code the
    /// payment is cancelled instead of being left dangling in
    /// `AwaitingResponse`.
    pub async fn start(&self, order: &Order) -> DomainResult<Payment> {
        info!(order_id = %order.id, "starting payment");

        let mut payment = self.store.create(order).await?;
        debug!(payment_id = payment.id, "pending payment created");

        self.notify(&order.id, OrderStatusEvent::OrderSentToPayment);

        let issue = self.gateway.issue_qr_code(order, QR_CODE_DESCRIPTION).await?;
        if issue.is_issued() {
            payment.attach_gateway_qr(issue.gateway_reference, issue.qr_code)?;
            let payment = self.store.update(&payment).await?;
            info!(payment_id = payment.id, "payment updated with the issued qr code");
            Ok(payment)
        } else {
            warn!(order_id = %order.id, "gateway declined to issue a qr code, cancelling");
            self.cancel(&order.id).await
        }
    }

    /// Confirm the payment for an order as paid and hand the order to the
    /// kitchen queue.
    pub async fn mark_paid(&self, order_id: &str) -> DomainResult<Payment> {
        let mut payment = self.store.find_by_order(order_id).await?;
        payment.mark_paid();
        let payment = self.store.update(&payment).await?;

        self.notify(order_id, OrderStatusEvent::SentToKitchen);

        info!(order_id = %order_id, "payment confirmed as paid");
        Ok(payment)
    }

    /// Cancel the payment for an order.
    pub async fn cancel(&self, order_id: &str) -> DomainResult<Payment> {
        let mut payment = self.store.find_by_order(order_id).await?;
        payment.mark_cancelled();
        let payment = self.store.update(&payment).await?;

        self.notify(order_id, OrderStatusEvent::Cancelled);

        info!(order_id = %order_id, "payment cancelled");
        Ok(payment)
    }

    /// Current payment for an order, read-through to the store.
    pub async fn query_status(&self, order_id: &str) -> DomainResult<Payment> {
        self.store.find_by_order(order_id).await
    }

    /// Payment correlated to a gateway-assigned reference, read-through to
    /// the store.
    pub async fn query_by_gateway_reference(&self, reference: &str) -> DomainResult<Payment> {
        self.store.find_by_gateway_reference(reference).await
    }

    /// Reconcile a raw gateway webhook payload against the local records.
    ///
    /// The gateway contract requires a success acknowledgement regardless of
    /// the outcome, so every failure on this path is reduced to a logged
    /// no-op: an unparseable payload, a reference with no local payment, and
    /// a failed update all leave the store untouched and return normally.
    /// These warnings are the signal to alert on.
    pub async fn reconcile_webhook(&self, raw_payload: &str) {
        let notification = self.gateway.parse_webhook(raw_payload).await;
        if notification.is_empty() {
            debug!("webhook payload carries no final transaction, ignoring");
            return;
        }

        let payment = match self
            .query_by_gateway_reference(&notification.gateway_reference)
            .await
        {
            Ok(payment) => payment,
            Err(e) => {
                warn!(
                    gateway_reference = %notification.gateway_reference,
                    error = %e,
                    "webhook references no local payment, acknowledging anyway"
                );
                return;
            }
        };

        if !payment.is_open() {
            // No per-order serialization: a late webhook overwrites a
            // settled payment. Logged so the overlap is visible.
            warn!(
                order_id = %payment.order_id,
                status = %payment.status,
                "webhook arrived for a settled payment, status will be overwritten"
            );
        }

        let outcome = if notification.paid {
            self.mark_paid(&payment.order_id).await
        } else {
            self.cancel(&payment.order_id).await
        };

        match outcome {
            Ok(payment) => {
                info!(
                    order_id = %payment.order_id,
                    status = %payment.status,
                    "payment reconciled from webhook"
                );
            }
            Err(e) => {
                warn!(
                    order_id = %payment.order_id,
                    error = %e,
                    "webhook reconciliation failed, acknowledging anyway"
                );
            }
        }
    }

    /// Fire-and-forget status notification.
    ///
    /// The publish outcome never reaches the caller and never blocks the
    /// operation result; a failed delivery is only logged.
    fn notify(&self, order_id: &str, event: OrderStatusEvent) {
        let notifier = Arc::clone(&self.notifier);
        let order_id = order_id.to_string();
        tokio::spawn(async move {
            if !notifier.publish(&order_id, event).await {
                warn!(
                    order_id = %order_id,
                    event = %event,
                    "status notification was not delivered"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;
    use crate::domain::{Money, PaymentStatus};
    use crate::ports::{QrCodeIssue, WebhookNotification};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    struct MockStore {
        payments: Mutex<Vec<Payment>>,
        updates: Mutex<Vec<Payment>>,
        next_id: AtomicI64,
        fail_create: bool,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                payments: Mutex::new(Vec::new()),
                updates: Mutex::new(Vec::new()),
                next_id: AtomicI64::new(1),
                fail_create: false,
            }
        }

        fn failing_create() -> Self {
            Self {
                fail_create: true,
                ..Self::new()
            }
        }

        fn seed(&self, payment: Payment) {
            self.payments.lock().unwrap().push(payment);
        }

        fn stored(&self, order_id: &str) -> Option<Payment> {
            self.payments
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.order_id == order_id)
                .max_by_key(|p| p.id)
                .cloned()
        }

        fn update_count(&self) -> usize {
            self.updates.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PaymentStorePort for MockStore {
        async fn create(&self, order: &Order) -> DomainResult<Payment> {
            if self.fail_create {
                return Err(DomainError::PaymentNotCreated);
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let payment = Payment::new(id, order.id.clone(), order.total);
            self.payments.lock().unwrap().push(payment.clone());
            Ok(payment)
        }

        async fn update(&self, payment: &Payment) -> DomainResult<Payment> {
            if !payment.is_persisted() {
                return Err(DomainError::PaymentNotPersisted);
            }
            let mut payments = self.payments.lock().unwrap();
            let stored = payments
                .iter_mut()
                .find(|p| p.id == payment.id)
                .ok_or_else(|| DomainError::PaymentNotFound(payment.order_id.clone()))?;
            *stored = payment.clone();
            self.updates.lock().unwrap().push(payment.clone());
            Ok(payment.clone())
        }

        async fn find_by_order(&self, order_id: &str) -> DomainResult<Payment> {
            self.stored(order_id)
                .ok_or_else(|| DomainError::PaymentNotFound(order_id.to_string()))
        }

        async fn find_by_gateway_reference(&self, reference: &str) -> DomainResult<Payment> {
            self.payments
                .lock()
                .unwrap()
                .iter()
                .find(|p| !p.gateway_reference.is_empty() && p.gateway_reference == reference)
                .cloned()
                .ok_or_else(|| DomainError::GatewayPaymentNotFound(reference.to_string()))
        }
    }

    struct StubGateway {
        issue: QrCodeIssue,
        notification: WebhookNotification,
    }

    impl StubGateway {
        fn issuing(reference: &str, qr_code: &str) -> Self {
            Self {
                issue: QrCodeIssue {
                    gateway_reference: reference.to_string(),
                    qr_code: qr_code.to_string(),
                },
                notification: WebhookNotification::empty(),
            }
        }

        fn declining() -> Self {
            Self {
                issue: QrCodeIssue::declined(),
                notification: WebhookNotification::empty(),
            }
        }

        fn notifying(reference: &str, paid: bool) -> Self {
            Self {
                issue: QrCodeIssue::declined(),
                notification: WebhookNotification {
                    gateway_reference: reference.to_string(),
                    raw_status: "closed".to_string(),
                    paid,
                },
            }
        }
    }

    #[async_trait]
    impl PaymentGatewayPort for StubGateway {
        async fn issue_qr_code(
            &self,
            _order: &Order,
            _description: &str,
        ) -> DomainResult<QrCodeIssue> {
            Ok(self.issue.clone())
        }

        async fn parse_webhook(&self, _raw_payload: &str) -> WebhookNotification {
            self.notification.clone()
        }
    }

    struct RecordingNotifier {
        events: Mutex<Vec<(String, OrderStatusEvent)>>,
        deliver: bool,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
                deliver: true,
            }
        }

        /// Records events but reports every publish as undelivered.
        fn undeliverable() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
                deliver: false,
            }
        }

        fn events(&self) -> Vec<(String, OrderStatusEvent)> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatusNotifierPort for RecordingNotifier {
        async fn publish(&self, order_id: &str, event: OrderStatusEvent) -> bool {
            self.events
                .lock()
                .unwrap()
                .push((order_id.to_string(), event));
            self.deliver
        }
    }

    fn order() -> Order {
        Order {
            id: "1".to_string(),
            total: Money::from_cents(1000).unwrap(),
            items: Vec::new(),
            customer: None,
        }
    }

    fn service(
        store: MockStore,
        gateway: StubGateway,
    ) -> (
        PaymentService<MockStore, StubGateway, RecordingNotifier>,
        Arc<MockStore>,
        Arc<RecordingNotifier>,
    ) {
        service_with_notifier(store, gateway, RecordingNotifier::new())
    }

    fn service_with_notifier(
        store: MockStore,
        gateway: StubGateway,
        notifier: RecordingNotifier,
    ) -> (
        PaymentService<MockStore, StubGateway, RecordingNotifier>,
        Arc<MockStore>,
        Arc<RecordingNotifier>,
    ) {
        let store = Arc::new(store);
        let notifier = Arc::new(notifier);
        let service = PaymentService::new(
            Arc::clone(&store),
            Arc::new(gateway),
            Arc::clone(&notifier),
        );
        (service, store, notifier)
    }

    /// Spawned fire-and-forget notifications only run once the test task
    /// yields back to the runtime.
    async fn drain_notifications() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn start_attaches_qr_and_stays_awaiting() {
        let (service, store, notifier) = service(MockStore::new(), StubGateway::issuing("ABC", "Q1"));

        let payment = service.start(&order()).await.unwrap();

        assert_eq!(payment.status, PaymentStatus::AwaitingResponse);
        assert_eq!(payment.gateway_reference, "ABC");
        assert_eq!(payment.qr_code, "Q1");

        let stored = store.stored("1").unwrap();
        assert_eq!(stored.gateway_reference, "ABC");
        assert_eq!(stored.qr_code, "Q1");

        drain_notifications().await;
        assert_eq!(
            notifier.events(),
            vec![("1".to_string(), OrderStatusEvent::OrderSentToPayment)]
        );
    }

    #[tokio::test]
    async fn start_cancels_when_gateway_declines() {
        let (service, store, notifier) = service(MockStore::new(), StubGateway::declining());

        let payment = service.start(&order()).await.unwrap();

        assert_eq!(payment.status, PaymentStatus::Cancelled);
        assert!(payment.gateway_reference.is_empty());
        assert_eq!(store.stored("1").unwrap().status, PaymentStatus::Cancelled);

        drain_notifications().await;
        let events: Vec<OrderStatusEvent> =
            notifier.events().into_iter().map(|(_, e)| e).collect();
        assert!(events.contains(&OrderStatusEvent::OrderSentToPayment));
        assert!(events.contains(&OrderStatusEvent::Cancelled));
    }

    #[tokio::test]
    async fn start_fails_when_store_cannot_create() {
        let (service, store, _) =
            service(MockStore::failing_create(), StubGateway::issuing("ABC", "Q1"));

        let err = service.start(&order()).await.unwrap_err();

        assert!(matches!(err, DomainError::PaymentNotCreated));
        assert_eq!(store.update_count(), 0);
    }

    #[tokio::test]
    async fn start_then_query_status_is_consistent() {
        let (service, _, _) = service(MockStore::new(), StubGateway::issuing("ABC", "Q1"));

        service.start(&order()).await.unwrap();
        let payment = service.query_status("1").await.unwrap();

        assert_eq!(payment.status, PaymentStatus::AwaitingResponse);
        assert_eq!(payment.qr_code, "Q1");
    }

    #[tokio::test]
    async fn mark_paid_updates_status_and_notifies_kitchen() {
        let (service, store, notifier) = service(MockStore::new(), StubGateway::declining());
        store.seed(Payment::new(
            7,
            "1".to_string(),
            Money::from_cents(1000).unwrap(),
        ));

        let payment = service.mark_paid("1").await.unwrap();

        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(store.stored("1").unwrap().status, PaymentStatus::Paid);

        drain_notifications().await;
        assert_eq!(
            notifier.events(),
            vec![("1".to_string(), OrderStatusEvent::SentToKitchen)]
        );
    }

    #[tokio::test]
    async fn mark_paid_succeeds_when_notification_is_undelivered() {
        let (service, store, notifier) = service_with_notifier(
            MockStore::new(),
            StubGateway::declining(),
            RecordingNotifier::undeliverable(),
        );
        store.seed(Payment::new(
            7,
            "1".to_string(),
            Money::from_cents(1000).unwrap(),
        ));

        let payment = service.mark_paid("1").await.unwrap();

        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(store.stored("1").unwrap().status, PaymentStatus::Paid);

        drain_notifications().await;
        assert_eq!(
            notifier.events(),
            vec![("1".to_string(), OrderStatusEvent::SentToKitchen)]
        );
    }

    #[tokio::test]
    async fn start_succeeds_when_notification_is_undelivered() {
        let (service, store, notifier) = service_with_notifier(
            MockStore::new(),
            StubGateway::issuing("ABC", "Q1"),
            RecordingNotifier::undeliverable(),
        );

        let payment = service.start(&order()).await.unwrap();

        assert_eq!(payment.status, PaymentStatus::AwaitingResponse);
        assert_eq!(store.stored("1").unwrap().qr_code, "Q1");

        drain_notifications().await;
        assert_eq!(
            notifier.events(),
            vec![("1".to_string(), OrderStatusEvent::OrderSentToPayment)]
        );
    }

    #[tokio::test]
    async fn mark_paid_unknown_order_performs_no_update() {
        let (service, store, notifier) = service(MockStore::new(), StubGateway::declining());

        let err = service.mark_paid("missing").await.unwrap_err();

        assert!(matches!(err, DomainError::PaymentNotFound(_)));
        assert_eq!(store.update_count(), 0);

        drain_notifications().await;
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn cancel_unknown_order_performs_no_update() {
        let (service, store, _) = service(MockStore::new(), StubGateway::declining());

        let err = service.cancel("missing").await.unwrap_err();

        assert!(matches!(err, DomainError::PaymentNotFound(_)));
        assert_eq!(store.update_count(), 0);
    }

    #[tokio::test]
    async fn find_by_order_returns_most_recent_record() {
        let (service, store, _) = service(MockStore::new(), StubGateway::declining());
        store.seed(Payment::new(
            1,
            "1".to_string(),
            Money::from_cents(500).unwrap(),
        ));
        store.seed(Payment::new(
            2,
            "1".to_string(),
            Money::from_cents(1000).unwrap(),
        ));

        let payment = service.query_status("1").await.unwrap();

        assert_eq!(payment.id, 2);
    }

    #[tokio::test]
    async fn query_by_gateway_reference_unknown_fails() {
        let (service, _, _) = service(MockStore::new(), StubGateway::declining());

        let err = service.query_by_gateway_reference("ZZZ").await.unwrap_err();

        assert!(matches!(err, DomainError::GatewayPaymentNotFound(_)));
    }

    #[tokio::test]
    async fn update_unpersisted_payment_fails() {
        let store = MockStore::new();
        let payment = Payment::new(0, "1".to_string(), Money::from_cents(1000).unwrap());

        let err = store.update(&payment).await.unwrap_err();

        assert!(matches!(err, DomainError::PaymentNotPersisted));
        assert_eq!(store.update_count(), 0);
    }

    #[tokio::test]
    async fn reconcile_paid_webhook_marks_payment_paid() {
        let (service, store, _) = service(MockStore::new(), StubGateway::notifying("ABC", true));
        let mut seeded = Payment::new(7, "1".to_string(), Money::from_cents(1000).unwrap());
        seeded
            .attach_gateway_qr("ABC".to_string(), "Q1".to_string())
            .unwrap();
        store.seed(seeded);

        service.reconcile_webhook("{}").await;

        assert_eq!(store.stored("1").unwrap().status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn reconcile_unpaid_webhook_cancels_payment() {
        let (service, store, _) = service(MockStore::new(), StubGateway::notifying("ABC", false));
        let mut seeded = Payment::new(7, "1".to_string(), Money::from_cents(1000).unwrap());
        seeded
            .attach_gateway_qr("ABC".to_string(), "Q1".to_string())
            .unwrap();
        store.seed(seeded);

        service.reconcile_webhook("{}").await;

        assert_eq!(store.stored("1").unwrap().status, PaymentStatus::Cancelled);
    }

    #[tokio::test]
    async fn reconcile_empty_notification_is_a_no_op() {
        let (service, store, _) = service(MockStore::new(), StubGateway::declining());
        store.seed(Payment::new(
            7,
            "1".to_string(),
            Money::from_cents(1000).unwrap(),
        ));

        service.reconcile_webhook("not even json").await;

        assert_eq!(store.update_count(), 0);
        assert_eq!(
            store.stored("1").unwrap().status,
            PaymentStatus::AwaitingResponse
        );
    }

    #[tokio::test]
    async fn reconcile_unknown_reference_is_a_no_op() {
        let (service, store, _) = service(MockStore::new(), StubGateway::notifying("ZZZ", true));
        store.seed(Payment::new(
            7,
            "1".to_string(),
            Money::from_cents(1000).unwrap(),
        ));

        service.reconcile_webhook("{}").await;

        assert_eq!(store.update_count(), 0);
    }

    // The core performs no per-order serialization: a webhook landing after
    // an operation already moved the payment to a terminal state simply
    // overwrites it. Accepted limitation.
    #[tokio::test]
    async fn late_webhook_overwrites_terminal_status() {
        let (service, store, _) = service(MockStore::new(), StubGateway::notifying("ABC", true));
        let mut seeded = Payment::new(7, "1".to_string(), Money::from_cents(1000).unwrap());
        seeded
            .attach_gateway_qr("ABC".to_string(), "Q1".to_string())
            .unwrap();
        seeded.mark_cancelled();
        store.seed(seeded);

        service.reconcile_webhook("{}").await;

        assert_eq!(store.stored("1").unwrap().status, PaymentStatus::Paid);
    }
}
