//! Gateway payment confirmation: checkout callback, webhook and failures.

use chrono::Utc;
use modkit::AuthUser;
use notifications::contract::model::PaymentReceived;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use vendors::contract::AvailabilityStatus;

use crate::contract::model::{
    AttemptStatus, Booking, BookingStatus, PaymentAttempt, PaymentRecord, PaymentStatus,
    VendorProgress,
};
use crate::domain::error::DomainError;
use crate::domain::pricing::from_minor_units;
use crate::domain::service::Service;

/// Fields posted back by the checkout after a successful payment.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub booking_id: Uuid,
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFailure {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Captured { booking_id: Uuid },
    Failed { booking_id: Uuid },
    Ignored { event: String },
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    event: String,
    #[serde(default)]
    payload: WebhookPayload,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookPayload {
    payment: Option<PaymentWrapper>,
}

#[derive(Debug, Deserialize)]
struct PaymentWrapper {
    entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
struct PaymentEntity {
    id: String,
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    amount: i64,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    notes: serde_json::Value,
}

impl PaymentEntity {
    fn booking_id(&self) -> Option<Uuid> {
        self.notes
            .get("booking_id")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }
}

/// A payment accepted by the gateway, ready to be applied.
struct Capture<'a> {
    order_id: &'a str,
    payment_id: &'a str,
    signature: Option<&'a str>,
    amount: f64,
    method: Option<String>,
}

impl Service {
    /// Confirms a checkout payment. Nothing is recorded unless the signature
    /// over `order_id|payment_id` matches.
    #[instrument(
        name = "bookings.service.verify_payment",
        skip(self, confirmation),
        fields(booking_id = %confirmation.booking_id, payment_id = %confirmation.payment_id)
    )]
    pub async fn verify_payment(
        &self,
        caller: AuthUser,
        confirmation: PaymentConfirmation,
    ) -> Result<Booking, DomainError> {
        if !self.gateway.verify_payment_signature(
            &confirmation.order_id,
            &confirmation.payment_id,
            &confirmation.signature,
        ) {
            warn!("payment signature mismatch");
            return Err(DomainError::InvalidSignature);
        }
        let booking = self.find_booking(confirmation.booking_id).await?;
        if !caller.can_act_for(booking.user_id) {
            return Err(DomainError::forbidden("not your booking"));
        }
        if !booking.knows_order(&confirmation.order_id) {
            return Err(DomainError::UnknownOrder {
                booking_id: booking.id,
                order_id: confirmation.order_id,
            });
        }

        let payment = self
            .gateway
            .fetch_payment(&confirmation.payment_id)
            .await
            .map_err(|e| DomainError::Gateway {
                message: e.to_string(),
            })?;
        if payment
            .order_id
            .as_deref()
            .is_some_and(|o| o != confirmation.order_id)
        {
            return Err(DomainError::UnknownOrder {
                booking_id: booking.id,
                order_id: confirmation.order_id,
            });
        }

        self.apply_capture(
            booking,
            Capture {
                order_id: &confirmation.order_id,
                payment_id: &confirmation.payment_id,
                signature: Some(&confirmation.signature),
                amount: payment.amount,
                method: payment.method,
            },
        )
        .await
    }

    /// Handles a signed gateway notification. Bookings are located through
    /// the `booking_id` note attached when the order was created.
    #[instrument(name = "bookings.service.handle_webhook", skip_all)]
    pub async fn handle_webhook(
        &self,
        body: &[u8],
        signature: &str,
    ) -> Result<WebhookOutcome, DomainError> {
        if !self.gateway.verify_webhook_signature(body, signature) {
            warn!("webhook signature mismatch");
            return Err(DomainError::InvalidSignature);
        }
        let envelope: WebhookEnvelope = serde_json::from_slice(body)
            .map_err(|e| DomainError::validation("body", e.to_string()))?;
        let event = envelope.event;
        let entity = match (event.as_str(), envelope.payload.payment) {
            ("payment.captured" | "payment.failed", Some(p)) => p.entity,
            _ => {
                info!(%event, "webhook ignored");
                return Ok(WebhookOutcome::Ignored { event });
            }
        };
        let Some(booking_id) = entity.booking_id() else {
            warn!(%event, payment_id = %entity.id, "webhook without booking note");
            return Ok(WebhookOutcome::Ignored { event });
        };
        let booking = match self.find_booking(booking_id).await {
            Ok(b) => b,
            Err(DomainError::BookingNotFound { .. }) => {
                warn!(%booking_id, "webhook for unknown booking");
                return Ok(WebhookOutcome::Ignored { event });
            }
            Err(e) => return Err(e),
        };

        let order_id = entity
            .order_id
            .clone()
            .or_else(|| booking.latest_order_id().map(str::to_string))
            .unwrap_or_default();
        if event == "payment.captured" {
            self.apply_capture(
                booking,
                Capture {
                    order_id: &order_id,
                    payment_id: &entity.id,
                    signature: None,
                    amount: from_minor_units(entity.amount),
                    method: entity.method.clone(),
                },
            )
            .await?;
            Ok(WebhookOutcome::Captured { booking_id })
        } else {
            self.apply_failure(
                booking,
                PaymentFailure {
                    order_id: Some(order_id),
                    payment_id: Some(entity.id),
                    reason: entity.error_description,
                },
            )
            .await?;
            Ok(WebhookOutcome::Failed { booking_id })
        }
    }

    #[instrument(name = "bookings.service.record_payment_failure", skip(self, failure), fields(booking_id = %id))]
    pub async fn record_payment_failure(
        &self,
        caller: AuthUser,
        id: Uuid,
        failure: PaymentFailure,
    ) -> Result<Booking, DomainError> {
        let booking = self.find_booking(id).await?;
        if !caller.can_act_for(booking.user_id) {
            return Err(DomainError::forbidden("not your booking"));
        }
        if booking.payment_status == PaymentStatus::Paid {
            return Err(DomainError::validation("payment_status", "booking is already paid"));
        }
        self.apply_failure(booking, failure).await
    }

    async fn apply_failure(
        &self,
        mut booking: Booking,
        failure: PaymentFailure,
    ) -> Result<Booking, DomainError> {
        let order_id = failure
            .order_id
            .or_else(|| booking.latest_order_id().map(str::to_string))
            .unwrap_or_default();
        booking.payment_history.push(PaymentAttempt {
            amount: booking.total_amount,
            order_id,
            payment_id: failure.payment_id,
            signature: None,
            status: AttemptStatus::Failed,
            failure_reason: failure.reason,
            timestamp: Utc::now(),
        });
        // A late failure notice must not undo a capture.
        if !booking.payment_status.is_spent() {
            booking.payment_status = PaymentStatus::Failed;
        }
        booking.updated_at = Utc::now();
        self.save(&booking).await?;
        info!(booking_id = %booking.id, "payment failure recorded");
        Ok(booking)
    }

    /// Applying the same gateway payment twice is a no-op.
    async fn apply_capture(
        &self,
        mut booking: Booking,
        capture: Capture<'_>,
    ) -> Result<Booking, DomainError> {
        if booking.has_captured(capture.payment_id) {
            info!(booking_id = %booking.id, "payment already applied");
            return Ok(booking);
        }
        let now = Utc::now();
        let cancelled = booking.booking_status == BookingStatus::Cancelled;
        booking.payment_status = PaymentStatus::Paid;
        if !cancelled {
            if booking.booking_status == BookingStatus::Pending {
                booking.booking_status = BookingStatus::Confirmed;
            }
            if booking.vendor_progress == VendorProgress::NotStarted {
                booking.vendor_progress = VendorProgress::Confirmed;
            }
            booking.confirmed_at.get_or_insert(now);
        }
        if capture.method.is_some() {
            booking.payment_method = capture.method;
        }
        booking.advance_payment = Some(PaymentRecord {
            amount: capture.amount,
            paid_at: now,
            payment_id: capture.payment_id.to_string(),
        });
        booking.payment_history.push(PaymentAttempt {
            amount: capture.amount,
            order_id: capture.order_id.to_string(),
            payment_id: Some(capture.payment_id.to_string()),
            signature: capture.signature.map(str::to_string),
            status: AttemptStatus::Paid,
            failure_reason: None,
            timestamp: now,
        });
        booking.updated_at = now;
        self.save(&booking).await?;
        if cancelled {
            // The date was released on cancel and stays free.
            warn!(
                booking_id = %booking.id,
                payment_id = capture.payment_id,
                amount = capture.amount,
                "payment captured on a cancelled booking, refund it manually"
            );
            return Ok(booking);
        }
        info!(booking_id = %booking.id, amount = capture.amount, "payment captured");

        // Separate from the booking write; a failure here is only logged.
        self.mark_date(&booking, AvailabilityStatus::Booked).await;
        self.notify_payment_received(&booking, capture.amount).await;
        Ok(booking)
    }

    async fn notify_payment_received(&self, booking: &Booking, amount: f64) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let vendor = match self.vendors.get_vendor(booking.vendor_id).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "vendor lookup for payment email failed");
                return;
            }
        };
        let Some((vendor_user_name, vendor_email)) = self.user_contact(vendor.user_id).await else {
            return;
        };
        let vendor_name = vendor
            .business_name
            .clone()
            .unwrap_or(vendor_user_name);
        let msg = PaymentReceived {
            vendor_email,
            vendor_name,
            user_name: self.user_name(booking.user_id).await,
            amount,
            currency: booking.currency.clone(),
            service_date: booking.service_date,
            service_type: booking.service_type.clone(),
            booking_id: booking.id,
        };
        if let Err(e) = notifier.send_payment_received(msg).await {
            warn!(booking_id = %booking.id, error = %e, "payment email not sent");
        }
    }
}
