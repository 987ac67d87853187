//! Payments recorded by hand outside the gateway, and the vendor's
//! percentage-based work progress.

use chrono::Utc;
use modkit::AuthUser;
use notifications::contract::model::VendorPaymentRecorded;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{
    Booking, BookingStatus, NewVendorPayment, PaymentStatus, ProgressUpdate, VendorPayment,
    VendorPaymentStatus, VendorProgress,
};
use crate::domain::error::DomainError;
use crate::domain::pricing::round2;
use crate::domain::service::{optional, Service};

#[derive(Debug, Clone)]
pub struct BookingPayments {
    pub payments: Vec<VendorPayment>,
    pub total_amount: f64,
    pub total_paid: f64,
    pub remaining: f64,
}

fn total_paid(payments: &[VendorPayment]) -> f64 {
    round2(
        payments
            .iter()
            .filter(|p| p.status.counts_as_paid())
            .fold(0.0, |acc, p| acc + p.amount),
    )
}

/// Moves the payment status according to what has been paid by hand.
/// Bookings settled through the gateway keep their status. Without a
/// gateway capture, `paid` and `partially_paid` can only come from manual
/// payments, so they fall back to `pending` once nothing counts any more.
fn settle(booking: &mut Booking, paid: f64) -> bool {
    if booking.advance_payment.is_some() {
        return false;
    }
    let next = if paid >= booking.total_amount {
        PaymentStatus::Paid
    } else if paid > 0.0 {
        PaymentStatus::PartiallyPaid
    } else if matches!(
        booking.payment_status,
        PaymentStatus::Paid | PaymentStatus::PartiallyPaid
    ) {
        PaymentStatus::Pending
    } else {
        return false;
    };
    let changed = booking.payment_status != next;
    booking.payment_status = next;
    changed
}

impl Service {
    #[instrument(name = "bookings.service.record_vendor_payment", skip(self, new), fields(booking_id = %booking_id))]
    pub async fn record_vendor_payment(
        &self,
        caller: AuthUser,
        booking_id: Uuid,
        new: NewVendorPayment,
    ) -> Result<(VendorPayment, Booking), DomainError> {
        let mut booking = self.find_booking(booking_id).await?;
        if caller.id != booking.user_id {
            return Err(DomainError::forbidden(
                "only the customer may record payments for this booking",
            ));
        }
        if !new.amount.is_finite() || new.amount < 0.0 {
            return Err(DomainError::validation("amount", "must be a non-negative amount"));
        }

        let now = Utc::now();
        let payment = VendorPayment {
            id: Uuid::new_v4(),
            booking_id,
            user_id: caller.id,
            vendor_id: booking.vendor_id,
            amount: round2(new.amount),
            payment_type: new.payment_type,
            method: new.method,
            status: new.status,
            transaction_id: optional(new.transaction_id),
            notes: optional(new.notes),
            created_at: now,
            updated_at: now,
        };
        self.store
            .insert_payment(payment.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let paid = self.paid_on(booking_id).await?;
        if settle(&mut booking, paid) {
            booking.updated_at = now;
            self.save(&booking).await?;
        }
        info!(amount = payment.amount, total_paid = paid, "vendor payment recorded");

        self.notify_payment_recorded(&booking, &payment, paid).await;
        Ok((payment, booking))
    }

    /// Payments of a booking with running totals. Visible to the customer,
    /// the booked vendor and admins.
    #[instrument(name = "bookings.service.booking_payments", skip(self), fields(booking_id = %booking_id))]
    pub async fn booking_payments(
        &self,
        caller: AuthUser,
        booking_id: Uuid,
    ) -> Result<BookingPayments, DomainError> {
        let booking = self.get_booking(caller, booking_id).await?;
        let mut payments = self
            .store
            .payments_of_booking(booking_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        let paid = total_paid(&payments);
        payments.reverse();
        Ok(BookingPayments {
            payments,
            total_amount: booking.total_amount,
            total_paid: paid,
            remaining: round2(booking.total_amount - paid),
        })
    }

    #[instrument(name = "bookings.service.user_payment_history", skip(self), fields(user_id = %caller.id))]
    pub async fn user_payment_history(
        &self,
        caller: AuthUser,
    ) -> Result<Vec<VendorPayment>, DomainError> {
        self.store
            .payments_by_user(caller.id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "bookings.service.vendor_payment_history", skip(self), fields(user_id = %caller.id))]
    pub async fn vendor_payment_history(
        &self,
        caller: AuthUser,
    ) -> Result<Vec<VendorPayment>, DomainError> {
        let profile = self.profile_of(caller).await?;
        self.store
            .payments_to_vendor(profile.id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    /// Only the payer may change a payment's status.
    #[instrument(name = "bookings.service.update_payment_status", skip(self), fields(payment_id = %payment_id))]
    pub async fn update_payment_status(
        &self,
        caller: AuthUser,
        payment_id: Uuid,
        status: VendorPaymentStatus,
    ) -> Result<VendorPayment, DomainError> {
        let mut payment = self
            .store
            .find_payment(payment_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or(DomainError::PaymentNotFound { id: payment_id })?;
        if payment.user_id != caller.id {
            return Err(DomainError::forbidden("only the payer may update this payment"));
        }
        if payment.status == status {
            return Ok(payment);
        }
        payment.status = status;
        payment.updated_at = Utc::now();
        self.store
            .update_payment(payment.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        match self.find_booking(payment.booking_id).await {
            Ok(mut booking) => {
                let paid = self.paid_on(booking.id).await?;
                if settle(&mut booking, paid) {
                    booking.updated_at = Utc::now();
                    self.save(&booking).await?;
                }
            }
            Err(DomainError::BookingNotFound { id }) => {
                warn!(booking_id = %id, "payment refers to a missing booking");
            }
            Err(e) => return Err(e),
        }
        info!(status = ?status, "payment status updated");
        Ok(payment)
    }

    /// Sets work progress in percent: 0 is not started, 100 completes the
    /// booking, anything between is in progress.
    #[instrument(name = "bookings.service.update_work_progress", skip(self, note), fields(booking_id = %booking_id))]
    pub async fn update_work_progress(
        &self,
        caller: AuthUser,
        booking_id: Uuid,
        progress: i64,
        note: Option<String>,
    ) -> Result<Booking, DomainError> {
        let progress = u8::try_from(progress)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| DomainError::validation("progress", "must be between 0 and 100"))?;
        let mut booking = self.booked_vendor_booking(caller, booking_id).await?;
        if booking.booking_status == BookingStatus::Cancelled {
            return Err(DomainError::AlreadyCancelled { id: booking_id });
        }

        let now = Utc::now();
        let status = match progress {
            0 => VendorProgress::NotStarted,
            100 => VendorProgress::Completed,
            _ => VendorProgress::InProgress,
        };
        booking.work_progress = progress;
        booking.vendor_progress = status;
        booking.progress_updates.push(ProgressUpdate {
            status,
            note: optional(note),
            updated_by: caller.id,
            timestamp: now,
        });
        if status == VendorProgress::Completed {
            booking.booking_status = BookingStatus::Completed;
            booking.completed_at = Some(now);
        }
        booking.updated_at = now;
        self.save(&booking).await?;
        info!(progress, "work progress updated");
        Ok(booking)
    }

    async fn paid_on(&self, booking_id: Uuid) -> Result<f64, DomainError> {
        let payments = self
            .store
            .payments_of_booking(booking_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(total_paid(&payments))
    }

    async fn notify_payment_recorded(&self, booking: &Booking, payment: &VendorPayment, paid: f64) {
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
        let msg = VendorPaymentRecorded {
            vendor_email,
            vendor_name: vendor.business_name.clone().unwrap_or(vendor_user_name),
            user_name: self.user_name(booking.user_id).await,
            amount: payment.amount,
            payment_type: payment.payment_type.as_str().to_string(),
            remaining: round2((booking.total_amount - paid).max(0.0)),
            booking_id: booking.id,
        };
        if let Err(e) = notifier.send_vendor_payment_recorded(msg).await {
            warn!(booking_id = %booking.id, error = %e, "payment email not sent");
        }
    }
}
