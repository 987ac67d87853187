use std::collections::BTreeMap;
use std::sync::Arc;

use accounts::contract::AccountsApi;
use chrono::Utc;
use events::contract::{EventsApi, EventsError};
use messages::contract::MessagesApi;
use modkit::AuthUser;
use notifications::contract::NotificationsApi;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use vendors::contract::{AvailabilityStatus, VendorProfile, VendorsApi, VendorsError};

use crate::config::BookingsConfig;
use crate::contract::model::{
    AttemptStatus, Booking, BookingStatus, NewBooking, PaymentAttempt, PaymentStatus,
    ProgressUpdate, SelectedPackage, VendorProgress,
};
use crate::domain::budget_check::{BudgetCheck, BudgetStatus};
use crate::domain::error::DomainError;
use crate::domain::ports::{OrderRequest, PaymentGateway};
use crate::domain::pricing::{self, to_minor_units};
use crate::domain::repo::{BookingFilter, BookingStore};

/// What the browser needs to open the hosted checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOrder {
    pub id: String,
    /// Minor units.
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

#[derive(Debug, Clone)]
pub struct CreatedBooking {
    pub booking: Booking,
    pub order: CheckoutOrder,
    pub budget: BudgetStatus,
}

#[derive(Clone)]
pub struct Service {
    pub(crate) store: Arc<dyn BookingStore>,
    pub(crate) gateway: Arc<dyn PaymentGateway>,
    pub(crate) vendors: Arc<dyn VendorsApi>,
    pub(crate) accounts: Option<Arc<dyn AccountsApi>>,
    pub(crate) events: Option<Arc<dyn EventsApi>>,
    pub(crate) notifier: Option<Arc<dyn NotificationsApi>>,
    pub(crate) messages: Option<Arc<dyn MessagesApi>>,
    pub(crate) config: BookingsConfig,
}

/// Optional collaborators, all best-effort.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub accounts: Option<Arc<dyn AccountsApi>>,
    pub events: Option<Arc<dyn EventsApi>>,
    pub notifier: Option<Arc<dyn NotificationsApi>>,
    pub messages: Option<Arc<dyn MessagesApi>>,
}

impl Service {
    pub fn new(
        store: Arc<dyn BookingStore>,
        gateway: Arc<dyn PaymentGateway>,
        vendors: Arc<dyn VendorsApi>,
        deps: Collaborators,
        config: BookingsConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            vendors,
            accounts: deps.accounts,
            events: deps.events,
            notifier: deps.notifier,
            messages: deps.messages,
            config,
        }
    }

    /// Prices the package, records the booking and opens a gateway order.
    /// A budget overshoot is reported, never refused.
    #[instrument(
        name = "bookings.service.create_booking",
        skip(self, new),
        fields(user_id = %caller.id, vendor_id = %new.vendor_id, service_date = %new.service_date)
    )]
    pub async fn create_booking(
        &self,
        caller: AuthUser,
        new: NewBooking,
    ) -> Result<CreatedBooking, DomainError> {
        let vendor = self.active_vendor(new.vendor_id).await?;
        if vendor
            .status_on(new.service_date)
            .is_some_and(AvailabilityStatus::blocks_booking)
        {
            return Err(DomainError::DateUnavailable {
                vendor_id: vendor.id,
                date: new.service_date,
            });
        }
        if let Some(event_id) = new.event_id {
            self.check_event(caller, event_id).await?;
        }

        let package = priced_package(&vendor, new.selected_package)?;
        let quote = pricing::quote(package.price, new.discount_amount)?;
        let budget = self.check_budget(caller.id, quote.total).await;

        let now = Utc::now();
        let mut booking = Booking {
            id: Uuid::new_v4(),
            user_id: caller.id,
            vendor_id: vendor.id,
            event_id: new.event_id,
            service_date: new.service_date,
            service_type: vendor.service_type.clone(),
            selected_package: package,
            base_amount: quote.base,
            tax_amount: quote.tax,
            discount_amount: quote.discount,
            total_amount: quote.total,
            currency: self.config.currency.clone(),
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            advance_payment: None,
            final_payment: None,
            payment_history: Vec::new(),
            vendor_progress: VendorProgress::NotStarted,
            progress_updates: Vec::new(),
            booking_status: BookingStatus::Pending,
            number_of_guests: new.number_of_guests,
            venue: optional(new.venue),
            special_requests: optional(new.special_requests),
            cancellation_reason: None,
            cancelled_at: None,
            cancelled_by: None,
            refund_amount: None,
            work_progress: 0,
            confirmed_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store
            .insert_booking(booking.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let notes = BTreeMap::from([
            ("booking_id".to_string(), booking.id.to_string()),
            ("user_id".to_string(), caller.id.to_string()),
            ("vendor_id".to_string(), vendor.id.to_string()),
            ("service_type".to_string(), vendor.service_type.clone()),
        ]);
        let order = self
            .gateway
            .create_order(OrderRequest {
                amount: to_minor_units(booking.total_amount),
                currency: booking.currency.clone(),
                receipt: format!("booking_{}", booking.id),
                notes,
            })
            .await
            .map_err(|e| {
                warn!(booking_id = %booking.id, error = %e, "order creation failed");
                DomainError::Gateway {
                    message: e.to_string(),
                }
            })?;

        booking.payment_history.push(PaymentAttempt {
            amount: booking.total_amount,
            order_id: order.id.clone(),
            payment_id: None,
            signature: None,
            status: AttemptStatus::Created,
            failure_reason: None,
            timestamp: Utc::now(),
        });
        booking.updated_at = Utc::now();
        self.save(&booking).await?;

        if let Some(alert) = budget.alert() {
            self.push_budget_alert(caller.id, alert).await;
        }
        info!(booking_id = %booking.id, total = booking.total_amount, order_id = %order.id, "booking created");
        Ok(CreatedBooking {
            booking,
            order: CheckoutOrder {
                id: order.id,
                amount: order.amount,
                currency: order.currency,
                key_id: self.gateway.key_id().to_string(),
            },
            budget,
        })
    }

    /// Never fails; problems are logged and reported as `Unavailable`.
    #[instrument(name = "bookings.service.check_budget", skip(self))]
    pub async fn check_budget(&self, user_id: Uuid, requested: f64) -> BudgetStatus {
        let Some(accounts) = &self.accounts else {
            return BudgetStatus::Unavailable;
        };
        let total_budget = match accounts.personal_budget(user_id).await {
            Ok(Some(total)) if total > 0.0 => total,
            Ok(_) => return BudgetStatus::NoBudget,
            Err(e) => {
                warn!(error = %e, "budget lookup failed");
                return BudgetStatus::Unavailable;
            }
        };
        match self.store.spent_by_user(user_id).await {
            Ok(spent) => {
                let check = BudgetCheck::evaluate(total_budget, spent, requested);
                if check.is_exceeding {
                    info!(over_by = check.projected_total - total_budget, "booking exceeds budget");
                } else if check.is_warning {
                    info!(percentage = check.percentage_used, "booking nears budget");
                }
                BudgetStatus::Checked(check)
            }
            Err(e) => {
                warn!(error = %e, "spent total unavailable");
                BudgetStatus::Unavailable
            }
        }
    }

    #[instrument(name = "bookings.service.list_bookings", skip(self, filter), fields(user_id = %caller.id))]
    pub async fn list_bookings(
        &self,
        caller: AuthUser,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, DomainError> {
        self.store
            .bookings_of_user(caller.id, &filter)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    /// Bookings made against the caller's vendor profile.
    #[instrument(name = "bookings.service.vendor_bookings", skip(self), fields(user_id = %caller.id))]
    pub async fn vendor_bookings(&self, caller: AuthUser) -> Result<Vec<Booking>, DomainError> {
        let profile = self.profile_of(caller).await?;
        self.store
            .bookings_of_vendor(profile.id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    /// Visible to the customer, the booked vendor and admins.
    #[instrument(name = "bookings.service.get_booking", skip(self), fields(booking_id = %id))]
    pub async fn get_booking(&self, caller: AuthUser, id: Uuid) -> Result<Booking, DomainError> {
        let booking = self.find_booking(id).await?;
        if caller.can_act_for(booking.user_id) || self.is_booked_vendor(caller, &booking).await? {
            return Ok(booking);
        }
        Err(DomainError::forbidden("not a party to this booking"))
    }

    #[instrument(
        name = "bookings.service.update_vendor_progress",
        skip(self, note),
        fields(booking_id = %id, status = ?status)
    )]
    pub async fn update_vendor_progress(
        &self,
        caller: AuthUser,
        id: Uuid,
        status: VendorProgress,
        note: Option<String>,
    ) -> Result<Booking, DomainError> {
        let mut booking = self.booked_vendor_booking(caller, id).await?;
        if booking.booking_status == BookingStatus::Cancelled {
            return Err(DomainError::AlreadyCancelled { id });
        }
        let now = Utc::now();
        booking.vendor_progress = status;
        booking.progress_updates.push(ProgressUpdate {
            status,
            note: optional(note),
            updated_by: caller.id,
            timestamp: now,
        });
        match status {
            VendorProgress::Completed => {
                booking.booking_status = BookingStatus::Completed;
                booking.completed_at = Some(now);
            }
            VendorProgress::InProgress if booking.booking_status == BookingStatus::Confirmed => {
                booking.booking_status = BookingStatus::InProgress;
            }
            _ => {}
        }
        booking.updated_at = now;
        self.save(&booking).await?;
        info!(booking_status = ?booking.booking_status, "vendor progress updated");
        Ok(booking)
    }

    /// Cancels the booking, refunding a captured payment and releasing the date.
    #[instrument(name = "bookings.service.cancel_booking", skip(self, reason, refund_amount), fields(booking_id = %id))]
    pub async fn cancel_booking(
        &self,
        caller: AuthUser,
        id: Uuid,
        reason: Option<String>,
        refund_amount: Option<f64>,
    ) -> Result<Booking, DomainError> {
        let mut booking = self.find_booking(id).await?;
        if !caller.can_act_for(booking.user_id) {
            return Err(DomainError::forbidden("only the customer or an admin may cancel"));
        }
        if booking.booking_status == BookingStatus::Cancelled {
            return Err(DomainError::AlreadyCancelled { id });
        }
        if let Some(amount) = refund_amount {
            if !amount.is_finite() || amount <= 0.0 || amount > booking.total_amount {
                return Err(DomainError::validation(
                    "refund_amount",
                    "must be positive and at most the booking total",
                ));
            }
        }

        let now = Utc::now();
        let was_paid = booking.payment_status.is_spent();
        let captured = booking.captured_payment_id().map(str::to_string);
        if let (true, Some(payment_id)) = (was_paid, captured) {
            let refund = self
                .gateway
                .refund(&payment_id, refund_amount)
                .await
                .map_err(|e| {
                    warn!(%payment_id, error = %e, "refund failed");
                    DomainError::Gateway {
                        message: e.to_string(),
                    }
                })?;
            info!(refund_id = %refund.id, amount = refund.amount, "refund issued");
            booking.payment_status = PaymentStatus::Refunded;
            booking.refund_amount = Some(refund.amount);
            booking.payment_history.push(PaymentAttempt {
                amount: refund.amount,
                order_id: booking.latest_order_id().unwrap_or_default().to_string(),
                payment_id: Some(payment_id),
                signature: None,
                status: AttemptStatus::Refunded,
                failure_reason: None,
                timestamp: now,
            });
        }

        booking.booking_status = BookingStatus::Cancelled;
        booking.vendor_progress = VendorProgress::Cancelled;
        booking.cancellation_reason = optional(reason);
        booking.cancelled_at = Some(now);
        booking.cancelled_by = Some(caller.id);
        booking.updated_at = now;
        self.save(&booking).await?;

        // Only a confirmed booking ever marked the date as booked.
        if booking.confirmed_at.is_some() {
            self.mark_date(&booking, AvailabilityStatus::Available).await;
        }
        info!(refunded = booking.refund_amount.is_some(), "booking cancelled");
        Ok(booking)
    }

    /// Latest completed booking of a customer with a vendor.
    pub async fn completed_booking(
        &self,
        user_id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Uuid>, DomainError> {
        self.store
            .completed_booking(user_id, vendor_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    pub(crate) async fn find_booking(&self, id: Uuid) -> Result<Booking, DomainError> {
        self.store
            .find_booking(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or(DomainError::BookingNotFound { id })
    }

    pub(crate) async fn save(&self, booking: &Booking) -> Result<(), DomainError> {
        self.store
            .update_booking(booking.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    /// The caller's vendor profile; 404 when they have none.
    pub(crate) async fn profile_of(&self, caller: AuthUser) -> Result<VendorProfile, DomainError> {
        self.vendors
            .vendor_of_user(caller.id)
            .await
            .map_err(vendor_error)?
            .ok_or(DomainError::VendorNotFound { id: caller.id })
    }

    pub(crate) async fn is_booked_vendor(
        &self,
        caller: AuthUser,
        booking: &Booking,
    ) -> Result<bool, DomainError> {
        let profile = self
            .vendors
            .vendor_of_user(caller.id)
            .await
            .map_err(vendor_error)?;
        Ok(profile.is_some_and(|p| p.id == booking.vendor_id))
    }

    /// The booking, if the caller is the vendor it was made with.
    pub(crate) async fn booked_vendor_booking(
        &self,
        caller: AuthUser,
        id: Uuid,
    ) -> Result<Booking, DomainError> {
        let booking = self.find_booking(id).await?;
        if !self.is_booked_vendor(caller, &booking).await? {
            return Err(DomainError::forbidden("only the booked vendor may do this"));
        }
        Ok(booking)
    }

    pub(crate) async fn mark_date(&self, booking: &Booking, status: AvailabilityStatus) {
        if let Err(e) = self
            .vendors
            .set_date_status(booking.vendor_id, booking.service_date, status)
            .await
        {
            warn!(
                vendor_id = %booking.vendor_id,
                date = %booking.service_date,
                error = %e,
                "availability update failed"
            );
        }
    }

    pub(crate) async fn user_name(&self, user_id: Uuid) -> String {
        self.user_contact(user_id)
            .await
            .map(|(name, _)| name)
            .unwrap_or_else(|| "A customer".to_string())
    }

    /// Name and email, when accounts are wired in and the user exists.
    pub(crate) async fn user_contact(&self, user_id: Uuid) -> Option<(String, String)> {
        let accounts = self.accounts.as_ref()?;
        match accounts.get_user(user_id).await {
            Ok(u) => Some((u.name, u.email)),
            Err(e) => {
                warn!(%user_id, error = %e, "user lookup failed");
                None
            }
        }
    }

    async fn push_budget_alert(&self, user_id: Uuid, alert: messages::contract::BudgetWarning) {
        let Some(messages) = &self.messages else {
            return;
        };
        match messages.push_budget_warning(user_id, alert).await {
            Ok(streams) => debug!(streams, "budget alert pushed"),
            Err(e) => warn!(error = %e, "budget alert not delivered"),
        }
    }

    async fn active_vendor(&self, id: Uuid) -> Result<VendorProfile, DomainError> {
        let vendor = self.vendors.get_vendor(id).await.map_err(vendor_error)?;
        if !vendor.is_active {
            return Err(DomainError::VendorNotFound { id });
        }
        Ok(vendor)
    }

    async fn check_event(&self, caller: AuthUser, event_id: Uuid) -> Result<(), DomainError> {
        let Some(events) = &self.events else {
            return Ok(());
        };
        match events.get_event(event_id).await {
            Ok(event) if caller.can_act_for(event.owner_id) => Ok(()),
            Ok(_) => Err(DomainError::forbidden("the event belongs to someone else")),
            Err(EventsError::NotFound { id }) => Err(DomainError::EventNotFound { id }),
            Err(e) => Err(DomainError::database(e.to_string())),
        }
    }
}

/// Uses the vendor's tier price when the package name matches one.
fn priced_package(
    vendor: &VendorProfile,
    requested: SelectedPackage,
) -> Result<SelectedPackage, DomainError> {
    let name = requested.package_name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("package_name", "must not be empty"));
    }
    Ok(match vendor.tier(name) {
        Some(tier) => SelectedPackage {
            package_name: tier.package_name.clone(),
            price: tier.price,
            inclusions: if requested.inclusions.is_empty() {
                tier.inclusions.clone()
            } else {
                requested.inclusions
            },
        },
        None => SelectedPackage {
            package_name: name.to_string(),
            ..requested
        },
    })
}

pub(crate) fn vendor_error(e: VendorsError) -> DomainError {
    match e {
        VendorsError::NotFound { id } => DomainError::VendorNotFound { id },
        VendorsError::Validation { message } => DomainError::validation("vendor", message),
        VendorsError::Internal => DomainError::database("vendors lookup failed"),
    }
}

pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
