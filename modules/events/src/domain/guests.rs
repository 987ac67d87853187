//! Guest list, invitations and RSVP tracking.

use chrono::Utc;
use modkit::AuthUser;
use notifications::contract::model::{GuestInvitation, RsvpReminder};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{Event, Guest, RsvpStatus};
use crate::domain::error::DomainError;
use crate::domain::service::{optional, required, Service};

/// An invitation as seen by the invited person.
#[derive(Debug, Clone)]
pub struct Invitation {
    pub guest: Guest,
    pub event: Option<Event>,
}

#[derive(Debug, Clone)]
pub struct PendingRsvp {
    pub event: Event,
    pub days_until_event: i64,
    pub window_days: i64,
    /// Empty unless the event falls inside the window.
    pub guests: Vec<Guest>,
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(DomainError::validation("email", "is not a valid address")),
    }
}

impl Service {
    #[instrument(name = "events.service.add_guest", skip(self, name, email), fields(event_id = %event_id))]
    pub async fn add_guest(
        &self,
        caller: AuthUser,
        event_id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<Guest, DomainError> {
        self.owned_event(caller, event_id).await?;
        self.insert_guest(event_id, name, email).await
    }

    #[instrument(name = "events.service.list_guests", skip(self), fields(event_id = %event_id))]
    pub async fn list_guests(&self, caller: AuthUser, event_id: Uuid) -> Result<Vec<Guest>, DomainError> {
        self.owned_event(caller, event_id).await?;
        self.guests_of(event_id).await
    }

    /// Adds the guest and mails the invitation. A failed mail leaves the
    /// guest on the list with no `invited_at`.
    #[instrument(name = "events.service.invite_guest", skip(self, name, email, message), fields(event_id = %event_id))]
    pub async fn invite_guest(
        &self,
        caller: AuthUser,
        event_id: Uuid,
        name: &str,
        email: &str,
        message: Option<String>,
    ) -> Result<Guest, DomainError> {
        let event = self.owned_event(caller, event_id).await?;
        let mut guest = self.insert_guest(event_id, name, email).await?;

        let Some(notifier) = &self.notifier else {
            warn!(guest_id = %guest.id, "notifications unavailable, invitation not mailed");
            return Ok(guest);
        };
        let invitation = GuestInvitation {
            guest_email: guest.email.clone(),
            guest_name: guest.name.clone(),
            event_name: event.name.clone(),
            event_date: event.date,
            event_location: event.location.clone(),
            organizer_name: self.organizer_name(event.owner_id).await,
            message: optional(message),
        };
        match notifier.send_guest_invitation(invitation).await {
            Ok(()) => {
                guest.invited_at = Some(Utc::now());
                self.store
                    .update_guest(guest.clone())
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?;
                info!(guest_id = %guest.id, "invitation sent");
            }
            Err(e) => warn!(guest_id = %guest.id, error = %e, "invitation mail failed"),
        }
        Ok(guest)
    }

    /// Any transition is allowed, including back to `pending`.
    #[instrument(name = "events.service.update_rsvp", skip(self), fields(guest_id = %guest_id))]
    pub async fn update_rsvp(&self, guest_id: Uuid, status: RsvpStatus) -> Result<Guest, DomainError> {
        let mut guest = self.load_guest(guest_id).await?;
        guest.rsvp = status;
        guest.responded_at = match status {
            RsvpStatus::Pending => None,
            RsvpStatus::Accepted | RsvpStatus::Rejected => Some(Utc::now()),
        };
        self.store
            .update_guest(guest.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!(?status, "rsvp updated");
        Ok(guest)
    }

    #[instrument(name = "events.service.delete_guest", skip(self), fields(guest_id = %guest_id))]
    pub async fn delete_guest(&self, caller: AuthUser, guest_id: Uuid) -> Result<(), DomainError> {
        let guest = self.load_guest(guest_id).await?;
        self.owned_event(caller, guest.event_id).await?;
        self.store
            .delete_guest(guest_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    /// Every invitation addressed to `email`, with its event when it still
    /// exists.
    #[instrument(name = "events.service.invitations_for", skip(self, email))]
    pub async fn invitations_for(&self, email: &str) -> Result<Vec<Invitation>, DomainError> {
        let email = normalize_email(email)?;
        let guests = self
            .store
            .guests_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        let mut out = Vec::with_capacity(guests.len());
        for guest in guests {
            let event = self
                .store
                .find_event(guest.event_id)
                .await
                .map_err(|e| DomainError::database(e.to_string()))?;
            out.push(Invitation { guest, event });
        }
        debug!(found = out.len(), "invitations looked up");
        Ok(out)
    }

    /// Guests still `pending` when the event is between today and `days`
    /// days away.
    #[instrument(name = "events.service.pending_rsvp", skip(self), fields(event_id = %event_id))]
    pub async fn pending_rsvp(
        &self,
        caller: AuthUser,
        event_id: Uuid,
        days: Option<i64>,
    ) -> Result<PendingRsvp, DomainError> {
        let window_days = days
            .filter(|d| *d > 0)
            .unwrap_or(self.config.default_reminder_days);
        let event = self.owned_event(caller, event_id).await?;
        let days_until_event = event.days_until(Utc::now().date_naive());
        let guests = if (0..=window_days).contains(&days_until_event) {
            self.guests_of(event_id)
                .await?
                .into_iter()
                .filter(|g| g.rsvp == RsvpStatus::Pending)
                .collect()
        } else {
            Vec::new()
        };
        Ok(PendingRsvp {
            event,
            days_until_event,
            window_days,
            guests,
        })
    }

    /// Mails a reminder to every pending guest inside the window. Returns how
    /// many reminders went out.
    #[instrument(name = "events.service.remind_pending", skip(self), fields(event_id = %event_id))]
    pub async fn remind_pending(
        &self,
        caller: AuthUser,
        event_id: Uuid,
        days: Option<i64>,
    ) -> Result<usize, DomainError> {
        let pending = self.pending_rsvp(caller, event_id, days).await?;
        let Some(notifier) = &self.notifier else {
            warn!("notifications unavailable, no reminders sent");
            return Ok(0);
        };
        let organizer = self.organizer_name(pending.event.owner_id).await;
        let mut sent = 0;
        for guest in &pending.guests {
            let reminder = RsvpReminder {
                guest_email: guest.email.clone(),
                guest_name: guest.name.clone(),
                event_name: pending.event.name.clone(),
                event_date: pending.event.date,
                event_location: pending.event.location.clone(),
                organizer_name: organizer.clone(),
                days_until_event: pending.days_until_event,
            };
            match notifier.send_rsvp_reminder(reminder).await {
                Ok(()) => sent += 1,
                Err(e) => warn!(guest_id = %guest.id, error = %e, "reminder mail failed"),
            }
        }
        info!(sent, pending = pending.guests.len(), "rsvp reminders sent");
        Ok(sent)
    }

    async fn insert_guest(&self, event_id: Uuid, name: &str, email: &str) -> Result<Guest, DomainError> {
        let name = required("name", name)?;
        let email = normalize_email(email)?;
        if self.guests_of(event_id).await?.iter().any(|g| g.email == email) {
            return Err(DomainError::GuestExists { email });
        }
        let guest = Guest {
            id: Uuid::new_v4(),
            event_id,
            name,
            email,
            rsvp: RsvpStatus::Pending,
            invited_at: None,
            responded_at: None,
            created_at: Utc::now(),
        };
        self.store
            .insert_guest(guest.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(guest)
    }

    async fn guests_of(&self, event_id: Uuid) -> Result<Vec<Guest>, DomainError> {
        self.store
            .guests_of(event_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    async fn load_guest(&self, id: Uuid) -> Result<Guest, DomainError> {
        self.store
            .find_guest(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or(DomainError::GuestNotFound { id })
    }
}
