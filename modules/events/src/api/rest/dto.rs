use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{
    BudgetSummary, Event, EventPatch, Expense, ExpenseCategory, ExpensePatch, ExpenseStatus,
    Guest, NewEvent, NewExpense, RsvpStatus,
};
use crate::domain::guests::{Invitation, PendingRsvp};

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub location: String,
    pub event_type: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventDto {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            owner_id: e.owner_id,
            name: e.name,
            date: e.date,
            time: e.time.map(|t| t.format("%H:%M").to_string()),
            location: e.location,
            event_type: e.event_type,
            description: e.description,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEventReq {
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<String>,
    pub location: String,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateEventReq {
    /// `None` when `time` is present but unreadable.
    pub fn into_new_event(self) -> Option<NewEvent> {
        let time = match self.time.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(t) => Some(parse_time(t)?),
        };
        Some(NewEvent {
            name: self.name,
            date: self.date,
            time,
            location: self.location,
            event_type: self.event_type,
            description: self.description,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateEventReq {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub event_type: Option<String>,
    pub description: Option<String>,
}

impl UpdateEventReq {
    pub fn into_patch(self) -> Option<EventPatch> {
        let time = match self.time.as_deref() {
            None => None,
            Some(t) => Some(parse_time(t)?),
        };
        Some(EventPatch {
            name: self.name,
            date: self.date,
            time,
            location: self.location,
            event_type: self.event_type,
            description: self.description,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GuestDto {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub rsvp_status: RsvpStatus,
    pub invited_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Guest> for GuestDto {
    fn from(g: Guest) -> Self {
        Self {
            id: g.id,
            event_id: g.event_id,
            name: g.name,
            email: g.email,
            rsvp_status: g.rsvp,
            invited_at: g.invited_at,
            responded_at: g.responded_at,
            created_at: g.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddGuestReq {
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct InviteReq {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RsvpReq {
    pub status: RsvpStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RsvpUpdatedDto {
    pub message: String,
    pub guest: GuestDto,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvitationDto {
    #[serde(flatten)]
    pub guest: GuestDto,
    pub event: Option<EventDto>,
}

impl From<Invitation> for InvitationDto {
    fn from(i: Invitation) -> Self {
        Self {
            guest: i.guest.into(),
            event: i.event.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DaysQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PendingRsvpDto {
    pub event_id: Uuid,
    pub event_name: String,
    pub event_date: NaiveDate,
    pub days_until_event: i64,
    pub window_days: i64,
    pub guests: Vec<GuestDto>,
}

impl From<PendingRsvp> for PendingRsvpDto {
    fn from(p: PendingRsvp) -> Self {
        Self {
            event_id: p.event.id,
            event_name: p.event.name,
            event_date: p.event.date,
            days_until_event: p.days_until_event,
            window_days: p.window_days,
            guests: p.guests.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RemindedDto {
    pub sent: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BudgetDto {
    pub event_id: Uuid,
    pub total_budget: f64,
    pub expenses: Vec<Expense>,
    pub total_spent: f64,
    pub remaining: f64,
    pub percentage_used: f64,
    pub by_category: BTreeMap<ExpenseCategory, f64>,
    pub updated_at: DateTime<Utc>,
}

impl From<BudgetSummary> for BudgetDto {
    fn from(s: BudgetSummary) -> Self {
        Self {
            event_id: s.budget.event_id,
            total_budget: s.budget.total_budget,
            expenses: s.budget.expenses,
            total_spent: s.total_spent,
            remaining: s.remaining,
            percentage_used: s.percentage_used,
            by_category: s.by_category,
            updated_at: s.budget.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetBudgetReq {
    pub total_budget: f64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExpenseReq {
    pub title: String,
    pub amount: f64,
    #[serde(default)]
    pub category: ExpenseCategory,
    #[serde(default)]
    pub status: ExpenseStatus,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl From<ExpenseReq> for NewExpense {
    fn from(r: ExpenseReq) -> Self {
        Self {
            title: r.title,
            amount: r.amount,
            category: r.category,
            status: r.status,
            date: r.date,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ExpensePatchReq {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<ExpenseCategory>,
    pub status: Option<ExpenseStatus>,
    pub date: Option<DateTime<Utc>>,
}

impl From<ExpensePatchReq> for ExpensePatch {
    fn from(r: ExpensePatchReq) -> Self {
        Self {
            title: r.title,
            amount: r.amount,
            category: r.category,
            status: r.status,
            date: r.date,
        }
    }
}
