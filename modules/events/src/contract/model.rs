//! Events, guests and per-event budgets. Expense lines are stored as JSON,
//! so they carry serde derives.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub location: String,
    pub event_type: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whole days from `today` until the event; negative once it has passed.
    pub fn days_until(&self, today: NaiveDate) -> i64 {
        (self.date - today).num_days()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub name: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub location: String,
    pub event_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub location: Option<String>,
    pub event_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Guest {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub rsvp: RsvpStatus,
    pub invited_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default, ToSchema)]
pub enum ExpenseCategory {
    Venue,
    Catering,
    Decoration,
    Entertainment,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    #[default]
    Pending,
    PartiallyDone,
    Paid,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Expense {
    pub id: Uuid,
    pub title: String,
    pub amount: f64,
    #[serde(default)]
    pub category: ExpenseCategory,
    #[serde(default)]
    pub status: ExpenseStatus,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub event_id: Uuid,
    pub total_budget: f64,
    pub expenses: Vec<Expense>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub status: ExpenseStatus,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpensePatch {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<ExpenseCategory>,
    pub status: Option<ExpenseStatus>,
    pub date: Option<DateTime<Utc>>,
}

/// A budget with its totals, recomputed on every read.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSummary {
    pub budget: Budget,
    pub total_spent: f64,
    pub remaining: f64,
    pub percentage_used: f64,
    pub by_category: BTreeMap<ExpenseCategory, f64>,
}

impl BudgetSummary {
    pub fn of(budget: Budget) -> Self {
        let mut by_category = BTreeMap::new();
        let mut total_spent = 0.0;
        for e in &budget.expenses {
            *by_category.entry(e.category).or_insert(0.0) += e.amount;
            total_spent += e.amount;
        }
        let total_spent = round2(total_spent);
        for v in by_category.values_mut() {
            *v = round2(*v);
        }
        let percentage_used = if budget.total_budget > 0.0 {
            round2(total_spent / budget.total_budget * 100.0)
        } else {
            0.0
        };
        Self {
            remaining: round2(budget.total_budget - total_spent),
            total_spent,
            percentage_used,
            by_category,
            budget,
        }
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
