//! Personal spending check run before a booking is created. It only
//! classifies; a booking is never refused because of it.

use messages::contract::{AlertLevel, BudgetWarning};

use crate::domain::pricing::round2;

const WARNING_PCT: f64 = 80.0;
const CRITICAL_PCT: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetCheck {
    pub total_budget: f64,
    pub total_spent: f64,
    pub remaining: f64,
    pub requested_amount: f64,
    pub projected_total: f64,
    pub percentage_used: f64,
    pub is_exceeding: bool,
    pub is_warning: bool,
    pub is_critical: bool,
}

impl BudgetCheck {
    pub fn evaluate(total_budget: f64, total_spent: f64, requested_amount: f64) -> Self {
        let projected_total = total_spent + requested_amount;
        let percentage_used = projected_total / total_budget * 100.0;
        Self {
            total_budget,
            total_spent,
            remaining: total_budget - total_spent,
            requested_amount,
            projected_total,
            percentage_used: round2(percentage_used),
            is_exceeding: projected_total > total_budget,
            is_warning: (WARNING_PCT..CRITICAL_PCT).contains(&percentage_used),
            is_critical: percentage_used >= CRITICAL_PCT,
        }
    }

    /// Alert to show the customer, if the booking is worth warning about.
    pub fn alert(&self) -> Option<BudgetWarning> {
        let (level, message, recommendation) = if self.is_exceeding || self.is_critical {
            (
                AlertLevel::Critical,
                format!(
                    "This booking will exceed your budget by ₹{:.2}",
                    self.projected_total - self.total_budget
                ),
                "Consider reviewing your budget or choosing a lower-priced vendor".to_string(),
            )
        } else if self.is_warning {
            (
                AlertLevel::Warning,
                format!("You've used {:.2}% of your budget", self.percentage_used),
                format!("₹{:.2} remaining for other bookings", self.remaining),
            )
        } else {
            return None;
        };
        Some(BudgetWarning {
            level,
            message,
            recommendation,
            total_budget: self.total_budget,
            projected_total: self.projected_total,
            percentage_used: self.percentage_used,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BudgetStatus {
    /// The customer never set a spending limit.
    NoBudget,
    Checked(BudgetCheck),
    /// The check failed and was skipped.
    Unavailable,
}

impl BudgetStatus {
    pub fn alert(&self) -> Option<BudgetWarning> {
        match self {
            Self::Checked(check) => check.alert(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_classify_usage() {
        let low = BudgetCheck::evaluate(100_000.0, 20_000.0, 10_000.0);
        assert!(!low.is_warning && !low.is_critical && !low.is_exceeding);
        assert_eq!(low.alert(), None);

        let warn = BudgetCheck::evaluate(100_000.0, 50_000.0, 30_000.0);
        assert_eq!(warn.percentage_used, 80.0);
        assert!(warn.is_warning && !warn.is_critical);
        let alert = warn.alert().unwrap();
        assert_eq!(alert.level, AlertLevel::Warning);
        assert_eq!(alert.message, "You've used 80.00% of your budget");
        assert_eq!(alert.recommendation, "₹50000.00 remaining for other bookings");

        let exact = BudgetCheck::evaluate(100_000.0, 60_000.0, 40_000.0);
        assert!(exact.is_critical && !exact.is_warning && !exact.is_exceeding);
        assert_eq!(exact.alert().unwrap().level, AlertLevel::Critical);
    }

    #[test]
    fn overshoot_is_reported_in_the_message() {
        let over = BudgetCheck::evaluate(50_000.0, 40_000.0, 23_600.0);
        assert!(over.is_exceeding && over.is_critical);
        let alert = over.alert().unwrap();
        assert_eq!(alert.level, AlertLevel::Critical);
        assert_eq!(alert.message, "This booking will exceed your budget by ₹13600.00");
        assert_eq!(alert.projected_total, 63_600.0);
    }

    #[test]
    fn only_checked_status_carries_an_alert() {
        assert_eq!(BudgetStatus::NoBudget.alert(), None);
        assert_eq!(BudgetStatus::Unavailable.alert(), None);
        let checked = BudgetStatus::Checked(BudgetCheck::evaluate(1000.0, 0.0, 900.0));
        assert!(checked.alert().is_some());
    }
}
