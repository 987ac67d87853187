//! Per-event budget and its expense lines.

use chrono::Utc;
use modkit::AuthUser;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::contract::model::{
    round2, Budget, BudgetSummary, Expense, ExpensePatch, NewExpense,
};
use crate::domain::error::DomainError;
use crate::domain::service::{required, Service};

fn check_amount(field: &str, v: f64) -> Result<f64, DomainError> {
    if !v.is_finite() || v < 0.0 {
        return Err(DomainError::validation(field, "must be a non-negative number"));
    }
    Ok(round2(v))
}

impl Service {
    #[instrument(name = "events.service.get_budget", skip(self), fields(event_id = %event_id))]
    pub async fn get_budget(&self, caller: AuthUser, event_id: Uuid) -> Result<BudgetSummary, DomainError> {
        self.owned_event(caller, event_id).await?;
        Ok(BudgetSummary::of(self.load_budget(event_id).await?))
    }

    /// Creates the budget on first use.
    #[instrument(name = "events.service.set_total_budget", skip(self), fields(event_id = %event_id))]
    pub async fn set_total_budget(
        &self,
        caller: AuthUser,
        event_id: Uuid,
        total_budget: f64,
    ) -> Result<BudgetSummary, DomainError> {
        let total_budget = check_amount("total_budget", total_budget)?;
        self.owned_event(caller, event_id).await?;
        let budget = match self.find_budget(event_id).await? {
            Some(mut b) => {
                b.total_budget = total_budget;
                b.updated_at = Utc::now();
                b
            }
            None => Budget {
                event_id,
                total_budget,
                expenses: Vec::new(),
                updated_at: Utc::now(),
            },
        };
        self.save_budget(&budget).await?;
        info!(total_budget, "event budget set");
        Ok(BudgetSummary::of(budget))
    }

    #[instrument(name = "events.service.add_expense", skip(self, new), fields(event_id = %event_id))]
    pub async fn add_expense(
        &self,
        caller: AuthUser,
        event_id: Uuid,
        new: NewExpense,
    ) -> Result<BudgetSummary, DomainError> {
        let title = required("title", &new.title)?;
        let amount = check_amount("amount", new.amount)?;
        self.owned_event(caller, event_id).await?;
        let mut budget = self.load_budget(event_id).await?;
        budget.expenses.push(Expense {
            id: Uuid::new_v4(),
            title,
            amount,
            category: new.category,
            status: new.status,
            date: new.date.unwrap_or_else(Utc::now),
        });
        budget.updated_at = Utc::now();
        self.save_budget(&budget).await?;
        Ok(BudgetSummary::of(budget))
    }

    #[instrument(name = "events.service.update_expense", skip(self, patch), fields(event_id = %event_id, expense_id = %expense_id))]
    pub async fn update_expense(
        &self,
        caller: AuthUser,
        event_id: Uuid,
        expense_id: Uuid,
        patch: ExpensePatch,
    ) -> Result<BudgetSummary, DomainError> {
        self.owned_event(caller, event_id).await?;
        let mut budget = self.load_budget(event_id).await?;
        let expense = budget
            .expenses
            .iter_mut()
            .find(|e| e.id == expense_id)
            .ok_or(DomainError::ExpenseNotFound { id: expense_id })?;
        if let Some(title) = patch.title {
            expense.title = required("title", &title)?;
        }
        if let Some(amount) = patch.amount {
            expense.amount = check_amount("amount", amount)?;
        }
        if let Some(category) = patch.category {
            expense.category = category;
        }
        if let Some(status) = patch.status {
            expense.status = status;
        }
        if let Some(date) = patch.date {
            expense.date = date;
        }
        budget.updated_at = Utc::now();
        self.save_budget(&budget).await?;
        Ok(BudgetSummary::of(budget))
    }

    #[instrument(name = "events.service.delete_expense", skip(self), fields(event_id = %event_id, expense_id = %expense_id))]
    pub async fn delete_expense(
        &self,
        caller: AuthUser,
        event_id: Uuid,
        expense_id: Uuid,
    ) -> Result<BudgetSummary, DomainError> {
        self.owned_event(caller, event_id).await?;
        let mut budget = self.load_budget(event_id).await?;
        let before = budget.expenses.len();
        budget.expenses.retain(|e| e.id != expense_id);
        if budget.expenses.len() == before {
            return Err(DomainError::ExpenseNotFound { id: expense_id });
        }
        budget.updated_at = Utc::now();
        self.save_budget(&budget).await?;
        Ok(BudgetSummary::of(budget))
    }

    async fn find_budget(&self, event_id: Uuid) -> Result<Option<Budget>, DomainError> {
        self.store
            .find_budget(event_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    async fn load_budget(&self, event_id: Uuid) -> Result<Budget, DomainError> {
        self.find_budget(event_id)
            .await?
            .ok_or(DomainError::BudgetNotFound { event_id })
    }

    async fn save_budget(&self, budget: &Budget) -> Result<(), DomainError> {
        self.store
            .save_budget(budget.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{ExpenseCategory, ExpenseStatus};

    fn line(amount: f64, category: ExpenseCategory) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            title: "x".into(),
            amount,
            category,
            status: ExpenseStatus::Pending,
            date: Utc::now(),
        }
    }

    #[test]
    fn summary_totals_by_category() {
        let budget = Budget {
            event_id: Uuid::new_v4(),
            total_budget: 1000.0,
            expenses: vec![
                line(100.10, ExpenseCategory::Venue),
                line(200.20, ExpenseCategory::Venue),
                line(50.0, ExpenseCategory::Catering),
            ],
            updated_at: Utc::now(),
        };
        let s = BudgetSummary::of(budget);
        assert_eq!(s.total_spent, 350.3);
        assert_eq!(s.remaining, 649.7);
        assert_eq!(s.percentage_used, 35.03);
        assert_eq!(s.by_category[&ExpenseCategory::Venue], 300.3);
        assert_eq!(s.by_category[&ExpenseCategory::Catering], 50.0);
        assert!(!s.by_category.contains_key(&ExpenseCategory::Other));
    }

    #[test]
    fn zero_budget_reports_zero_percent() {
        let s = BudgetSummary::of(Budget {
            event_id: Uuid::new_v4(),
            total_budget: 0.0,
            expenses: vec![line(10.0, ExpenseCategory::Other)],
            updated_at: Utc::now(),
        });
        assert_eq!(s.percentage_used, 0.0);
        assert_eq!(s.remaining, -10.0);
    }

    #[test]
    fn amounts_are_checked() {
        assert!(check_amount("a", -0.01).is_err());
        assert!(check_amount("a", f64::NAN).is_err());
        assert_eq!(check_amount("a", 19.999).unwrap(), 20.0);
    }
}
