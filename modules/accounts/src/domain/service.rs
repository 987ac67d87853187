use std::sync::Arc;

use chrono::{Duration, Utc};
use modkit::{JwtAuth, Role};
use notifications::contract::{model::OtpPurpose, NotificationsApi};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::AccountsConfig;
use crate::contract::model::{NewAccount, ProfilePatch, User};
use crate::domain::credentials::{self, OTP_LEN};
use crate::domain::error::DomainError;
use crate::domain::model::{Account, OtpChallenge, Session};
use crate::domain::repo::AccountsRepository;

#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn AccountsRepository>,
    jwt: Arc<JwtAuth>,
    notifier: Option<Arc<dyn NotificationsApi>>,
    config: AccountsConfig,
}

impl Service {
    pub fn new(
        repo: Arc<dyn AccountsRepository>,
        jwt: Arc<JwtAuth>,
        notifier: Option<Arc<dyn NotificationsApi>>,
        config: AccountsConfig,
    ) -> Self {
        Self {
            repo,
            jwt,
            notifier,
            config,
        }
    }

    #[instrument(name = "accounts.service.register", skip(self, new), fields(email = %new.email))]
    pub async fn register(&self, new: NewAccount) -> Result<OtpChallenge, DomainError> {
        let role = new.role.unwrap_or(Role::User);
        if role == Role::Admin {
            return Err(DomainError::RoleNotAllowed {
                role: role.as_str().to_string(),
            });
        }
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name", "must not be empty"));
        }
        let email = credentials::normalize_email(&new.email);
        if !credentials::is_plausible_email(&email) {
            return Err(DomainError::validation("email", "is not a valid address"));
        }
        self.check_password(&new.password)?;

        if self
            .repo
            .email_exists(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::email_already_exists(email));
        }

        let password_hash =
            credentials::hash_password(new.password, self.config.bcrypt_cost).await?;
        let otp = credentials::generate_otp();
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role,
            phone: None,
            otp: Some(otp.clone()),
            otp_expires_at: Some(now + self.otp_ttl()),
            is_verified: false,
            total_budget: None,
            budget_updated_at: None,
            created_at: now,
            updated_at: now,
        };
        self.repo
            .insert(account.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!(user_id = %account.id, role = role.as_str(), "account registered");

        self.mail_otp(&account, &otp, OtpPurpose::Registration).await;
        Ok(OtpChallenge {
            user_id: account.id,
            message: "Registration successful. Check your email for the verification code."
                .to_string(),
        })
    }

    /// First login step: checks the password and mails a fresh code.
    #[instrument(name = "accounts.service.login", skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<OtpChallenge, DomainError> {
        let email = credentials::normalize_email(email);
        let mut account = self
            .repo
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or(DomainError::InvalidCredentials)?;

        let ok =
            credentials::verify_password(password.to_string(), account.password_hash.clone())
                .await?;
        if !ok {
            debug!(user_id = %account.id, "password mismatch");
            return Err(DomainError::InvalidCredentials);
        }

        let otp = self.issue_otp(&mut account).await?;
        self.mail_otp(&account, &otp, OtpPurpose::Login).await;
        Ok(OtpChallenge {
            user_id: account.id,
            message: "OTP sent to your email".to_string(),
        })
    }

    /// Second login step: exchanges a valid code for a bearer token.
    #[instrument(name = "accounts.service.verify_otp", skip(self, otp), fields(user_id = %user_id))]
    pub async fn verify_otp(&self, user_id: Uuid, otp: &str) -> Result<Session, DomainError> {
        let mut account = self.load(user_id).await?;
        self.consume_otp(&mut account, otp)?;
        account.is_verified = true;
        account.updated_at = Utc::now();
        self.repo
            .update(account.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let token = self
            .jwt
            .issue(account.id, account.role)
            .map_err(|e| DomainError::credentials(e.to_string()))?;
        info!("login completed");
        Ok(Session {
            token,
            user: account.to_user(),
        })
    }

    #[instrument(name = "accounts.service.forgot_password", skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<OtpChallenge, DomainError> {
        let email = credentials::normalize_email(email);
        let mut account = self
            .repo
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::email_not_found(email.clone()))?;
        let otp = self.issue_otp(&mut account).await?;
        self.mail_otp(&account, &otp, OtpPurpose::PasswordReset).await;
        Ok(OtpChallenge {
            user_id: account.id,
            message: "Password reset code sent to your email".to_string(),
        })
    }

    #[instrument(name = "accounts.service.reset_password", skip(self, otp, new_password))]
    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: String,
    ) -> Result<(), DomainError> {
        self.check_password(&new_password)?;
        let email = credentials::normalize_email(email);
        let mut account = self
            .repo
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::email_not_found(email.clone()))?;
        self.consume_otp(&mut account, otp)?;
        account.password_hash =
            credentials::hash_password(new_password, self.config.bcrypt_cost).await?;
        account.updated_at = Utc::now();
        self.repo
            .update(account)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!("password reset");
        Ok(())
    }

    #[instrument(name = "accounts.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        Ok(self.load(id).await?.to_user())
    }

    #[instrument(name = "accounts.service.update_profile", skip(self, patch), fields(user_id = %id))]
    pub async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<User, DomainError> {
        let mut account = self.load(id).await?;
        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::validation("name", "must not be empty"));
            }
            account.name = name;
        }
        if let Some(phone) = patch.phone {
            let phone = phone.trim().to_string();
            account.phone = (!phone.is_empty()).then_some(phone);
        }
        account.updated_at = Utc::now();
        self.repo
            .update(account.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(account.to_user())
    }

    #[instrument(name = "accounts.service.set_budget", skip(self), fields(user_id = %id))]
    pub async fn set_budget(&self, id: Uuid, total_budget: f64) -> Result<User, DomainError> {
        if !total_budget.is_finite() || total_budget < 0.0 {
            return Err(DomainError::validation(
                "total_budget",
                "must be a non-negative number",
            ));
        }
        let mut account = self.load(id).await?;
        let now = Utc::now();
        account.total_budget = Some(total_budget);
        account.budget_updated_at = Some(now);
        account.updated_at = now;
        self.repo
            .update(account.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!(total_budget, "personal budget updated");
        Ok(account.to_user())
    }

    async fn load(&self, id: Uuid) -> Result<Account, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    fn otp_ttl(&self) -> Duration {
        Duration::minutes(self.config.otp_ttl_minutes)
    }

    fn check_password(&self, password: &str) -> Result<(), DomainError> {
        if password.chars().count() < self.config.min_password_len {
            return Err(DomainError::validation(
                "password",
                format!(
                    "must be at least {} characters",
                    self.config.min_password_len
                ),
            ));
        }
        Ok(())
    }

    async fn issue_otp(&self, account: &mut Account) -> Result<String, DomainError> {
        let otp = credentials::generate_otp();
        let now = Utc::now();
        account.otp = Some(otp.clone());
        account.otp_expires_at = Some(now + self.otp_ttl());
        account.updated_at = now;
        self.repo
            .update(account.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(otp)
    }

    /// Checks and clears the stored code. The caller persists the account.
    fn consume_otp(&self, account: &mut Account, supplied: &str) -> Result<(), DomainError> {
        let supplied = supplied.trim();
        if supplied.len() != OTP_LEN {
            return Err(DomainError::InvalidOtp);
        }
        match (&account.otp, account.otp_expires_at) {
            (Some(stored), Some(expires)) if stored == supplied => {
                if expires < Utc::now() {
                    return Err(DomainError::OtpExpired);
                }
            }
            _ => return Err(DomainError::InvalidOtp),
        }
        account.otp = None;
        account.otp_expires_at = None;
        Ok(())
    }

    async fn mail_otp(&self, account: &Account, otp: &str, purpose: OtpPurpose) {
        let Some(notifier) = &self.notifier else {
            warn!(user_id = %account.id, "notifications unavailable, OTP not mailed");
            return;
        };
        if let Err(e) = notifier
            .send_otp(&account.email, &account.name, otp, purpose)
            .await
        {
            warn!(user_id = %account.id, error = %e, "failed to mail OTP");
        }
    }
}
