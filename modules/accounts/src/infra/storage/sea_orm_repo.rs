//! SeaORM implementation of the accounts repository.

use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::domain::model::Account;
use crate::domain::repo::AccountsRepository;
use crate::infra::storage::entity::{ActiveModel, Column, Entity, Model};

pub struct SeaOrmAccountsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmAccountsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn to_domain(m: Model) -> anyhow::Result<Account> {
    Ok(Account {
        role: modkit_db::text_enum::decode(&m.role).context("users.role")?,
        id: m.id,
        name: m.name,
        email: m.email,
        password_hash: m.password_hash,
        phone: m.phone,
        otp: m.otp,
        otp_expires_at: m.otp_expires_at,
        is_verified: m.is_verified,
        total_budget: m.total_budget,
        budget_updated_at: m.budget_updated_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn to_active(a: Account) -> anyhow::Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(a.id),
        name: Set(a.name),
        email: Set(a.email),
        password_hash: Set(a.password_hash),
        role: Set(modkit_db::text_enum::encode(&a.role)?),
        phone: Set(a.phone),
        otp: Set(a.otp),
        otp_expires_at: Set(a.otp_expires_at),
        is_verified: Set(a.is_verified),
        total_budget: Set(a.total_budget),
        budget_updated_at: Set(a.budget_updated_at),
        created_at: Set(a.created_at),
        updated_at: Set(a.updated_at),
    })
}

#[async_trait::async_trait]
impl<C> AccountsRepository for SeaOrmAccountsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?
            .map(to_domain)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        Entity::find()
            .filter(Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email failed")?
            .map(to_domain)
            .transpose()
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = Entity::find()
            .filter(Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, account: Account) -> anyhow::Result<()> {
        to_active(account)?
            .insert(&self.conn)
            .await
            .context("insert failed")?;
        Ok(())
    }

    async fn update(&self, account: Account) -> anyhow::Result<()> {
        to_active(account)?
            .update(&self.conn)
            .await
            .context("update failed")?;
        Ok(())
    }
}
