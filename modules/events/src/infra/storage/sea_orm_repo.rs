//! SeaORM implementation of the event, guest and budget stores.

use anyhow::Context;
use modkit_db::text_enum;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::contract::model::{Budget, Event, Guest};
use crate::domain::repo::{BudgetsRepository, EventsRepository, GuestsRepository};
use crate::infra::storage::entity::{budget, event, guest};

pub struct SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn event_to_domain(m: event::Model) -> Event {
    Event {
        id: m.id,
        owner_id: m.owner_id,
        name: m.name,
        date: m.date,
        time: m.time,
        location: m.location,
        event_type: m.event_type,
        description: m.description,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn event_to_active(e: Event) -> event::ActiveModel {
    event::ActiveModel {
        id: Set(e.id),
        owner_id: Set(e.owner_id),
        name: Set(e.name),
        date: Set(e.date),
        time: Set(e.time),
        location: Set(e.location),
        event_type: Set(e.event_type),
        description: Set(e.description),
        created_at: Set(e.created_at),
        updated_at: Set(e.updated_at),
    }
}

fn guest_to_domain(m: guest::Model) -> anyhow::Result<Guest> {
    Ok(Guest {
        rsvp: text_enum::decode(&m.rsvp_status).context("guests.rsvp_status")?,
        id: m.id,
        event_id: m.event_id,
        name: m.name,
        email: m.email,
        invited_at: m.invited_at,
        responded_at: m.responded_at,
        created_at: m.created_at,
    })
}

fn guest_to_active(g: Guest) -> anyhow::Result<guest::ActiveModel> {
    Ok(guest::ActiveModel {
        id: Set(g.id),
        event_id: Set(g.event_id),
        name: Set(g.name),
        email: Set(g.email),
        rsvp_status: Set(text_enum::encode(&g.rsvp)?),
        invited_at: Set(g.invited_at),
        responded_at: Set(g.responded_at),
        created_at: Set(g.created_at),
    })
}

#[async_trait::async_trait]
impl<C> EventsRepository for SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_event(&self, id: Uuid) -> anyhow::Result<Option<Event>> {
        Ok(event::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_event failed")?
            .map(event_to_domain))
    }

    async fn events_of(&self, owner_id: Uuid) -> anyhow::Result<Vec<Event>> {
        let rows = event::Entity::find()
            .filter(event::Column::OwnerId.eq(owner_id))
            .order_by_asc(event::Column::Date)
            .order_by_asc(event::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("events_of failed")?;
        Ok(rows.into_iter().map(event_to_domain).collect())
    }

    async fn insert_event(&self, e: Event) -> anyhow::Result<()> {
        event_to_active(e)
            .insert(&self.conn)
            .await
            .context("insert_event failed")?;
        Ok(())
    }

    async fn update_event(&self, e: Event) -> anyhow::Result<()> {
        event_to_active(e)
            .update(&self.conn)
            .await
            .context("update_event failed")?;
        Ok(())
    }

    async fn delete_event(&self, id: Uuid) -> anyhow::Result<()> {
        guest::Entity::delete_many()
            .filter(guest::Column::EventId.eq(id))
            .exec(&self.conn)
            .await
            .context("delete guests of event failed")?;
        budget::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete budget of event failed")?;
        event::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete_event failed")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<C> GuestsRepository for SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_guest(&self, id: Uuid) -> anyhow::Result<Option<Guest>> {
        guest::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_guest failed")?
            .map(guest_to_domain)
            .transpose()
    }

    async fn guests_of(&self, event_id: Uuid) -> anyhow::Result<Vec<Guest>> {
        guest::Entity::find()
            .filter(guest::Column::EventId.eq(event_id))
            .order_by_asc(guest::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("guests_of failed")?
            .into_iter()
            .map(guest_to_domain)
            .collect()
    }

    async fn guests_by_email(&self, email: &str) -> anyhow::Result<Vec<Guest>> {
        guest::Entity::find()
            .filter(guest::Column::Email.eq(email))
            .order_by_desc(guest::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("guests_by_email failed")?
            .into_iter()
            .map(guest_to_domain)
            .collect()
    }

    async fn insert_guest(&self, g: Guest) -> anyhow::Result<()> {
        guest_to_active(g)?
            .insert(&self.conn)
            .await
            .context("insert_guest failed")?;
        Ok(())
    }

    async fn update_guest(&self, g: Guest) -> anyhow::Result<()> {
        guest_to_active(g)?
            .update(&self.conn)
            .await
            .context("update_guest failed")?;
        Ok(())
    }

    async fn delete_guest(&self, id: Uuid) -> anyhow::Result<()> {
        guest::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete_guest failed")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<C> BudgetsRepository for SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_budget(&self, event_id: Uuid) -> anyhow::Result<Option<Budget>> {
        Ok(budget::Entity::find_by_id(event_id)
            .one(&self.conn)
            .await
            .context("find_budget failed")?
            .map(|m| Budget {
                event_id: m.event_id,
                total_budget: m.total_budget,
                expenses: m.expenses.0,
                updated_at: m.updated_at,
            }))
    }

    async fn save_budget(&self, b: Budget) -> anyhow::Result<()> {
        let am = budget::ActiveModel {
            event_id: Set(b.event_id),
            total_budget: Set(b.total_budget),
            expenses: Set(budget::Expenses(b.expenses)),
            updated_at: Set(b.updated_at),
        };
        budget::Entity::insert(am)
            .on_conflict(
                OnConflict::column(budget::Column::EventId)
                    .update_columns([
                        budget::Column::TotalBudget,
                        budget::Column::Expenses,
                        budget::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("save_budget failed")?;
        Ok(())
    }
}
