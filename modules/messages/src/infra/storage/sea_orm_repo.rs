use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::contract::model::Message;
use crate::domain::repo::MessagesRepository;
use crate::infra::storage::entity::{ActiveModel, Column, Entity, Model};

pub struct SeaOrmMessagesRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmMessagesRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

impl From<Model> for Message {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            recipient_id: m.recipient_id,
            text: m.text,
            read_at: m.read_at,
            created_at: m.created_at,
        }
    }
}

fn between(a: Uuid, b: Uuid) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(Column::SenderId.eq(a))
                .add(Column::RecipientId.eq(b)),
        )
        .add(
            Condition::all()
                .add(Column::SenderId.eq(b))
                .add(Column::RecipientId.eq(a)),
        )
}

#[async_trait::async_trait]
impl<C> MessagesRepository for SeaOrmMessagesRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert(&self, m: Message) -> anyhow::Result<()> {
        let row = ActiveModel {
            id: Set(m.id),
            sender_id: Set(m.sender_id),
            recipient_id: Set(m.recipient_id),
            text: Set(m.text),
            read_at: Set(m.read_at),
            created_at: Set(m.created_at),
        };
        row.insert(&self.conn).await.context("insert message failed")?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Message>> {
        Ok(Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find message failed")?
            .map(Into::into))
    }

    async fn thread(&self, a: Uuid, b: Uuid) -> anyhow::Result<Vec<Message>> {
        let rows = Entity::find()
            .filter(between(a, b))
            .order_by_asc(Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("thread query failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn involving(&self, user_id: Uuid) -> anyhow::Result<Vec<Message>> {
        let rows = Entity::find()
            .filter(
                Condition::any()
                    .add(Column::SenderId.eq(user_id))
                    .add(Column::RecipientId.eq(user_id)),
            )
            .order_by_desc(Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("involving query failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn mark_read(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        let res = Entity::update_many()
            .col_expr(Column::ReadAt, Expr::value(at))
            .filter(Column::RecipientId.eq(recipient_id))
            .filter(Column::SenderId.eq(sender_id))
            .filter(Column::ReadAt.is_null())
            .exec(&self.conn)
            .await
            .context("mark_read failed")?;
        Ok(res.rows_affected)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete message failed")?;
        Ok(())
    }
}
