//! SeaORM implementation of the vendor profile store.

use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    Unchanged, Value,
};
use uuid::Uuid;

use crate::contract::model::{AvailabilityEntry, Coordinates, Location, Review, VendorProfile};
use crate::domain::repo::{TextMatch, VendorsRepository};
use crate::infra::storage::entity::{
    ActiveModel, Calendar, Column, Entity, Model, Portfolio, PricingTiers, Reviews,
};

pub struct SeaOrmVendorsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmVendorsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn to_domain(m: Model) -> VendorProfile {
    let coordinates = match (m.lat, m.lon) {
        (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
        _ => None,
    };
    VendorProfile {
        id: m.id,
        user_id: m.user_id,
        business_name: m.business_name,
        service_type: m.service_type,
        description: m.description,
        location: Location {
            address: m.address,
            city: m.city,
            state: m.state,
            coordinates,
        },
        pricing_tiers: m.pricing_tiers.0,
        availability: m.availability.0,
        portfolio: m.portfolio.0,
        reviews: m.reviews.0,
        average_rating: m.average_rating,
        total_reviews: u32::try_from(m.total_reviews).unwrap_or_default(),
        contact_phone: m.contact_phone,
        years_of_experience: u32::try_from(m.years_of_experience).unwrap_or_default(),
        response_time: m.response_time,
        is_active: m.is_active,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn to_active(p: VendorProfile) -> anyhow::Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(p.id),
        user_id: Set(p.user_id),
        business_name: Set(p.business_name),
        service_type: Set(p.service_type),
        description: Set(p.description),
        address: Set(p.location.address),
        city: Set(p.location.city),
        state: Set(p.location.state),
        lat: Set(p.location.coordinates.map(|c| c.lat)),
        lon: Set(p.location.coordinates.map(|c| c.lon)),
        pricing_tiers: Set(PricingTiers(p.pricing_tiers)),
        availability: Set(Calendar(p.availability)),
        portfolio: Set(Portfolio(p.portfolio)),
        reviews: Set(Reviews(p.reviews)),
        average_rating: Set(p.average_rating),
        total_reviews: Set(i32::try_from(p.total_reviews).context("total_reviews")?),
        contact_phone: Set(p.contact_phone),
        years_of_experience: Set(
            i32::try_from(p.years_of_experience).context("years_of_experience")?,
        ),
        response_time: Set(p.response_time),
        is_active: Set(p.is_active),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
    })
}

/// `lower(column) LIKE '%needle%'` with the needle's wildcards escaped.
fn contains_ci(column: Column, needle: &str) -> SimpleExpr {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

impl<C> SeaOrmVendorsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn set_columns(
        &self,
        id: Uuid,
        what: &'static str,
        values: Vec<(Column, Value)>,
    ) -> anyhow::Result<()> {
        let mut stmt = Entity::update_many().filter(Column::Id.eq(id));
        for (column, value) in values {
            stmt = stmt.col_expr(column, Expr::value(value));
        }
        let res = stmt
            .exec(&self.conn)
            .await
            .with_context(|| format!("{what} failed"))?;
        if res.rows_affected == 0 {
            anyhow::bail!("{what}: vendor profile {id} not found");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<C> VendorsRepository for SeaOrmVendorsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<VendorProfile>> {
        Ok(Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?
            .map(to_domain))
    }

    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<VendorProfile>> {
        Ok(Entity::find()
            .filter(Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("find_by_user failed")?
            .map(to_domain))
    }

    async fn list_active(&self, text: &TextMatch) -> anyhow::Result<Vec<VendorProfile>> {
        let mut query = Entity::find().filter(Column::IsActive.eq(true));
        for (column, needle) in [
            (Column::ServiceType, &text.service_type),
            (Column::City, &text.city),
            (Column::State, &text.state),
        ] {
            if let Some(needle) = needle {
                query = query.filter(contains_ci(column, needle));
            }
        }
        let rows = query
            .order_by_asc(Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("list_active failed")?;
        Ok(rows.into_iter().map(to_domain).collect())
    }

    async fn insert(&self, profile: VendorProfile) -> anyhow::Result<()> {
        to_active(profile)?
            .insert(&self.conn)
            .await
            .context("insert failed")?;
        Ok(())
    }

    async fn update_details(&self, p: &VendorProfile) -> anyhow::Result<()> {
        let model = ActiveModel {
            id: Unchanged(p.id),
            business_name: Set(p.business_name.clone()),
            service_type: Set(p.service_type.clone()),
            description: Set(p.description.clone()),
            address: Set(p.location.address.clone()),
            city: Set(p.location.city.clone()),
            state: Set(p.location.state.clone()),
            lat: Set(p.location.coordinates.map(|c| c.lat)),
            lon: Set(p.location.coordinates.map(|c| c.lon)),
            pricing_tiers: Set(PricingTiers(p.pricing_tiers.clone())),
            contact_phone: Set(p.contact_phone.clone()),
            years_of_experience: Set(
                i32::try_from(p.years_of_experience).context("years_of_experience")?,
            ),
            response_time: Set(p.response_time.clone()),
            is_active: Set(p.is_active),
            updated_at: Set(p.updated_at),
            ..Default::default()
        };
        model
            .update(&self.conn)
            .await
            .context("update_details failed")?;
        Ok(())
    }

    async fn write_calendar(
        &self,
        id: Uuid,
        calendar: &[AvailabilityEntry],
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.set_columns(
            id,
            "write_calendar",
            vec![
                (Column::Availability, Calendar(calendar.to_vec()).into()),
                (Column::UpdatedAt, at.into()),
            ],
        )
        .await
    }

    async fn write_portfolio(
        &self,
        id: Uuid,
        portfolio: &[String],
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.set_columns(
            id,
            "write_portfolio",
            vec![
                (Column::Portfolio, Portfolio(portfolio.to_vec()).into()),
                (Column::UpdatedAt, at.into()),
            ],
        )
        .await
    }

    async fn write_reviews(
        &self,
        id: Uuid,
        reviews: &[Review],
        average_rating: f64,
        total_reviews: u32,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let total = i32::try_from(total_reviews).context("total_reviews")?;
        self.set_columns(
            id,
            "write_reviews",
            vec![
                (Column::Reviews, Reviews(reviews.to_vec()).into()),
                (Column::AverageRating, average_rating.into()),
                (Column::TotalReviews, total.into()),
                (Column::UpdatedAt, at.into()),
            ],
        )
        .await
    }
}
