//! SeaORM implementation of the booking and vendor payment stores.

use anyhow::Context;
use modkit_db::text_enum;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::contract::model::{Booking, BookingStatus, PaymentStatus, VendorPayment};
use crate::domain::repo::{BookingFilter, BookingsRepository, PaymentsRepository};
use crate::infra::storage::entity::{booking, vendor_payment};

pub struct SeaOrmBookingsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmBookingsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn booking_to_domain(m: booking::Model) -> anyhow::Result<Booking> {
    Ok(Booking {
        payment_status: text_enum::decode(&m.payment_status).context("bookings.payment_status")?,
        vendor_progress: text_enum::decode(&m.vendor_progress).context("bookings.vendor_progress")?,
        booking_status: text_enum::decode(&m.booking_status).context("bookings.booking_status")?,
        number_of_guests: m
            .number_of_guests
            .map(u32::try_from)
            .transpose()
            .context("bookings.number_of_guests")?,
        work_progress: u8::try_from(m.work_progress).context("bookings.work_progress")?,
        id: m.id,
        user_id: m.user_id,
        vendor_id: m.vendor_id,
        event_id: m.event_id,
        service_date: m.service_date,
        service_type: m.service_type,
        selected_package: m.selected_package.0,
        base_amount: m.base_amount,
        tax_amount: m.tax_amount,
        discount_amount: m.discount_amount,
        total_amount: m.total_amount,
        currency: m.currency,
        payment_method: m.payment_method,
        advance_payment: m.advance_payment.map(|r| r.0),
        final_payment: m.final_payment.map(|r| r.0),
        payment_history: m.payment_history.0,
        progress_updates: m.progress_updates.0,
        venue: m.venue,
        special_requests: m.special_requests,
        cancellation_reason: m.cancellation_reason,
        cancelled_at: m.cancelled_at,
        cancelled_by: m.cancelled_by,
        refund_amount: m.refund_amount,
        confirmed_at: m.confirmed_at,
        completed_at: m.completed_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn booking_to_active(b: Booking) -> anyhow::Result<booking::ActiveModel> {
    Ok(booking::ActiveModel {
        payment_status: Set(text_enum::encode(&b.payment_status)?),
        vendor_progress: Set(text_enum::encode(&b.vendor_progress)?),
        booking_status: Set(text_enum::encode(&b.booking_status)?),
        number_of_guests: Set(b
            .number_of_guests
            .map(i32::try_from)
            .transpose()
            .context("number_of_guests out of range")?),
        work_progress: Set(i16::from(b.work_progress)),
        id: Set(b.id),
        user_id: Set(b.user_id),
        vendor_id: Set(b.vendor_id),
        event_id: Set(b.event_id),
        service_date: Set(b.service_date),
        service_type: Set(b.service_type),
        selected_package: Set(booking::Package(b.selected_package)),
        base_amount: Set(b.base_amount),
        tax_amount: Set(b.tax_amount),
        discount_amount: Set(b.discount_amount),
        total_amount: Set(b.total_amount),
        currency: Set(b.currency),
        payment_method: Set(b.payment_method),
        advance_payment: Set(b.advance_payment.map(booking::Record)),
        final_payment: Set(b.final_payment.map(booking::Record)),
        payment_history: Set(booking::History(b.payment_history)),
        progress_updates: Set(booking::Progress(b.progress_updates)),
        venue: Set(b.venue),
        special_requests: Set(b.special_requests),
        cancellation_reason: Set(b.cancellation_reason),
        cancelled_at: Set(b.cancelled_at),
        cancelled_by: Set(b.cancelled_by),
        refund_amount: Set(b.refund_amount),
        confirmed_at: Set(b.confirmed_at),
        completed_at: Set(b.completed_at),
        created_at: Set(b.created_at),
        updated_at: Set(b.updated_at),
    })
}

fn payment_to_domain(m: vendor_payment::Model) -> anyhow::Result<VendorPayment> {
    Ok(VendorPayment {
        payment_type: text_enum::decode(&m.payment_type).context("vendor_payments.payment_type")?,
        method: text_enum::decode(&m.method).context("vendor_payments.method")?,
        status: text_enum::decode(&m.status).context("vendor_payments.status")?,
        id: m.id,
        booking_id: m.booking_id,
        user_id: m.user_id,
        vendor_id: m.vendor_id,
        amount: m.amount,
        transaction_id: m.transaction_id,
        notes: m.notes,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn payment_to_active(p: VendorPayment) -> anyhow::Result<vendor_payment::ActiveModel> {
    Ok(vendor_payment::ActiveModel {
        payment_type: Set(text_enum::encode(&p.payment_type)?),
        method: Set(text_enum::encode(&p.method)?),
        status: Set(text_enum::encode(&p.status)?),
        id: Set(p.id),
        booking_id: Set(p.booking_id),
        user_id: Set(p.user_id),
        vendor_id: Set(p.vendor_id),
        amount: Set(p.amount),
        transaction_id: Set(p.transaction_id),
        notes: Set(p.notes),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
    })
}

fn bookings_from(rows: Vec<booking::Model>) -> anyhow::Result<Vec<Booking>> {
    rows.into_iter().map(booking_to_domain).collect()
}

fn payments_from(rows: Vec<vendor_payment::Model>) -> anyhow::Result<Vec<VendorPayment>> {
    rows.into_iter().map(payment_to_domain).collect()
}

#[async_trait::async_trait]
impl<C> BookingsRepository for SeaOrmBookingsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_booking(&self, id: Uuid) -> anyhow::Result<Option<Booking>> {
        booking::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_booking failed")?
            .map(booking_to_domain)
            .transpose()
    }

    async fn bookings_of_user(
        &self,
        user_id: Uuid,
        filter: &BookingFilter,
    ) -> anyhow::Result<Vec<Booking>> {
        let mut query = booking::Entity::find().filter(booking::Column::UserId.eq(user_id));
        if let Some(status) = &filter.status {
            query = query.filter(booking::Column::BookingStatus.eq(text_enum::encode(status)?));
        }
        if let Some(status) = &filter.payment_status {
            query = query.filter(booking::Column::PaymentStatus.eq(text_enum::encode(status)?));
        }
        if let Some(event_id) = filter.event_id {
            query = query.filter(booking::Column::EventId.eq(event_id));
        }
        let rows = query
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("bookings_of_user failed")?;
        bookings_from(rows)
    }

    async fn bookings_of_vendor(&self, vendor_id: Uuid) -> anyhow::Result<Vec<Booking>> {
        let rows = booking::Entity::find()
            .filter(booking::Column::VendorId.eq(vendor_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("bookings_of_vendor failed")?;
        bookings_from(rows)
    }

    async fn insert_booking(&self, b: Booking) -> anyhow::Result<()> {
        booking_to_active(b)?
            .insert(&self.conn)
            .await
            .context("insert_booking failed")?;
        Ok(())
    }

    async fn update_booking(&self, b: Booking) -> anyhow::Result<()> {
        booking_to_active(b)?
            .update(&self.conn)
            .await
            .context("update_booking failed")?;
        Ok(())
    }

    async fn spent_by_user(&self, user_id: Uuid) -> anyhow::Result<f64> {
        let spent = [PaymentStatus::Paid, PaymentStatus::PartiallyPaid]
            .iter()
            .map(text_enum::encode)
            .collect::<Result<Vec<_>, _>>()?;
        let totals: Vec<f64> = booking::Entity::find()
            .select_only()
            .column(booking::Column::TotalAmount)
            .filter(booking::Column::UserId.eq(user_id))
            .filter(booking::Column::PaymentStatus.is_in(spent))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("spent_by_user failed")?;
        Ok(totals.into_iter().sum())
    }

    async fn completed_booking(
        &self,
        user_id: Uuid,
        vendor_id: Uuid,
    ) -> anyhow::Result<Option<Uuid>> {
        let id: Option<Uuid> = booking::Entity::find()
            .select_only()
            .column(booking::Column::Id)
            .filter(booking::Column::UserId.eq(user_id))
            .filter(booking::Column::VendorId.eq(vendor_id))
            .filter(
                booking::Column::BookingStatus.eq(text_enum::encode(&BookingStatus::Completed)?),
            )
            .order_by_desc(booking::Column::CompletedAt)
            .into_tuple()
            .one(&self.conn)
            .await
            .context("completed_booking failed")?;
        Ok(id)
    }
}

#[async_trait::async_trait]
impl<C> PaymentsRepository for SeaOrmBookingsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_payment(&self, id: Uuid) -> anyhow::Result<Option<VendorPayment>> {
        vendor_payment::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_payment failed")?
            .map(payment_to_domain)
            .transpose()
    }

    async fn payments_of_booking(&self, booking_id: Uuid) -> anyhow::Result<Vec<VendorPayment>> {
        let rows = vendor_payment::Entity::find()
            .filter(vendor_payment::Column::BookingId.eq(booking_id))
            .order_by_asc(vendor_payment::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("payments_of_booking failed")?;
        payments_from(rows)
    }

    async fn payments_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<VendorPayment>> {
        let rows = vendor_payment::Entity::find()
            .filter(vendor_payment::Column::UserId.eq(user_id))
            .order_by_desc(vendor_payment::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("payments_by_user failed")?;
        payments_from(rows)
    }

    async fn payments_to_vendor(&self, vendor_id: Uuid) -> anyhow::Result<Vec<VendorPayment>> {
        let rows = vendor_payment::Entity::find()
            .filter(vendor_payment::Column::VendorId.eq(vendor_id))
            .order_by_desc(vendor_payment::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("payments_to_vendor failed")?;
        payments_from(rows)
    }

    async fn insert_payment(&self, p: VendorPayment) -> anyhow::Result<()> {
        payment_to_active(p)?
            .insert(&self.conn)
            .await
            .context("insert_payment failed")?;
        Ok(())
    }

    async fn update_payment(&self, p: VendorPayment) -> anyhow::Result<()> {
        payment_to_active(p)?
            .update(&self.conn)
            .await
            .context("update_payment failed")?;
        Ok(())
    }
}
