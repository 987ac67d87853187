use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, Uri},
    response::Json,
    Extension,
};
use modkit::{bad_request, AuthUser, ProblemResponse};
use tracing::error;
use uuid::Uuid;

use crate::api::rest::dto::{
    BookingDto, BookingListDto, BookingListQuery, BookingPaymentsDto, CancelReq,
    CreateBookingReq, CreatedBookingDto, PaymentFailedReq, PaymentStatusReq, RecordPaymentReq,
    RecordedPaymentDto, VendorPaymentDto, VendorProgressReq, VerifiedDto, VerifyPaymentReq,
    WebhookAckDto, WorkProgressReq,
};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

// --- bookings ---

pub async fn create_booking(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<CreateBookingReq>,
) -> Result<(StatusCode, Json<CreatedBookingDto>), ProblemResponse> {
    match svc.create_booking(user, req.into()).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(created.into()))),
        Err(e) => {
            error!("Failed to create booking: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn verify_payment(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<VerifyPaymentReq>,
) -> Result<Json<VerifiedDto>, ProblemResponse> {
    svc.verify_payment(user, req.into())
        .await
        .map(|booking| {
            Json(VerifiedDto {
                message: "Payment verified successfully",
                booking: booking.into(),
            })
        })
        .map_err(|e| map_domain_error(&e, uri.path()))
}

/// Unauthenticated; trust comes from the body signature.
pub async fn webhook(
    uri: Uri,
    headers: HeaderMap,
    Extension(svc): Extension<Arc<Service>>,
    body: Bytes,
) -> Result<Json<WebhookAckDto>, ProblemResponse> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| bad_request("missing X-Razorpay-Signature header"))?;
    svc.handle_webhook(&body, signature)
        .await
        .map(|outcome| Json(outcome.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn list_bookings(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<BookingListDto>, ProblemResponse> {
    svc.list_bookings(user, query.into())
        .await
        .map(|bookings| Json(bookings.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn vendor_bookings(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<BookingListDto>, ProblemResponse> {
    svc.vendor_bookings(user)
        .await
        .map(|bookings| Json(bookings.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn get_booking(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingDto>, ProblemResponse> {
    svc.get_booking(user, id)
        .await
        .map(|b| Json(b.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn update_vendor_progress(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    Json(req): Json<VendorProgressReq>,
) -> Result<Json<BookingDto>, ProblemResponse> {
    svc.update_vendor_progress(user, id, req.status, req.note)
        .await
        .map(|b| Json(b.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn cancel_booking(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CancelReq>,
) -> Result<Json<BookingDto>, ProblemResponse> {
    match svc.cancel_booking(user, id, req.reason, req.refund_amount).await {
        Ok(b) => Ok(Json(b.into())),
        Err(e) => {
            error!("Failed to cancel booking {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn payment_failed(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    Json(req): Json<PaymentFailedReq>,
) -> Result<Json<BookingDto>, ProblemResponse> {
    svc.record_payment_failure(user, id, req.into())
        .await
        .map(|b| Json(b.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

// --- vendor payments ---

pub async fn record_vendor_payment(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecordPaymentReq>,
) -> Result<(StatusCode, Json<RecordedPaymentDto>), ProblemResponse> {
    match svc.record_vendor_payment(user, id, req.into()).await {
        Ok((payment, booking)) => Ok((
            StatusCode::CREATED,
            Json(RecordedPaymentDto {
                payment: payment.into(),
                booking: booking.into(),
            }),
        )),
        Err(e) => {
            error!("Failed to record payment for booking {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn booking_payments(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingPaymentsDto>, ProblemResponse> {
    svc.booking_payments(user, id)
        .await
        .map(|p| Json(p.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn user_payment_history(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<Vec<VendorPaymentDto>>, ProblemResponse> {
    svc.user_payment_history(user)
        .await
        .map(|ps| Json(ps.into_iter().map(Into::into).collect()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn vendor_payment_history(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<Vec<VendorPaymentDto>>, ProblemResponse> {
    svc.vendor_payment_history(user)
        .await
        .map(|ps| Json(ps.into_iter().map(Into::into).collect()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn update_payment_status(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    Json(req): Json<PaymentStatusReq>,
) -> Result<Json<VendorPaymentDto>, ProblemResponse> {
    svc.update_payment_status(user, id, req.status)
        .await
        .map(|p| Json(p.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn update_work_progress(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    Json(req): Json<WorkProgressReq>,
) -> Result<Json<BookingDto>, ProblemResponse> {
    svc.update_work_progress(user, id, req.progress, req.note)
        .await
        .map(|b| Json(b.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}
