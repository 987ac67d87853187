use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};
use std::sync::Arc;

use crate::api::rest::dto::{
    BookingDto, BookingListDto, BookingPaymentsDto, CancelReq, CreateBookingReq,
    CreatedBookingDto, PaymentFailedReq, PaymentStatusReq, RecordPaymentReq, RecordedPaymentDto,
    VendorPaymentDto, VendorProgressReq, VerifiedDto, VerifyPaymentReq, WebhookAckDto,
    WebhookEventReq, WorkProgressReq,
};
use crate::api::rest::handlers;
use crate::domain::service::Service;

pub fn register_routes(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    router = register_booking_routes(router, openapi);
    router = register_vendor_payment_routes(router, openapi);
    router = router.layer(Extension(service));
    Ok(router)
}

fn register_booking_routes(mut router: Router, openapi: &dyn OpenApiRegistry) -> Router {
    router = OperationBuilder::<Missing, Missing, ()>::post("/api/bookings/create")
        .operation_id("bookings.create")
        .summary("Book a vendor and open a payment order")
        .description("Prices the package with 18% tax, checks the caller's budget and creates a gateway order.")
        .tag("bookings")
        .bearer_auth()
        .json_request::<CreateBookingReq>(openapi, "Vendor, service date, package and optional event")
        .handler(handlers::create_booking)
        .json_response_with_schema::<CreatedBookingDto>(
            openapi,
            201,
            "Booking, checkout order and budget status",
        )
        .problem_response(openapi, 409, "Date booked or blocked")
        .problem_response(openapi, 502, "Payment gateway failure")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/bookings/verify-payment")
        .operation_id("bookings.verify_payment")
        .summary("Confirm a checkout payment")
        .tag("bookings")
        .bearer_auth()
        .json_request::<VerifyPaymentReq>(openapi, "booking_id, order_id, payment_id and signature")
        .handler(handlers::verify_payment)
        .json_response_with_schema::<VerifiedDto>(openapi, 200, "Paid booking")
        .problem_response(openapi, 502, "Payment gateway failure")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/bookings/webhook")
        .operation_id("bookings.webhook")
        .summary("Gateway notifications")
        .description("Signed with X-Razorpay-Signature over the raw body.")
        .tag("bookings")
        .json_request::<WebhookEventReq>(openapi, "Gateway event")
        .handler(handlers::webhook)
        .json_response_with_schema::<WebhookAckDto>(openapi, 200, "Acknowledged")
        .problem_response(openapi, 400, "Bad signature or body")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/bookings")
        .operation_id("bookings.list")
        .summary("Caller's bookings, newest first")
        .tag("bookings")
        .bearer_auth()
        .query_param("status", false, "Booking status")
        .query_param("payment_status", false, "Payment status")
        .query_param("event_id", false, "Event UUID")
        .handler(handlers::list_bookings)
        .json_response_with_schema::<BookingListDto>(openapi, 200, "Bookings")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/bookings/vendor/list")
        .operation_id("bookings.vendor_list")
        .summary("Bookings made with the caller's vendor profile")
        .tag("bookings")
        .bearer_auth()
        .handler(handlers::vendor_bookings)
        .json_response_with_schema::<BookingListDto>(openapi, 200, "Bookings")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/bookings/{id}")
        .operation_id("bookings.get")
        .summary("Booking by id")
        .tag("bookings")
        .bearer_auth()
        .path_param("id", "Booking UUID")
        .handler(handlers::get_booking)
        .json_response_with_schema::<BookingDto>(openapi, 200, "Booking")
        .problem_response(openapi, 403, "Not a party to the booking")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::patch("/api/bookings/{id}/vendor-progress")
        .operation_id("bookings.vendor_progress")
        .summary("Vendor reports progress")
        .tag("bookings")
        .bearer_auth()
        .path_param("id", "Booking UUID")
        .json_request::<VendorProgressReq>(openapi, "status and optional note")
        .handler(handlers::update_vendor_progress)
        .json_response_with_schema::<BookingDto>(openapi, 200, "Updated booking")
        .problem_response(openapi, 403, "Not the booked vendor")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/bookings/{id}/cancel")
        .operation_id("bookings.cancel")
        .summary("Cancel, refunding a captured payment")
        .tag("bookings")
        .bearer_auth()
        .path_param("id", "Booking UUID")
        .json_request::<CancelReq>(openapi, "Optional reason and partial refund amount")
        .handler(handlers::cancel_booking)
        .json_response_with_schema::<BookingDto>(openapi, 200, "Cancelled booking")
        .problem_response(openapi, 403, "Not the customer")
        .problem_response(openapi, 409, "Already cancelled")
        .problem_response(openapi, 502, "Refund failed")
        .standard_errors(openapi)
        .register(router, openapi);

    OperationBuilder::<Missing, Missing, ()>::post("/api/bookings/{id}/payment-failed")
        .operation_id("bookings.payment_failed")
        .summary("Record a failed checkout")
        .tag("bookings")
        .bearer_auth()
        .path_param("id", "Booking UUID")
        .json_request::<PaymentFailedReq>(openapi, "Optional order id, payment id and reason")
        .handler(handlers::payment_failed)
        .json_response_with_schema::<BookingDto>(openapi, 200, "Updated booking")
        .standard_errors(openapi)
        .register(router, openapi)
}

fn register_vendor_payment_routes(mut router: Router, openapi: &dyn OpenApiRegistry) -> Router {
    router = OperationBuilder::<Missing, Missing, ()>::post("/api/vendor-payments/{id}")
        .operation_id("vendor_payments.record")
        .summary("Record a payment made to the vendor")
        .tag("vendor-payments")
        .bearer_auth()
        .path_param("id", "Booking UUID")
        .json_request::<RecordPaymentReq>(
            openapi,
            "amount, payment_type, payment_method, status, transaction_id, notes",
        )
        .handler(handlers::record_vendor_payment)
        .json_response_with_schema::<RecordedPaymentDto>(openapi, 201, "Payment and updated booking")
        .problem_response(openapi, 403, "Not the customer")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/vendor-payments/booking/{id}")
        .operation_id("vendor_payments.of_booking")
        .summary("Payments of a booking with totals")
        .tag("vendor-payments")
        .bearer_auth()
        .path_param("id", "Booking UUID")
        .handler(handlers::booking_payments)
        .json_response_with_schema::<BookingPaymentsDto>(
            openapi,
            200,
            "Payments, total paid and remaining",
        )
        .problem_response(openapi, 403, "Not a party to the booking")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/vendor-payments/user/history")
        .operation_id("vendor_payments.user_history")
        .summary("Payments made by the caller")
        .tag("vendor-payments")
        .bearer_auth()
        .handler(handlers::user_payment_history)
        .json_list_response::<VendorPaymentDto>(openapi, 200, "Payments, newest first")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/vendor-payments/vendor/history")
        .operation_id("vendor_payments.vendor_history")
        .summary("Payments received by the caller's vendor profile")
        .tag("vendor-payments")
        .bearer_auth()
        .handler(handlers::vendor_payment_history)
        .json_list_response::<VendorPaymentDto>(openapi, 200, "Payments, newest first")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::put("/api/vendor-payments/{id}/status")
        .operation_id("vendor_payments.status")
        .summary("Change a payment's status")
        .tag("vendor-payments")
        .bearer_auth()
        .path_param("id", "Payment UUID")
        .json_request::<PaymentStatusReq>(openapi, "status")
        .handler(handlers::update_payment_status)
        .json_response_with_schema::<VendorPaymentDto>(openapi, 200, "Updated payment")
        .problem_response(openapi, 403, "Not the payer")
        .standard_errors(openapi)
        .register(router, openapi);

    OperationBuilder::<Missing, Missing, ()>::put("/api/vendor-payments/booking/{id}/progress")
        .operation_id("vendor_payments.work_progress")
        .summary("Vendor sets work progress in percent")
        .tag("vendor-payments")
        .bearer_auth()
        .path_param("id", "Booking UUID")
        .json_request::<WorkProgressReq>(openapi, "progress 0..=100 and optional note")
        .handler(handlers::update_work_progress)
        .json_response_with_schema::<BookingDto>(openapi, 200, "Updated booking")
        .problem_response(openapi, 403, "Not the booked vendor")
        .standard_errors(openapi)
        .register(router, openapi)
}
