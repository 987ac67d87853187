use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};
use std::sync::Arc;

use modkit::api::response::Ack;

use crate::api::rest::dto::{
    AddGuestReq, BudgetDto, CreateEventReq, EventDto, ExpensePatchReq, ExpenseReq, GuestDto,
    InvitationDto, InviteReq, PendingRsvpDto, RemindedDto, RsvpReq, RsvpUpdatedDto, SetBudgetReq,
    UpdateEventReq,
};
use crate::api::rest::handlers;
use crate::domain::service::Service;

pub fn register_routes(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    router = register_event_routes(router, openapi);
    router = register_guest_routes(router, openapi);
    router = register_budget_routes(router, openapi);
    router = router.layer(Extension(service));
    Ok(router)
}

fn register_event_routes(mut router: Router, openapi: &dyn OpenApiRegistry) -> Router {
    router = OperationBuilder::<Missing, Missing, ()>::get("/api/events")
        .operation_id("events.list")
        .summary("Caller's events")
        .tag("events")
        .bearer_auth()
        .handler(handlers::list_events)
        .json_list_response::<EventDto>(openapi, 200, "Events, soonest first")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/events")
        .operation_id("events.create")
        .summary("Create an event")
        .tag("events")
        .bearer_auth()
        .json_request::<CreateEventReq>(
            openapi,
            "Name, date, optional time, location, type and description",
        )
        .handler(handlers::create_event)
        .json_response_with_schema::<EventDto>(openapi, 201, "Created event")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/events/{id}")
        .operation_id("events.get")
        .summary("Event by id")
        .tag("events")
        .bearer_auth()
        .path_param("id", "Event UUID")
        .handler(handlers::get_event)
        .json_response_with_schema::<EventDto>(openapi, 200, "Event")
        .problem_response(openapi, 403, "Not the event owner")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::put("/api/events/{id}")
        .operation_id("events.update")
        .summary("Update event fields")
        .tag("events")
        .bearer_auth()
        .path_param("id", "Event UUID")
        .json_request::<UpdateEventReq>(openapi, "Fields to change")
        .handler(handlers::update_event)
        .json_response_with_schema::<EventDto>(openapi, 200, "Updated event")
        .problem_response(openapi, 403, "Not the event owner")
        .standard_errors(openapi)
        .register(router, openapi);

    OperationBuilder::<Missing, Missing, ()>::delete("/api/events/{id}")
        .operation_id("events.delete")
        .summary("Delete an event with its guests and budget")
        .tag("events")
        .bearer_auth()
        .path_param("id", "Event UUID")
        .handler(handlers::delete_event)
        .json_response_with_schema::<Ack>(openapi, 200, "Deleted")
        .problem_response(openapi, 403, "Not the event owner")
        .standard_errors(openapi)
        .register(router, openapi)
}

fn register_guest_routes(mut router: Router, openapi: &dyn OpenApiRegistry) -> Router {
    router = OperationBuilder::<Missing, Missing, ()>::post("/api/guests")
        .operation_id("guests.add")
        .summary("Add a guest to an event")
        .tag("guests")
        .bearer_auth()
        .json_request::<AddGuestReq>(openapi, "Event id, name and email")
        .handler(handlers::add_guest)
        .json_response_with_schema::<GuestDto>(openapi, 201, "Guest")
        .problem_response(openapi, 403, "Not the event owner")
        .problem_response(openapi, 409, "Email already on the guest list")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/guests/by-email/{email}")
        .operation_id("guests.invitations_by_email")
        .summary("Invitations addressed to an email")
        .tag("guests")
        .bearer_auth()
        .path_param("email", "Guest email")
        .handler(handlers::invitations_by_email)
        .json_list_response::<InvitationDto>(openapi, 200, "Guests with their events")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/guests/pending-rsvp/{id}")
        .operation_id("guests.pending_rsvp")
        .summary("Pending RSVPs for an upcoming event")
        .tag("guests")
        .bearer_auth()
        .path_param("id", "Event UUID")
        .query_param("days", false, "Window in days before the event")
        .handler(handlers::pending_rsvp)
        .json_response_with_schema::<PendingRsvpDto>(
            openapi,
            200,
            "Pending guests inside the window",
        )
        .problem_response(openapi, 403, "Not the event owner")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/guests/pending-rsvp/{id}/remind")
        .operation_id("guests.remind_pending")
        .summary("Mail reminders to pending guests")
        .tag("guests")
        .bearer_auth()
        .path_param("id", "Event UUID")
        .query_param("days", false, "Window in days before the event")
        .handler(handlers::remind_pending)
        .json_response_with_schema::<RemindedDto>(openapi, 200, "Number of reminders sent")
        .problem_response(openapi, 403, "Not the event owner")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/guests/{id}")
        .operation_id("guests.list")
        .summary("Guest list of an event")
        .tag("guests")
        .bearer_auth()
        .path_param("id", "Event UUID")
        .handler(handlers::list_guests)
        .json_list_response::<GuestDto>(openapi, 200, "Guests")
        .problem_response(openapi, 403, "Not the event owner")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/guests/{id}/invite")
        .operation_id("guests.invite")
        .summary("Add a guest and mail the invitation")
        .tag("guests")
        .bearer_auth()
        .path_param("id", "Event UUID")
        .json_request::<InviteReq>(openapi, "Name, email and optional personal message")
        .handler(handlers::invite_guest)
        .json_response_with_schema::<GuestDto>(openapi, 201, "Guest")
        .problem_response(openapi, 403, "Not the event owner")
        .problem_response(openapi, 409, "Email already on the guest list")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::put("/api/guests/{id}/rsvp")
        .operation_id("guests.update_rsvp")
        .summary("Record a guest's answer")
        .tag("guests")
        .bearer_auth()
        .path_param("id", "Guest UUID")
        .json_request::<RsvpReq>(openapi, "pending, accepted or rejected")
        .handler(handlers::update_rsvp)
        .json_response_with_schema::<RsvpUpdatedDto>(openapi, 200, "Updated guest")
        .standard_errors(openapi)
        .register(router, openapi);

    OperationBuilder::<Missing, Missing, ()>::delete("/api/guests/{id}")
        .operation_id("guests.delete")
        .summary("Remove a guest")
        .tag("guests")
        .bearer_auth()
        .path_param("id", "Guest UUID")
        .handler(handlers::delete_guest)
        .json_response_with_schema::<Ack>(openapi, 200, "Removed")
        .problem_response(openapi, 403, "Not the event owner")
        .standard_errors(openapi)
        .register(router, openapi)
}

fn register_budget_routes(mut router: Router, openapi: &dyn OpenApiRegistry) -> Router {
    router = OperationBuilder::<Missing, Missing, ()>::get("/api/budget/{id}")
        .operation_id("budget.get")
        .summary("Event budget with spending summary")
        .tag("budget")
        .bearer_auth()
        .path_param("id", "Event UUID")
        .handler(handlers::get_budget)
        .json_response_with_schema::<BudgetDto>(openapi, 200, "Budget summary")
        .problem_response(openapi, 403, "Not the event owner")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::put("/api/budget/{id}")
        .operation_id("budget.set_total")
        .summary("Set the total budget")
        .tag("budget")
        .bearer_auth()
        .path_param("id", "Event UUID")
        .json_request::<SetBudgetReq>(openapi, "Total budget")
        .handler(handlers::set_budget)
        .json_response_with_schema::<BudgetDto>(openapi, 200, "Budget summary")
        .problem_response(openapi, 403, "Not the event owner")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/budget/{id}/expenses")
        .operation_id("budget.add_expense")
        .summary("Add an expense line")
        .tag("budget")
        .bearer_auth()
        .path_param("id", "Event UUID")
        .json_request::<ExpenseReq>(openapi, "Title, amount, category, status and date")
        .handler(handlers::add_expense)
        .json_response_with_schema::<BudgetDto>(openapi, 201, "Budget summary")
        .problem_response(openapi, 403, "Not the event owner")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::put("/api/budget/{id}/expenses/{expense_id}")
        .operation_id("budget.update_expense")
        .summary("Change an expense line")
        .tag("budget")
        .bearer_auth()
        .path_param("id", "Event UUID")
        .path_param("expense_id", "Expense UUID")
        .json_request::<ExpensePatchReq>(openapi, "Fields to change")
        .handler(handlers::update_expense)
        .json_response_with_schema::<BudgetDto>(openapi, 200, "Budget summary")
        .problem_response(openapi, 403, "Not the event owner")
        .standard_errors(openapi)
        .register(router, openapi);

    OperationBuilder::<Missing, Missing, ()>::delete("/api/budget/{id}/expenses/{expense_id}")
        .operation_id("budget.delete_expense")
        .summary("Remove an expense line")
        .tag("budget")
        .bearer_auth()
        .path_param("id", "Event UUID")
        .path_param("expense_id", "Expense UUID")
        .handler(handlers::delete_expense)
        .json_response_with_schema::<BudgetDto>(openapi, 200, "Budget summary")
        .problem_response(openapi, 403, "Not the event owner")
        .standard_errors(openapi)
        .register(router, openapi)
}
