use std::collections::HashMap;
use std::sync::Arc;

use accounts::contract::{AccountsApi, AccountsError, User};
use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Extension, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use modkit::api::RouteCatalog;
use modkit::{AuthUser, JwtAuth, Role};
use modkit_db::{ConnectOpts, DbHandle};
use notifications::contract::NotificationsApi;
use notifications::gateways::local::NotificationsLocalClient;
use notifications::infra::memory::MemoryMailer;
use parking_lot::Mutex;
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use events::{
    config::EventsConfig,
    contract::{
        client::EventsApi,
        error::EventsError,
        model::{EventPatch, ExpenseCategory, ExpensePatch, ExpenseStatus, NewEvent, NewExpense, RsvpStatus},
    },
    domain::{error::DomainError, service::Service},
    gateways::local::EventsLocalClient,
    infra::storage::{migrations::Migrator, sea_orm_repo::SeaOrmEventsRepository},
};

#[derive(Default)]
struct FakeAccounts {
    users: Mutex<HashMap<Uuid, User>>,
}

impl FakeAccounts {
    fn add(&self, name: &str, role: Role) -> AuthUser {
        let id = Uuid::new_v4();
        self.users.lock().insert(
            id,
            User {
                id,
                name: name.into(),
                email: format!("{}@example.com", name.to_lowercase()),
                role,
                phone: None,
                is_verified: true,
                total_budget: None,
                budget_updated_at: None,
                created_at: Utc::now(),
            },
        );
        AuthUser { id, role }
    }
}

#[async_trait]
impl AccountsApi for FakeAccounts {
    async fn get_user(&self, id: Uuid) -> Result<User, AccountsError> {
        self.users
            .lock()
            .get(&id)
            .cloned()
            .ok_or(AccountsError::NotFound { id })
    }

    async fn personal_budget(&self, _id: Uuid) -> Result<Option<f64>, AccountsError> {
        Ok(None)
    }
}

struct Harness {
    service: Arc<Service>,
    accounts: Arc<FakeAccounts>,
    mailer: Arc<MemoryMailer>,
    _db: DbHandle,
}

async fn harness_with(mailer: MemoryMailer) -> Harness {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("Failed to connect to test database");
    Migrator::up(db.seaorm(), None)
        .await
        .expect("Failed to run migrations");

    let accounts = Arc::new(FakeAccounts::default());
    let mailer = Arc::new(mailer);
    let notifier: Arc<dyn NotificationsApi> = Arc::new(NotificationsLocalClient::new(Arc::new(
        notifications::domain::service::Service::new(mailer.clone()),
    )));
    let service = Arc::new(Service::new(
        Arc::new(SeaOrmEventsRepository::new(db.sea())),
        Some(accounts.clone() as Arc<dyn AccountsApi>),
        Some(notifier),
        EventsConfig::default(),
    ));
    Harness {
        service,
        accounts,
        mailer,
        _db: db,
    }
}

async fn harness() -> Harness {
    harness_with(MemoryMailer::default()).await
}

fn wedding(in_days: i64) -> NewEvent {
    NewEvent {
        name: "Asha & Ravi Wedding".into(),
        date: Utc::now().date_naive() + Duration::days(in_days),
        time: None,
        location: "Udaipur".into(),
        event_type: Some("wedding".into()),
        description: None,
    }
}

#[tokio::test]
async fn events_are_owned_and_deleted_with_their_data() -> Result<()> {
    let h = harness().await;
    let owner = h.accounts.add("Asha", Role::User);
    let stranger = h.accounts.add("Mallory", Role::User);
    let admin = h.accounts.add("Root", Role::Admin);

    let event = h.service.create_event(owner, wedding(30)).await?;
    assert_eq!(h.service.list_events(owner).await?.len(), 1);
    assert!(h.service.list_events(stranger).await?.is_empty());

    let err = h.service.get_event(stranger, event.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotOwner { .. }));
    assert_eq!(h.service.get_event(admin, event.id).await?.id, event.id);

    let updated = h
        .service
        .update_event(
            owner,
            event.id,
            EventPatch {
                location: Some("Jaipur".into()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.location, "Jaipur");
    assert_eq!(updated.name, event.name);
    assert!(updated.updated_at >= event.updated_at);

    let blank = NewEvent {
        name: "  ".into(),
        ..wedding(3)
    };
    assert!(matches!(
        h.service.create_event(owner, blank).await,
        Err(DomainError::Validation { .. })
    ));

    let guest = h.service.add_guest(owner, event.id, "Kiran", "kiran@example.com").await?;
    h.service.set_total_budget(owner, event.id, 1000.0).await?;

    h.service.delete_event(owner, event.id).await?;
    assert!(matches!(
        h.service.get_event(owner, event.id).await,
        Err(DomainError::EventNotFound { .. })
    ));
    assert!(matches!(
        h.service.update_rsvp(guest.id, RsvpStatus::Accepted).await,
        Err(DomainError::GuestNotFound { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn guest_list_rejects_duplicates_and_tracks_rsvp() -> Result<()> {
    let h = harness().await;
    let owner = h.accounts.add("Asha", Role::User);
    let event = h.service.create_event(owner, wedding(30)).await?;

    let guest = h.service.add_guest(owner, event.id, "Kiran", "Kiran@Example.com").await?;
    assert_eq!(guest.email, "kiran@example.com");
    assert_eq!(guest.rsvp, RsvpStatus::Pending);
    assert!(guest.invited_at.is_none());

    let dup = h.service.add_guest(owner, event.id, "K", "kiran@example.com").await;
    assert!(matches!(dup, Err(DomainError::GuestExists { .. })));

    let accepted = h.service.update_rsvp(guest.id, RsvpStatus::Accepted).await?;
    assert_eq!(accepted.rsvp, RsvpStatus::Accepted);
    assert!(accepted.responded_at.is_some());

    let back = h.service.update_rsvp(guest.id, RsvpStatus::Pending).await?;
    assert!(back.responded_at.is_none());

    let found = h.service.invitations_for("KIRAN@example.com").await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].event.as_ref().map(|e| e.id), Some(event.id));

    let stranger = h.accounts.add("Mallory", Role::User);
    assert!(matches!(
        h.service.delete_guest(stranger, guest.id).await,
        Err(DomainError::NotOwner { .. })
    ));
    h.service.delete_guest(owner, guest.id).await?;
    assert!(h.service.list_guests(owner, event.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn invitations_are_mailed_and_stamped() -> Result<()> {
    let h = harness().await;
    let owner = h.accounts.add("Asha", Role::User);
    let event = h.service.create_event(owner, wedding(30)).await?;

    let guest = h
        .service
        .invite_guest(owner, event.id, "Kiran", "kiran@example.com", Some("See you!".into()))
        .await?;
    assert!(guest.invited_at.is_some());

    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "kiran@example.com");
    assert!(sent[0].subject.contains("Asha & Ravi Wedding"));
    assert!(sent[0].text.contains("Asha"));

    let stored = h.service.list_guests(owner, event.id).await?;
    assert!(stored[0].invited_at.is_some());
    Ok(())
}

#[tokio::test]
async fn failed_invitation_mail_keeps_the_guest() -> Result<()> {
    let h = harness_with(MemoryMailer::failing("relay down")).await;
    let owner = h.accounts.add("Asha", Role::User);
    let event = h.service.create_event(owner, wedding(30)).await?;

    let guest = h
        .service
        .invite_guest(owner, event.id, "Kiran", "kiran@example.com", None)
        .await?;
    assert!(guest.invited_at.is_none());
    assert_eq!(h.service.list_guests(owner, event.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn pending_rsvp_only_inside_the_window() -> Result<()> {
    let h = harness().await;
    let owner = h.accounts.add("Asha", Role::User);
    let soon = h.service.create_event(owner, wedding(3)).await?;
    let later = h.service.create_event(owner, wedding(30)).await?;

    for event in [&soon, &later] {
        h.service.add_guest(owner, event.id, "Kiran", "kiran@example.com").await?;
        let answered = h.service.add_guest(owner, event.id, "Lee", "lee@example.com").await?;
        h.service.update_rsvp(answered.id, RsvpStatus::Rejected).await?;
    }

    let p = h.service.pending_rsvp(owner, soon.id, None).await?;
    assert_eq!(p.days_until_event, 3);
    assert_eq!(p.window_days, 7);
    assert_eq!(p.guests.len(), 1);
    assert_eq!(p.guests[0].name, "Kiran");

    assert!(h.service.pending_rsvp(owner, later.id, None).await?.guests.is_empty());
    assert_eq!(h.service.pending_rsvp(owner, later.id, Some(30)).await?.guests.len(), 1);

    assert_eq!(h.service.remind_pending(owner, soon.id, None).await?, 1);
    assert_eq!(h.service.remind_pending(owner, later.id, None).await?, 0);
    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.starts_with("RSVP Reminder"));
    Ok(())
}

#[tokio::test]
async fn budget_tracks_expenses_by_category() -> Result<()> {
    let h = harness().await;
    let owner = h.accounts.add("Asha", Role::User);
    let event = h.service.create_event(owner, wedding(30)).await?;

    assert!(matches!(
        h.service.get_budget(owner, event.id).await,
        Err(DomainError::BudgetNotFound { .. })
    ));

    h.service.set_total_budget(owner, event.id, 10_000.0).await?;
    let expense = |title: &str, amount, category| NewExpense {
        title: title.into(),
        amount,
        category,
        status: ExpenseStatus::Pending,
        date: None,
    };
    h.service
        .add_expense(owner, event.id, expense("Hall", 4000.0, ExpenseCategory::Venue))
        .await?;
    let summary = h
        .service
        .add_expense(owner, event.id, expense("Dinner", 2500.0, ExpenseCategory::Catering))
        .await?;
    assert_eq!(summary.total_spent, 6500.0);
    assert_eq!(summary.remaining, 3500.0);
    assert_eq!(summary.percentage_used, 65.0);
    assert_eq!(summary.by_category[&ExpenseCategory::Venue], 4000.0);

    let hall = summary.budget.expenses[0].id;
    let summary = h
        .service
        .update_expense(
            owner,
            event.id,
            hall,
            ExpensePatch {
                amount: Some(5000.0),
                status: Some(ExpenseStatus::Paid),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(summary.total_spent, 7500.0);
    assert_eq!(summary.budget.expenses[0].status, ExpenseStatus::Paid);

    let summary = h.service.delete_expense(owner, event.id, hall).await?;
    assert_eq!(summary.total_spent, 2500.0);
    assert!(matches!(
        h.service.delete_expense(owner, event.id, hall).await,
        Err(DomainError::ExpenseNotFound { .. })
    ));

    // Total can be lowered below what is already spent.
    let summary = h.service.set_total_budget(owner, event.id, 2000.0).await?;
    assert_eq!(summary.remaining, -500.0);
    assert_eq!(summary.budget.expenses.len(), 1);
    Ok(())
}

#[tokio::test]
async fn local_client_reads_any_event() -> Result<()> {
    let h = harness().await;
    let owner = h.accounts.add("Asha", Role::User);
    let event = h.service.create_event(owner, wedding(10)).await?;

    let api: Arc<dyn EventsApi> = Arc::new(EventsLocalClient::new(h.service.clone()));
    assert_eq!(api.get_event(event.id).await?.owner_id, owner.id);
    assert!(matches!(
        api.get_event(Uuid::new_v4()).await,
        Err(EventsError::NotFound { .. })
    ));
    Ok(())
}

async fn call(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header("authorization", format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn rest_events_guests_and_budget() -> Result<()> {
    let h = harness().await;
    let jwt = Arc::new(JwtAuth::new("test-secret", 1));
    let catalog = RouteCatalog::default();
    let app = events::api::rest::routes::register_routes(Router::new(), &catalog, h.service.clone())?
        .layer(Extension(jwt.clone()));

    let owner = h.accounts.add("Asha", Role::User);
    let token = jwt.issue(owner.id, owner.role)?;
    let date = NaiveDate::from_ymd_opt(2031, 2, 14).unwrap();

    let (status, _) = call(&app, "GET", "/api/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        "POST",
        "/api/events",
        Some(&token),
        Some(json!({"name": "Gala", "date": date, "time": "7pm", "location": "Pune"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "POST",
        "/api/events",
        Some(&token),
        Some(json!({"name": "Gala", "date": date, "time": "19:30", "location": "Pune"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["time"], "19:30");
    let event_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        "POST",
        "/api/guests",
        Some(&token),
        Some(json!({"event_id": event_id, "name": "Kiran", "email": "kiran@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rsvp_status"], "pending");
    let guest_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        "POST",
        "/api/guests",
        Some(&token),
        Some(json!({"event_id": event_id, "name": "Kiran", "email": "kiran@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/api/guests/{guest_id}/rsvp"),
        Some(&token),
        Some(json!({"status": "accepted"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "RSVP updated successfully");
    assert_eq!(body["guest"]["rsvp_status"], "accepted");

    let (status, body) = call(&app, "GET", &format!("/api/guests/{event_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = call(&app, "GET", "/api/guests/by-email/kiran@example.com", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["event"]["name"], "Gala");

    let (status, _) = call(&app, "GET", &format!("/api/budget/{event_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/budget/{event_id}"),
        Some(&token),
        Some(json!({"total_budget": 5000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/budget/{event_id}/expenses"),
        Some(&token),
        Some(json!({"title": "Band", "amount": 1250.5, "category": "Entertainment"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total_spent"], 1250.5);
    assert_eq!(body["by_category"]["Entertainment"], 1250.5);
    assert_eq!(body["expenses"][0]["status"], "pending");

    let other = h.accounts.add("Mallory", Role::User);
    let other_token = jwt.issue(other.id, other.role)?;
    let (status, _) = call(&app, "GET", &format!("/api/events/{event_id}"), Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, "DELETE", &format!("/api/events/{event_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = call(&app, "GET", &format!("/api/events/{event_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!catalog.is_empty());
    Ok(())
}
