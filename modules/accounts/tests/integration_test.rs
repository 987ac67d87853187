use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Extension, Router,
};
use modkit::api::RouteCatalog;
use modkit::{JwtAuth, Role};
use modkit_db::{ConnectOpts, DbHandle};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;

use accounts::{
    config::AccountsConfig,
    contract::{client::AccountsApi, model::NewAccount},
    domain::{error::DomainError, service::Service},
    gateways::local::AccountsLocalClient,
    infra::storage::{migrations::Migrator, sea_orm_repo::SeaOrmAccountsRepository},
};
use notifications::{
    contract::NotificationsApi, domain::service::Service as MailService,
    gateways::local::NotificationsLocalClient, infra::memory::MemoryMailer,
};

struct Harness {
    service: Arc<Service>,
    mailer: Arc<MemoryMailer>,
    jwt: Arc<JwtAuth>,
    _db: DbHandle,
}

impl Harness {
    /// The code from the newest mail sent to `to`.
    fn last_code(&self, to: &str) -> String {
        let mail = self
            .mailer
            .sent()
            .into_iter()
            .rev()
            .find(|m| m.to == to)
            .expect("no mail for recipient");
        let line = mail
            .text
            .lines()
            .find_map(|l| l.strip_prefix("Code: "))
            .expect("mail carries no code");
        line.trim().to_string()
    }
}

async fn harness_with(config: AccountsConfig) -> Harness {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("Failed to connect to test database");
    Migrator::up(db.seaorm(), None)
        .await
        .expect("Failed to run migrations");

    let mailer = Arc::new(MemoryMailer::default());
    let notifier: Arc<dyn NotificationsApi> = Arc::new(NotificationsLocalClient::new(Arc::new(
        MailService::new(mailer.clone()),
    )));
    let jwt = Arc::new(JwtAuth::new("test-secret", 1));
    let repo = SeaOrmAccountsRepository::new(db.sea());
    let service = Arc::new(Service::new(
        Arc::new(repo),
        jwt.clone(),
        Some(notifier),
        config,
    ));
    Harness {
        service,
        mailer,
        jwt,
        _db: db,
    }
}

async fn harness() -> Harness {
    harness_with(AccountsConfig {
        bcrypt_cost: 4,
        ..Default::default()
    })
    .await
}

fn new_account(email: &str) -> NewAccount {
    NewAccount {
        name: "Asha Rao".into(),
        email: email.into(),
        password: "hunter22".into(),
        role: None,
    }
}

fn router(h: &Harness) -> Router {
    accounts::api::rest::routes::register_routes(
        Router::new(),
        &RouteCatalog::default(),
        h.service.clone(),
    )
    .expect("Failed to register routes")
    .layer(Extension(h.jwt.clone()))
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
async fn register_login_and_verify() -> Result<()> {
    let h = harness().await;
    let reg = h.service.register(new_account(" Asha@Example.com ")).await?;
    let code = h.last_code("asha@example.com");
    assert_eq!(code.len(), 6);

    let user = h.service.get_user(reg.user_id).await?;
    assert_eq!(user.email, "asha@example.com");
    assert_eq!(user.role, Role::User);
    assert!(!user.is_verified);

    let challenge = h.service.login("ASHA@example.com", "hunter22").await?;
    assert_eq!(challenge.user_id, reg.user_id);
    let code = h.last_code("asha@example.com");

    let session = h.service.verify_otp(reg.user_id, &code).await?;
    assert!(session.user.is_verified);
    let claims = h.jwt.verify(&session.token)?;
    assert_eq!(claims.sub, reg.user_id);
    assert_eq!(claims.role, Role::User);

    // A code is single use.
    assert!(matches!(
        h.service.verify_otp(reg.user_id, &code).await,
        Err(DomainError::InvalidOtp)
    ));
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_wrong_code_are_rejected() -> Result<()> {
    let h = harness().await;
    let reg = h.service.register(new_account("a@x.io")).await?;
    assert!(matches!(
        h.service.login("a@x.io", "nope-nope").await,
        Err(DomainError::InvalidCredentials)
    ));
    assert!(matches!(
        h.service.login("missing@x.io", "hunter22").await,
        Err(DomainError::InvalidCredentials)
    ));

    h.service.login("a@x.io", "hunter22").await?;
    let code = h.last_code("a@x.io");
    let wrong = if code == "111111" { "222222" } else { "111111" };
    assert!(matches!(
        h.service.verify_otp(reg.user_id, wrong).await,
        Err(DomainError::InvalidOtp)
    ));
    Ok(())
}

#[tokio::test]
async fn expired_code_is_rejected() -> Result<()> {
    let h = harness_with(AccountsConfig {
        bcrypt_cost: 4,
        otp_ttl_minutes: -1,
        ..Default::default()
    })
    .await;
    let reg = h.service.register(new_account("late@x.io")).await?;
    let code = h.last_code("late@x.io");
    assert!(matches!(
        h.service.verify_otp(reg.user_id, &code).await,
        Err(DomainError::OtpExpired)
    ));
    Ok(())
}

#[tokio::test]
async fn registration_rules() -> Result<()> {
    let h = harness().await;
    h.service.register(new_account("dup@x.io")).await?;
    assert!(matches!(
        h.service.register(new_account("DUP@x.io")).await,
        Err(DomainError::EmailAlreadyExists { .. })
    ));

    let mut admin = new_account("boss@x.io");
    admin.role = Some(Role::Admin);
    assert!(matches!(
        h.service.register(admin).await,
        Err(DomainError::RoleNotAllowed { .. })
    ));

    let mut short = new_account("short@x.io");
    short.password = "abc".into();
    assert!(matches!(
        h.service.register(short).await,
        Err(DomainError::Validation { .. })
    ));

    let mut vendor = new_account("vendor@x.io");
    vendor.role = Some(Role::Vendor);
    let reg = h.service.register(vendor).await?;
    assert_eq!(h.service.get_user(reg.user_id).await?.role, Role::Vendor);
    Ok(())
}

#[tokio::test]
async fn password_reset_flow() -> Result<()> {
    let h = harness().await;
    h.service.register(new_account("r@x.io")).await?;
    h.service.forgot_password("r@x.io").await?;
    let code = h.last_code("r@x.io");
    h.service
        .reset_password("r@x.io", &code, "new-password".into())
        .await?;

    assert!(h.service.login("r@x.io", "hunter22").await.is_err());
    h.service.login("r@x.io", "new-password").await?;

    assert!(matches!(
        h.service.forgot_password("ghost@x.io").await,
        Err(DomainError::EmailNotFound { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn profile_budget_and_local_client() -> Result<()> {
    let h = harness().await;
    let reg = h.service.register(new_account("b@x.io")).await?;
    let client: Arc<dyn AccountsApi> = Arc::new(AccountsLocalClient::new(h.service.clone()));
    assert_eq!(client.personal_budget(reg.user_id).await?, None);

    h.service.set_budget(reg.user_id, 50_000.0).await?;
    assert_eq!(client.personal_budget(reg.user_id).await?, Some(50_000.0));
    assert!(h.service.set_budget(reg.user_id, -1.0).await.is_err());

    let patched = h
        .service
        .update_profile(
            reg.user_id,
            accounts::contract::model::ProfilePatch {
                name: Some("Asha R".into()),
                phone: Some("+91 98765 43210".into()),
            },
        )
        .await?;
    assert_eq!(patched.name, "Asha R");
    assert_eq!(patched.phone.as_deref(), Some("+91 98765 43210"));

    let missing = client.get_user(uuid::Uuid::new_v4()).await;
    assert!(matches!(
        missing,
        Err(accounts::contract::AccountsError::NotFound { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn rest_login_flow_and_protected_routes() -> Result<()> {
    let h = harness().await;
    let app = router(&h);

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"name": "Asha", "email": "rest@x.io", "password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = body["user_id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"name": "Asha", "email": "rest@x.io", "password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ACCOUNTS_EMAIL_CONFLICT");

    let (status, _) = call(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "rest@x.io", "password": "wrong-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "rest@x.io", "password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        "POST",
        "/api/auth/verify-otp",
        None,
        Some(json!({"user_id": user_id, "otp": "000000"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let code = h.last_code("rest@x.io");
    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/verify-otp",
        None,
        Some(json!({"user_id": user_id, "otp": code})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["is_verified"], true);

    let (status, _) = call(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "rest@x.io");

    let (status, body) = call(
        &app,
        "PUT",
        "/api/auth/budget",
        Some(&token),
        Some(json!({"total_budget": 120000.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_budget"], 120000.0);

    let (status, body) = call(&app, "GET", &format!("/api/auth/{user_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Asha");
    assert!(body.get("total_budget").is_none());
    Ok(())
}
