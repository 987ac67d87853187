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
use chrono::{NaiveDate, Utc};
use modkit::api::RouteCatalog;
use modkit::{ClientHub, JwtAuth, Role};
use modkit_db::{ConnectOpts, DbHandle};
use parking_lot::Mutex;
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use vendors::{
    config::VendorsConfig,
    contract::{
        client::{ReviewEligibility, VendorsApi},
        model::{
            AvailabilityEntry, AvailabilityStatus, Coordinates, Location, NewReview,
            PricingTier, ProfileInput, Review,
        },
    },
    domain::{
        error::DomainError,
        model::SearchQuery,
        repo::{TextMatch, VendorsRepository},
        search::SortKey,
        service::Service,
    },
    gateways::local::VendorsLocalClient,
    infra::storage::{migrations::Migrator, sea_orm_repo::SeaOrmVendorsRepository},
};

#[derive(Default)]
struct FakeAccounts {
    users: Mutex<HashMap<Uuid, User>>,
}

impl FakeAccounts {
    fn add(&self, name: &str, role: Role) -> Uuid {
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
        id
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

/// Pretends `reviewer` completed `booking` with every vendor.
struct CompletedBooking {
    reviewer: Uuid,
    booking: Uuid,
}

#[async_trait]
impl ReviewEligibility for CompletedBooking {
    async fn completed_booking(&self, user_id: Uuid, _vendor_id: Uuid) -> Option<Uuid> {
        (user_id == self.reviewer).then_some(self.booking)
    }
}

struct Harness {
    service: Arc<Service>,
    accounts: Arc<FakeAccounts>,
    hub: Arc<ClientHub>,
    _db: DbHandle,
}

async fn harness() -> Harness {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("Failed to connect to test database");
    Migrator::up(db.seaorm(), None)
        .await
        .expect("Failed to run migrations");

    let accounts = Arc::new(FakeAccounts::default());
    let hub = Arc::new(ClientHub::new());
    let service = Arc::new(Service::new(
        Arc::new(SeaOrmVendorsRepository::new(db.sea())),
        Some(accounts.clone() as Arc<dyn AccountsApi>),
        hub.clone(),
        VendorsConfig::default(),
    ));
    Harness {
        service,
        accounts,
        hub,
        _db: db,
    }
}

fn tier(name: &str, price: f64) -> PricingTier {
    PricingTier {
        package_name: name.into(),
        price,
        currency: "INR".into(),
        description: None,
        inclusions: vec!["setup".into()],
    }
}

fn profile(service_type: &str, city: &str, prices: &[f64]) -> ProfileInput {
    ProfileInput {
        business_name: Some(format!("{city} {service_type}")),
        service_type: service_type.into(),
        description: Some("Weddings and parties".into()),
        location: Location {
            address: "12 Park Street".into(),
            city: city.into(),
            state: "Maharashtra".into(),
            coordinates: None,
        },
        pricing_tiers: prices
            .iter()
            .enumerate()
            .map(|(i, p)| tier(&format!("Tier {i}"), *p))
            .collect(),
        contact_phone: Some("+91 90000 00000".into()),
        years_of_experience: 5,
        response_time: Some("within a day".into()),
        is_active: true,
    }
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[tokio::test]
async fn profile_upsert_keeps_calendar_and_portfolio() -> Result<()> {
    let h = harness().await;
    let owner = h.accounts.add("Meera", Role::Vendor);

    assert!(matches!(
        h.service.get_own_profile(owner).await,
        Err(DomainError::ProfileMissing { .. })
    ));

    let created = h
        .service
        .upsert_profile(owner, profile("Catering", "Mumbai", &[25_000.0]))
        .await?;
    h.service
        .set_availability(
            owner,
            vec![AvailabilityEntry {
                date: date("2026-12-20"),
                status: AvailabilityStatus::Blocked,
            }],
        )
        .await?;
    h.service
        .add_portfolio_image(owner, "https://cdn.example.com/a.jpg")
        .await?;

    let mut changed = profile("Catering", "Pune", &[30_000.0, 60_000.0]);
    changed.business_name = Some("Meera's Kitchen".into());
    let updated = h.service.upsert_profile(owner, changed).await?;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.location.city, "Pune");
    assert_eq!(updated.pricing_tiers.len(), 2);

    let own = h.service.get_own_profile(owner).await?;
    assert_eq!(own.owner.map(|o| o.name), Some("Meera".to_string()));
    assert_eq!(own.profile.availability.len(), 1);
    assert_eq!(own.profile.portfolio, vec!["https://cdn.example.com/a.jpg"]);
    assert_eq!(own.profile.business_name.as_deref(), Some("Meera's Kitchen"));
    Ok(())
}

#[tokio::test]
async fn search_reads_back_stored_profiles() -> Result<()> {
    let h = harness().await;
    let wanted = NaiveDate::from_ymd_opt(2026, 11, 14).unwrap();

    let a = h.accounts.add("A", Role::Vendor);
    let mut near = profile("Photography", "Mumbai", &[40_000.0, 80_000.0]);
    near.location.coordinates = Some(Coordinates {
        lat: 19.07,
        lon: 72.87,
    });
    h.service.upsert_profile(a, near).await?;
    h.service
        .set_availability(
            a,
            vec![AvailabilityEntry {
                date: wanted,
                status: AvailabilityStatus::Available,
            }],
        )
        .await?;

    let b = h.accounts.add("B", Role::Vendor);
    let mut far = profile("Photography", "Pune", &[20_000.0]);
    far.location.coordinates = Some(Coordinates {
        lat: 18.52,
        lon: 73.85,
    });
    h.service.upsert_profile(b, far).await?;

    let c = h.accounts.add("C", Role::Vendor);
    let mut hidden = profile("Photography", "Mumbai", &[10_000.0]);
    hidden.is_active = false;
    h.service.upsert_profile(c, hidden).await?;

    let all = h
        .service
        .advanced_search(SearchQuery {
            service_type: Some("photo".into()),
            sort_by: Some(SortKey::PriceLow),
            ..Default::default()
        })
        .await?;
    assert_eq!(all.total, 2);
    assert_eq!(all.listings[0].hit.min_package_price, Some(20_000.0));
    assert_eq!(all.listings[0].owner.as_ref().map(|o| o.name.as_str()), Some("B"));

    let nearby = h
        .service
        .advanced_search(SearchQuery {
            lat: Some(19.076),
            lon: Some(72.8777),
            max_distance: Some(10_000.0),
            date: Some(wanted),
            max_price: Some(50_000.0),
            ..Default::default()
        })
        .await?;
    assert_eq!(nearby.total, 1);
    let hit = &nearby.listings[0].hit;
    assert_eq!(hit.profile.location.city, "Mumbai");
    assert!(hit.distance.unwrap() < 10_000.0);
    assert_eq!(hit.is_available_on_date, Some(true));
    assert_eq!(hit.max_package_price, Some(80_000.0));

    let basic = h
        .service
        .basic_search(Some("MUM".into()), Some("photography".into()))
        .await?;
    assert_eq!(basic.len(), 1);

    let paged = h
        .service
        .advanced_search(SearchQuery {
            limit: Some(1),
            page: Some(2),
            ..Default::default()
        })
        .await?;
    assert_eq!(paged.total, 2);
    assert_eq!(paged.total_pages(), 2);
    assert_eq!(paged.listings.len(), 1);

    assert!(matches!(
        h.service
            .advanced_search(SearchQuery {
                min_price: Some(-1.0),
                ..Default::default()
            })
            .await,
        Err(DomainError::Validation { .. })
    ));
    for bad in [-0.5, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            h.service
                .advanced_search(SearchQuery {
                    min_rating: Some(bad),
                    ..Default::default()
                })
                .await,
            Err(DomainError::Validation { field, .. }) if field == "min_rating"
        ));
    }
    Ok(())
}

#[tokio::test]
async fn text_filters_run_in_the_store() -> Result<()> {
    let h = harness().await;
    let repo = SeaOrmVendorsRepository::new(h._db.sea());

    let a = h.accounts.add("A", Role::Vendor);
    h.service
        .upsert_profile(a, profile("Photography", "Mumbai", &[40_000.0]))
        .await?;
    let b = h.accounts.add("B", Role::Vendor);
    let mut goa = profile("Catering", "Panaji", &[20_000.0]);
    goa.location.state = "Goa".into();
    h.service.upsert_profile(b, goa).await?;
    let c = h.accounts.add("C", Role::Vendor);
    let mut hidden = profile("Photography", "Mumbai", &[10_000.0]);
    hidden.is_active = false;
    h.service.upsert_profile(c, hidden).await?;

    let all = repo.list_active(&TextMatch::default()).await?;
    assert_eq!(all.len(), 2);

    let mumbai = repo
        .list_active(&TextMatch {
            city: Some("MUM".into()),
            ..Default::default()
        })
        .await?;
    assert_eq!(mumbai.len(), 1);
    assert_eq!(mumbai[0].user_id, a);

    let goa = repo
        .list_active(&TextMatch {
            service_type: Some("cater".into()),
            state: Some("goa".into()),
            ..Default::default()
        })
        .await?;
    assert_eq!(goa.len(), 1);
    assert_eq!(goa[0].user_id, b);

    // LIKE wildcards in the needle match literally.
    for needle in ["%", "_umbai"] {
        let none = repo
            .list_active(&TextMatch {
                city: Some(needle.into()),
                ..Default::default()
            })
            .await?;
        assert!(none.is_empty(), "{needle} matched {}", none.len());
    }
    Ok(())
}

#[tokio::test]
async fn stale_copies_keep_each_others_columns() -> Result<()> {
    let h = harness().await;
    let repo = SeaOrmVendorsRepository::new(h._db.sea());
    let owner = h.accounts.add("Stale", Role::Vendor);
    let vendor = h
        .service
        .upsert_profile(owner, profile("Decor", "Delhi", &[12_000.0]))
        .await?;

    // Three writers each read the profile before any of them writes.
    let mut for_calendar = repo.find_by_id(vendor.id).await?.expect("profile");
    let mut for_reviews = repo.find_by_id(vendor.id).await?.expect("profile");
    let mut for_details = repo.find_by_id(vendor.id).await?.expect("profile");

    for_calendar.availability.push(AvailabilityEntry {
        date: date("2026-12-31"),
        status: AvailabilityStatus::Booked,
    });
    repo.write_calendar(vendor.id, &for_calendar.availability, Utc::now())
        .await?;

    for_reviews.reviews.push(Review {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        booking_id: None,
        rating: 5,
        comment: None,
        is_verified_booking: false,
        date: Utc::now(),
    });
    repo.write_reviews(vendor.id, &for_reviews.reviews, 5.0, 1, Utc::now())
        .await?;

    for_details.business_name = Some("Delhi Decor Co".into());
    for_details.updated_at = Utc::now();
    repo.update_details(&for_details).await?;

    let stored = repo.find_by_id(vendor.id).await?.expect("profile");
    assert_eq!(stored.availability.len(), 1);
    assert_eq!(stored.availability[0].status, AvailabilityStatus::Booked);
    assert_eq!(stored.reviews.len(), 1);
    assert_eq!(stored.total_reviews, 1);
    assert_eq!(stored.average_rating, 5.0);
    assert_eq!(stored.business_name.as_deref(), Some("Delhi Decor Co"));

    // The service paths go through the same writers.
    h.service
        .set_date_status(vendor.id, date("2027-01-02"), AvailabilityStatus::Blocked)
        .await?;
    let again = repo.find_by_id(vendor.id).await?.expect("profile");
    assert_eq!(again.availability.len(), 2);
    assert_eq!(again.reviews.len(), 1);

    let gone = Uuid::new_v4();
    let images = vec!["https://x.example/a.png".to_string()];
    assert!(repo.write_portfolio(gone, &images, Utc::now()).await.is_err());
    Ok(())
}

#[tokio::test]
async fn reviews_recompute_rating_and_verify_bookings() -> Result<()> {
    let h = harness().await;
    let owner = h.accounts.add("Vendor", Role::Vendor);
    let vendor = h
        .service
        .upsert_profile(owner, profile("DJ", "Goa", &[15_000.0]))
        .await?;

    let review = |rating| NewReview {
        rating,
        comment: Some("  great night  ".into()),
        booking_id: None,
    };
    assert!(matches!(
        h.service.add_review(vendor.id, Uuid::new_v4(), review(6)).await,
        Err(DomainError::InvalidRating { rating: 6 })
    ));
    assert!(h.service.add_review(vendor.id, Uuid::new_v4(), review(0)).await.is_err());

    // Nothing published in the hub yet: reviews stay unverified.
    let first = h.service.add_review(vendor.id, Uuid::new_v4(), review(4)).await?;
    assert!(!first.reviews[0].is_verified_booking);
    assert_eq!(first.reviews[0].comment.as_deref(), Some("great night"));

    let reviewer = Uuid::new_v4();
    let booking = Uuid::new_v4();
    h.hub
        .register::<dyn ReviewEligibility>(Arc::new(CompletedBooking { reviewer, booking }));
    h.service.add_review(vendor.id, reviewer, review(5)).await?;
    let last = h.service.add_review(vendor.id, Uuid::new_v4(), review(5)).await?;

    assert_eq!(last.total_reviews, 3);
    assert_eq!(last.average_rating, 4.7);
    let verified = &last.reviews[1];
    assert!(verified.is_verified_booking);
    assert_eq!(verified.booking_id, Some(booking));
    assert!(!last.reviews[2].is_verified_booking);

    assert!(matches!(
        h.service.add_review(Uuid::new_v4(), reviewer, review(3)).await,
        Err(DomainError::VendorNotFound { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn calendar_range_and_local_client() -> Result<()> {
    let h = harness().await;
    let owner = h.accounts.add("Cal", Role::Vendor);
    let vendor = h
        .service
        .upsert_profile(owner, profile("Decor", "Delhi", &[5_000.0]))
        .await?;
    let client: Arc<dyn VendorsApi> = Arc::new(VendorsLocalClient::new(h.service.clone()));

    client
        .set_date_status(vendor.id, date("2026-10-03"), AvailabilityStatus::Booked)
        .await?;
    client
        .set_date_status(vendor.id, date("2026-10-01"), AvailabilityStatus::Available)
        .await?;
    client
        .set_date_status(vendor.id, date("2026-10-03"), AvailabilityStatus::Available)
        .await?;
    client
        .set_date_status(vendor.id, date("2026-11-01"), AvailabilityStatus::Blocked)
        .await?;

    let october = h
        .service
        .availability(vendor.id, Some(date("2026-10-01")), Some(date("2026-10-31")))
        .await?;
    assert_eq!(october.len(), 2);
    assert_eq!(october[0].date, date("2026-10-01"));
    assert_eq!(october[1].status, AvailabilityStatus::Available);

    let stored = client.get_vendor(vendor.id).await?;
    assert_eq!(stored.status_on(date("2026-11-01")), Some(AvailabilityStatus::Blocked));
    assert_eq!(client.vendor_of_user(owner).await?.map(|p| p.id), Some(vendor.id));
    assert!(client.vendor_of_user(Uuid::new_v4()).await?.is_none());

    assert!(h
        .service
        .availability(vendor.id, Some(date("2026-10-31")), Some(date("2026-10-01")))
        .await
        .is_err());
    Ok(())
}

#[tokio::test]
async fn portfolio_accepts_web_urls_only() -> Result<()> {
    let h = harness().await;
    let owner = h.accounts.add("Pix", Role::Vendor);
    assert!(matches!(
        h.service.add_portfolio_image(owner, "https://x.io/1.png").await,
        Err(DomainError::ProfileMissing { .. })
    ));
    h.service
        .upsert_profile(owner, profile("Photography", "Jaipur", &[]))
        .await?;
    for bad in ["not a url", "ftp://x.io/1.png", "file:///etc/passwd"] {
        assert!(h.service.add_portfolio_image(owner, bad).await.is_err(), "{bad}");
    }
    let portfolio = h
        .service
        .add_portfolio_image(owner, "http://x.io/1.png")
        .await?;
    assert_eq!(portfolio, vec!["http://x.io/1.png"]);
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
async fn rest_profile_search_and_reviews() -> Result<()> {
    let h = harness().await;
    let jwt = Arc::new(JwtAuth::new("test-secret", 1));
    let catalog = RouteCatalog::default();
    let app = vendors::api::rest::routes::register_routes(
        Router::new(),
        &catalog,
        h.service.clone(),
    )?
    .layer(Extension(jwt.clone()));

    // Nested contract types are registered with the DTOs that embed them.
    for name in ["VendorDto", "SearchResponse", "ProfileReq", "Location", "SortKey", "Problem"] {
        assert!(catalog.has_schema(name), "{name} missing from the catalog");
    }
    let doc = serde_json::to_value(catalog.document("Vendors", "test"))?;
    let list = &doc["paths"]["/api/vendors/search"]["get"]["responses"]["200"]["content"]
        ["application/json"]["schema"];
    assert_eq!(list["items"]["$ref"], "#/components/schemas/VendorDto");

    let vendor_user = h.accounts.add("Ravi", Role::Vendor);
    let vendor_token = jwt.issue(vendor_user, Role::Vendor)?;
    let customer = h.accounts.add("Nina", Role::User);
    let customer_token = jwt.issue(customer, Role::User)?;

    let body = json!({
        "business_name": "Ravi Sounds",
        "service_type": "DJ",
        "location": {"address": "1 Beach Rd", "city": "Goa", "state": "Goa",
                     "coordinates": {"lat": 15.49, "lon": 73.82}},
        "pricing_tiers": [
            {"package_name": "Basic", "price": 12000.0},
            {"package_name": "Premium", "price": 30000.0, "inclusions": ["lights"]}
        ]
    });
    let (status, _) = call(&app, "POST", "/api/vendors/profile", Some(&customer_token), Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = call(&app, "POST", "/api/vendors/profile", Some(&vendor_token), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["pricing_tiers"][0]["currency"], "INR");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, calendar) = call(
        &app,
        "PUT",
        "/api/vendors/profile/availability",
        Some(&vendor_token),
        Some(json!({"dates": [{"date": "2026-12-31", "status": "booked"}, {"date": "2026-12-24"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(calendar[0]["date"], "2026-12-24");
    assert_eq!(calendar[0]["status"], "available");

    let (status, page) = call(
        &app,
        "GET",
        "/api/vendors/search/advanced?service_type=dj&sort_by=price_high&limit=500",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total_results"], 1);
    assert_eq!(page["pagination"]["limit"], 100);
    assert_eq!(page["filters"]["sort_by"], "price_high");
    let card = &page["vendors"][0];
    assert_eq!(card["min_package_price"], 12000.0);
    assert_eq!(card["user"]["name"], "Ravi");
    assert!(card.get("reviews").is_none());
    assert!(card.get("availability").is_none());

    let (status, found) = call(&app, "GET", "/api/vendors/search?location=GOA", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().map(Vec::len), Some(1));

    let (status, range) = call(
        &app,
        "GET",
        &format!("/api/vendors/{id}/availability?start=2026-12-25&end=2026-12-31"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(range["availability"].as_array().map(Vec::len), Some(1));

    let (status, _) = call(&app, "POST", &format!("/api/vendors/{id}/reviews"), None, Some(json!({"rating": 5}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, problem) = call(
        &app,
        "POST",
        &format!("/api/vendors/{id}/reviews"),
        Some(&customer_token),
        Some(json!({"rating": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["code"], "VENDORS_VALIDATION");

    let (status, added) = call(
        &app,
        "POST",
        &format!("/api/vendors/{id}/reviews"),
        Some(&customer_token),
        Some(json!({"rating": 4, "comment": "Loud and fun"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added["average_rating"], 4.0);
    assert_eq!(added["total_reviews"], 1);

    let (status, vendor) = call(&app, "GET", &format!("/api/vendors/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vendor["user"]["email"], "ravi@example.com");
    assert_eq!(vendor["reviews"][0]["comment"], "Loud and fun");

    let (status, problem) = call(&app, "GET", &format!("/api/vendors/{}", Uuid::new_v4()), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(problem["code"], "VENDORS_NOT_FOUND");
    Ok(())
}
