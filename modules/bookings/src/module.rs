use std::sync::Arc;

use accounts::contract::AccountsApi;
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use events::contract::EventsApi;
use messages::contract::MessagesApi;
use modkit::api::OpenApiRegistry;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use notifications::contract::NotificationsApi;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};
use vendors::contract::{ReviewEligibility, VendorsApi};

use crate::api::rest::routes;
use crate::config::BookingsConfig;
use crate::domain::service::{Collaborators, Service};
use crate::gateways::local::BookingsReviewEligibility;
use crate::infra::razorpay::RazorpayGateway;
use crate::infra::storage::sea_orm_repo::SeaOrmBookingsRepository;

pub const MODULE_NAME: &str = "bookings";

/// Vendor bookings, gateway payments and manually recorded vendor payments.
#[derive(Default)]
pub struct Bookings {
    service: ArcSwapOption<Service>,
}

impl Bookings {
    pub fn service(&self) -> Option<Arc<Service>> {
        self.service.load_full()
    }
}

#[async_trait]
impl Module for Bookings {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing bookings module");
        let cfg: BookingsConfig = ctx.module_config();
        debug!(
            currency = %cfg.currency,
            gateway = %cfg.razorpay.base_url,
            "bookings config loaded"
        );

        let db = ctx.db_required()?;
        let hub = ctx.client_hub();
        let vendors = hub
            .get::<dyn VendorsApi>()
            .map_err(|e| anyhow::anyhow!("bookings requires the vendors module: {e}"))?;
        let deps = Collaborators {
            accounts: hub
                .get::<dyn AccountsApi>()
                .map_err(|e| warn!(error = %e, "accounts not available, budget checks are skipped"))
                .ok(),
            events: hub
                .get::<dyn EventsApi>()
                .map_err(|e| warn!(error = %e, "events not available, event ids are not checked"))
                .ok(),
            notifier: hub
                .get::<dyn NotificationsApi>()
                .map_err(|e| warn!(error = %e, "notifications not available, vendors will not be mailed"))
                .ok(),
            messages: hub
                .get::<dyn MessagesApi>()
                .map_err(|e| warn!(error = %e, "messages not available, budget alerts are not pushed"))
                .ok(),
        };

        let gateway = RazorpayGateway::new(&cfg.razorpay)?;
        let repo = SeaOrmBookingsRepository::new(db.sea());
        let service = Arc::new(Service::new(
            Arc::new(repo),
            Arc::new(gateway),
            vendors,
            deps,
            cfg,
        ));
        self.service.store(Some(service.clone()));

        let eligibility: Arc<dyn ReviewEligibility> =
            Arc::new(BookingsReviewEligibility::new(service));
        hub.register::<dyn ReviewEligibility>(eligibility);
        Ok(())
    }
}

#[async_trait]
impl DbModule for Bookings {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running bookings migrations");
        crate::infra::storage::migrations::Migrator::up(db.seaorm(), None).await?;
        Ok(())
    }
}

impl RestfulModule for Bookings {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        let service = self
            .service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;
        let router = routes::register_routes(router, openapi, service)?;
        info!("Bookings REST routes registered");
        Ok(router)
    }
}
