use std::sync::Arc;

use accounts::contract::AccountsApi;
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use notifications::contract::NotificationsApi;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};

use crate::api::rest::routes;
use crate::config::EventsConfig;
use crate::contract::client::EventsApi;
use crate::domain::service::Service;
use crate::gateways::local::EventsLocalClient;
use crate::infra::storage::sea_orm_repo::SeaOrmEventsRepository;

pub const MODULE_NAME: &str = "events";

/// Events, their guest lists and budgets.
#[derive(Default)]
pub struct Events {
    service: ArcSwapOption<Service>,
}

impl Events {
    pub fn service(&self) -> Option<Arc<Service>> {
        self.service.load_full()
    }
}

#[async_trait]
impl Module for Events {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing events module");
        let cfg: EventsConfig = ctx.module_config();
        debug!(default_reminder_days = cfg.default_reminder_days, "events config loaded");

        let db = ctx.db_required()?;
        let hub = ctx.client_hub();
        let accounts = hub
            .get::<dyn AccountsApi>()
            .map_err(|e| warn!(error = %e, "accounts not available, organizer names fall back"))
            .ok();
        let notifier = hub
            .get::<dyn NotificationsApi>()
            .map_err(|e| warn!(error = %e, "notifications not available, invitations will not be mailed"))
            .ok();

        let repo = SeaOrmEventsRepository::new(db.sea());
        let service = Arc::new(Service::new(Arc::new(repo), accounts, notifier, cfg));
        self.service.store(Some(service.clone()));

        let api: Arc<dyn EventsApi> = Arc::new(EventsLocalClient::new(service));
        hub.register::<dyn EventsApi>(api);
        Ok(())
    }
}

#[async_trait]
impl DbModule for Events {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running events migrations");
        crate::infra::storage::migrations::Migrator::up(db.seaorm(), None).await?;
        Ok(())
    }
}

impl RestfulModule for Events {
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
        info!("Events REST routes registered");
        Ok(router)
    }
}
