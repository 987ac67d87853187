use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::{DbModule, JwtAuth, Module, ModuleCtx, RestfulModule};
use notifications::contract::NotificationsApi;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};

use crate::api::rest::routes;
use crate::config::AccountsConfig;
use crate::contract::client::AccountsApi;
use crate::domain::service::Service;
use crate::gateways::local::AccountsLocalClient;
use crate::infra::storage::sea_orm_repo::SeaOrmAccountsRepository;

pub const MODULE_NAME: &str = "accounts";

/// Users, login and personal budget. Needs `api_ingress` (token keys) and
/// `notifications` to be initialized first.
#[derive(Default)]
pub struct Accounts {
    service: ArcSwapOption<Service>,
}

impl Accounts {
    pub fn service(&self) -> Option<Arc<Service>> {
        self.service.load_full()
    }
}

#[async_trait]
impl Module for Accounts {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing accounts module");
        let cfg: AccountsConfig = ctx.module_config();
        debug!(otp_ttl_minutes = cfg.otp_ttl_minutes, "accounts config loaded");

        let db = ctx.db_required()?;
        let jwt = ctx.client_hub().get::<JwtAuth>()?;
        let notifier = match ctx.client_hub().get::<dyn NotificationsApi>() {
            Ok(n) => Some(n),
            Err(e) => {
                warn!(error = %e, "notifications not available, codes will not be mailed");
                None
            }
        };

        let repo = SeaOrmAccountsRepository::new(db.sea());
        let service = Arc::new(Service::new(Arc::new(repo), jwt, notifier, cfg));
        self.service.store(Some(service.clone()));

        let api: Arc<dyn AccountsApi> = Arc::new(AccountsLocalClient::new(service));
        ctx.client_hub().register::<dyn AccountsApi>(api);
        Ok(())
    }
}

#[async_trait]
impl DbModule for Accounts {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running accounts migrations");
        crate::infra::storage::migrations::Migrator::up(db.seaorm(), None).await?;
        Ok(())
    }
}

impl RestfulModule for Accounts {
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
        info!("Accounts REST routes registered");
        Ok(router)
    }
}
