use std::sync::Arc;

use accounts::contract::AccountsApi;
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};

use crate::api::rest::routes;
use crate::config::VendorsConfig;
use crate::contract::client::VendorsApi;
use crate::domain::service::Service;
use crate::gateways::local::VendorsLocalClient;
use crate::infra::storage::sea_orm_repo::SeaOrmVendorsRepository;

pub const MODULE_NAME: &str = "vendors";

/// Vendor profiles and search. Depends on `accounts` for owner names.
#[derive(Default)]
pub struct Vendors {
    service: ArcSwapOption<Service>,
}

impl Vendors {
    pub fn service(&self) -> Option<Arc<Service>> {
        self.service.load_full()
    }
}

#[async_trait]
impl Module for Vendors {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing vendors module");
        let cfg: VendorsConfig = ctx.module_config();
        debug!(
            default_page_size = cfg.default_page_size,
            max_page_size = cfg.max_page_size,
            "vendors config loaded"
        );

        let db = ctx.db_required()?;
        let accounts = match ctx.client_hub().get::<dyn AccountsApi>() {
            Ok(a) => Some(a),
            Err(e) => {
                warn!(error = %e, "accounts not available, vendor owners will be omitted");
                None
            }
        };

        let repo = SeaOrmVendorsRepository::new(db.sea());
        let service = Arc::new(Service::new(
            Arc::new(repo),
            accounts,
            ctx.client_hub(),
            cfg,
        ));
        self.service.store(Some(service.clone()));

        let api: Arc<dyn VendorsApi> = Arc::new(VendorsLocalClient::new(service));
        ctx.client_hub().register::<dyn VendorsApi>(api);
        Ok(())
    }
}

#[async_trait]
impl DbModule for Vendors {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running vendors migrations");
        crate::infra::storage::migrations::Migrator::up(db.seaorm(), None).await?;
        Ok(())
    }
}

impl RestfulModule for Vendors {
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
        info!("Vendors REST routes registered");
        Ok(router)
    }
}
