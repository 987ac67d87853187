use std::sync::Arc;

use accounts::contract::AccountsApi;
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};

use crate::api::rest::{routes, sse_adapter::SseLiveChannels};
use crate::config::MessagesConfig;
use crate::contract::client::MessagesApi;
use crate::domain::service::Service;
use crate::gateways::local::MessagesLocalClient;
use crate::infra::storage::sea_orm_repo::SeaOrmMessagesRepository;

pub const MODULE_NAME: &str = "messages";

/// Direct messages and the per-user live channel.
#[derive(Default)]
pub struct Messages {
    service: ArcSwapOption<Service>,
    live: ArcSwapOption<SseLiveChannels>,
}

#[async_trait]
impl Module for Messages {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing messages module");
        let cfg: MessagesConfig = ctx.module_config();
        debug!(
            channel_capacity = cfg.channel_capacity,
            max_text_len = cfg.max_text_len,
            "messages config loaded"
        );

        let db = ctx.db_required()?;
        let accounts = ctx
            .client_hub()
            .get::<dyn AccountsApi>()
            .map_err(|e| warn!(error = %e, "accounts not available, recipients are not checked"))
            .ok();

        let live = Arc::new(SseLiveChannels::new(cfg.channel_capacity));
        let repo = SeaOrmMessagesRepository::new(db.sea());
        let service = Arc::new(Service::new(Arc::new(repo), accounts, live.clone(), cfg));
        self.service.store(Some(service.clone()));
        self.live.store(Some(live));

        let api: Arc<dyn MessagesApi> = Arc::new(MessagesLocalClient::new(service));
        ctx.client_hub().register::<dyn MessagesApi>(api);
        Ok(())
    }
}

#[async_trait]
impl DbModule for Messages {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running messages migrations");
        crate::infra::storage::migrations::Migrator::up(db.seaorm(), None).await?;
        Ok(())
    }
}

impl RestfulModule for Messages {
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
        let live = self
            .live
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Live channels not initialized"))?;
        let router = routes::register_routes(router, openapi, service, live)?;
        info!("Messages REST routes registered");
        Ok(router)
    }
}
