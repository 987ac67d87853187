use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use modkit::{Module, ModuleCtx};
use tracing::info;

use crate::config::{DeliveryMode, NotificationsConfig};
use crate::contract::client::NotificationsApi;
use crate::domain::ports::Mailer;
use crate::domain::service::Service;
use crate::gateways::local::NotificationsLocalClient;
use crate::infra::{log::LogMailer, smtp::SmtpMailer};

pub const MODULE_NAME: &str = "notifications";

/// Core-only module: no tables, no routes. Publishes `dyn NotificationsApi`.
#[derive(Default)]
pub struct Notifications {
    service: ArcSwapOption<Service>,
    mailer_override: Option<Arc<dyn Mailer>>,
}

impl Notifications {
    /// Use `mailer` regardless of configuration.
    pub fn with_mailer(mailer: Arc<dyn Mailer>) -> Self {
        Self {
            service: ArcSwapOption::empty(),
            mailer_override: Some(mailer),
        }
    }

    fn build_mailer(&self, cfg: &NotificationsConfig) -> anyhow::Result<Arc<dyn Mailer>> {
        if let Some(m) = &self.mailer_override {
            return Ok(m.clone());
        }
        Ok(match cfg.mode {
            DeliveryMode::Log => Arc::new(LogMailer),
            DeliveryMode::Smtp => Arc::new(SmtpMailer::from_config(cfg)?),
        })
    }
}

#[async_trait]
impl Module for Notifications {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let cfg: NotificationsConfig = ctx.module_config();
        let mailer = self.build_mailer(&cfg)?;
        info!(mailer = mailer.kind(), host = %cfg.smtp_host, "initializing notifications");

        let service = Arc::new(Service::new(mailer));
        self.service.store(Some(service.clone()));

        let api: Arc<dyn NotificationsApi> = Arc::new(NotificationsLocalClient::new(service));
        ctx.client_hub().register::<dyn NotificationsApi>(api);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryMailer;
    use modkit::ModuleCtxBuilder;

    #[tokio::test]
    async fn init_publishes_the_client() {
        let mailer = Arc::new(MemoryMailer::default());
        let module = Notifications::with_mailer(mailer.clone());
        let ctx = ModuleCtxBuilder::new(Default::default())
            .for_module(MODULE_NAME)
            .build();
        module.init(&ctx).await.unwrap();

        let api = ctx.client_hub().get::<dyn NotificationsApi>().unwrap();
        api.send_test("ops@x.io").await.unwrap();
        assert_eq!(mailer.sent().len(), 1);
    }

    #[test]
    fn log_mode_is_the_default() {
        let module = Notifications::default();
        let mailer = module.build_mailer(&NotificationsConfig::default()).unwrap();
        assert_eq!(mailer.kind(), "log");
    }
}
