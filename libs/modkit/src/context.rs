use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::client_hub::ClientHub;

/// Source of raw per-module config sections.
pub trait ConfigProvider: Send + Sync {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

/// Everything a module sees during its lifecycle phases.
#[derive(Clone)]
pub struct ModuleCtx {
    pub(crate) db: Option<Arc<modkit_db::DbHandle>>,
    pub(crate) config_provider: Option<Arc<dyn ConfigProvider>>,
    pub(crate) client_hub: Arc<ClientHub>,
    pub(crate) cancellation_token: CancellationToken,
    pub(crate) module_name: Option<Arc<str>>,
}

pub struct ModuleCtxBuilder {
    inner: ModuleCtx,
}

impl ModuleCtxBuilder {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            inner: ModuleCtx {
                db: None,
                config_provider: None,
                client_hub: Arc::new(ClientHub::default()),
                cancellation_token: token,
                module_name: None,
            },
        }
    }

    pub fn with_db(mut self, db: Arc<modkit_db::DbHandle>) -> Self {
        self.inner.db = Some(db);
        self
    }

    pub fn with_config_provider(mut self, p: Arc<dyn ConfigProvider>) -> Self {
        self.inner.config_provider = Some(p);
        self
    }

    pub fn with_client_hub(mut self, hub: Arc<ClientHub>) -> Self {
        self.inner.client_hub = hub;
        self
    }

    /// Scope the context to one module so `module_config` resolves its section.
    pub fn for_module(mut self, name: &str) -> Self {
        self.inner.module_name = Some(Arc::from(name));
        self
    }

    pub fn build(self) -> ModuleCtx {
        self.inner
    }
}

impl ModuleCtx {
    pub(crate) fn for_module(mut self, name: &str) -> Self {
        self.module_name = Some(Arc::from(name));
        self
    }

    pub fn db(&self) -> Option<Arc<modkit_db::DbHandle>> {
        self.db.clone()
    }

    pub fn db_required(&self) -> anyhow::Result<Arc<modkit_db::DbHandle>> {
        self.db
            .clone()
            .ok_or_else(|| anyhow::anyhow!("module '{}' requires a database", self.name()))
    }

    pub fn client_hub(&self) -> Arc<ClientHub> {
        self.client_hub.clone()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn current_module(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    fn name(&self) -> &str {
        self.module_name.as_deref().unwrap_or("<unscoped>")
    }

    /// Lenient: the module's section deserialized into `T`, or `T::default()`
    /// when the section is missing or does not fit.
    pub fn module_config<T: DeserializeOwned + Default>(&self) -> T {
        let Some(raw) = self.raw_section() else {
            return T::default();
        };
        match serde_json::from_value::<T>(raw.clone()) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(module = self.name(), error = %e, "invalid module config, using defaults");
                T::default()
            }
        }
    }

    /// Strict: missing or malformed sections are errors.
    pub fn module_config_required<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let name = self.name().to_string();
        let raw = self
            .raw_section()
            .ok_or_else(|| anyhow::anyhow!("missing module config: {name}"))?;
        serde_json::from_value(raw.clone())
            .map_err(|e| anyhow::anyhow!("invalid {name} config: {e}"))
    }

    fn raw_section(&self) -> Option<&serde_json::Value> {
        let name = self.module_name.as_deref()?;
        self.config_provider.as_ref()?.get_module_config(name)
    }
}
