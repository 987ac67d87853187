//! REST host: owns the HTTP server, the global middleware stack, the bearer
//! token keys and the route catalog served at `/openapi.json`.

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::{ArcSwap, ArcSwapOption};
use axum::{middleware::from_fn, routing::get, Extension, Router};
use modkit::api::{OpenApiRegistry, RouteCatalog};
use modkit::{JwtAuth, ModuleCtx};
use parking_lot::Mutex;
use rand::Rng;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

pub const MODULE_NAME: &str = "api_ingress";

pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
    jwt: ArcSwapOption<JwtAuth>,
    catalog: RouteCatalog,
    final_router: Mutex<Option<Router>>,
    server: Mutex<Option<JoinHandle<anyhow::Result<()>>>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            jwt: ArcSwapOption::empty(),
            catalog: RouteCatalog::default(),
            final_router: Mutex::new(None),
            server: Mutex::new(None),
        }
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    /// Router produced by the REST phase, if it ran.
    pub fn router(&self) -> Option<Router> {
        self.final_router.lock().clone()
    }

    fn jwt_from_config(cfg: &ApiIngressConfig) -> JwtAuth {
        let secret = if cfg.jwt_secret.is_empty() {
            tracing::warn!("api_ingress.jwt_secret not set, using a random per-process secret");
            let bytes: [u8; 32] = rand::rng().random();
            hex::encode(bytes)
        } else {
            cfg.jwt_secret.clone()
        };
        JwtAuth::new(&secret, cfg.token_ttl_hours)
    }

    /// Outermost first: set id, propagate id, trace, id into span/extensions,
    /// timeout, CORS, body limit, auth keys.
    fn apply_middleware(&self, router: Router, cfg: &ApiIngressConfig) -> anyhow::Result<Router> {
        let jwt = self
            .jwt
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("api_ingress used before init"))?;
        let x_request_id = request_id::header();

        let mut router = router
            .layer(Extension(jwt))
            .layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));
        if cfg.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        Ok(router
            .layer(TimeoutLayer::new(Duration::from_secs(cfg.request_timeout_secs)))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId)))
    }

    async fn serve(
        router: Router,
        addr: SocketAddr,
        cancel: CancellationToken,
    ) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "HTTP server listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("HTTP server draining");
            })
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

#[async_trait]
impl modkit::Module for ApiIngress {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let cfg = ctx.module_config::<ApiIngressConfig>();
        let jwt = Arc::new(Self::jwt_from_config(&cfg));
        ctx.client_hub().register::<JwtAuth>(jwt.clone());
        self.jwt.store(Some(jwt));
        self.config.store(Arc::new(cfg));
        tracing::debug!(module = MODULE_NAME, "initialized");
        Ok(())
    }
}

impl modkit::RestHostModule for ApiIngress {
    fn rest_prepare(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        Ok(router.route("/health", get(web::health_check)))
    }

    fn rest_finalize(&self, _ctx: &ModuleCtx, mut router: Router) -> anyhow::Result<Router> {
        let cfg = self.get_config();
        if cfg.enable_docs {
            tracing::info!(operations = self.catalog.len(), "serving route catalog");
            let doc = serde_json::to_value(
                self.catalog
                    .document("EventHub API", env!("CARGO_PKG_VERSION")),
            )?;
            router = router
                .route("/openapi.json", get(web::openapi_json))
                .layer(Extension(web::OpenApiDoc(Arc::new(doc))));
        }
        let router = self.apply_middleware(router, &cfg)?;
        *self.final_router.lock() = Some(router.clone());
        Ok(router)
    }

    fn as_registry(&self) -> &dyn OpenApiRegistry {
        &self.catalog
    }
}

#[async_trait]
impl modkit::StatefulModule for ApiIngress {
    async fn start(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        let cfg = self.get_config();
        let addr: SocketAddr = cfg
            .bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address '{}': {e}", cfg.bind_addr))?;
        let router = self
            .router()
            .ok_or_else(|| anyhow::anyhow!("REST phase did not produce a router"))?;
        let handle = tokio::spawn(Self::serve(router, addr, cancel));
        *self.server.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        cancel.cancel();
        let handle = self.server.lock().take();
        if let Some(handle) = handle {
            match tokio::time::timeout(Duration::from_secs(30), handle).await {
                Ok(joined) => joined??,
                Err(_) => tracing::warn!("HTTP server did not drain within 30s"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_keys() {
        let cfg: ApiIngressConfig =
            serde_json::from_value(serde_json::json!({"enable_docs": true})).unwrap();
        assert!(cfg.enable_docs);
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.token_ttl_hours, 168);
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let res: Result<ApiIngressConfig, _> =
            serde_json::from_value(serde_json::json!({"bind": "x"}));
        assert!(res.is_err());
    }

    #[test]
    fn empty_secret_still_yields_working_keys() {
        let jwt = ApiIngress::jwt_from_config(&ApiIngressConfig::default());
        let id = uuid::Uuid::new_v4();
        let token = jwt.issue(id, modkit::Role::User).unwrap();
        assert_eq!(jwt.verify(&token).unwrap().sub, id);
    }
}
