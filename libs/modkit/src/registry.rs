//! Explicit module registry.
//!
//! The server binary registers every module by hand, declaring its name, its
//! dependencies and the capabilities it provides. `build` resolves a
//! dependency order once, and the lifecycle phases walk that order.

use axum::Router;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::context::ModuleCtx;
use crate::contracts::{
    DbModule, Module, OpenApiRegistry, RestHostModule, RestfulModule, StatefulModule,
};

pub struct ModuleEntry {
    pub name: &'static str,
    pub deps: Vec<&'static str>,
    pub core: Arc<dyn Module>,
    pub rest: Option<Arc<dyn RestfulModule>>,
    pub rest_host: Option<Arc<dyn RestHostModule>>,
    pub db: Option<Arc<dyn DbModule>>,
    pub stateful: Option<Arc<dyn StatefulModule>>,
}

impl std::fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("rest", &self.rest.is_some())
            .field("rest_host", &self.rest_host.is_some())
            .field("db", &self.db.is_some())
            .field("stateful", &self.stateful.is_some())
            .finish()
    }
}

/// Modules in dependency order.
pub struct ModuleRegistry {
    modules: Vec<ModuleEntry>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.modules.iter().map(|m| m.name))
            .finish()
    }
}

impl ModuleRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn modules(&self) -> &[ModuleEntry] {
        &self.modules
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name).collect()
    }

    pub fn get_module(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.modules
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.core.clone())
    }

    pub async fn run_init_phase(&self, base: &ModuleCtx) -> Result<(), RegistryError> {
        for e in &self.modules {
            let ctx = base.clone().for_module(e.name);
            tracing::debug!(module = e.name, "init");
            e.core
                .init(&ctx)
                .await
                .map_err(|source| RegistryError::Init {
                    module: e.name,
                    source,
                })?;
        }
        Ok(())
    }

    pub async fn run_db_phase(&self, db: &modkit_db::DbHandle) -> Result<(), RegistryError> {
        for e in &self.modules {
            let Some(dbm) = &e.db else { continue };
            tracing::debug!(module = e.name, "migrate");
            dbm.migrate(db)
                .await
                .map_err(|source| RegistryError::DbMigrate {
                    module: e.name,
                    source,
                })?;
        }
        Ok(())
    }

    /// Host prepare, then every REST provider in order, then host finalize.
    pub fn run_rest_phase(&self, base: &ModuleCtx, router: Router) -> Result<Router, RegistryError> {
        let mut hosts = self.modules.iter().filter(|e| e.rest_host.is_some());
        let (host_entry, host) = match (hosts.next(), hosts.next()) {
            (Some(entry), None) => match &entry.rest_host {
                Some(h) => (entry, h.clone()),
                None => return Err(RegistryError::RestRequiresHost),
            },
            (Some(_), Some(_)) => return Err(RegistryError::MultipleRestHosts),
            (None, _) => {
                return if self.modules.iter().any(|e| e.rest.is_some()) {
                    Err(RegistryError::RestRequiresHost)
                } else {
                    Ok(router)
                };
            }
        };

        let host_ctx = base.clone().for_module(host_entry.name);
        let catalog: &dyn OpenApiRegistry = host.as_registry();

        let mut router = host
            .rest_prepare(&host_ctx, router)
            .map_err(|source| RegistryError::RestPrepare {
                module: host_entry.name,
                source,
            })?;

        for e in &self.modules {
            let Some(rest) = &e.rest else { continue };
            let ctx = base.clone().for_module(e.name);
            router = rest
                .register_rest(&ctx, router, catalog)
                .map_err(|source| RegistryError::RestRegister {
                    module: e.name,
                    source,
                })?;
        }

        host.rest_finalize(&host_ctx, router)
            .map_err(|source| RegistryError::RestFinalize {
                module: host_entry.name,
                source,
            })
    }

    pub async fn run_start_phase(&self, cancel: CancellationToken) -> Result<(), RegistryError> {
        for e in &self.modules {
            let Some(s) = &e.stateful else { continue };
            s.start(cancel.clone())
                .await
                .map_err(|source| RegistryError::Start {
                    module: e.name,
                    source,
                })?;
        }
        Ok(())
    }

    /// Reverse order; failures are logged and do not stop the remaining modules.
    pub async fn run_stop_phase(&self, cancel: CancellationToken) {
        for e in self.modules.iter().rev() {
            let Some(s) = &e.stateful else { continue };
            if let Err(err) = s.stop(cancel.clone()).await {
                tracing::warn!(module = e.name, error = %err, "module stop failed");
            }
        }
    }
}

struct Pending {
    name: &'static str,
    deps: Vec<&'static str>,
    core: Arc<dyn Module>,
}

/// Collects modules and their capabilities. Registration order breaks ties
/// between modules that do not depend on each other.
#[derive(Default)]
pub struct RegistryBuilder {
    cores: Vec<Pending>,
    rest: HashMap<&'static str, Arc<dyn RestfulModule>>,
    rest_host: Vec<(&'static str, Arc<dyn RestHostModule>)>,
    db: HashMap<&'static str, Arc<dyn DbModule>>,
    stateful: HashMap<&'static str, Arc<dyn StatefulModule>>,
    errors: Vec<String>,
}

impl RegistryBuilder {
    pub fn register_core(
        &mut self,
        name: &'static str,
        deps: &[&'static str],
        module: Arc<dyn Module>,
    ) -> &mut Self {
        if self.cores.iter().any(|p| p.name == name) {
            self.errors.push(format!("module '{name}' registered twice"));
        } else {
            self.cores.push(Pending {
                name,
                deps: deps.to_vec(),
                core: module,
            });
        }
        self
    }

    pub fn register_rest(&mut self, name: &'static str, m: Arc<dyn RestfulModule>) -> &mut Self {
        self.rest.insert(name, m);
        self
    }

    pub fn register_rest_host(
        &mut self,
        name: &'static str,
        m: Arc<dyn RestHostModule>,
    ) -> &mut Self {
        self.rest_host.push((name, m));
        self
    }

    pub fn register_db(&mut self, name: &'static str, m: Arc<dyn DbModule>) -> &mut Self {
        self.db.insert(name, m);
        self
    }

    pub fn register_stateful(
        &mut self,
        name: &'static str,
        m: Arc<dyn StatefulModule>,
    ) -> &mut Self {
        self.stateful.insert(name, m);
        self
    }

    pub fn build(self) -> Result<ModuleRegistry, RegistryError> {
        if !self.errors.is_empty() {
            return Err(RegistryError::InvalidConfiguration {
                errors: self.errors,
            });
        }
        if self.rest_host.len() > 1 {
            return Err(RegistryError::MultipleRestHosts);
        }

        let index: HashMap<&'static str, usize> = self
            .cores
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name, i))
            .collect();

        let capability_owners = self
            .rest
            .keys()
            .chain(self.db.keys())
            .chain(self.stateful.keys())
            .chain(self.rest_host.iter().map(|(n, _)| n));
        for name in capability_owners {
            if !index.contains_key(name) {
                return Err(RegistryError::UnknownModule(name.to_string()));
            }
        }

        // Edge dep -> dependant.
        let mut edges = vec![Vec::<usize>::new(); self.cores.len()];
        let mut indegree = vec![0usize; self.cores.len()];
        for (i, p) in self.cores.iter().enumerate() {
            for dep in &p.deps {
                let d = *index
                    .get(dep)
                    .ok_or_else(|| RegistryError::UnknownDependency {
                        module: p.name.to_string(),
                        depends_on: dep.to_string(),
                    })?;
                edges[d].push(i);
                indegree[i] += 1;
            }
        }

        if let Some(path) = find_cycle(&self.cores, &edges) {
            return Err(RegistryError::CycleDetected { path });
        }

        let mut queue: VecDeque<usize> = (0..self.cores.len())
            .filter(|&i| indegree[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.cores.len());
        while let Some(u) = queue.pop_front() {
            order.push(u);
            for &v in &edges[u] {
                indegree[v] -= 1;
                if indegree[v] == 0 {
                    queue.push_back(v);
                }
            }
        }

        let mut rest = self.rest;
        let mut db = self.db;
        let mut stateful = self.stateful;
        let mut host = self.rest_host.into_iter().next();
        let mut slots: Vec<Option<Pending>> = self.cores.into_iter().map(Some).collect();

        let mut modules = Vec::with_capacity(order.len());
        for i in order {
            let Some(p) = slots[i].take() else { continue };
            let rest_host = match &host {
                Some((n, _)) if *n == p.name => host.take().map(|(_, h)| h),
                _ => None,
            };
            modules.push(ModuleEntry {
                name: p.name,
                rest: rest.remove(p.name),
                db: db.remove(p.name),
                stateful: stateful.remove(p.name),
                rest_host,
                deps: p.deps,
                core: p.core,
            });
        }

        tracing::info!(
            modules = ?modules.iter().map(|e| e.name).collect::<Vec<_>>(),
            "module order resolved"
        );
        Ok(ModuleRegistry { modules })
    }
}

/// First dependency cycle found by DFS, closed with its starting module.
fn find_cycle(cores: &[Pending], edges: &[Vec<usize>]) -> Option<Vec<&'static str>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        OnPath,
        Done,
    }

    fn visit(
        u: usize,
        cores: &[Pending],
        edges: &[Vec<usize>],
        marks: &mut [Mark],
        path: &mut Vec<usize>,
    ) -> Option<Vec<&'static str>> {
        marks[u] = Mark::OnPath;
        path.push(u);
        for &v in &edges[u] {
            match marks[v] {
                Mark::OnPath => {
                    let start = path.iter().position(|&n| n == v).unwrap_or(0);
                    let mut cycle: Vec<_> = path[start..].iter().map(|&n| cores[n].name).collect();
                    cycle.push(cores[v].name);
                    return Some(cycle);
                }
                Mark::New => {
                    if let Some(c) = visit(v, cores, edges, marks, path) {
                        return Some(c);
                    }
                }
                Mark::Done => {}
            }
        }
        path.pop();
        marks[u] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::New; cores.len()];
    let mut path = Vec::new();
    for u in 0..cores.len() {
        if marks[u] == Mark::New {
            if let Some(c) = visit(u, cores, edges, &mut marks, &mut path) {
                return Some(c);
            }
        }
    }
    None
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("init failed for module '{module}'")]
    Init {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("migration failed for module '{module}'")]
    DbMigrate {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST prepare failed for host '{module}'")]
    RestPrepare {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST registration failed for module '{module}'")]
    RestRegister {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST finalize failed for host '{module}'")]
    RestFinalize {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("start failed for module '{module}'")]
    Start {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("modules expose REST routes but no REST host is registered")]
    RestRequiresHost,
    #[error("more than one REST host registered")]
    MultipleRestHosts,
    #[error("unknown module '{0}'")]
    UnknownModule(String),
    #[error("module '{module}' depends on unknown '{depends_on}'")]
    UnknownDependency { module: String, depends_on: String },
    #[error("dependency cycle: {}", path.join(" -> "))]
    CycleDetected { path: Vec<&'static str> },
    #[error("invalid registry configuration: {}", errors.join("; "))]
    InvalidConfiguration { errors: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RouteCatalog;
    use crate::context::ModuleCtxBuilder;
    use parking_lot::Mutex;

    struct Recording {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Module for Recording {
        async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
            assert_eq!(ctx.current_module(), Some(self.name));
            self.log.lock().push(format!("init:{}", self.name));
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl StatefulModule for Recording {
        async fn start(&self, _c: CancellationToken) -> anyhow::Result<()> {
            self.log.lock().push(format!("start:{}", self.name));
            Ok(())
        }
        async fn stop(&self, _c: CancellationToken) -> anyhow::Result<()> {
            self.log.lock().push(format!("stop:{}", self.name));
            Ok(())
        }
    }

    impl RestfulModule for Recording {
        fn register_rest(
            &self,
            _ctx: &ModuleCtx,
            router: Router,
            _openapi: &dyn OpenApiRegistry,
        ) -> anyhow::Result<Router> {
            self.log.lock().push(format!("rest:{}", self.name));
            Ok(router)
        }
    }

    struct Host {
        catalog: RouteCatalog,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Module for Host {
        async fn init(&self, _ctx: &ModuleCtx) -> anyhow::Result<()> {
            Ok(())
        }
    }

    impl RestHostModule for Host {
        fn rest_prepare(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
            self.log.lock().push("prepare".into());
            Ok(router)
        }
        fn rest_finalize(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
            self.log.lock().push("finalize".into());
            Ok(router)
        }
        fn as_registry(&self) -> &dyn OpenApiRegistry {
            &self.catalog
        }
    }

    fn recording(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Recording> {
        Arc::new(Recording {
            name,
            log: log.clone(),
        })
    }

    fn ctx() -> ModuleCtx {
        ModuleCtxBuilder::new(CancellationToken::new()).build()
    }

    #[tokio::test]
    async fn phases_follow_dependency_order_and_stop_reverses_it() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut b = ModuleRegistry::builder();
        let bookings = recording("bookings", &log);
        let vendors = recording("vendors", &log);
        b.register_core("bookings", &["vendors"], bookings.clone())
            .register_stateful("bookings", bookings)
            .register_core("vendors", &[], vendors.clone())
            .register_stateful("vendors", vendors);
        let reg = b.build().unwrap();
        assert_eq!(reg.names(), vec!["vendors", "bookings"]);

        reg.run_init_phase(&ctx()).await.unwrap();
        let token = CancellationToken::new();
        reg.run_start_phase(token.clone()).await.unwrap();
        reg.run_stop_phase(token).await;

        assert_eq!(
            *log.lock(),
            vec![
                "init:vendors",
                "init:bookings",
                "start:vendors",
                "start:bookings",
                "stop:bookings",
                "stop:vendors",
            ]
        );
    }

    #[test]
    fn cycle_is_reported_with_its_path() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut b = ModuleRegistry::builder();
        b.register_core("a", &["b"], recording("a", &log))
            .register_core("b", &["a"], recording("b", &log));
        match b.build() {
            Err(RegistryError::CycleDetected { path }) => {
                assert_eq!(path.first(), path.last());
                assert_eq!(path.len(), 3);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn unknown_dependency_and_duplicates_are_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut b = ModuleRegistry::builder();
        b.register_core("events", &["accounts"], recording("events", &log));
        assert!(matches!(
            b.build(),
            Err(RegistryError::UnknownDependency { .. })
        ));

        let mut b = ModuleRegistry::builder();
        b.register_core("events", &[], recording("events", &log))
            .register_core("events", &[], recording("events", &log));
        assert!(matches!(
            b.build(),
            Err(RegistryError::InvalidConfiguration { .. })
        ));

        let mut b = ModuleRegistry::builder();
        b.register_stateful("ghost", recording("ghost", &log));
        assert!(matches!(b.build(), Err(RegistryError::UnknownModule(_))));
    }

    #[test]
    fn rest_phase_needs_exactly_one_host() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let m = recording("messages", &log);
        let mut b = ModuleRegistry::builder();
        b.register_core("messages", &[], m.clone())
            .register_rest("messages", m);
        let reg = b.build().unwrap();
        assert!(matches!(
            reg.run_rest_phase(&ctx(), Router::new()),
            Err(RegistryError::RestRequiresHost)
        ));
    }

    #[test]
    fn rest_phase_wraps_providers_between_prepare_and_finalize() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let host = Arc::new(Host {
            catalog: RouteCatalog::default(),
            log: log.clone(),
        });
        let m = recording("messages", &log);
        let mut b = ModuleRegistry::builder();
        b.register_core("api_ingress", &[], host.clone())
            .register_rest_host("api_ingress", host)
            .register_core("messages", &["api_ingress"], m.clone())
            .register_rest("messages", m);
        let reg = b.build().unwrap();
        reg.run_rest_phase(&ctx(), Router::new()).unwrap();
        assert_eq!(*log.lock(), vec!["prepare", "rest:messages", "finalize"]);
    }
}
