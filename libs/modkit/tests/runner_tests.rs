//! End-to-end lifecycle tests for the runner.

use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use modkit::{
    context::{ConfigProvider, ModuleCtx},
    contracts::{DbModule, Module, StatefulModule},
    registry::ModuleRegistry,
    runtime::{run, DbOptions, RunOptions, ShutdownOptions},
    ClientHub,
};
use modkit_db::{ConnectOpts, DbHandle};

type Calls = Arc<Mutex<Vec<String>>>;

struct MapConfig(HashMap<String, serde_json::Value>);

impl ConfigProvider for MapConfig {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get(module_name)
    }
}

#[derive(Debug, Default, Deserialize)]
struct GreetingCfg {
    #[serde(default)]
    greeting: String,
}

struct Tracked {
    name: &'static str,
    calls: Calls,
    fail_init: bool,
}

impl Tracked {
    fn new(name: &'static str, calls: &Calls) -> Arc<Self> {
        Arc::new(Self {
            name,
            calls: calls.clone(),
            fail_init: false,
        })
    }
}

#[async_trait::async_trait]
impl Module for Tracked {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        if self.fail_init {
            anyhow::bail!("boom");
        }
        let cfg: GreetingCfg = ctx.module_config();
        let mut entry = format!("init:{}", self.name);
        if !cfg.greeting.is_empty() {
            entry.push(':');
            entry.push_str(&cfg.greeting);
        }
        self.calls.lock().push(entry);
        Ok(())
    }
}

#[async_trait::async_trait]
impl DbModule for Tracked {
    async fn migrate(&self, db: &DbHandle) -> anyhow::Result<()> {
        use sea_orm::ConnectionTrait;
        db.sea()
            .execute_unprepared(&format!(
                "CREATE TABLE IF NOT EXISTS {}_marker (id INTEGER PRIMARY KEY)",
                self.name
            ))
            .await?;
        self.calls.lock().push(format!("db:{}", self.name));
        Ok(())
    }
}

#[async_trait::async_trait]
impl StatefulModule for Tracked {
    async fn start(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
        self.calls.lock().push(format!("start:{}", self.name));
        Ok(())
    }
    async fn stop(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
        self.calls.lock().push(format!("stop:{}", self.name));
        Ok(())
    }
}

fn config(sections: serde_json::Value) -> Arc<dyn ConfigProvider> {
    Arc::new(MapConfig(serde_json::from_value(sections).unwrap()))
}

#[tokio::test]
async fn full_cycle_runs_every_phase_in_order() {
    let calls: Calls = Arc::default();
    let accounts = Tracked::new("accounts", &calls);
    let events = Tracked::new("events", &calls);

    let mut b = ModuleRegistry::builder();
    b.register_core("events", &["accounts"], events.clone())
        .register_db("events", events.clone())
        .register_stateful("events", events)
        .register_core("accounts", &[], accounts.clone())
        .register_db("accounts", accounts.clone())
        .register_stateful("accounts", accounts);
    let registry = b.build().unwrap();

    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .unwrap();
    let token = CancellationToken::new();
    let stopper = token.clone();
    let handle = tokio::spawn(run(RunOptions {
        modules_cfg: config(serde_json::json!({"events": {"greeting": "hi"}})),
        db: DbOptions::Handle(Arc::new(db)),
        shutdown: ShutdownOptions::Token(token),
        registry,
        client_hub: None,
    }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    stopper.cancel();
    timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(
        *calls.lock(),
        vec![
            "init:accounts",
            "init:events:hi",
            "db:accounts",
            "db:events",
            "start:accounts",
            "start:events",
            "stop:events",
            "stop:accounts",
        ]
    );
}

#[tokio::test]
async fn init_failure_aborts_before_start() {
    let calls: Calls = Arc::default();
    let broken = Arc::new(Tracked {
        name: "broken",
        calls: calls.clone(),
        fail_init: true,
    });
    let mut b = ModuleRegistry::builder();
    b.register_core("broken", &[], broken.clone())
        .register_stateful("broken", broken);

    let err = run(RunOptions {
        modules_cfg: config(serde_json::json!({})),
        db: DbOptions::None,
        shutdown: ShutdownOptions::Token(CancellationToken::new()),
        registry: b.build().unwrap(),
        client_hub: None,
    })
    .await
    .unwrap_err();
    assert!(err.to_string().contains("broken"));
    assert!(calls.lock().is_empty());
}

#[tokio::test]
async fn future_shutdown_and_shared_hub() {
    struct Publisher;

    #[async_trait::async_trait]
    impl Module for Publisher {
        async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
            ctx.client_hub()
                .register::<String>(Arc::new("published".to_string()));
            Ok(())
        }
    }

    let hub = Arc::new(ClientHub::new());
    let mut b = ModuleRegistry::builder();
    b.register_core("publisher", &[], Arc::new(Publisher));

    let fut = Box::pin(tokio::time::sleep(Duration::from_millis(20)));
    timeout(
        Duration::from_secs(2),
        run(RunOptions {
            modules_cfg: config(serde_json::json!({})),
            db: DbOptions::None,
            shutdown: ShutdownOptions::Future(fut),
            registry: b.build().unwrap(),
            client_hub: Some(hub.clone()),
        }),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(hub.get::<String>().unwrap().as_str(), "published");
}
