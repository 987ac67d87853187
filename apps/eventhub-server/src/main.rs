use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::runtime::{run, DbOptions, RunOptions, ShutdownOptions};
use modkit::{ModuleRegistry, RegistryBuilder};
use modkit_db::{ConnectOpts, DbHandle};
use runtime::{AppConfig, AppConfigProvider, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Lets the module runtime read the `modules` bag of the app config.
struct ModkitConfigAdapter(Arc<AppConfigProvider>);

impl modkit::ConfigProvider for ModkitConfigAdapter {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get_module_config(module_name)
    }
}

/// EventHub Server - event planning marketplace
#[derive(Parser)]
#[command(name = "eventhub-server")]
#[command(about = "EventHub Server - event planning marketplace")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);
    seed_ingress_bind_addr(&mut config, args.port.is_some());

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!(home_dir = %config.server.home_dir, "EventHub Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config),
    }
}

/// The REST host listens on `server.host:server.port` unless its own
/// section names an address. `--port` always wins.
fn seed_ingress_bind_addr(config: &mut AppConfig, port_from_cli: bool) {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let section = config
        .modules
        .entry(api_ingress::MODULE_NAME.to_string())
        .or_insert_with(|| serde_json::json!({}));
    let Some(map) = section.as_object_mut() else {
        return;
    };
    if port_from_cli || !map.contains_key("bind_addr") {
        map.insert("bind_addr".to_string(), serde_json::Value::String(addr));
    }
}

/// Resolves a relative SQLite file DSN against `base_dir`.
/// In-memory DSNs and other engines pass through unchanged.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let Some(rest) = dsn.strip_prefix("sqlite://") else {
        return Ok(dsn.to_string());
    };
    let (path, query) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path.is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    let mut p = PathBuf::from(path);
    if p.is_relative() {
        p = base_dir.join(p);
    }

    let mut out = format!("sqlite://{}", p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

async fn connect_database(
    db_config: &DatabaseConfig,
    base_dir: &Path,
    mock: bool,
) -> Result<DbHandle> {
    let configured = db_config.url.trim();
    if configured.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    let dsn = if mock {
        "sqlite::memory:".to_string()
    } else {
        absolutize_sqlite_dsn(configured, base_dir)?
    };
    DbHandle::detect(&dsn).with_context(|| format!("Unsupported database DSN '{dsn}'"))?;

    let opts = ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
        ..Default::default()
    };

    tracing::info!(dsn = %dsn, "Connecting to database");
    let db = DbHandle::connect(&dsn, opts).await?;
    tracing::info!(backend = ?db.engine(), "Connected to database");
    Ok(db)
}

/// Every module with its dependencies and capabilities.
fn build_registry() -> Result<ModuleRegistry> {
    let ingress = Arc::new(api_ingress::ApiIngress::default());
    let notifications = Arc::new(notifications::Notifications::default());
    let accounts = Arc::new(accounts::Accounts::default());
    let vendors = Arc::new(vendors::Vendors::default());
    let events = Arc::new(events::Events::default());
    let messages = Arc::new(messages::Messages::default());
    let bookings = Arc::new(bookings::Bookings::default());

    let mut b = RegistryBuilder::default();
    b.register_core(api_ingress::MODULE_NAME, &[], ingress.clone())
        .register_rest_host(api_ingress::MODULE_NAME, ingress.clone())
        .register_stateful(api_ingress::MODULE_NAME, ingress);

    b.register_core(notifications::module::MODULE_NAME, &[], notifications);

    b.register_core(
        accounts::module::MODULE_NAME,
        &[notifications::module::MODULE_NAME],
        accounts.clone(),
    )
    .register_db(accounts::module::MODULE_NAME, accounts.clone())
    .register_rest(accounts::module::MODULE_NAME, accounts);

    b.register_core(
        vendors::module::MODULE_NAME,
        &[accounts::module::MODULE_NAME],
        vendors.clone(),
    )
    .register_db(vendors::module::MODULE_NAME, vendors.clone())
    .register_rest(vendors::module::MODULE_NAME, vendors);

    b.register_core(
        events::module::MODULE_NAME,
        &[accounts::module::MODULE_NAME, notifications::module::MODULE_NAME],
        events.clone(),
    )
    .register_db(events::module::MODULE_NAME, events.clone())
    .register_rest(events::module::MODULE_NAME, events);

    b.register_core(
        messages::module::MODULE_NAME,
        &[accounts::module::MODULE_NAME],
        messages.clone(),
    )
    .register_db(messages::module::MODULE_NAME, messages.clone())
    .register_rest(messages::module::MODULE_NAME, messages);

    b.register_core(
        bookings::module::MODULE_NAME,
        &[
            vendors::module::MODULE_NAME,
            accounts::module::MODULE_NAME,
            events::module::MODULE_NAME,
            notifications::module::MODULE_NAME,
            messages::module::MODULE_NAME,
        ],
        bookings.clone(),
    )
    .register_db(bookings::module::MODULE_NAME, bookings.clone())
    .register_rest(bookings::module::MODULE_NAME, bookings);

    Ok(b.build()?)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");
    let registry = build_registry()?;

    let base_dir = PathBuf::from(&config.server.home_dir);
    let db = match &config.database {
        Some(db_config) => {
            DbOptions::Handle(Arc::new(connect_database(db_config, &base_dir, args.mock).await?))
        }
        None if args.mock => {
            let mock = DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_conns: None,
                busy_timeout_ms: None,
            };
            DbOptions::Handle(Arc::new(connect_database(&mock, &base_dir, true).await?))
        }
        None => {
            tracing::warn!("No database configuration found, running without database");
            DbOptions::None
        }
    };

    let config_provider = Arc::new(ModkitConfigAdapter(Arc::new(AppConfigProvider::new(config))));
    run(RunOptions {
        modules_cfg: config_provider,
        db,
        shutdown: ShutdownOptions::Signals,
        registry,
        client_hub: None,
    })
    .await
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    build_registry()?;
    if let Some(db) = &config.database {
        DbHandle::detect(db.url.trim())
            .with_context(|| format!("Unsupported database DSN '{}'", db.url))?;
    }
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
