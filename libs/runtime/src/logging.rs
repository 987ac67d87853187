//! `tracing` subscriber setup driven by [`LoggingConfig`].
//!
//! Every configured subsystem gets its own console level and, optionally, its
//! own rotating JSON log file. The `default` section covers all remaining
//! targets. Records emitted through the `log` facade are bridged in.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use parking_lot::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::{FilterFn, Targets},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

use crate::config::{LoggingConfig, Section};

const DEFAULT_KEY: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 5;

fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        "off" | "none" => None,
        _ => Some(LevelFilter::INFO),
    }
}

/// `target == prefix` or `target` starts with `prefix::`
fn target_matches(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .map(|rest| rest.is_empty() || rest.starts_with("::"))
        .unwrap_or(false)
}

type BoxedFilter = FilterFn<Box<dyn Fn(&tracing::Metadata<'_>) -> bool + Send + Sync + 'static>>;

/// Matches everything that is *not* owned by an explicit subsystem.
fn catch_all_filter(subsystems: Vec<String>, max: LevelFilter) -> BoxedFilter {
    FilterFn::new(Box::new(move |meta: &tracing::Metadata<'_>| {
        let owned = subsystems.iter().any(|s| target_matches(meta.target(), s));
        !owned && max >= *meta.level()
    }))
}

// ---------- rotating file writers ----------

#[derive(Clone)]
struct RotatingFile(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl RotatingFile {
    fn open(path: &Path, section: &Section) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
        let backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);
        let rotate = FileRotate::new(
            path,
            AppendTimestamp::default(FileLimit::MaxFiles(backups)),
            ContentLimit::BytesSurpassed(max_bytes as usize),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rotate))))
    }
}

/// Writer handed to `fmt`; `None` swallows the record.
struct FileSink(Option<RotatingFile>);

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(file) => file.0.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(file) => file.0.lock().flush(),
            None => Ok(()),
        }
    }
}

/// Picks the log file by target prefix, falling back to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    fallback: Option<RotatingFile>,
    by_subsystem: Vec<(String, RotatingFile)>,
}

impl FileRouter {
    fn route(&self, target: &str) -> Option<RotatingFile> {
        self.by_subsystem
            .iter()
            .find(|(prefix, _)| target_matches(target, prefix))
            .map(|(_, file)| file.clone())
            .or_else(|| self.fallback.clone())
    }

    fn is_empty(&self) -> bool {
        self.fallback.is_none() && self.by_subsystem.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = FileSink;

    fn make_writer(&'a self) -> Self::Writer {
        FileSink(self.fallback.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        FileSink(self.route(meta.target()))
    }
}

fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_section_file(name: &str, section: &Section, base_dir: &Path) -> Option<RotatingFile> {
    if section.file.trim().is_empty() {
        return None;
    }
    let path = resolve_log_path(&section.file, base_dir);
    match RotatingFile::open(&path, section) {
        Ok(file) => Some(file),
        Err(e) => {
            // The subscriber is not installed yet, stderr is all we have.
            eprintln!(
                "logging: cannot open log file for '{name}' at {}: {e}",
                path.display()
            );
            None
        }
    }
}

// ---------- plan ----------

/// Console and file filters derived from the config, ready to install.
struct LoggingPlan {
    subsystems: Vec<String>,
    console: Targets,
    files: Targets,
    default_console: Option<LevelFilter>,
    default_file: Option<LevelFilter>,
    router: FileRouter,
}

impl LoggingPlan {
    fn from_config(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let mut console = Targets::new().with_default(LevelFilter::OFF);
        let mut files = Targets::new().with_default(LevelFilter::OFF);
        let mut router = FileRouter::default();
        let mut subsystems = Vec::new();

        let mut named: Vec<(&String, &Section)> =
            cfg.iter().filter(|(k, _)| k.as_str() != DEFAULT_KEY).collect();
        // Longest prefix first so nested targets pick the most specific file.
        named.sort_by_key(|(k, _)| std::cmp::Reverse(k.len()));

        for (name, section) in named {
            subsystems.push(name.clone());
            if let Some(level) = parse_level(&section.console_level) {
                console = console.with_target(name.clone(), level);
            }
            if let Some(file) = open_section_file(name, section, base_dir) {
                router.by_subsystem.push((name.clone(), file));
                if let Some(level) = parse_level(&section.file_level) {
                    files = files.with_target(name.clone(), level);
                }
            }
        }

        let default_section = cfg.get(DEFAULT_KEY);
        router.fallback =
            default_section.and_then(|s| open_section_file(DEFAULT_KEY, s, base_dir));

        Self {
            subsystems,
            console,
            files,
            default_console: default_section.and_then(|s| parse_level(&s.console_level)),
            default_file: router
                .fallback
                .as_ref()
                .and(default_section)
                .and_then(|s| parse_level(&s.file_level)),
            router,
        }
    }

    fn install(self) {
        let ansi = std::io::stdout().is_terminal();

        let console_named = fmt::layer()
            .with_ansi(ansi)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(self.console);

        let console_default = self.default_console.map(|level| {
            fmt::layer()
                .with_ansi(ansi)
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_filter(catch_all_filter(self.subsystems.clone(), level))
        });

        let (file_named, file_default) = if self.router.is_empty() {
            (None, None)
        } else {
            let named = fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(self.router.clone())
                .with_filter(self.files);
            let default = self.default_file.map(|level| {
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_writer(self.router.clone())
                    .with_filter(catch_all_filter(self.subsystems.clone(), level))
            });
            (Some(named), default)
        };

        let _ = Registry::default()
            .with(console_named)
            .with(console_default)
            .with(file_named)
            .with(file_default)
            .try_init();
    }
}

/// Install the global subscriber.
///
/// `base_dir` resolves relative log file paths (normally `server.home_dir`).
/// Calling it twice is harmless: the second install is ignored.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }
    LoggingPlan::from_config(cfg, base_dir).install();
}

/// Plain console logging at `info`, honoring `RUST_LOG` when present.
pub fn init_default_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(parse_level("TRACE"), Some(LevelFilter::TRACE));
        assert_eq!(parse_level("Debug"), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level("warning"), Some(LevelFilter::WARN));
        assert_eq!(parse_level("off"), None);
        assert_eq!(parse_level("bogus"), Some(LevelFilter::INFO));
    }

    #[test]
    fn target_prefix_requires_module_boundary() {
        assert!(target_matches("bookings", "bookings"));
        assert!(target_matches("bookings::domain::service", "bookings"));
        assert!(!target_matches("bookings_extra", "bookings"));
        assert!(!target_matches("vendors", "bookings"));
    }

    #[test]
    fn relative_log_files_land_under_home() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/api.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/api.log"));
        assert_eq!(
            resolve_log_path("/var/log/eventhub.log", tmp.path()),
            PathBuf::from("/var/log/eventhub.log")
        );
    }

    #[test]
    fn plan_routes_subsystems_to_their_files() {
        let tmp = tempdir().unwrap();
        let mut cfg = default_logging_config();
        cfg.insert(
            "bookings".into(),
            section("debug", "logs/bookings.log", "info"),
        );
        cfg.insert("vendors".into(), section("warn", "", ""));

        let plan = LoggingPlan::from_config(&cfg, tmp.path());

        assert_eq!(plan.subsystems.len(), 2);
        assert_eq!(plan.router.by_subsystem.len(), 1);
        assert!(plan.router.fallback.is_some());
        assert!(tmp.path().join("logs").is_dir());
        assert_eq!(plan.default_console, Some(LevelFilter::INFO));
        assert_eq!(plan.default_file, Some(LevelFilter::DEBUG));

        let bookings = plan.router.route("bookings::api::rest::handlers");
        let fallback = plan.router.route("vendors::domain");
        assert!(bookings.is_some());
        assert!(fallback.is_some());
        assert!(!Arc::ptr_eq(&bookings.unwrap().0, &fallback.unwrap().0));
    }

    #[test]
    fn empty_file_disables_file_output() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert(DEFAULT_KEY.into(), section("info", "", "debug"));

        let plan = LoggingPlan::from_config(&cfg, tmp.path());
        assert!(plan.router.is_empty());
        assert_eq!(plan.default_file, None);
    }
}
