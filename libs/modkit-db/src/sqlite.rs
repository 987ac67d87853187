//! SQLite DSN handling: whitelisted PRAGMA query parameters are lifted out of
//! the DSN and applied through typed connect options.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};

use crate::{DbError, Result};

const PRAGMA_KEYS: &[&str] = &["journal_mode", "synchronous", "busy_timeout", "wal"];

/// PRAGMA settings taken from the DSN query string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pragmas {
    pub journal_mode: Option<String>,
    pub synchronous: Option<String>,
    pub busy_timeout_ms: Option<u64>,
    /// Legacy `wal=true|false` toggle, used when `journal_mode` is absent.
    pub wal: Option<bool>,
}

impl Pragmas {
    fn from_pairs(pairs: &HashMap<String, String>) -> Self {
        let mut out = Pragmas::default();
        for (key, value) in pairs {
            match key.as_str() {
                "journal_mode" => match value.to_ascii_uppercase().as_str() {
                    m @ ("DELETE" | "WAL" | "MEMORY" | "TRUNCATE" | "PERSIST" | "OFF") => {
                        out.journal_mode = Some(m.to_string())
                    }
                    _ => tracing::warn!(value = %value, "ignoring invalid journal_mode"),
                },
                "synchronous" => match value.to_ascii_uppercase().as_str() {
                    m @ ("OFF" | "NORMAL" | "FULL" | "EXTRA") => {
                        out.synchronous = Some(m.to_string())
                    }
                    _ => tracing::warn!(value = %value, "ignoring invalid synchronous"),
                },
                "busy_timeout" => match value.parse::<u64>() {
                    Ok(ms) => out.busy_timeout_ms = Some(ms),
                    Err(_) => tracing::warn!(value = %value, "ignoring invalid busy_timeout"),
                },
                "wal" => match value.to_ascii_lowercase().as_str() {
                    "true" | "1" => out.wal = Some(true),
                    "false" | "0" => out.wal = Some(false),
                    _ => tracing::warn!(value = %value, "ignoring invalid wal toggle"),
                },
                _ => {}
            }
        }
        out
    }

    fn journal_mode(&self, in_memory: bool) -> SqliteJournalMode {
        let named = self.journal_mode.as_deref().or(match self.wal {
            Some(true) => Some("WAL"),
            Some(false) => Some("DELETE"),
            None => None,
        });
        match named {
            Some("WAL") if !in_memory => SqliteJournalMode::Wal,
            Some("MEMORY") => SqliteJournalMode::Memory,
            Some("TRUNCATE") => SqliteJournalMode::Truncate,
            Some("PERSIST") => SqliteJournalMode::Persist,
            Some("OFF") => SqliteJournalMode::Off,
            Some(_) => SqliteJournalMode::Delete,
            // WAL is not supported for in-memory databases.
            None if in_memory => SqliteJournalMode::Delete,
            None => SqliteJournalMode::Wal,
        }
    }

    fn synchronous(&self) -> SqliteSynchronous {
        match self.synchronous.as_deref() {
            Some("OFF") => SqliteSynchronous::Off,
            Some("FULL") => SqliteSynchronous::Full,
            Some("EXTRA") => SqliteSynchronous::Extra,
            _ => SqliteSynchronous::Normal,
        }
    }
}

/// Split PRAGMA parameters out of `dsn`, keeping every other query parameter.
pub(crate) fn extract_pragmas(dsn: &str) -> (String, Pragmas) {
    let Some((base, query)) = dsn.split_once('?') else {
        return (dsn.to_string(), Pragmas::default());
    };

    let mut pragmas = HashMap::new();
    let mut keep = Vec::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let lower = key.to_ascii_lowercase();
        if PRAGMA_KEYS.contains(&lower.as_str()) {
            pragmas.insert(lower, value.into_owned());
        } else {
            keep.push(format!("{key}={value}"));
        }
    }

    let clean = if keep.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{}", keep.join("&"))
    };
    (clean, Pragmas::from_pairs(&pragmas))
}

pub(crate) fn is_memory_dsn(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.to_ascii_lowercase().contains("mode=memory")
}

/// Build typed connect options for a SQLite DSN.
pub(crate) fn connect_options(
    dsn: &str,
    default_busy_timeout: Duration,
    create_dirs: bool,
) -> Result<SqliteConnectOptions> {
    let (clean, pragmas) = extract_pragmas(dsn);
    let in_memory = is_memory_dsn(&clean);

    if create_dirs && !in_memory {
        if let Some(parent) = file_path(&clean).and_then(|p| p.parent().map(Path::to_path_buf)) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(&parent)?;
            }
        }
    }

    let busy = pragmas
        .busy_timeout_ms
        .map(Duration::from_millis)
        .unwrap_or(default_busy_timeout);

    let opts = SqliteConnectOptions::from_str(&clean)
        .map_err(|e| DbError::InvalidDsn(e.to_string()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(pragmas.journal_mode(in_memory))
        .synchronous(pragmas.synchronous())
        .busy_timeout(busy);
    Ok(opts)
}

fn file_path(dsn: &str) -> Option<&Path> {
    let rest = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty()).then(|| Path::new(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pragmas_are_lifted_out_of_dsn() {
        let (clean, pragmas) =
            extract_pragmas("sqlite:///data/app.db?wal=true&synchronous=full&mode=rwc");
        assert_eq!(clean, "sqlite:///data/app.db?mode=rwc");
        assert_eq!(pragmas.wal, Some(true));
        assert_eq!(pragmas.synchronous.as_deref(), Some("FULL"));
    }

    #[test]
    fn dsn_without_query_is_untouched() {
        let (clean, pragmas) = extract_pragmas("sqlite://database/eventhub.db");
        assert_eq!(clean, "sqlite://database/eventhub.db");
        assert_eq!(pragmas, Pragmas::default());
    }

    #[test]
    fn invalid_values_are_dropped() {
        let (_, pragmas) =
            extract_pragmas("sqlite://x.db?journal_mode=bogus&busy_timeout=-5&wal=maybe");
        assert_eq!(pragmas, Pragmas::default());
    }

    #[test]
    fn memory_databases_never_use_wal() {
        let (_, pragmas) = extract_pragmas("sqlite::memory:?journal_mode=wal");
        assert!(matches!(
            pragmas.journal_mode(true),
            SqliteJournalMode::Delete
        ));
        assert!(matches!(
            Pragmas::default().journal_mode(false),
            SqliteJournalMode::Wal
        ));
    }

    #[test]
    fn memory_dsn_detection() {
        assert!(is_memory_dsn("sqlite::memory:"));
        assert!(is_memory_dsn("sqlite://file:shared?mode=memory&cache=shared"));
        assert!(!is_memory_dsn("sqlite://database/eventhub.db"));
    }

    #[test]
    fn file_path_strips_scheme_and_query() {
        assert_eq!(
            file_path("sqlite:///tmp/a/b.db?mode=rwc"),
            Some(Path::new("/tmp/a/b.db"))
        );
        assert_eq!(file_path("postgres://x"), None);
    }
}
