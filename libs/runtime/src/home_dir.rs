use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the server home directory into an absolute path.
///
/// * `None` (or empty) resolves to `<user home>/<default_subdir>`.
/// * A leading `~` is expanded against the user home.
/// * Relative paths are resolved against the current working directory.
///
/// When `create` is set the directory is created if it does not exist yet.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let user_home = dirs::home_dir();

    let path = match configured.as_deref().map(str::trim) {
        None | Some("") => user_home
            .ok_or_else(|| anyhow!("cannot determine user home directory"))?
            .join(default_subdir),
        Some(raw) => expand_tilde(raw, user_home.as_deref())?,
    };

    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(path)
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home dir {}", path.display()))?;
    }
    Ok(path)
}

fn expand_tilde(raw: &str, user_home: Option<&Path>) -> Result<PathBuf> {
    let rest = match raw.strip_prefix('~') {
        Some(rest) => rest,
        None => return Ok(PathBuf::from(raw)),
    };
    let home = user_home.ok_or_else(|| anyhow!("cannot expand '~' without a user home"))?;
    let rest = rest.trim_start_matches(['/', '\\']);
    if rest.is_empty() {
        Ok(home.to_path_buf())
    } else {
        Ok(home.join(rest))
    }
}
