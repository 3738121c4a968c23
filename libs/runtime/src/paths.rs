use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the server home directory into an absolute path.
///
/// - `None` means the platform default: `$HOME/<default_subdir>`
///   (`%APPDATA%\<default_subdir>` on Windows);
/// - a leading `~` expands to the user's home;
/// - relative paths are anchored at the current working directory.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match configured {
        None => user_home()?.join(default_subdir),
        Some(raw) => expand(&raw)?,
    };
    let resolved = if resolved.is_absolute() {
        resolved
    } else {
        std::env::current_dir()
            .context("current directory is not accessible")?
            .join(resolved)
    };
    if create {
        std::fs::create_dir_all(&resolved)
            .with_context(|| format!("cannot create home dir {}", resolved.display()))?;
    }
    Ok(resolved)
}

fn expand(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return user_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(user_home()?.join(rest));
    }
    if raw.starts_with('~') {
        bail!("unsupported home_dir form: {raw}");
    }
    Ok(Path::new(raw).to_path_buf())
}

fn user_home() -> Result<PathBuf> {
    let var = if cfg!(windows) { "APPDATA" } else { "HOME" };
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .with_context(|| format!("{var} is not set"))
}
