//! Per-user directories for configuration and data.
//!
//! An explicit `--dir` wins. Otherwise the XDG base directory variables are
//! honored, falling back to `~/.config` and `~/.local/share`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Directory name under the XDG base directories.
const APP_DIR: &str = "cinecat";

/// Kind of per-user directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppDir {
    /// `$XDG_CONFIG_HOME/cinecat` or `~/.config/cinecat`.
    Config,
    /// `$XDG_DATA_HOME/cinecat` or `~/.local/share/cinecat`.
    Data,
}

impl AppDir {
    /// XDG variable naming the base directory.
    const fn xdg_var(self) -> &'static str {
        match self {
            Self::Config => "XDG_CONFIG_HOME",
            Self::Data => "XDG_DATA_HOME",
        }
    }

    /// Base directory relative to `$HOME`.
    fn home_fallback(self, home: &Path) -> PathBuf {
        match self {
            Self::Config => home.join(".config"),
            Self::Data => home.join(".local").join("share"),
        }
    }
}

/// Resolves the directory of `kind` from the process environment.
///
/// # Errors
///
/// Returns an error if `dir` is `None` and neither the XDG variable nor
/// `HOME` is set.
pub fn resolve_app_dir(dir: Option<&PathBuf>, kind: AppDir) -> Result<PathBuf> {
    resolve_app_dir_with(dir, kind, |name: &str| std::env::var_os(name))
}

/// Resolves the directory of `kind` using `env` for variable lookups.
///
/// Relative XDG values are ignored, as the XDG base directory rules require.
fn resolve_app_dir_with(
    dir: Option<&PathBuf>,
    kind: AppDir,
    env: impl Fn(&str) -> Option<OsString>,
) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.clone());
    }
    if let Some(base) = env(kind.xdg_var())
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
    {
        return Ok(base.join(APP_DIR));
    }
    let Some(home) = env("HOME").filter(|h| !h.is_empty()) else {
        bail!("HOME environment variable is not set");
    };
    Ok(kind.home_fallback(Path::new(&home)).join(APP_DIR))
}
