use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use directories::{ProjectDirs, UserDirs};
use git_version::git_version;
use overscroll_config::ConfigPath;
use rustix::time::{clock_gettime, ClockId};

pub fn version() -> String {
    format!(
        "{} ({})",
        env!("CARGO_PKG_VERSION"),
        git_version!(fallback = "unknown commit"),
    )
}

pub fn get_monotonic_time() -> Duration {
    let ts = clock_gettime(ClockId::Monotonic);
    Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32)
}

/// Returns the sign of `x` as `-1`, `0` or `1`.
///
/// Both zeros and NaN map to `0`, so callers can multiply by the result without NaN leaking
/// through.
pub fn sign(x: f64) -> f64 {
    if x > 0. {
        1.
    } else if x < 0. {
        -1.
    } else {
        0.
    }
}

pub fn expand_home(path: &Path) -> anyhow::Result<Option<PathBuf>> {
    if let Ok(rest) = path.strip_prefix("~") {
        let dirs = UserDirs::new().context("error retrieving home directory")?;
        Ok(Some([dirs.home_dir(), rest].iter().collect()))
    } else {
        Ok(None)
    }
}

/// Picks the config file location.
///
/// An explicit path comes from the command line or from the `OVERSCROLL_CONFIG` environment
/// variable, in that order. Otherwise the user config directory is tried first, then `/etc`.
pub fn config_path(cli_path: Option<PathBuf>) -> anyhow::Result<ConfigPath> {
    let explicit = cli_path.or_else(|| env::var_os("OVERSCROLL_CONFIG").map(PathBuf::from));

    if let Some(mut path) = explicit {
        if let Some(expanded) = expand_home(&path).context("error expanding ~")? {
            path = expanded;
        }
        return Ok(ConfigPath::Explicit(path));
    }

    let mut user_path = ProjectDirs::from("", "", "overscroll")
        .context("error retrieving home directory")?
        .config_dir()
        .to_owned();
    user_path.push("config.kdl");

    Ok(ConfigPath::Regular {
        user_path,
        system_path: PathBuf::from("/etc/overscroll/config.kdl"),
    })
}
