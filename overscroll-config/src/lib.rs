#[macro_use]
extern crate tracing;

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use miette::{Context as _, IntoDiagnostic as _};

pub mod debug;
pub mod scroller;
pub mod utils;

pub use crate::debug::Debug;
pub use crate::scroller::{Curve, Scroller};
pub use crate::utils::FloatOrInt;

#[derive(knuffel::Decode, Debug, Default, Clone, PartialEq)]
pub struct Config {
    #[knuffel(child, default)]
    pub scroller: Scroller,
    #[knuffel(child, default)]
    pub debug: Debug,
}

#[derive(Debug, Clone)]
pub enum ConfigPath {
    /// Explicitly set config path.
    ///
    /// Load the config only from this path.
    Explicit(PathBuf),

    /// Default config path.
    ///
    /// Prioritize the user path, fallback to the system path, fallback to the built-in defaults.
    Regular {
        /// User config path, usually `$XDG_CONFIG_HOME/overscroll/config.kdl`.
        user_path: PathBuf,
        /// System config path, usually `/etc/overscroll/config.kdl`.
        system_path: PathBuf,
    },
}

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let config = Self::parse(
            path.file_name()
                .and_then(OsStr::to_str)
                .unwrap_or("config.kdl"),
            &contents,
        )
        .context("error parsing")?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        let _span = tracy_client::span!("Config::parse");
        knuffel::parse(filename, text)
    }
}

impl ConfigPath {
    /// Returns the path that [`ConfigPath::load`] would read, if any.
    pub fn resolve(&self) -> Option<&Path> {
        match self {
            ConfigPath::Explicit(path) => Some(path.as_path()),
            ConfigPath::Regular {
                user_path,
                system_path,
            } => {
                if user_path.exists() {
                    Some(user_path.as_path())
                } else if system_path.exists() {
                    Some(system_path.as_path())
                } else {
                    None
                }
            }
        }
    }

    /// Loads the config.
    ///
    /// A regular path with neither file present yields the default config. An explicit path must
    /// exist.
    pub fn load(&self) -> miette::Result<Config> {
        let _span = tracy_client::span!("ConfigPath::load");

        match self.resolve() {
            Some(path) => Config::load(path).context("error loading config"),
            None => {
                debug!("no config file found, using defaults");
                Ok(Config::default())
            }
        }
    }
}
