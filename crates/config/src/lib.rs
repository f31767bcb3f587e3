//! Configuration for the splice pipeline.
//!
//! A single TOML file controls how the pipeline attaches to its host, whether it
//! logs, and which artifact namespaces it must never touch.
//!
//! # Configuration File
//!
//! Looked up at `$XDG_CONFIG_HOME/splice/splice.toml` (or the platform
//! equivalent) unless a path is given explicitly:
//!
//! ```toml
//! # Keep loading without the pipeline if the host refuses attachment.
//! allow_attach_non_fail_hard = false
//!
//! # Default log output for splice targets (RUST_LOG still overrides).
//! enable_log = true
//!
//! # Artifacts whose names start with any of these are never transformed.
//! transformer_exclusions = ["java.", "javax.", "splice."]
//! ```
//!
//! Every key is optional. A missing file is created with the defaults by
//! [`SpliceConfig::load_or_init`].

pub mod error;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use splice_filter::Predicate;
use tracing::{debug, info};

pub use error::{ConfigError, Result};

/// File name inside the platform configuration directory.
pub const CONFIG_FILE_NAME: &str = "splice.toml";

/// Namespaces excluded from transformation in a freshly written configuration.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
	"java.",
	"javax.",
	"sun.",
	"com.sun.",
	"jdk.",
	"org.objectweb.asm",
	"org.apache.logging",
	"net.fabricmc.loader",
	"org.slf4j",
	"com.google",
	"io.netty",
	"it.unimi.dsi.fastutil",
	"org.apache.commons",
	"org.apache.http",
	"lombok",
	"splice.",
];

/// What to do when the pipeline cannot attach to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachPolicy {
	/// Abort startup.
	#[default]
	FailHard,
	/// Continue with an inert pipeline.
	NonFailHard,
}

/// Parsed `splice.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpliceConfig {
	/// Selects [`AttachPolicy::NonFailHard`].
	pub allow_attach_non_fail_hard: bool,
	/// Enables splice log output when `RUST_LOG` is unset.
	pub enable_log: bool,
	/// Name prefixes that are never transformed.
	pub transformer_exclusions: Vec<String>,
}

impl Default for SpliceConfig {
	fn default() -> Self {
		Self {
			allow_attach_non_fail_hard: false,
			enable_log: true,
			transformer_exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
		}
	}
}

impl SpliceConfig {
	/// Parse a TOML string. Absent keys take their defaults.
	pub fn parse(input: &str) -> Result<Self> {
		toml::from_str(input).map_err(|error| ConfigError::Parse { path: None, error })
	}

	/// Load configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		toml::from_str(&content).map_err(|error| ConfigError::Parse {
			path: Some(path.to_path_buf()),
			error,
		})
	}

	/// Loads `path`, or writes the defaults there first if it does not exist.
	pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		if path.exists() {
			debug!(path = %path.display(), "loading configuration");
			return Self::load(path);
		}
		let config = Self::default();
		config.save(path)?;
		info!(path = %path.display(), "wrote default configuration");
		Ok(config)
	}

	/// Writes the configuration to `path`, creating parent directories.
	pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|error| ConfigError::Io {
				path: parent.to_path_buf(),
				error,
			})?;
		}
		fs::write(path, self.to_toml()?).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})
	}

	/// Renders the configuration as TOML.
	pub fn to_toml(&self) -> Result<String> {
		Ok(toml::to_string_pretty(self)?)
	}

	/// Trimmed, non-blank exclusion prefixes in file order.
	pub fn exclusions(&self) -> impl Iterator<Item = &str> {
		self.transformer_exclusions
			.iter()
			.map(|p| p.trim())
			.filter(|p| !p.is_empty())
	}

	/// Predicate that is true for artifacts the pipeline may transform.
	///
	/// `not(prefix(a) or prefix(b) or ...)`, or [`Predicate::All`] when no
	/// usable prefix is configured.
	pub fn exclusion_filter(&self) -> Predicate {
		let mut prefixes = self.exclusions().map(Predicate::prefix).peekable();
		if prefixes.peek().is_none() {
			return Predicate::all();
		}
		Predicate::any_of(prefixes).negate()
	}

	pub fn attach_policy(&self) -> AttachPolicy {
		if self.allow_attach_non_fail_hard {
			AttachPolicy::NonFailHard
		} else {
			AttachPolicy::FailHard
		}
	}
}

/// `<config dir>/splice/splice.toml`.
pub fn default_config_path() -> Result<PathBuf> {
	let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
	Ok(dir.join("splice").join(CONFIG_FILE_NAME))
}
