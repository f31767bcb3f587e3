//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading or writing a configuration file.
	#[error("I/O error on {path}: {error}")]
	Io {
		/// Path to the file that failed.
		path: PathBuf,
		/// The underlying I/O error.
		#[source]
		error: std::io::Error,
	},

	/// The file is not valid TOML or has mistyped keys.
	#[error("invalid configuration{}: {error}", path_suffix(.path))]
	Parse {
		/// Source file, when parsing from disk.
		path: Option<PathBuf>,
		#[source]
		error: toml::de::Error,
	},

	/// The configuration could not be rendered back to TOML.
	#[error("failed to serialize configuration: {0}")]
	Serialize(#[from] toml::ser::Error),

	/// No platform configuration directory could be determined.
	#[error("no configuration directory on this platform")]
	NoConfigDir,
}

fn path_suffix(path: &Option<PathBuf>) -> String {
	path.as_ref()
		.map(|p| format!(" in {}", p.display()))
		.unwrap_or_default()
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
