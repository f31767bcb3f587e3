//! Raw artifact bytes, consulted when the native stage produces nothing.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{trace, warn};

/// Supplies the unmodified bytes of an artifact by name.
pub trait ArtifactSource: Send + Sync {
	fn read(&self, name: &str) -> Option<Bytes>;
}

/// Reads `<root>/<name with '.' replaced by '/'>.<extension>`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
	root: PathBuf,
	extension: String,
}

impl DirectorySource {
	pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
		Self {
			root: root.into(),
			extension: extension.into(),
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Maps an artifact name to its file, or `None` for names that could
	/// address anything outside `root` or have an empty segment.
	pub fn path_for(&self, name: &str) -> Option<PathBuf> {
		if name.contains(['/', '\\', ':']) || name.split('.').any(str::is_empty) {
			return None;
		}
		let relative = name.replace('.', "/");
		let mut path = self.root.join(relative);
		if !self.extension.is_empty() {
			path.set_extension(&self.extension);
		}
		Some(path)
	}
}

impl ArtifactSource for DirectorySource {
	fn read(&self, name: &str) -> Option<Bytes> {
		let Some(path) = self.path_for(name) else {
			trace!(name, "artifact name not addressable on disk");
			return None;
		};
		match fs::read(&path) {
			Ok(bytes) => Some(Bytes::from(bytes)),
			Err(error) if error.kind() == ErrorKind::NotFound => None,
			Err(error) => {
				warn!(name, path = %path.display(), %error, "failed to read artifact");
				None
			}
		}
	}
}
