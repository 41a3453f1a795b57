use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::path::PathBuf;

/// Source of documents for the engine. The engine only ever asks whether a
/// path exists and for its raw bytes; decoding is handled by
/// [`normalize_encoding`].
pub trait DocumentLoader {
	/// Returns true when `path` refers to something that can be loaded.
	fn exists(&self, path: &Path) -> bool;

	/// Read the raw bytes stored at `path`.
	fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

impl<L: DocumentLoader + ?Sized> DocumentLoader for &L {
	fn exists(&self, path: &Path) -> bool {
		(**self).exists(path)
	}

	fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
		(**self).read(path)
	}
}

/// Loads documents from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemLoader;

impl DocumentLoader for FileSystemLoader {
	fn exists(&self, path: &Path) -> bool {
		path.exists()
	}

	fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
		std::fs::read(path)
	}
}

/// Holds documents in memory, keyed by the exact path they are requested
/// with. Useful for embedding the engine where no filesystem is available.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
	documents: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryLoader {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add or replace a document.
	pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> &mut Self {
		self.documents.insert(path.into(), content.into());
		self
	}

	/// Builder form of [`MemoryLoader::insert`].
	#[must_use]
	pub fn with(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
		self.insert(path, content);
		self
	}
}

impl DocumentLoader for MemoryLoader {
	fn exists(&self, path: &Path) -> bool {
		self.documents.contains_key(path)
	}

	fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
		self.documents.get(path).cloned().ok_or_else(|| {
			io::Error::new(
				io::ErrorKind::NotFound,
				format!("no document registered at `{}`", path.display()),
			)
		})
	}
}

/// Decode raw document bytes as UTF-8. Invalid sequences are replaced with
/// `U+FFFD` rather than rejected.
pub fn normalize_encoding(bytes: Vec<u8>) -> String {
	match String::from_utf8(bytes) {
		Ok(text) => text,
		Err(error) => String::from_utf8_lossy(error.as_bytes()).into_owned(),
	}
}
