use std::path::Path;

use tempfile::TempDir;

use crate::Engine;
use crate::MemoryLoader;

/// An in-memory set of documents keyed by path.
pub fn memory_loader(files: &[(&str, &str)]) -> MemoryLoader {
	files
		.iter()
		.fold(MemoryLoader::new(), |loader, (path, content)| {
			loader.with(*path, *content)
		})
}

/// Render `entry` from an in-memory set of documents with default options.
pub fn render_memory(files: &[(&str, &str)], entry: &str) -> String {
	Engine::with_loader(memory_loader(files)).render(entry)
}

/// Write `files` into a fresh temporary directory, creating parent
/// directories as needed.
pub fn temp_project(files: &[(&str, &str)]) -> std::io::Result<TempDir> {
	let tmp = tempfile::tempdir()?;
	for (path, content) in files {
		write_file(tmp.path(), path, content)?;
	}

	Ok(tmp)
}

pub fn write_file(root: &Path, path: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(path);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}

pub fn card_page() -> [(&'static str, &'static str); 2] {
	[
		("page.html", r#"<Component file="card.html" title={'Hi'} />"#),
		("card.html", "<h1>%title%</h1>"),
	]
}
