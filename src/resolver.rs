//! A filesystem-backed `ricc_ast::IncludeResolver`, the driver's
//! concrete implementation of the linker collaborator the preprocessor
//! crate only depends on as a trait object.

use std::path::{Path, PathBuf};

use ricc_ast::IncludeResolver;

pub struct FsResolver {
	/// Directory the top-level source file lives in; checked first for
	/// `#include "..."`, ahead of `quote_dirs`.
	source_dir: PathBuf,
	quote_dirs: Vec<PathBuf>,
	include_dirs: Vec<PathBuf>,
}

impl FsResolver {
	pub fn new(source_dir: PathBuf, quote_dirs: Vec<PathBuf>, include_dirs: Vec<PathBuf>) -> Self {
		Self { source_dir, quote_dirs, include_dirs }
	}

	fn find_in(dirs: impl Iterator<Item = PathBuf>, path: &str) -> Option<PathBuf> {
		dirs.map(|dir| dir.join(path)).find(|candidate| candidate.is_file())
	}
}

impl IncludeResolver for FsResolver {
	fn resolve_internal(&self, path: &str) -> Option<PathBuf> {
		let local = self.source_dir.join(path);
		if local.is_file() {
			return Some(local);
		}
		Self::find_in(self.quote_dirs.iter().cloned(), path).or_else(|| Self::resolve_external(self, path))
	}

	fn resolve_external(&self, path: &str) -> Option<PathBuf> {
		Self::find_in(self.include_dirs.iter().cloned(), path)
	}
}

/// Directory a path's file lives in, or `.` if it has none.
pub fn parent_dir(path: &Path) -> PathBuf {
	path.parent().filter(|p| !p.as_os_str().is_empty()).map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
