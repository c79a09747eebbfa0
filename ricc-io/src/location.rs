//! Component B: location tracker.
//!
//! Maps stream positions to `(file, line, column)`. A [`LocationTracker`]
//! is owned by whatever is driving a [`crate::stream::Stream`] — the
//! preprocessor's directive engine, concretely — and advanced one
//! character at a time as the stream is consumed.

use std::fmt;

/// Opaque handle into the driver's file table. The table itself (path ->
/// id, id -> path) is an out-of-scope collaborator; this crate only needs
/// an equality-comparable, copyable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u32);

/// An immutable snapshot of a position, suitable for attaching to
/// diagnostics. `file` is `None` when the snapshot was taken while
/// scanning a non-file input (a macro expansion buffer); in that case a
/// diagnostic should fall back to the enclosing [`LocationTracker::prev`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
	pub file: Option<FileId>,
	pub line: u32,
	pub column: u32,
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.file {
			Some(FileId(id)) => write!(f, "file#{id}:{}:{}", self.line, self.column),
			None => write!(f, "<macro-body>:{}:{}", self.line, self.column),
		}
	}
}

/// Tracks line/column as a [`crate::stream::Stream`] is consumed.
///
/// When `file` is `None` the tracker belongs to a macro-body buffer rather
/// than a real file; `prev` then holds the location of the invocation
/// site so diagnostics raised while scanning the substitution still point
/// somewhere useful in the original source.
#[derive(Debug, Clone)]
pub struct LocationTracker {
	file: Option<FileId>,
	line: u32,
	column: u32,
	prev: Option<Location>,
	begin: Option<Location>,
	end: Option<Location>,
}

impl LocationTracker {
	/// A tracker for a real, file-backed input. Lines/columns are 1-based.
	pub fn for_file(file: FileId) -> Self {
		Self { file: Some(file), line: 1, column: 1, prev: None, begin: None, end: None }
	}

	/// A tracker for a non-file (macro expansion) buffer. `prev` is the
	/// location of the site that triggered the expansion.
	pub fn for_macro_body(prev: Location) -> Self {
		Self { file: None, line: 1, column: 1, prev: Some(prev), begin: None, end: None }
	}

	pub fn is_file(&self) -> bool {
		self.file.is_some()
	}

	/// Advance past `c`. Line breaks reset the column; every other
	/// character just advances it. Returns `c` unchanged so callers can
	/// write `out.push(tracker.advance(c))` inline.
	pub fn advance(&mut self, c: char) -> char {
		if c == '\n' {
			self.line_break()
		} else {
			self.column += 1;
		}
		c
	}

	/// Advance the line counter and reset the column, as if `\n` had just
	/// been consumed. Exposed separately because `\r\n` and bare `\r`
	/// line endings normalize to a single line break without themselves
	/// being the `\n` character.
	pub fn line_break(&mut self) -> char {
		self.line += 1;
		self.column = 1;
		'\n'
	}

	/// An opaque `(line, column)` snapshot, cheap enough to push onto a
	/// backtrack stack on every character read. Pairs with
	/// [`LocationTracker::restore_pos`] so a caller that pushes a
	/// character back onto its stream (undoing a read) can undo the
	/// matching `advance`/`line_break` too, rather than double-counting
	/// the position when that character is read again.
	pub fn snapshot_pos(&self) -> (u32, u32) {
		(self.line, self.column)
	}

	/// Undo an `advance`/`line_break` by restoring a position captured
	/// with [`LocationTracker::snapshot_pos`] just before it.
	pub fn restore_pos(&mut self, pos: (u32, u32)) {
		self.line = pos.0;
		self.column = pos.1;
	}

	/// Mark the start of a region about to be substituted (macro call
	/// site, or an `#include`'s insertion point).
	pub fn update_begin(&mut self) {
		self.begin = Some(self.copy());
	}

	/// Mark the end of a substituted region, once expansion/inclusion is
	/// complete and the tracker has advanced past it.
	pub fn update_end(&mut self) {
		self.end = Some(self.copy());
	}

	pub fn begin(&self) -> Option<Location> {
		self.begin
	}

	pub fn end(&self) -> Option<Location> {
		self.end
	}

	/// An immutable snapshot of the current position, for attaching to a
	/// diagnostic. Non-file trackers report their caller's location
	/// instead of `(None, line, column)`, since a raw macro-body position
	/// is meaningless to the user.
	pub fn copy(&self) -> Location {
		match self.file {
			Some(file) => Location { file: Some(file), line: self.line, column: self.column },
			None => self.prev.unwrap_or_default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn file_tracker_advances_line_and_column() {
		let mut t = LocationTracker::for_file(FileId(0));
		for c in "ab\ncd".chars() {
			t.advance(c);
		}
		let loc = t.copy();
		assert_eq!(loc.line, 2);
		assert_eq!(loc.column, 3);
		assert_eq!(loc.file, Some(FileId(0)));
	}

	#[test]
	fn macro_body_tracker_reports_caller_location() {
		let caller = Location { file: Some(FileId(3)), line: 40, column: 7 };
		let mut t = LocationTracker::for_macro_body(caller);
		t.advance('x');
		t.advance('y');
		assert_eq!(t.copy(), caller);
		assert!(!t.is_file());
	}

	#[test]
	fn begin_end_bracket_a_substitution() {
		let mut t = LocationTracker::for_file(FileId(0));
		t.advance('a');
		t.update_begin();
		for c in "FOO".chars() {
			t.advance(c);
		}
		t.update_end();
		assert_eq!(t.begin().unwrap().column, 2);
		assert_eq!(t.end().unwrap().column, 5);
	}
}
