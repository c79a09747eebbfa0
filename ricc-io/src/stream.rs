//! Component A: character I/O.
//!
//! A pushbackable byte+UTF-8 reader over either a real file or an
//! in-memory buffer, plus a matching output sink that can be detached
//! into an owned `String`. Grounded on `rpmspec-rs`'s `Consumer<R>`
//! (`util.rs`): push reads back onto a small internal buffer so
//! `unread_char` is O(1) and unbounded, rather than seeking the
//! underlying reader.
//!
//! The teacher's `Consumer<R>` is read-only; this generalizes it with an
//! output role (`set_buffer`/`extract_buffer`) and an explicit
//! `swap`, per spec: "Streams can be swapped atomically between input
//! and output roles" — modelling recursive macro expansion without
//! coroutines (see `ricc-pp`'s nested re-entrancy).

use std::{
	fs::File,
	io::{self, BufRead, BufReader, Cursor, Read},
};

use tracing::trace;

/// Sentinel returned by [`Stream::read_char`] past EOF. Not a valid
/// Unicode scalar value callers would otherwise see, so it can't be
/// confused with real input.
pub const EOF: char = '\u{FFFF}';

enum Source {
	File(BufReader<File>),
	Memory(BufReader<Cursor<Vec<u8>>>),
}

impl Source {
	fn read_one_byte(&mut self) -> io::Result<Option<u8>> {
		let buf = match self {
			Source::File(r) => r.fill_buf()?,
			Source::Memory(r) => r.fill_buf()?,
		};
		let Some(&b) = buf.first() else { return Ok(None) };
		match self {
			Source::File(r) => r.consume(1),
			Source::Memory(r) => r.consume(1),
		}
		Ok(Some(b))
	}
}

/// An input/output stream with unbounded character push-back.
///
/// Reading decodes UTF-8 on the fly, one codepoint at a time;
/// `unread_char` pushes a decoded `char` back onto a LIFO buffer that is
/// drained before the underlying source is touched again, so push-back
/// depth is limited only by memory.
pub struct Stream {
	source: Option<Source>,
	pushback: Vec<char>,
	/// Byte offset of the next character that would be read. Moves
	/// backwards on `unread_char` and forwards on `read_char`/`scan_utf8`,
	/// so a matched unscan/scan pair always restores it exactly.
	pos: usize,
	is_file: bool,
	/// Present when this stream is acting in the output role: characters
	/// written via [`Stream::append`] accumulate here instead of being
	/// read.
	out_buf: Option<String>,
}

impl Stream {
	/// Open `path` as a file-backed input stream.
	pub fn open_file(path: &std::path::Path) -> io::Result<Self> {
		let file = File::open(path)?;
		Ok(Self {
			source: Some(Source::File(BufReader::new(file))),
			pushback: Vec::new(),
			pos: 0,
			is_file: true,
			out_buf: None,
		})
	}

	/// Wrap already-decoded text as a memory-backed input stream (a
	/// macro's substitution buffer, an `%include`d literal, etc).
	pub fn from_memory(contents: impl Into<String>) -> Self {
		let bytes = contents.into().into_bytes();
		Self {
			source: Some(Source::Memory(BufReader::new(Cursor::new(bytes)))),
			pushback: Vec::new(),
			pos: 0,
			is_file: false,
			out_buf: None,
		}
	}

	/// A pure output stream: no source, just an accumulation buffer. This
	/// is what `set_buffer` reassigns the active output role to.
	pub fn output_buffer() -> Self {
		Self { source: None, pushback: Vec::new(), pos: 0, is_file: false, out_buf: Some(String::new()) }
	}

	/// True iff the current input is a real file. Used by the
	/// preprocessor to decide whether to bother tracking `(line, column)`
	/// (no point for a one-shot in-memory expansion buffer whose
	/// diagnostics fall back to the invocation site anyway).
	pub fn is_file(&self) -> bool {
		self.is_file
	}

	pub fn position(&self) -> usize {
		self.pos
	}

	/// Read one decoded character, or [`EOF`] if the stream is exhausted.
	pub fn read_char(&mut self) -> char {
		if let Some(c) = self.pushback.pop() {
			self.pos += c.len_utf8();
			return c;
		}
		match self.read_utf8_codepoint() {
			Some(c) => {
				self.pos += c.len_utf8();
				c
			}
			None => EOF,
		}
	}

	/// Push `c` back onto the stream. A subsequent `read_char` yields `c`
	/// again, even if `c` was pushed back after hitting EOF.
	pub fn unread_char(&mut self, c: char) {
		if c == EOF {
			return;
		}
		self.pos -= c.len_utf8();
		self.pushback.push(c);
	}

	/// Decode the next UTF-8 codepoint directly from the underlying
	/// source, bypassing push-back. Used internally by `read_char`, and
	/// exposed for callers that need to distinguish "nothing pending,
	/// decode fresh" from the push-back fast path (none do today, but the
	/// distinction mirrors the two scan entry points in the spec).
	pub fn read_utf8_codepoint(&mut self) -> Option<char> {
		let source = self.source.as_mut()?;
		let first = source.read_one_byte().ok()??;
		let len = utf8_len(first);
		if len == 1 {
			return Some(first as char);
		}
		let mut buf = [0u8; 4];
		buf[0] = first;
		for slot in buf.iter_mut().take(len).skip(1) {
			*slot = source.read_one_byte().ok()??;
		}
		match std::str::from_utf8(&buf[..len]) {
			Ok(s) => s.chars().next(),
			Err(_) => {
				trace!("invalid UTF-8 sequence in source, substituting U+FFFD");
				Some('\u{FFFD}')
			}
		}
	}

	/// Append to the output buffer. Panics if this stream isn't currently
	/// in the output role — callers swap into that role first.
	pub fn append(&mut self, s: &str) {
		self.out_buf.get_or_insert_with(String::new).push_str(s);
	}

	pub fn append_char(&mut self, c: char) {
		self.out_buf.get_or_insert_with(String::new).push(c);
	}

	/// `set_buffer`: reassign this stream's output role to a fresh heap
	/// buffer with the given capacity hint, discarding whatever output it
	/// held before.
	pub fn set_buffer(&mut self, capacity_hint: usize) {
		self.out_buf = Some(String::with_capacity(capacity_hint));
	}

	/// `extract_buffer`: detach the accumulated output as an owned
	/// `String`, leaving this stream with an empty output buffer.
	pub fn extract_buffer(&mut self) -> String {
		self.out_buf.take().unwrap_or_default()
	}

	/// Atomic exchange of the active sink between `self` and `other` —
	/// the preprocessor's core re-entrancy primitive: swap the live input
	/// for a macro's substitution buffer, recurse, swap back.
	pub fn swap(&mut self, other: &mut Stream) {
		std::mem::swap(self, other);
	}
}

/// Length in bytes of the UTF-8 sequence starting with leading byte `b`.
/// Malformed leading bytes are treated as length 1 (matches `read_utf8_codepoint`'s
/// lossy fallback behavior for invalid encodings).
fn utf8_len(b: u8) -> usize {
	if b & 0b1000_0000 == 0 {
		1
	} else if b & 0b1110_0000 == 0b1100_0000 {
		2
	} else if b & 0b1111_0000 == 0b1110_0000 {
		3
	} else if b & 0b1111_1000 == 0b1111_0000 {
		4
	} else {
		1
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unread_then_read_restores_position_and_char() {
		let mut s = Stream::from_memory("héllo");
		let a = s.read_char();
		assert_eq!(a, 'h');
		let pos_after_h = s.position();
		let e_acute = s.read_char();
		assert_eq!(e_acute, 'é');
		let pos_after_e = s.position();
		s.unread_char(e_acute);
		assert_eq!(s.position(), pos_after_h);
		assert_eq!(s.read_char(), 'é');
		assert_eq!(s.position(), pos_after_e);
	}

	#[test]
	fn read_past_eof_yields_sentinel_and_unread_survives_it() {
		let mut s = Stream::from_memory("x");
		assert_eq!(s.read_char(), 'x');
		assert_eq!(s.read_char(), EOF);
		s.unread_char('z');
		assert_eq!(s.read_char(), 'z');
	}

	#[test]
	fn memory_stream_is_not_file_backed() {
		assert!(!Stream::from_memory("abc").is_file());
	}

	#[test]
	fn output_buffer_roundtrips() {
		let mut s = Stream::output_buffer();
		s.append("hello, ");
		s.append_char('w');
		s.append("orld");
		assert_eq!(s.extract_buffer(), "hello, world");
		assert_eq!(s.extract_buffer(), "");
	}

	#[test]
	fn swap_exchanges_sinks() {
		let mut a = Stream::from_memory("AAA");
		let mut b = Stream::from_memory("BBB");
		a.swap(&mut b);
		assert_eq!(a.read_char(), 'B');
		assert_eq!(b.read_char(), 'A');
	}
}
