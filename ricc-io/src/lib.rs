//! Character I/O and source-location tracking shared by the
//! preprocessor and, for diagnostics, the code generator.
//!
//! See `rpmspec-rs::util::Consumer` for the teacher pattern this
//! generalizes (push-back via a reversed internal buffer).

pub mod location;
pub mod stream;

pub use location::{FileId, Location, LocationTracker};
pub use stream::{Stream, EOF};
