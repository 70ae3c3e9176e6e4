//! Source Scanning
//!
//! Discovers interface-definition and generated files on disk and reads their
//! modification times.

pub mod path;
pub mod walker;

pub use path::{absolutize, has_extension, normalize_lexically, to_absolute};
pub use walker::{ScannedFile, Walker, WalkerConfig};
