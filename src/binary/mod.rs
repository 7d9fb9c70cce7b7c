//! Sequential little-endian binary cursor.
//!
//! Strings in RSM files are ANSI, either fixed-width and NUL-padded
//! or prefixed with an i32 byte length.

mod reader;
mod writer;

pub use reader::ByteReader;
pub use writer::ByteWriter;

/// Width of fixed ANSI name fields in pre-2.2 files.
pub const FIXED_NAME_LEN: usize = 40;
