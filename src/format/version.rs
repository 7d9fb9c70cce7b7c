//! RSM format version.

use std::fmt;

/// `major.minor` version from the file header.
///
/// Ordering compares major then minor, which matches comparing the
/// decimal `major.minor` value for the single-digit minors in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    /// Texture vertex colors, smoothing groups.
    pub const V1_2: Self = Self::new(1, 2);
    /// Volume box flags.
    pub const V1_3: Self = Self::new(1, 3);
    /// Header alpha byte.
    pub const V1_4: Self = Self::new(1, 4);
    /// No more model-level position keys.
    pub const V1_5: Self = Self::new(1, 5);
    /// Scale keyframes.
    pub const V1_6: Self = Self::new(1, 6);
    /// Length-prefixed strings, frame rate, position keyframes, face record lengths.
    pub const V2_2: Self = Self::new(2, 2);
    /// Per-mesh texture lists and texture animation.
    pub const V2_3: Self = Self::new(2, 3);

    /// Newest version this crate reads and writes.
    pub const LATEST: Self = Self::V2_3;

    /// Create a version.
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// True for versions with a known layout.
    pub fn is_supported(self) -> bool {
        match self.major {
            1 => self.minor <= 9,
            2 => self.minor <= 3,
            _ => false,
        }
    }

    /// True for 2.2 and later ("RSM2") files.
    #[inline]
    pub fn is_rsm2(self) -> bool {
        self >= Self::V2_2
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
