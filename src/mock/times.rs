use core::fmt;

/// Expected number of invocations of a mocked method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Times {
    Never,
    Once,
    AtLeastOnce,
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
    /// Inclusive range
    Between(usize, usize),
}

impl Times {
    #[must_use]
    pub fn matches(self, count: usize) -> bool {
        match self {
            Self::Never => count == 0,
            Self::Once => count == 1,
            Self::AtLeastOnce => count >= 1,
            Self::Exactly(expected) => count == expected,
            Self::AtLeast(min) => count >= min,
            Self::AtMost(max) => count <= max,
            Self::Between(min, max) => (min..=max).contains(&count),
        }
    }
}

impl fmt::Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("never"),
            Self::Once => f.write_str("once"),
            Self::AtLeastOnce => f.write_str("at least once"),
            Self::Exactly(count) => write!(f, "exactly {count} time(s)"),
            Self::AtLeast(count) => write!(f, "at least {count} time(s)"),
            Self::AtMost(count) => write!(f, "at most {count} time(s)"),
            Self::Between(min, max) => write!(f, "between {min} and {max} time(s)"),
        }
    }
}
