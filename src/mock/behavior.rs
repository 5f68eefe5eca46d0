/// How a mock answers an invocation that no setup matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MockBehavior {
    /// Return a default value
    #[default]
    Loose,
    /// Panic, failing the test at the call site
    Strict,
}

/// Default value policy of a loose mock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DefaultValue {
    /// `Default::default()` for plain values, `None` for mockable types
    #[default]
    Empty,
    /// Mockable return types get a fresh mock, reused by later calls of the same method
    Mock,
}
