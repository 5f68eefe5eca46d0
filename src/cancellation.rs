use tokio_util::sync::CancellationToken;

/// Owner of a [`CancellationToken`]. Registering a source makes resolved tokens derive from it.
#[derive(Debug, Clone, Default)]
pub struct CancellationTokenSource {
    token: CancellationToken,
}

impl CancellationTokenSource {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cancelled together with the source
    #[inline]
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
