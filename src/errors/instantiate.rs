/// Error returned by a user constructor or factory.
///
/// The original error is kept as is, so callers can tell a failing system under test apart
/// from a container that couldn't build it and can downcast to the original error type.
#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl InstantiateErrorKind {
    #[inline]
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: core::fmt::Display + core::fmt::Debug + Send + Sync + 'static,
    {
        match self {
            Self::Custom(err) => err.downcast_ref(),
        }
    }
}
