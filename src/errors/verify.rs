use super::{ConfigErrorKind, ResolveErrorKind};
use crate::{any::TypeInfo, mock::Times};

#[derive(thiserror::Error, Debug)]
pub enum VerifyErrorKind {
    #[error("Mock of `{type_info}` has no setups to verify")]
    NoSetups { type_info: TypeInfo },
    #[error("Mock of `{type_info}` has setups that were never invoked: {}", .methods.join(", "))]
    UninvokedSetups {
        type_info: TypeInfo,
        methods: Vec<&'static str>,
    },
    #[error("Expected `{type_info}::{method}` to be invoked {expected}, but it was invoked {actual} time(s)")]
    CallCount {
        type_info: TypeInfo,
        method: &'static str,
        expected: Times,
        actual: usize,
    },
    #[error(transparent)]
    Resolve(#[from] ResolveErrorKind),
    #[error(transparent)]
    Config(#[from] ConfigErrorKind),
}

impl VerifyErrorKind {
    #[inline]
    #[must_use]
    pub fn is_missing_setups(&self) -> bool {
        matches!(self, Self::NoSetups { .. })
    }
}
