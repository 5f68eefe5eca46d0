use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentErrorKind {
    #[error("Argument `{parameter}` has type `{actual}`, expected `{expected}`")]
    TypeMismatch {
        parameter: &'static str,
        expected: TypeInfo,
        actual: TypeInfo,
    },
    #[error("Proxy `{proxy}` can't be forwarded to `{target}`. Register a cast with `implements` for it")]
    NotForwardable { proxy: TypeInfo, target: TypeInfo },
}
