use super::{ArgumentErrorKind, ConfigErrorKind, InstantiateErrorKind};
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Did not find a best constructor for `{type_info}`{}", cycle_hint(.cycle))]
    NoViableConstructor { type_info: TypeInfo, cycle: Vec<TypeInfo> },
    #[error("No resolver provided a value for `{type_info}`. Register a value, a factory, a constructor or a proxy for it")]
    Unresolved { type_info: TypeInfo },
    #[error("`{type_info}` resolved to null, but a value is required")]
    Null { type_info: TypeInfo },
    #[error("Incorrect resolved type. Actual: `{actual}`, expected: `{expected}`")]
    IncorrectType { expected: TypeInfo, actual: TypeInfo },
    #[error("`{requested}` is registered as a real instance of `{actual}`, not as a mock")]
    NotAMock { requested: TypeInfo, actual: TypeInfo },
    #[error("`{type_info}` resolved to null, which isn't a mock")]
    NullMock { type_info: TypeInfo },
    #[error("Container has been dropped")]
    ContainerDropped,
    #[error(transparent)]
    Instantiate(#[from] InstantiateErrorKind),
    #[error(transparent)]
    Config(#[from] ConfigErrorKind),
    #[error(transparent)]
    Argument(#[from] ArgumentErrorKind),
}

impl ResolveErrorKind {
    #[inline]
    #[must_use]
    pub fn is_no_viable_constructor(&self) -> bool {
        matches!(self, Self::NoViableConstructor { .. })
    }

    /// Error returned by the constructor of the system under test (or one of its dependencies), if any
    #[inline]
    #[must_use]
    pub fn instantiate_error(&self) -> Option<&InstantiateErrorKind> {
        match self {
            Self::Instantiate(err) => Some(err),
            _ => None,
        }
    }
}

fn cycle_hint(cycle: &[TypeInfo]) -> String {
    if cycle.is_empty() {
        return String::new();
    }

    let mut hint = String::from(". Cyclic dependency detected: ");
    for (index, type_info) in cycle.iter().enumerate() {
        if index != 0 {
            hint.push_str(" -> ");
        }
        hint.push_str(type_info.name);
    }
    hint
}
