use crate::any::TypeInfo;

/// How a constructor parameter consumes its resolved value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DependencyKind {
    Required,
    Optional,
    Array,
    Sequence,
    Func,
    Lazy,
}

impl DependencyKind {
    /// Shaped parameters are synthesized by resolvers, so they never disqualify a constructor
    #[inline]
    #[must_use]
    pub fn is_shape(self) -> bool {
        !matches!(self, Self::Required | Self::Optional)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Dependency {
    pub type_info: TypeInfo,
    pub kind: DependencyKind,
}

impl Dependency {
    #[inline]
    #[must_use]
    pub const fn new(type_info: TypeInfo, kind: DependencyKind) -> Self {
        Self { type_info, kind }
    }
}
