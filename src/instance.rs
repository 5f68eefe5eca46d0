use crate::{
    any::{AnyValue, TypeInfo},
    mock::ErasedMock,
};

/// Value resolved for a requested type, as kept by the cache
#[derive(Debug, Clone)]
pub enum Instance {
    /// Real value. `None` is an explicit null registration.
    Real { value: Option<AnyValue> },
    /// Mock, with its value viewed as the requested type
    Mock { mock: ErasedMock, value: AnyValue },
    /// Array assembled from other instances
    Array {
        element: TypeInfo,
        items: Vec<Instance>,
        value: AnyValue,
    },
}

impl Instance {
    #[inline]
    #[must_use]
    pub fn real(value: AnyValue) -> Self {
        Self::Real { value: Some(value) }
    }

    #[inline]
    #[must_use]
    pub fn null() -> Self {
        Self::Real { value: None }
    }

    #[inline]
    #[must_use]
    pub fn mock(mock: ErasedMock, value: AnyValue) -> Self {
        Self::Mock { mock, value }
    }

    #[must_use]
    pub fn value(&self) -> Option<&AnyValue> {
        match self {
            Self::Real { value } => value.as_ref(),
            Self::Mock { value, .. } | Self::Array { value, .. } => Some(value),
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<AnyValue> {
        match self {
            Self::Real { value } => value,
            Self::Mock { value, .. } | Self::Array { value, .. } => Some(value),
        }
    }

    /// `true` for a mock and for an array holding at least one mock
    #[must_use]
    pub fn is_mock(&self) -> bool {
        match self {
            Self::Real { .. } => false,
            Self::Mock { .. } => true,
            Self::Array { items, .. } => items.iter().any(Instance::is_mock),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Real { value: None })
    }

    /// Every mock held by the instance, array items included
    #[must_use]
    pub fn mocks(&self) -> Vec<&ErasedMock> {
        let mut mocks = Vec::new();
        self.collect_mocks(&mut mocks);
        mocks
    }

    fn collect_mocks<'a>(&'a self, mocks: &mut Vec<&'a ErasedMock>) {
        match self {
            Self::Real { .. } => {}
            Self::Mock { mock, .. } => mocks.push(mock),
            Self::Array { items, .. } => {
                for item in items {
                    item.collect_mocks(mocks);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instance;
    use crate::{
        any::{AnyValue, TypeInfo},
        config::Config,
        container::WeakAutoMocker,
        mock::{ErasedMock, Interceptor},
    };

    use std::sync::Arc;
    use tracing_test::traced_test;

    struct Proxy;

    fn mock() -> Instance {
        let interceptor = Arc::new(Interceptor::new(
            TypeInfo::of::<Proxy>(),
            Config::default(),
            WeakAutoMocker::new(),
        ));
        let value = AnyValue::new(Arc::new(Proxy));
        Instance::mock(ErasedMock::new(interceptor, value.clone()), value)
    }

    #[test]
    #[traced_test]
    fn test_is_mock() {
        let real = Instance::real(AnyValue::new(Arc::new(1u8)));
        let array = |items: Vec<Instance>| Instance::Array {
            element: TypeInfo::of::<Proxy>(),
            items,
            value: AnyValue::new(Arc::new(Vec::<Arc<Proxy>>::new())),
        };

        assert!(!real.is_mock());
        assert!(mock().is_mock());
        assert!(!array(vec![]).is_mock());
        assert!(!array(vec![real.clone()]).is_mock());
        assert!(array(vec![real, mock()]).is_mock());
        assert_eq!(array(vec![mock(), mock()]).mocks().len(), 2);
    }

    #[test]
    #[traced_test]
    fn test_null() {
        let null = Instance::null();

        assert!(null.is_null());
        assert!(null.value().is_none());
        assert!(!null.is_mock());
    }
}
