use std::sync::Arc;

use crate::{
    any::{AnyValue, TypeInfo},
    dependency::{Dependency, DependencyKind},
    errors::ResolveErrorKind,
    registry::Registry,
    shapes::{self, Func, Lazy, Sequence},
};

/// Resolved values of a constructor's parameters, in declaration order. `None` is a null value.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: Vec<Option<AnyValue>>,
}

impl Arguments {
    #[inline]
    #[must_use]
    pub fn new(values: Vec<Option<AnyValue>>) -> Self {
        Self { values }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&AnyValue>> {
        self.values.iter().map(Option::as_ref)
    }
}

/// Constructor parameter the container knows how to resolve.
///
/// [`Parameter::dependency`] describes the parameter to the constructor selector and registers
/// the descriptor of its shape, [`Parameter::extract`] converts the resolved value back.
pub trait Parameter: Sized + 'static {
    fn dependency(registry: &Registry) -> Dependency;

    fn extract(value: Option<&AnyValue>) -> Result<Self, ResolveErrorKind>;
}

fn downcast<T>(value: Option<&AnyValue>) -> Result<Arc<T>, ResolveErrorKind>
where
    T: ?Sized + Send + Sync + 'static,
{
    let Some(value) = value else {
        return Err(ResolveErrorKind::Null {
            type_info: TypeInfo::of::<T>(),
        });
    };
    value.downcast::<T>().ok_or_else(|| ResolveErrorKind::IncorrectType {
        expected: TypeInfo::of::<T>(),
        actual: value.type_info(),
    })
}

impl<T> Parameter for Arc<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn dependency(_registry: &Registry) -> Dependency {
        Dependency::new(TypeInfo::of::<T>(), DependencyKind::Required)
    }

    fn extract(value: Option<&AnyValue>) -> Result<Self, ResolveErrorKind> {
        downcast(value)
    }
}

impl<T> Parameter for Option<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn dependency(_registry: &Registry) -> Dependency {
        Dependency::new(TypeInfo::of::<T>(), DependencyKind::Optional)
    }

    fn extract(value: Option<&AnyValue>) -> Result<Self, ResolveErrorKind> {
        match value {
            Some(_) => downcast(value).map(Some),
            None => Ok(None),
        }
    }
}

impl<T> Parameter for Vec<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn dependency(registry: &Registry) -> Dependency {
        let type_info = TypeInfo::of::<Self>();
        registry.register_shape(type_info, shapes::array::<T>);
        Dependency::new(type_info, DependencyKind::Array)
    }

    fn extract(value: Option<&AnyValue>) -> Result<Self, ResolveErrorKind> {
        downcast::<Self>(value).map(|items| (*items).clone())
    }
}

impl<T> Parameter for Sequence<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn dependency(registry: &Registry) -> Dependency {
        let type_info = TypeInfo::of::<Self>();
        registry.register_shape(type_info, shapes::sequence::<T>);
        Dependency::new(type_info, DependencyKind::Sequence)
    }

    fn extract(value: Option<&AnyValue>) -> Result<Self, ResolveErrorKind> {
        downcast::<Self>(value).map(|items| (*items).clone())
    }
}

impl<Args, R> Parameter for Func<Args, R>
where
    Args: 'static,
    R: ?Sized + Send + Sync + 'static,
{
    fn dependency(registry: &Registry) -> Dependency {
        let type_info = TypeInfo::of::<Self>();
        registry.register_shape(type_info, shapes::func::<Args, R>);
        Dependency::new(type_info, DependencyKind::Func)
    }

    fn extract(value: Option<&AnyValue>) -> Result<Self, ResolveErrorKind> {
        downcast::<Self>(value).map(|func| (*func).clone())
    }
}

impl<T> Parameter for Lazy<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn dependency(registry: &Registry) -> Dependency {
        let type_info = TypeInfo::of::<Self>();
        registry.register_shape(type_info, shapes::lazy::<T>);
        Dependency::new(type_info, DependencyKind::Lazy)
    }

    fn extract(value: Option<&AnyValue>) -> Result<Self, ResolveErrorKind> {
        downcast::<Self>(value).map(|lazy| (*lazy).clone())
    }
}

/// Ordered list of [`Parameter`]s of a constructor or factory
pub trait Parameters: Sized + 'static {
    fn dependencies(registry: &Registry) -> Vec<Dependency>;

    fn extract(arguments: &Arguments) -> Result<Self, ResolveErrorKind>;
}

macro_rules! impl_parameters {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_variables, unused_mut)]
        impl<$($ty,)*> Parameters for ($($ty,)*)
        where
            $( $ty: Parameter, )*
        {
            fn dependencies(registry: &Registry) -> Vec<Dependency> {
                vec![$($ty::dependency(registry),)*]
            }

            fn extract(arguments: &Arguments) -> Result<Self, ResolveErrorKind> {
                let mut values = arguments.iter();
                Ok(($($ty::extract(values.next().flatten())?,)*))
            }
        }
    };
}

all_the_tuples!(impl_parameters);

#[cfg(test)]
mod tests {
    use super::{Arguments, Parameter, Parameters};
    use crate::{
        any::{AnyValue, TypeInfo},
        dependency::DependencyKind,
        errors::ResolveErrorKind,
        registry::Registry,
    };

    use std::sync::Arc;
    use tracing_test::traced_test;

    trait Service: Send + Sync {}

    struct Impl;

    impl Service for Impl {}

    #[test]
    #[traced_test]
    fn test_dependencies() {
        let registry = Registry::new();
        let dependencies = <(Arc<dyn Service>, Option<Arc<String>>, Vec<Arc<dyn Service>>)>::dependencies(&registry);

        assert_eq!(dependencies.len(), 3);
        assert_eq!(dependencies[0].type_info, TypeInfo::of::<dyn Service>());
        assert_eq!(dependencies[1].kind, DependencyKind::Optional);
        assert_eq!(dependencies[2].kind, DependencyKind::Array);
        assert!(registry.contains(&TypeInfo::of::<Vec<Arc<dyn Service>>>()));
    }

    #[test]
    #[traced_test]
    fn test_extract() {
        let service: Arc<dyn Service> = Arc::new(Impl);
        let arguments = Arguments::new(vec![Some(AnyValue::new(service)), None]);

        let (service, text) = <(Arc<dyn Service>, Option<Arc<String>>)>::extract(&arguments).unwrap();
        let _: Arc<dyn Service> = service;
        assert!(text.is_none());
    }

    #[test]
    #[traced_test]
    fn test_extract_errors() {
        let value = AnyValue::new(Arc::new(1u8));

        assert!(matches!(
            <Arc<String>>::extract(None),
            Err(ResolveErrorKind::Null { .. })
        ));
        assert!(matches!(
            <Arc<String>>::extract(Some(&value)),
            Err(ResolveErrorKind::IncorrectType { .. })
        ));
    }
}
