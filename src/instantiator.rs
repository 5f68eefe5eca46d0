use std::sync::Arc;
use tracing::debug;

use crate::{
    any::AnyValue,
    errors::{InstantiateErrorKind, ResolveErrorKind},
    mock::Interceptor,
    parameter::{Arguments, Parameter, Parameters},
};

/// Constructor or factory of a value, taking its dependencies as [`Parameter`]s
pub trait Instantiator<Deps>: Clone + 'static
where
    Deps: Parameters,
{
    type Provides: 'static;
    type Error: Into<InstantiateErrorKind>;

    fn instantiate(&mut self, dependencies: Deps) -> Result<Self::Provides, Self::Error>;
}

/// Constructor of a proxy. Besides its own dependencies it receives the interceptor
/// the proxy forwards its calls to.
pub trait ProxyInstantiator<Deps>: Clone + 'static
where
    Deps: Parameters,
{
    type Provides: 'static;

    fn instantiate(&mut self, interceptor: Arc<Interceptor>, dependencies: Deps) -> Self::Provides;
}

pub(crate) type BoxedInstantiator = Arc<dyn Fn(Arguments) -> Result<AnyValue, ResolveErrorKind> + Send + Sync>;
pub(crate) type BoxedProxyInstantiator =
    Arc<dyn Fn(Arc<Interceptor>, Arguments) -> Result<AnyValue, ResolveErrorKind> + Send + Sync>;

#[must_use]
pub(crate) fn boxed_instantiator<Inst, Deps>(instantiator: Inst) -> BoxedInstantiator
where
    Inst: Instantiator<Deps> + Send + Sync,
    Inst::Provides: Send + Sync,
    Deps: Parameters,
{
    Arc::new(move |arguments: Arguments| {
        let dependencies = Deps::extract(&arguments)?;
        let provided = instantiator
            .clone()
            .instantiate(dependencies)
            .map_err(|err| ResolveErrorKind::Instantiate(err.into()))?;

        debug!("Instantiated");

        Ok(AnyValue::new(Arc::new(provided)))
    })
}

/// Same as [`boxed_instantiator`] for factories returning a shared value, possibly a trait object
#[must_use]
pub(crate) fn boxed_shared_instantiator<Inst, Deps, T>(instantiator: Inst) -> BoxedInstantiator
where
    Inst: Instantiator<Deps, Provides = Arc<T>> + Send + Sync,
    Deps: Parameters,
    T: ?Sized + Send + Sync + 'static,
{
    Arc::new(move |arguments: Arguments| {
        let dependencies = Deps::extract(&arguments)?;
        let provided = instantiator
            .clone()
            .instantiate(dependencies)
            .map_err(|err| ResolveErrorKind::Instantiate(err.into()))?;

        debug!("Instantiated");

        Ok(AnyValue::new(provided))
    })
}

#[must_use]
pub(crate) fn boxed_proxy_instantiator<Inst, Deps>(instantiator: Inst) -> BoxedProxyInstantiator
where
    Inst: ProxyInstantiator<Deps> + Send + Sync,
    Inst::Provides: Send + Sync,
    Deps: Parameters,
{
    Arc::new(move |interceptor: Arc<Interceptor>, arguments: Arguments| {
        let dependencies = Deps::extract(&arguments)?;
        let proxy = instantiator.clone().instantiate(interceptor, dependencies);

        debug!("Proxy instantiated");

        Ok(AnyValue::new(Arc::new(proxy)))
    })
}

macro_rules! impl_instantiator {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Instantiator<($($ty,)*)> for F
        where
            F: FnMut($($ty,)*) -> Result<Response, Err> + Clone + 'static,
            Response: 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: Parameter, )*
        {
            type Provides = Response;
            type Error = Err;

            fn instantiate(&mut self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }

        #[allow(non_snake_case)]
        impl<F, Response, $($ty,)*> ProxyInstantiator<($($ty,)*)> for F
        where
            F: FnMut(Arc<Interceptor>, $($ty,)*) -> Response + Clone + 'static,
            Response: 'static,
            $( $ty: Parameter, )*
        {
            type Provides = Response;

            fn instantiate(&mut self, interceptor: Arc<Interceptor>, ($($ty,)*): ($($ty,)*)) -> Self::Provides {
                self(interceptor, $($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_instantiator);
