use core::any::Any;
use std::sync::Arc;

use super::Interceptor;

/// Handle of a setup registered on an [`Interceptor`]. Builder methods update the setup in place.
pub struct Setup {
    interceptor: Arc<Interceptor>,
    index: usize,
}

impl Setup {
    /// Registers a setup for `method`, matching any arguments and answering with a default value
    pub fn new(interceptor: &Arc<Interceptor>, method: &'static str) -> Self {
        let index = interceptor.add_setup(method);
        Self {
            interceptor: interceptor.clone(),
            index,
        }
    }

    /// Only match calls whose arguments, passed as `A`, satisfy `matcher`
    pub fn with<A, F>(self, matcher: F) -> Self
    where
        A: 'static,
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.interceptor.update_setup(self.index, |setup| {
            setup.matcher = Some(Arc::new(move |args: &dyn Any| args.downcast_ref::<A>().is_some_and(&matcher)));
        });
        self
    }

    pub fn returns<R>(self, value: R) -> Self
    where
        R: Clone + Send + Sync + 'static,
    {
        self.interceptor.update_setup(self.index, |setup| {
            setup.response = Some(Arc::new(move |_: &dyn Any| Some(Box::new(value.clone()) as Box<dyn Any + Send>)));
        });
        self
    }

    /// Computes the returned value from the call arguments, passed as `A`
    pub fn returns_with<A, R, F>(self, response: F) -> Self
    where
        A: 'static,
        R: Send + 'static,
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        self.interceptor.update_setup(self.index, |setup| {
            setup.response = Some(Arc::new(move |args: &dyn Any| {
                args.downcast_ref::<A>()
                    .map(|args| Box::new(response(args)) as Box<dyn Any + Send>)
            }));
        });
        self
    }

    /// Include the setup in [`Interceptor::verify`]
    pub fn verifiable(self) -> Self {
        self.interceptor.update_setup(self.index, |setup| setup.verifiable = true);
        self
    }

    /// Number of calls answered by this setup
    #[must_use]
    pub fn invocations(&self) -> usize {
        self.interceptor.setup_invocations(self.index)
    }
}
