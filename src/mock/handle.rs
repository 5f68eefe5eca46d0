use core::{fmt, ops::Deref};
use std::sync::Arc;

use super::{Interceptor, Invocation, Setup, Times};
use crate::{
    any::{AnyValue, TypeInfo},
    errors::{ResolveErrorKind, VerifyErrorKind},
};

/// Mock without its static type: the interceptor and the proxy object it drives
#[derive(Clone)]
pub struct ErasedMock {
    interceptor: Arc<Interceptor>,
    proxy: AnyValue,
}

impl ErasedMock {
    #[inline]
    #[must_use]
    pub fn new(interceptor: Arc<Interceptor>, proxy: AnyValue) -> Self {
        Self { interceptor, proxy }
    }

    #[inline]
    #[must_use]
    pub fn interceptor(&self) -> &Arc<Interceptor> {
        &self.interceptor
    }

    /// Proxy object, stored under the proxy type
    #[inline]
    #[must_use]
    pub fn proxy(&self) -> &AnyValue {
        &self.proxy
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.interceptor.type_info()
    }
}

impl fmt::Debug for ErasedMock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedMock")
            .field("mocked", &self.interceptor.type_info())
            .field("proxy", &self.proxy)
            .finish()
    }
}

/// Typed handle of a mock: the object handed to the system under test plus its interceptor
pub struct Mock<T: ?Sized> {
    erased: ErasedMock,
    object: Arc<T>,
}

impl<T: ?Sized> Clone for Mock<T> {
    fn clone(&self) -> Self {
        Self {
            erased: self.erased.clone(),
            object: self.object.clone(),
        }
    }
}

impl<T> Mock<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    /// Wraps a proxy built by hand, for example to register it with [`crate::AutoMocker::use_mock`]
    #[must_use]
    pub fn new<P>(interceptor: Arc<Interceptor>, proxy: Arc<P>, object: Arc<T>) -> Self
    where
        P: Send + Sync + 'static,
    {
        Self {
            erased: ErasedMock::new(interceptor, AnyValue::new(proxy)),
            object,
        }
    }

    pub(crate) fn from_parts(erased: ErasedMock, value: &AnyValue) -> Result<Self, ResolveErrorKind> {
        match value.downcast::<T>() {
            Some(object) => Ok(Self { erased, object }),
            None => Err(ResolveErrorKind::IncorrectType {
                expected: TypeInfo::of::<T>(),
                actual: value.type_info(),
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn object(&self) -> Arc<T> {
        self.object.clone()
    }

    #[inline]
    #[must_use]
    pub fn interceptor(&self) -> &Arc<Interceptor> {
        self.erased.interceptor()
    }

    #[inline]
    #[must_use]
    pub fn erased(&self) -> &ErasedMock {
        &self.erased
    }

    pub fn setup(&self, method: &'static str) -> Setup {
        Setup::new(self.interceptor(), method)
    }

    pub fn setup_all_properties(&self) {
        self.interceptor().setup_all_properties();
    }

    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.interceptor().invocations()
    }

    pub fn verify(&self) -> Result<(), VerifyErrorKind> {
        self.interceptor().verify()
    }

    pub fn verify_all(&self) -> Result<(), VerifyErrorKind> {
        self.interceptor().verify_all()
    }

    pub fn verify_calls(&self, method: &'static str, times: Times) -> Result<(), VerifyErrorKind> {
        self.interceptor().verify_calls(method, times)
    }

    pub fn verify_calls_with<A, F>(&self, method: &'static str, matcher: F, times: Times) -> Result<(), VerifyErrorKind>
    where
        A: 'static,
        F: Fn(&A) -> bool,
    {
        self.interceptor().verify_calls_with(method, matcher, times)
    }
}

impl<T: ?Sized> Deref for Mock<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.object
    }
}

impl<T: ?Sized> fmt::Debug for Mock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mock").field("erased", &self.erased).finish_non_exhaustive()
    }
}

/// Concrete type that can be partially mocked.
///
/// The proxy wraps a real instance built by the container and forwards the mockable members to the
/// interceptor, usually through [`Interceptor::invoke_base`] so that unmatched calls can reach
/// the real implementation.
pub trait SelfMock: Sized + Send + Sync + 'static {
    type Proxy: Send + Sync + 'static;

    fn self_mock(base: Arc<Self>, interceptor: Arc<Interceptor>) -> Self::Proxy;
}
