mod array;
mod cache;
mod callback;
mod cancellation;
mod delegate;
mod disposable;
mod enumerable;
mod func;
mod instance;
mod lazy;
mod mock;
mod self_resolver;
mod simple_type;

pub use array::ArrayResolver;
pub use cache::CacheResolver;
pub use callback::CallbackResolver;
pub use cancellation::CancellationTokenResolver;
pub use delegate::DelegateResolver;
pub use disposable::AutoMockerDisposableResolver;
pub use enumerable::EnumerableResolver;
pub use func::FuncResolver;
pub use instance::InstanceResolver;
pub use lazy::LazyResolver;
pub use mock::MockResolver;
pub use self_resolver::SelfResolver;
pub use simple_type::SimpleTypeResolver;

pub(crate) use callback::Callback;

use core::any::{type_name, Any};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::{any::TypeInfo, context::MockResolutionContext, errors::ConfigErrorKind, errors::ResolveErrorKind};

pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// Stage of the resolution pipeline.
///
/// A resolver provides a value by calling [`MockResolutionContext::set_value`] and declines by leaving
/// the context untouched, the pipeline then asks the next resolver.
pub trait Resolver: AsAny {
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind>;

    /// `true` if the resolver provides `type_info` without constructing or mocking it.
    /// Known types never disqualify a constructor.
    fn provides(&self, _type_info: &TypeInfo) -> bool {
        false
    }
}

#[inline]
fn is<R: Resolver>(resolver: &Arc<dyn Resolver>) -> bool {
    let resolver: &dyn Resolver = &**resolver;
    resolver.as_any().is::<R>()
}

#[inline]
pub(crate) fn name_of(resolver: &Arc<dyn Resolver>) -> &'static str {
    let resolver: &dyn Resolver = &**resolver;
    resolver.type_name()
}

fn downcast<R: Resolver>(resolver: Arc<dyn Resolver>) -> Option<Arc<R>> {
    resolver.into_any_arc().downcast::<R>().ok()
}

fn not_found<R>() -> ConfigErrorKind {
    ConfigErrorKind::ResolverNotFound { name: type_name::<R>() }
}

/// Resolvers in the default order
#[must_use]
pub fn default_resolvers() -> Vec<Arc<dyn Resolver>> {
    vec![
        Arc::new(CacheResolver::new()),
        Arc::new(CallbackResolver::new()),
        Arc::new(AutoMockerDisposableResolver),
        Arc::new(SelfResolver),
        Arc::new(CancellationTokenResolver),
        Arc::new(ArrayResolver),
        Arc::new(EnumerableResolver),
        Arc::new(FuncResolver),
        Arc::new(DelegateResolver),
        Arc::new(LazyResolver),
        Arc::new(InstanceResolver),
        Arc::new(MockResolver),
    ]
}

/// Ordered, mutable list of resolvers. The order is the resolution priority.
pub struct Resolvers {
    list: RwLock<Vec<Arc<dyn Resolver>>>,
}

impl Resolvers {
    #[must_use]
    pub fn new(resolvers: Vec<Arc<dyn Resolver>>) -> Self {
        Self {
            list: RwLock::new(resolvers),
        }
    }

    /// Current resolvers. Later changes to the list don't affect the snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<dyn Resolver>> {
        self.list.read().clone()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.list.read().iter().map(name_of).collect()
    }

    pub fn push<R: Resolver>(&self, resolver: R) {
        self.list.write().push(Arc::new(resolver));
    }

    /// # Panics
    /// If `index > len`
    pub fn insert<R: Resolver>(&self, index: usize, resolver: R) {
        self.list.write().insert(index, Arc::new(resolver));
    }

    /// Removes the first resolver of type `R`
    pub fn remove<R: Resolver>(&self) -> Option<Arc<R>> {
        let mut list = self.list.write();
        let index = list.iter().position(is::<R>)?;
        downcast(list.remove(index))
    }

    #[must_use]
    pub fn position<R: Resolver>(&self) -> Option<usize> {
        self.list.read().iter().position(is::<R>)
    }

    #[must_use]
    pub fn find<R: Resolver>(&self) -> Option<Arc<R>> {
        let resolver = self.list.read().iter().find(|resolver| is::<R>(resolver)).cloned()?;
        downcast(resolver)
    }

    #[must_use]
    pub fn contains<R: Resolver>(&self) -> bool {
        self.position::<R>().is_some()
    }

    pub(crate) fn any_provides(&self, type_info: &TypeInfo) -> bool {
        self.list.read().iter().any(|resolver| resolver.provides(type_info))
    }

    /// Replaces the first resolver of type `R`, returning it
    pub fn replace<R: Resolver, N: Resolver>(&self, resolver: N) -> Result<Arc<R>, ConfigErrorKind> {
        let mut list = self.list.write();
        let index = list.iter().position(is::<R>).ok_or_else(not_found::<R>)?;
        let replaced = core::mem::replace(&mut list[index], Arc::new(resolver));
        downcast(replaced).ok_or_else(not_found::<R>)
    }

    /// Inserts `resolver` before the first resolver of type `R`
    pub fn insert_before<R: Resolver, N: Resolver>(&self, resolver: N) -> Result<(), ConfigErrorKind> {
        let mut list = self.list.write();
        let index = list.iter().position(is::<R>).ok_or_else(not_found::<R>)?;
        list.insert(index, Arc::new(resolver));
        Ok(())
    }

    /// Inserts `resolver` after the first resolver of type `R`
    pub fn insert_after<R: Resolver, N: Resolver>(&self, resolver: N) -> Result<(), ConfigErrorKind> {
        let mut list = self.list.write();
        let index = list.iter().position(is::<R>).ok_or_else(not_found::<R>)?;
        list.insert(index + 1, Arc::new(resolver));
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.list.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.read().is_empty()
    }

    pub fn clear(&self) {
        self.list.write().clear();
    }
}

impl Default for Resolvers {
    fn default() -> Self {
        Self::new(default_resolvers())
    }
}

impl core::fmt::Debug for Resolvers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
