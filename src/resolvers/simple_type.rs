use core::fmt;
use once_cell::sync::OnceCell;
use std::sync::Arc;

use super::Resolver;
use crate::{
    any::{AnyValue, TypeInfo},
    container::AutoMocker,
    context::MockResolutionContext,
    errors::ResolveErrorKind,
    instance::Instance,
};

type Alias<T> = (TypeInfo, Arc<dyn Fn(Arc<T>) -> AnyValue + Send + Sync>);

/// Provides one fixed value of `T`, created on first use, for `T` and the aliases it's viewed as.
///
/// ```ignore
/// mocker.resolvers().insert_before::<MockResolver, _>(
///     SimpleTypeResolver::new(|_| Arc::new(FakeClock::default()))
///         .alias(|clock| clock as Arc<dyn Clock>),
/// )?;
/// ```
pub struct SimpleTypeResolver<T: ?Sized> {
    factory: Arc<dyn Fn(&AutoMocker) -> Arc<T> + Send + Sync>,
    value: OnceCell<Arc<T>>,
    aliases: Vec<Alias<T>>,
}

impl<T> SimpleTypeResolver<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    #[must_use]
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&AutoMocker) -> Arc<T> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            value: OnceCell::new(),
            aliases: Vec::new(),
        }
    }

    /// Also provide the value as `I`
    #[must_use]
    pub fn alias<I>(mut self, cast: fn(Arc<T>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.aliases
            .push((TypeInfo::of::<I>(), Arc::new(move |value: Arc<T>| AnyValue::new(cast(value)))));
        self
    }

    fn value(&self, mocker: &AutoMocker) -> Arc<T> {
        self.value.get_or_init(|| (self.factory)(mocker)).clone()
    }
}

impl<T> Resolver for SimpleTypeResolver<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind> {
        let requested = context.requested_type();
        let value = if requested.is::<T>() {
            AnyValue::new(self.value(context.mocker()))
        } else if let Some((_, alias)) = self.aliases.iter().find(|(type_info, _)| *type_info == requested) {
            alias(self.value(context.mocker()))
        } else {
            return Ok(());
        };

        context.set_value(Instance::real(value));
        Ok(())
    }

    fn provides(&self, type_info: &TypeInfo) -> bool {
        type_info.is::<T>() || self.aliases.iter().any(|(alias, _)| alias == type_info)
    }
}

impl<T: ?Sized> fmt::Debug for SimpleTypeResolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleTypeResolver")
            .field("created", &self.value.get().is_some())
            .finish_non_exhaustive()
    }
}
