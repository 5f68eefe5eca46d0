use core::fmt;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use super::Resolver;
use crate::{
    any::TypeInfo,
    config::FactoryConfig,
    container::AutoMocker,
    context::{MockResolutionContext, ObjectGraphContext},
    errors::ResolveErrorKind,
    instance::Instance,
};

pub(crate) type Callback =
    Arc<dyn Fn(&AutoMocker, &ObjectGraphContext) -> Result<Instance, ResolveErrorKind> + Send + Sync>;

/// Factories registered with `use_factory` and `with`.
/// A factory runs on first access, its value is cached by the container unless its config says otherwise.
#[derive(Default)]
pub struct CallbackResolver {
    callbacks: DashMap<TypeInfo, (Callback, FactoryConfig)>,
}

impl CallbackResolver {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, type_info: TypeInfo, callback: Callback, config: FactoryConfig) {
        self.callbacks.insert(type_info, (callback, config));
    }

    /// Removes the factory of `type_info`. Already cached values stay in the cache.
    pub fn remove(&self, type_info: &TypeInfo) -> bool {
        self.callbacks.remove(type_info).is_some()
    }

    #[must_use]
    pub fn contains(&self, type_info: &TypeInfo) -> bool {
        self.callbacks.contains_key(type_info)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl Resolver for CallbackResolver {
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind> {
        // The shard lock is released before the factory runs, it may resolve other types
        let Some((callback, config)) = self
            .callbacks
            .get(&context.requested_type())
            .map(|entry| entry.value().clone())
        else {
            return Ok(());
        };

        let instance = callback(context.mocker(), context.graph())?;

        debug!(cache_provides = config.cache_provides, "Factory called");

        context.set_value(instance);
        if !config.cache_provides {
            context.set_no_cache();
        }
        Ok(())
    }

    fn provides(&self, type_info: &TypeInfo) -> bool {
        self.callbacks.contains_key(type_info)
    }
}

impl fmt::Debug for CallbackResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.callbacks.iter().map(|entry| *entry.key()))
            .finish()
    }
}
