use tracing::debug;

use super::Resolver;
use crate::{
    any::TypeInfo, cache::Cache, context::MockResolutionContext, errors::ResolveErrorKind, instance::Instance,
};

/// Previously resolved and registered instances.
/// Must run first: it's what makes repeated resolutions return the same object.
#[derive(Debug, Default)]
pub struct CacheResolver {
    cache: Cache,
}

impl CacheResolver {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, type_info: &TypeInfo) -> Option<Instance> {
        self.cache.get(type_info)
    }

    #[must_use]
    pub fn contains(&self, type_info: &TypeInfo) -> bool {
        self.cache.contains(type_info)
    }

    pub fn remove(&self, type_info: &TypeInfo) -> Option<Instance> {
        self.cache.remove(type_info)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.len() == 0
    }

    #[inline]
    pub(crate) fn cache(&self) -> &Cache {
        &self.cache
    }
}

impl Resolver for CacheResolver {
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind> {
        if let Some(instance) = self.cache.get(&context.requested_type()) {
            debug!("Found in cache");
            context.set_value(instance);
            context.set_no_cache();
        } else {
            debug!("Not found in cache");
        }
        Ok(())
    }

    fn provides(&self, type_info: &TypeInfo) -> bool {
        self.cache.contains(type_info)
    }
}
