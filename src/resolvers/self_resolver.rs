use std::sync::Arc;

use super::Resolver;
use crate::{
    any::{AnyValue, TypeInfo},
    container::{AutoMocker, ServiceProvider},
    context::MockResolutionContext,
    errors::ResolveErrorKind,
    instance::Instance,
};

/// Resolves `AutoMocker` and `dyn ServiceProvider` to the container itself
#[derive(Debug, Default, Clone, Copy)]
pub struct SelfResolver;

impl Resolver for SelfResolver {
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind> {
        let requested = context.requested_type();
        let value = if requested.is::<AutoMocker>() {
            AnyValue::new(Arc::new(context.mocker().clone()))
        } else if requested.is::<dyn ServiceProvider>() {
            let provider: Arc<dyn ServiceProvider> = Arc::new(context.mocker().clone());
            AnyValue::new(provider)
        } else {
            return Ok(());
        };

        context.set_value(Instance::real(value));
        context.set_no_cache();
        Ok(())
    }

    fn provides(&self, type_info: &TypeInfo) -> bool {
        type_info.is::<AutoMocker>() || type_info.is::<dyn ServiceProvider>()
    }
}
