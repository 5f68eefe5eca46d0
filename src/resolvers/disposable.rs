use std::sync::Arc;

use super::Resolver;
use crate::{
    any::{AnyValue, TypeInfo},
    context::MockResolutionContext,
    disposable::{DisposableAggregator, ResolvedObjectsDisposer},
    errors::ResolveErrorKind,
    instance::Instance,
};

/// Resolves `dyn DisposableAggregator` to an aggregator disposing the container's resolved objects
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoMockerDisposableResolver;

impl Resolver for AutoMockerDisposableResolver {
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind> {
        if !context.requested_type().is::<dyn DisposableAggregator>() {
            return Ok(());
        }

        let aggregator: Arc<dyn DisposableAggregator> = Arc::new(ResolvedObjectsDisposer::new(context.mocker().downgrade()));
        context.set_value(Instance::real(AnyValue::new(aggregator)));
        context.set_no_cache();
        Ok(())
    }

    fn provides(&self, type_info: &TypeInfo) -> bool {
        type_info.is::<dyn DisposableAggregator>()
    }
}
