use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::Resolver;
use crate::{
    any::{AnyValue, TypeInfo},
    cancellation::CancellationTokenSource,
    context::MockResolutionContext,
    errors::ResolveErrorKind,
    instance::Instance,
};

/// Resolves a [`CancellationToken`] from a registered [`CancellationTokenSource`],
/// or to a token that is never cancelled
#[derive(Debug, Default, Clone, Copy)]
pub struct CancellationTokenResolver;

impl Resolver for CancellationTokenResolver {
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind> {
        if !context.requested_type().is::<CancellationToken>() {
            return Ok(());
        }

        let source = context
            .mocker()
            .cached(&TypeInfo::of::<CancellationTokenSource>())
            .and_then(|instance| instance.value()?.downcast::<CancellationTokenSource>());
        let token = match source {
            Some(source) => {
                debug!("Token derived from the registered source");
                source.token()
            }
            None => CancellationToken::new(),
        };

        context.set_value(Instance::real(AnyValue::new(Arc::new(token))));
        context.set_no_cache();
        Ok(())
    }

    fn provides(&self, type_info: &TypeInfo) -> bool {
        type_info.is::<CancellationToken>()
    }
}
