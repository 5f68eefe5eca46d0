use super::Resolver;
use crate::{context::MockResolutionContext, errors::ResolveErrorKind, instance::Instance};

/// Creates a mock of types that have a proxy, resolving the proxy's own dependencies through the pipeline.
/// Mocks get the container-wide [`crate::Config`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MockResolver;

impl Resolver for MockResolver {
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind> {
        let requested = context.requested_type();
        let mocker = context.mocker();
        let Some(proxy) = mocker.registry().get(&requested).and_then(|descriptor| descriptor.proxy.clone()) else {
            return Ok(());
        };

        let (mock, value) = mocker.create_mock(requested, &proxy, context.graph(), mocker.config())?;
        context.set_value(Instance::mock(mock, value));
        Ok(())
    }
}
