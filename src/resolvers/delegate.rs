use super::Resolver;
use crate::{context::MockResolutionContext, errors::ResolveErrorKind, instance::Instance, registry::Shape};

/// Resolves delegate types declared with `Registry::delegate`. The delegate's factory calls back
/// into the container for its return type.
#[derive(Debug, Default, Clone, Copy)]
pub struct DelegateResolver;

impl Resolver for DelegateResolver {
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind> {
        let Some(descriptor) = context.mocker().registry().get(&context.requested_type()) else {
            return Ok(());
        };
        if let Some(Shape::Delegate { build, .. }) = descriptor.shape() {
            context.set_value(Instance::real(build(context.mocker().downgrade())));
        }
        Ok(())
    }
}
