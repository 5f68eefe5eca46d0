use super::Resolver;
use crate::{context::MockResolutionContext, errors::ResolveErrorKind, instance::Instance, registry::Shape};

/// Resolves `Func<Args, R>` to a factory calling back into the container for `R`
#[derive(Debug, Default, Clone, Copy)]
pub struct FuncResolver;

impl Resolver for FuncResolver {
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind> {
        let Some(descriptor) = context.mocker().registry().get(&context.requested_type()) else {
            return Ok(());
        };
        if let Some(&Shape::Func { build, .. }) = descriptor.shape() {
            context.set_value(Instance::real(build(context.mocker().downgrade())));
        }
        Ok(())
    }
}
