use super::Resolver;
use crate::{context::MockResolutionContext, errors::ResolveErrorKind, instance::Instance, registry::Shape};

/// Resolves `Lazy<T>` to a value resolving `T` on first access
#[derive(Debug, Default, Clone, Copy)]
pub struct LazyResolver;

impl Resolver for LazyResolver {
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind> {
        let Some(descriptor) = context.mocker().registry().get(&context.requested_type()) else {
            return Ok(());
        };
        if let Some(&Shape::Lazy { build, .. }) = descriptor.shape() {
            context.set_value(Instance::real(build(context.mocker().downgrade())));
        }
        Ok(())
    }
}
