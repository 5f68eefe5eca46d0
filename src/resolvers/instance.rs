use super::Resolver;
use crate::{
    context::MockResolutionContext,
    errors::ResolveErrorKind,
    instance::Instance,
    registry::TypeKind,
};

/// Constructs concrete types that have constructors and no mock proxy
#[derive(Debug, Default, Clone, Copy)]
pub struct InstanceResolver;

impl Resolver for InstanceResolver {
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind> {
        let Some(descriptor) = context.mocker().registry().get(&context.requested_type()) else {
            return Ok(());
        };
        if !matches!(descriptor.kind, TypeKind::Class { .. })
            || descriptor.proxy.is_some()
            || descriptor.constructors.is_empty()
        {
            return Ok(());
        }

        let value = context.mocker().construct(&descriptor, context.graph())?;
        context.set_value(Instance::real(value));
        Ok(())
    }
}
