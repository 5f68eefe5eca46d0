use super::Resolver;
use crate::{context::MockResolutionContext, errors::ResolveErrorKind, instance::Instance, registry::Shape};

/// Resolves `Sequence<T>` to a sequence of a single resolved `T`
#[derive(Debug, Default, Clone, Copy)]
pub struct EnumerableResolver;

impl Resolver for EnumerableResolver {
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind> {
        let Some(descriptor) = context.mocker().registry().get(&context.requested_type()) else {
            return Ok(());
        };
        let Some(&Shape::Sequence { element, assemble }) = descriptor.shape() else {
            return Ok(());
        };

        let item = context.mocker().resolve_type(element, context.graph())?;
        let values: Vec<_> = item.value().into_iter().cloned().collect();

        context.set_value(Instance::Array {
            element,
            items: vec![item],
            value: assemble(&values),
        });
        Ok(())
    }
}
