use tracing::debug;

use super::Resolver;
use crate::{context::MockResolutionContext, errors::ResolveErrorKind, instance::Instance, registry::Shape};

/// Resolves `Vec<Arc<T>>` to an array holding the cached `T`, or to an empty array if `T` isn't cached.
/// Mocks are never created for array elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrayResolver;

impl Resolver for ArrayResolver {
    fn resolve(&self, context: &mut MockResolutionContext<'_>) -> Result<(), ResolveErrorKind> {
        let Some(descriptor) = context.mocker().registry().get(&context.requested_type()) else {
            return Ok(());
        };
        let Some(&Shape::Array { element, assemble }) = descriptor.shape() else {
            return Ok(());
        };

        let items: Vec<Instance> = context
            .mocker()
            .cached(&element)
            .filter(|instance| !instance.is_null())
            .into_iter()
            .collect();
        let values: Vec<_> = items.iter().filter_map(Instance::value).cloned().collect();

        debug!(element = element.name, len = values.len(), "Array assembled");

        context.set_value(Instance::Array {
            element,
            items,
            value: assemble(&values),
        });
        context.set_no_cache();
        Ok(())
    }
}
