use tracing::debug;

use crate::{
    any::TypeInfo,
    context::ObjectGraphContext,
    dependency::Dependency,
    errors::ResolveErrorKind,
    registry::{Constructor, Registry, TypeDescriptor},
};

/// Picks the constructor the container calls to build a type.
///
/// Among the visible constructors the one with the most parameters wins, the earliest one on a tie.
/// A constructor is skipped if one of its parameters can't be satisfied: a type being constructed
/// higher in the graph, or a sealed type, unless the parameter type is already known.
/// Shaped parameters (arrays, sequences, factories, lazies) never disqualify a constructor.
pub(crate) struct ConstructorSelector<'a, K> {
    registry: &'a Registry,
    is_known: K,
}

impl<'a, K> ConstructorSelector<'a, K>
where
    K: Fn(&TypeInfo) -> bool,
{
    #[inline]
    #[must_use]
    pub(crate) fn new(registry: &'a Registry, is_known: K) -> Self {
        Self { registry, is_known }
    }

    pub(crate) fn select_for(
        &self,
        descriptor: &TypeDescriptor,
        graph: &ObjectGraphContext,
    ) -> Result<Constructor, ResolveErrorKind> {
        let mut best: Option<&Constructor> = None;
        let mut cycle = Vec::new();

        for constructor in descriptor
            .constructors
            .iter()
            .filter(|constructor| constructor.visibility.is_visible(graph.enable_private()))
        {
            if best.is_some_and(|best| constructor.dependencies.len() <= best.dependencies.len()) {
                continue;
            }

            match self.disqualifying(&constructor.dependencies, graph) {
                Some(Disqualified::Constructing(type_info)) => {
                    debug!(dependency = type_info.name, "Constructor skipped, dependency is being constructed");
                    if cycle.is_empty() {
                        cycle = graph.cycle_with(type_info);
                    }
                }
                Some(Disqualified::Sealed(type_info)) => {
                    debug!(dependency = type_info.name, "Constructor skipped, dependency is sealed");
                }
                None => best = Some(constructor),
            }
        }

        match best {
            Some(constructor) => Ok(constructor.clone()),
            None => Err(ResolveErrorKind::NoViableConstructor {
                type_info: descriptor.type_info,
                cycle,
            }),
        }
    }

    fn disqualifying(&self, dependencies: &[Dependency], graph: &ObjectGraphContext) -> Option<Disqualified> {
        dependencies.iter().find_map(|dependency| {
            let type_info = dependency.type_info;
            if (self.is_known)(&type_info) {
                None
            } else if graph.is_constructing(&type_info) {
                Some(Disqualified::Constructing(type_info))
            } else if !dependency.kind.is_shape() && self.registry.is_sealed(&type_info) {
                Some(Disqualified::Sealed(type_info))
            } else {
                None
            }
        })
    }
}

enum Disqualified {
    Constructing(TypeInfo),
    Sealed(TypeInfo),
}

#[cfg(test)]
mod tests {
    use super::ConstructorSelector;
    use crate::{
        any::TypeInfo,
        context::ObjectGraphContext,
        errors::{InstantiateErrorKind, ResolveErrorKind},
        registry::{Registry, Visibility},
    };

    use std::sync::Arc;
    use tracing_test::traced_test;

    trait Service: Send + Sync {}

    struct Target;

    fn descriptor(registry: &Registry) -> Arc<crate::registry::TypeDescriptor> {
        registry.get(&TypeInfo::of::<Target>()).unwrap()
    }

    #[test]
    #[traced_test]
    fn test_most_parameters_wins() {
        let registry = Registry::new();
        registry.interface::<dyn Service>();
        registry
            .class::<Target>()
            .constructor(|| Ok::<_, InstantiateErrorKind>(Target))
            .constructor(|_: Arc<dyn Service>, _: Arc<dyn Service>| Ok::<_, InstantiateErrorKind>(Target))
            .constructor(|_: Arc<dyn Service>| Ok::<_, InstantiateErrorKind>(Target));

        let selector = ConstructorSelector::new(&registry, |_: &TypeInfo| false);
        let constructor = selector
            .select_for(&descriptor(&registry), &ObjectGraphContext::new(false))
            .unwrap();

        assert_eq!(constructor.dependencies.len(), 2);
    }

    #[test]
    #[traced_test]
    fn test_sealed_parameter_unless_known() {
        let registry = Registry::new();
        registry
            .class::<Target>()
            .constructor(|| Ok::<_, InstantiateErrorKind>(Target))
            .constructor(|_: Arc<String>| Ok::<_, InstantiateErrorKind>(Target))
            .constructor(|_: Vec<Arc<String>>, _: Vec<Arc<String>>, _: Vec<Arc<String>>| {
                Ok::<_, InstantiateErrorKind>(Target)
            });
        let graph = ObjectGraphContext::new(false);

        let unknown = ConstructorSelector::new(&registry, |_: &TypeInfo| false);
        assert_eq!(
            unknown.select_for(&descriptor(&registry), &graph).unwrap().dependencies.len(),
            3
        );

        let registry = Registry::new();
        registry
            .class::<Target>()
            .constructor(|| Ok::<_, InstantiateErrorKind>(Target))
            .constructor(|_: Arc<String>| Ok::<_, InstantiateErrorKind>(Target));

        let unknown = ConstructorSelector::new(&registry, |_: &TypeInfo| false);
        assert!(unknown.select_for(&descriptor(&registry), &graph).unwrap().dependencies.is_empty());

        let known = ConstructorSelector::new(&registry, |type_info: &TypeInfo| type_info.is::<String>());
        assert_eq!(known.select_for(&descriptor(&registry), &graph).unwrap().dependencies.len(), 1);
    }

    #[test]
    #[traced_test]
    fn test_visibility() {
        let registry = Registry::new();
        registry
            .class::<Target>()
            .non_public_constructor(|| Ok::<_, InstantiateErrorKind>(Target));
        let selector = ConstructorSelector::new(&registry, |_: &TypeInfo| false);

        let err = selector
            .select_for(&descriptor(&registry), &ObjectGraphContext::new(false))
            .unwrap_err();
        assert!(err.is_no_viable_constructor());

        let constructor = selector
            .select_for(&descriptor(&registry), &ObjectGraphContext::new(true))
            .unwrap();
        assert_eq!(constructor.visibility, Visibility::NonPublic);
    }

    #[test]
    #[traced_test]
    fn test_constructing_dependency() {
        let registry = Registry::new();
        registry.class::<Target>().constructor(|_: Arc<Target>| Ok::<_, InstantiateErrorKind>(Target));
        let selector = ConstructorSelector::new(&registry, |_: &TypeInfo| false);
        let graph = ObjectGraphContext::new(false);
        let _guard = graph.enter(TypeInfo::of::<Target>());

        match selector.select_for(&descriptor(&registry), &graph) {
            Err(ResolveErrorKind::NoViableConstructor { type_info, cycle }) => {
                assert_eq!(type_info, TypeInfo::of::<Target>());
                assert_eq!(cycle, vec![TypeInfo::of::<Target>(), TypeInfo::of::<Target>()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
