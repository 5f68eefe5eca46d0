use core::cell::RefCell;

use crate::{any::TypeInfo, container::AutoMocker, instance::Instance};

/// State shared by every resolution of one top-level request
#[derive(Debug, Default)]
pub struct ObjectGraphContext {
    enable_private: bool,
    constructing: RefCell<Vec<TypeInfo>>,
}

impl ObjectGraphContext {
    #[inline]
    #[must_use]
    pub fn new(enable_private: bool) -> Self {
        Self {
            enable_private,
            constructing: RefCell::new(Vec::new()),
        }
    }

    /// Non-public constructors may be selected
    #[inline]
    #[must_use]
    pub fn enable_private(&self) -> bool {
        self.enable_private
    }

    /// `type_info` is being constructed higher in the graph
    #[must_use]
    pub fn is_constructing(&self, type_info: &TypeInfo) -> bool {
        self.constructing.borrow().contains(type_info)
    }

    /// Types being constructed, outermost first
    #[must_use]
    pub fn path(&self) -> Vec<TypeInfo> {
        self.constructing.borrow().clone()
    }

    /// Path of the graph closed by `type_info`
    #[must_use]
    pub(crate) fn cycle_with(&self, type_info: TypeInfo) -> Vec<TypeInfo> {
        let mut cycle = self.path();
        cycle.push(type_info);
        cycle
    }

    pub(crate) fn enter(&self, type_info: TypeInfo) -> ConstructionGuard<'_> {
        self.constructing.borrow_mut().push(type_info);
        ConstructionGuard { graph: self, type_info }
    }
}

/// Removes its type from the constructing set on drop
pub(crate) struct ConstructionGuard<'a> {
    graph: &'a ObjectGraphContext,
    type_info: TypeInfo,
}

impl Drop for ConstructionGuard<'_> {
    fn drop(&mut self) {
        let mut constructing = self.graph.constructing.borrow_mut();
        if let Some(index) = constructing.iter().rposition(|type_info| *type_info == self.type_info) {
            constructing.remove(index);
        }
    }
}

/// Resolution of a single requested type, handed to each resolver in turn until one provides a value
pub struct MockResolutionContext<'a> {
    mocker: &'a AutoMocker,
    requested_type: TypeInfo,
    graph: &'a ObjectGraphContext,
    value: Option<Instance>,
    no_cache: bool,
}

impl<'a> MockResolutionContext<'a> {
    #[inline]
    #[must_use]
    pub fn new(mocker: &'a AutoMocker, requested_type: TypeInfo, graph: &'a ObjectGraphContext) -> Self {
        Self {
            mocker,
            requested_type,
            graph,
            value: None,
            no_cache: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn mocker(&self) -> &'a AutoMocker {
        self.mocker
    }

    #[inline]
    #[must_use]
    pub fn requested_type(&self) -> TypeInfo {
        self.requested_type
    }

    #[inline]
    #[must_use]
    pub fn graph(&self) -> &'a ObjectGraphContext {
        self.graph
    }

    /// Provides the value and stops the pipeline. A null instance counts as provided.
    pub fn set_value(&mut self, instance: Instance) {
        self.value = Some(instance);
    }

    pub fn set_null(&mut self) {
        self.value = Some(Instance::null());
    }

    #[inline]
    #[must_use]
    pub fn value_provided(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&Instance> {
        self.value.as_ref()
    }

    /// The provided value isn't written back to the cache
    pub fn set_no_cache(&mut self) {
        self.no_cache = true;
    }

    #[inline]
    #[must_use]
    pub fn no_cache(&self) -> bool {
        self.no_cache
    }

    pub(crate) fn into_parts(self) -> (Option<Instance>, bool) {
        (self.value, self.no_cache)
    }
}
