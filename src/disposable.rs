use std::collections::BTreeSet;
use tracing::{debug, info_span};

use crate::{any::TypeInfo, container::WeakAutoMocker};

/// Value holding resources released by the container's dispose sweep
pub trait Disposable: Send + Sync {
    fn dispose(&self);
}

/// Disposes objects of a container. Resolving `dyn DisposableAggregator` yields the aggregator
/// of the container, unless another one was registered with `use_value`.
pub trait DisposableAggregator: Disposable {}

/// Default aggregator: disposes every disposable value in the cache once, skipping aggregators
#[derive(Debug, Clone)]
pub(crate) struct ResolvedObjectsDisposer {
    mocker: WeakAutoMocker,
}

impl ResolvedObjectsDisposer {
    #[inline]
    #[must_use]
    pub(crate) fn new(mocker: WeakAutoMocker) -> Self {
        Self { mocker }
    }
}

impl Disposable for ResolvedObjectsDisposer {
    fn dispose(&self) {
        let span = info_span!("dispose");
        let _guard = span.enter();

        let Some(mocker) = self.mocker.upgrade() else {
            debug!("Container has been dropped, nothing to dispose");
            return;
        };

        let aggregator = TypeInfo::of::<dyn DisposableAggregator>();
        let mut disposed = BTreeSet::new();
        for (type_info, value) in mocker.resolved_objects() {
            let Some(value) = value else { continue };
            if type_info == aggregator || !disposed.insert(value.addr()) {
                continue;
            }
            if value.dispose() {
                debug!(dependency = type_info.name, "Disposed");
            }
        }
    }
}

impl DisposableAggregator for ResolvedObjectsDisposer {}
