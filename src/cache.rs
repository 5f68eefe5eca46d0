use dashmap::DashMap;

use crate::{any::TypeInfo, instance::Instance};

#[derive(Debug, Default)]
pub(crate) struct Cache {
    map: DashMap<TypeInfo, Instance>,
}

impl Cache {
    #[must_use]
    pub(crate) fn get(&self, type_info: &TypeInfo) -> Option<Instance> {
        self.map.get(type_info).map(|instance| instance.clone())
    }

    #[must_use]
    pub(crate) fn contains(&self, type_info: &TypeInfo) -> bool {
        self.map.contains_key(type_info)
    }

    /// Overwrites any existing instance
    pub(crate) fn insert(&self, type_info: TypeInfo, instance: Instance) -> Option<Instance> {
        self.map.insert(type_info, instance)
    }

    /// Keeps the existing instance if another resolution won the race
    pub(crate) fn get_or_insert(&self, type_info: TypeInfo, instance: Instance) -> Instance {
        self.map.entry(type_info).or_insert(instance).clone()
    }

    pub(crate) fn remove(&self, type_info: &TypeInfo) -> Option<Instance> {
        self.map.remove(type_info).map(|(_, instance)| instance)
    }

    pub(crate) fn clear(&self) {
        self.map.clear();
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub(crate) fn snapshot(&self) -> Vec<(TypeInfo, Instance)> {
        self.map
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Cache;
    use crate::{
        any::{AnyValue, TypeInfo},
        instance::Instance,
    };

    use std::{sync::Arc, thread};
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_get_or_insert_keeps_first() {
        let cache = Cache::default();
        let type_info = TypeInfo::of::<u8>();
        let first = cache.get_or_insert(type_info, Instance::real(AnyValue::new(Arc::new(1u8))));
        let second = cache.get_or_insert(type_info, Instance::real(AnyValue::new(Arc::new(2u8))));

        assert!(first.value().unwrap().same_object(second.value().unwrap()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    #[traced_test]
    fn test_concurrent_writes() {
        let cache = Arc::new(Cache::default());
        let type_info = TypeInfo::of::<u8>();

        let values: Vec<Instance> = (0..8u8)
            .map(|value| {
                let cache = cache.clone();
                thread::spawn(move || cache.get_or_insert(type_info, Instance::real(AnyValue::new(Arc::new(value)))))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        let first = values[0].value().unwrap();
        assert!(values.iter().all(|value| value.value().unwrap().same_object(first)));
        assert!(cache.remove(&type_info).is_some());
        assert!(!cache.contains(&type_info));
    }
}
