use core::{fmt, marker::PhantomData};
use parking_lot::RwLock;
use std::{collections::BTreeMap, sync::Arc};
use tracing::debug;

use crate::{
    any::{dispose_value, AnyValue, Disposer, TypeInfo},
    container::WeakAutoMocker,
    dependency::Dependency,
    disposable::Disposable,
    instantiator::{
        boxed_instantiator, boxed_proxy_instantiator, BoxedInstantiator, BoxedProxyInstantiator, Instantiator,
        ProxyInstantiator,
    },
    parameter::Parameters,
    shapes::{self, Func},
};

/// Constructor visibility. Non-public constructors are only selected by
/// `create_instance_with(true)` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    NonPublic,
}

impl Visibility {
    #[inline]
    #[must_use]
    pub(crate) fn is_visible(self, enable_private: bool) -> bool {
        enable_private || self == Self::Public
    }
}

#[derive(Clone)]
pub(crate) struct Constructor {
    pub(crate) visibility: Visibility,
    pub(crate) dependencies: Vec<Dependency>,
    pub(crate) instantiator: BoxedInstantiator,
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("visibility", &self.visibility)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub(crate) struct ProxyDescriptor {
    pub(crate) proxy_type: TypeInfo,
    pub(crate) dependencies: Vec<Dependency>,
    pub(crate) instantiator: BoxedProxyInstantiator,
}

pub(crate) type Cast = Arc<dyn Fn(&AnyValue) -> Option<AnyValue> + Send + Sync>;
pub(crate) type DelegateBuilder = Arc<dyn Fn(WeakAutoMocker) -> AnyValue + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Shape {
    Array {
        element: TypeInfo,
        assemble: fn(&[AnyValue]) -> AnyValue,
    },
    Sequence {
        element: TypeInfo,
        assemble: fn(&[AnyValue]) -> AnyValue,
    },
    Func {
        returns: TypeInfo,
        build: fn(WeakAutoMocker) -> AnyValue,
    },
    Delegate {
        returns: TypeInfo,
        build: DelegateBuilder,
    },
    Lazy {
        of: TypeInfo,
        build: fn(WeakAutoMocker) -> AnyValue,
    },
}

#[derive(Clone)]
pub(crate) enum TypeKind {
    Interface,
    Class { sealed: bool },
    Shape(Shape),
}

#[derive(Clone)]
pub(crate) struct TypeDescriptor {
    pub(crate) type_info: TypeInfo,
    pub(crate) kind: TypeKind,
    pub(crate) constructors: Vec<Constructor>,
    pub(crate) proxy: Option<ProxyDescriptor>,
    pub(crate) disposer: Option<Disposer>,
}

impl TypeDescriptor {
    fn new(type_info: TypeInfo, kind: TypeKind) -> Self {
        Self {
            type_info,
            kind,
            constructors: Vec::new(),
            proxy: None,
            disposer: None,
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn is_sealed(&self) -> bool {
        matches!(self.kind, TypeKind::Class { sealed: true })
    }

    #[inline]
    #[must_use]
    pub(crate) fn shape(&self) -> Option<&Shape> {
        match &self.kind {
            TypeKind::Shape(shape) => Some(shape),
            _ => None,
        }
    }
}

/// Type that registers its own descriptors, see [`Registry::describe`]
pub trait Describe: 'static {
    fn describe(registry: &Registry);
}

/// Descriptions of the types the container can construct, mock or synthesize.
///
/// A type without a descriptor is sealed: it can't be constructed or mocked,
/// so it has to be registered with one of the `use_*` methods of the container.
#[derive(Default)]
pub struct Registry {
    descriptors: RwLock<BTreeMap<TypeInfo, Arc<TypeDescriptor>>>,
    casts: RwLock<BTreeMap<(TypeInfo, TypeInfo), Cast>>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a trait-object key. Interfaces become mockable once a proxy implementing them is registered.
    pub fn interface<T>(&self) -> &Self
    where
        T: ?Sized + 'static,
    {
        self.update(TypeInfo::of::<T>(), || TypeKind::Interface, |_| ());
        self
    }

    /// Declares a concrete type, returning a builder for its constructors and casts
    pub fn class<T>(&self) -> ClassBuilder<'_, T>
    where
        T: Send + Sync + 'static,
    {
        self.update(
            TypeInfo::of::<T>(),
            || TypeKind::Class { sealed: false },
            |descriptor| {
                if !matches!(descriptor.kind, TypeKind::Class { .. }) {
                    descriptor.kind = TypeKind::Class { sealed: false };
                }
            },
        );
        ClassBuilder {
            registry: self,
            _marker: PhantomData,
        }
    }

    /// Registers a proxy type built from an interceptor and its own dependencies.
    /// The proxy answers for the types named with [`ProxyBuilder::implements`] and for `P` itself.
    pub fn proxy<P, Inst, Deps>(&self, instantiator: Inst) -> ProxyBuilder<'_, P>
    where
        P: Send + Sync + 'static,
        Inst: ProxyInstantiator<Deps, Provides = P> + Send + Sync,
        Deps: Parameters,
    {
        let proxy = ProxyDescriptor {
            proxy_type: TypeInfo::of::<P>(),
            dependencies: Deps::dependencies(self),
            instantiator: boxed_proxy_instantiator(instantiator),
        };
        self.update(
            proxy.proxy_type,
            || TypeKind::Class { sealed: false },
            |descriptor| descriptor.proxy = Some(proxy.clone()),
        );

        debug!(proxy = proxy.proxy_type.name, "Proxy registered");

        ProxyBuilder {
            registry: self,
            proxy,
            _marker: PhantomData,
        }
    }

    /// Registers how a shared `S` is viewed as a `T`, usually a trait object it implements
    pub fn cast<S, T>(&self, cast: fn(Arc<S>) -> Arc<T>) -> &Self
    where
        S: ?Sized + Send + Sync + 'static,
        T: ?Sized + Send + Sync + 'static,
    {
        let erased: Cast = Arc::new(move |value: &AnyValue| value.downcast::<S>().map(|value| AnyValue::new(cast(value))));
        self.casts.write().insert((TypeInfo::of::<S>(), TypeInfo::of::<T>()), erased);
        self
    }

    /// Declares `D` as a delegate type wrapping a factory of `R`
    pub fn delegate<D, R>(&self, wrap: fn(Func<(), R>) -> D) -> &Self
    where
        D: Send + Sync + 'static,
        R: ?Sized + Send + Sync + 'static,
    {
        let shape = shapes::delegate(wrap);
        self.update(
            TypeInfo::of::<D>(),
            || TypeKind::Shape(shape.clone()),
            |descriptor| descriptor.kind = TypeKind::Shape(shape.clone()),
        );
        self
    }

    pub fn describe<T: Describe>(&self) -> &Self {
        T::describe(self);
        self
    }

    #[must_use]
    pub fn contains(&self, type_info: &TypeInfo) -> bool {
        self.descriptors.read().contains_key(type_info)
    }

    #[must_use]
    pub fn is_sealed(&self, type_info: &TypeInfo) -> bool {
        self.get(type_info).map_or(true, |descriptor| descriptor.is_sealed())
    }

    /// Proxy type that mocks `type_info`, if any
    #[must_use]
    pub fn proxy_type(&self, type_info: &TypeInfo) -> Option<TypeInfo> {
        self.get(type_info)
            .and_then(|descriptor| descriptor.proxy.as_ref().map(|proxy| proxy.proxy_type))
    }

    #[must_use]
    pub fn can_cast(&self, source: &TypeInfo, target: &TypeInfo) -> bool {
        source == target || self.casts.read().contains_key(&(*source, *target))
    }

    pub(crate) fn get(&self, type_info: &TypeInfo) -> Option<Arc<TypeDescriptor>> {
        self.descriptors.read().get(type_info).cloned()
    }

    pub(crate) fn proxy_descriptor(&self, type_info: &TypeInfo) -> Option<ProxyDescriptor> {
        self.get(type_info)?.proxy.clone()
    }

    pub(crate) fn register_shape(&self, type_info: TypeInfo, shape: fn() -> Shape) {
        if self.contains(&type_info) {
            return;
        }
        self.descriptors
            .write()
            .entry(type_info)
            .or_insert_with(|| Arc::new(TypeDescriptor::new(type_info, TypeKind::Shape(shape()))));
    }

    pub(crate) fn cast_value(&self, value: &AnyValue, target: &TypeInfo) -> Option<AnyValue> {
        if value.type_info() == *target {
            return Some(value.clone());
        }
        let cast = self.casts.read().get(&(value.type_info(), *target)).cloned()?;
        cast(value)
    }

    /// Proxy able to answer for all of `types`. The proxy of the first type is preferred.
    pub(crate) fn proxy_implementing(&self, types: &[TypeInfo]) -> Option<ProxyDescriptor> {
        let implements_all =
            |proxy: &ProxyDescriptor| types.iter().all(|type_info| self.can_cast(&proxy.proxy_type, type_info));

        let primary = types.first().and_then(|type_info| self.get(type_info)?.proxy.clone());
        if let Some(proxy) = primary.filter(|proxy| implements_all(proxy)) {
            return Some(proxy);
        }

        let proxies: Vec<ProxyDescriptor> = self
            .descriptors
            .read()
            .values()
            .filter_map(|descriptor| descriptor.proxy.clone())
            .collect();
        proxies.into_iter().find(|proxy| implements_all(proxy))
    }

    fn update(&self, type_info: TypeInfo, kind: impl FnOnce() -> TypeKind, update: impl FnOnce(&mut TypeDescriptor)) {
        let mut descriptors = self.descriptors.write();
        let descriptor = descriptors
            .entry(type_info)
            .or_insert_with(|| Arc::new(TypeDescriptor::new(type_info, kind())));
        update(Arc::make_mut(descriptor));
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.descriptors.read().keys()).finish()
    }
}

/// Builder returned by [`Registry::class`]
pub struct ClassBuilder<'r, T> {
    registry: &'r Registry,
    _marker: PhantomData<fn() -> T>,
}

impl<'r, T> ClassBuilder<'r, T>
where
    T: Send + Sync + 'static,
{
    pub fn constructor<Inst, Deps>(self, instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Provides = T> + Send + Sync,
        Deps: Parameters,
    {
        self.add_constructor(Visibility::Public, instantiator)
    }

    pub fn non_public_constructor<Inst, Deps>(self, instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Provides = T> + Send + Sync,
        Deps: Parameters,
    {
        self.add_constructor(Visibility::NonPublic, instantiator)
    }

    /// The type can't be mocked and is only injected when registered
    pub fn sealed(self) -> Self {
        self.registry.update(
            TypeInfo::of::<T>(),
            || TypeKind::Class { sealed: true },
            |descriptor| descriptor.kind = TypeKind::Class { sealed: true },
        );
        self
    }

    /// Constructed instances take part in the container's dispose sweep
    pub fn disposable(self) -> Self
    where
        T: Disposable,
    {
        self.registry.update(
            TypeInfo::of::<T>(),
            || TypeKind::Class { sealed: false },
            |descriptor| descriptor.disposer = Some(dispose_value::<T>),
        );
        self
    }

    pub fn implements<I>(self, cast: fn(Arc<T>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.registry.cast(cast);
        self
    }

    fn add_constructor<Inst, Deps>(self, visibility: Visibility, instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Provides = T> + Send + Sync,
        Deps: Parameters,
    {
        let constructor = Constructor {
            visibility,
            dependencies: Deps::dependencies(self.registry),
            instantiator: boxed_instantiator(instantiator),
        };
        self.registry.update(
            TypeInfo::of::<T>(),
            || TypeKind::Class { sealed: false },
            |descriptor| descriptor.constructors.push(constructor),
        );
        self
    }
}

/// Builder returned by [`Registry::proxy`]
pub struct ProxyBuilder<'r, P> {
    registry: &'r Registry,
    proxy: ProxyDescriptor,
    _marker: PhantomData<fn() -> P>,
}

impl<'r, P> ProxyBuilder<'r, P>
where
    P: Send + Sync + 'static,
{
    /// The proxy answers for `I`. It becomes the mock of `I` unless `I` already has one.
    pub fn implements<I>(self, cast: fn(Arc<P>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.registry.cast(cast);
        self.registry.update(
            TypeInfo::of::<I>(),
            || TypeKind::Interface,
            |descriptor| {
                if descriptor.proxy.is_none() {
                    descriptor.proxy = Some(self.proxy.clone());
                }
            },
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Registry, Visibility};
    use crate::{
        any::{AnyValue, TypeInfo},
        errors::InstantiateErrorKind,
        mock::Interceptor,
    };

    use std::sync::Arc;
    use tracing_test::traced_test;

    trait Base: Send + Sync {}
    trait Derived: Base {}

    struct Proxy(#[allow(dead_code)] Arc<Interceptor>);

    impl Base for Proxy {}
    impl Derived for Proxy {}

    struct OtherProxy;

    impl Base for OtherProxy {}

    struct Service;

    impl Base for Service {}

    #[test]
    #[traced_test]
    fn test_unknown_types_are_sealed() {
        let registry = Registry::new();
        registry.interface::<dyn Base>();
        registry.class::<Service>();
        registry.class::<String>().sealed();

        assert!(registry.is_sealed(&TypeInfo::of::<u32>()));
        assert!(registry.is_sealed(&TypeInfo::of::<String>()));
        assert!(!registry.is_sealed(&TypeInfo::of::<dyn Base>()));
        assert!(!registry.is_sealed(&TypeInfo::of::<Service>()));
    }

    #[test]
    #[traced_test]
    fn test_constructors() {
        let registry = Registry::new();
        registry
            .class::<Service>()
            .constructor(|| Ok::<_, InstantiateErrorKind>(Service))
            .non_public_constructor(|_: Arc<dyn Base>| Ok::<_, InstantiateErrorKind>(Service));

        let descriptor = registry.get(&TypeInfo::of::<Service>()).unwrap();
        assert_eq!(descriptor.constructors.len(), 2);
        assert_eq!(descriptor.constructors[1].visibility, Visibility::NonPublic);
        assert_eq!(descriptor.constructors[1].dependencies[0].type_info, TypeInfo::of::<dyn Base>());
    }

    #[test]
    #[traced_test]
    fn test_casts() {
        let registry = Registry::new();
        registry.class::<Service>().implements(|service| service as Arc<dyn Base>);

        let value = AnyValue::new(Arc::new(Service));
        let cast = registry.cast_value(&value, &TypeInfo::of::<dyn Base>()).unwrap();

        assert!(cast.is::<dyn Base>());
        assert!(cast.same_object(&value));
        assert!(registry.cast_value(&value, &TypeInfo::of::<dyn Derived>()).is_none());
    }

    #[test]
    #[traced_test]
    fn test_first_proxy_wins() {
        let registry = Registry::new();
        registry
            .proxy(|_: Arc<Interceptor>| OtherProxy)
            .implements(|proxy| proxy as Arc<dyn Base>);
        registry
            .proxy(Proxy)
            .implements(|proxy| proxy as Arc<dyn Base>)
            .implements(|proxy| proxy as Arc<dyn Derived>);

        assert_eq!(
            registry.proxy_type(&TypeInfo::of::<dyn Base>()),
            Some(TypeInfo::of::<OtherProxy>())
        );
        assert_eq!(
            registry.proxy_type(&TypeInfo::of::<dyn Derived>()),
            Some(TypeInfo::of::<Proxy>())
        );

        let combined = registry
            .proxy_implementing(&[TypeInfo::of::<dyn Base>(), TypeInfo::of::<dyn Derived>()])
            .unwrap();
        assert_eq!(combined.proxy_type, TypeInfo::of::<Proxy>());
    }
}
