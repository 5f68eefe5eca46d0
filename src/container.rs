use core::{any::type_name, fmt, iter};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Weak},
};
use tracing::{debug, debug_span, error, info_span};

use crate::{
    any::{AnyValue, TypeInfo},
    config::{Config, FactoryConfig, SelfMockOptions},
    constructor_selector::ConstructorSelector,
    context::{MockResolutionContext, ObjectGraphContext},
    dependency::Dependency,
    disposable::{Disposable, DisposableAggregator},
    errors::{ArgumentErrorKind, ConfigErrorKind, ResolveErrorKind, VerifyErrorKind},
    instance::Instance,
    instantiator::{boxed_instantiator, boxed_shared_instantiator, BoxedInstantiator, Instantiator},
    mock::{ErasedMock, Interceptor, Mock, SelfMock, Setup, Times},
    parameter::{Arguments, Parameter, Parameters},
    registry::{ProxyDescriptor, Registry, TypeDescriptor, TypeKind},
    resolvers::{self, CacheResolver, Callback, CallbackResolver, Resolver, Resolvers},
};

/// Container that builds systems under test, mocking every dependency that isn't registered.
///
/// Clones share the same cache, registry and resolvers.
#[derive(Clone)]
pub struct AutoMocker {
    inner: Arc<AutoMockerInner>,
}

struct AutoMockerInner {
    resolvers: Resolvers,
    registry: Registry,
    config: Config,
}

/// Non-owning handle of a container, held by synthesized factories and mocks
#[derive(Clone, Default)]
pub struct WeakAutoMocker {
    inner: Weak<AutoMockerInner>,
}

impl WeakAutoMocker {
    /// Handle that never upgrades
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn upgrade(&self) -> Option<AutoMocker> {
        self.inner.upgrade().map(|inner| AutoMocker { inner })
    }
}

impl fmt::Debug for WeakAutoMocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakAutoMocker")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Resolves values by type at runtime
pub trait ServiceProvider: Send + Sync {
    fn get_service(&self, type_info: TypeInfo) -> Result<Option<AnyValue>, ResolveErrorKind>;
}

impl ServiceProvider for AutoMocker {
    fn get_service(&self, type_info: TypeInfo) -> Result<Option<AnyValue>, ResolveErrorKind> {
        self.get_any(type_info)
    }
}

/// Types a mock is forwarded to by [`AutoMocker::combine_with`], written as a tuple of `Arc<T>`
pub trait ForwardTypes {
    fn type_infos() -> Vec<TypeInfo>;
}

macro_rules! impl_forward_types {
    (
        [$($ty:ident),*]
    ) => {
        impl<$($ty,)*> ForwardTypes for ($(Arc<$ty>,)*)
        where
            $( $ty: ?Sized + 'static, )*
        {
            fn type_infos() -> Vec<TypeInfo> {
                vec![$(TypeInfo::of::<$ty>(),)*]
            }
        }
    };
}

all_the_forward_tuples!(impl_forward_types);

impl AutoMocker {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a container whose mocks use `config`
    #[inline]
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self::with_resolvers(config, resolvers::default_resolvers())
    }

    #[must_use]
    pub fn with_resolvers(config: Config, resolvers: Vec<Arc<dyn Resolver>>) -> Self {
        Self {
            inner: Arc::new(AutoMockerInner {
                resolvers: Resolvers::new(resolvers),
                registry: Registry::new(),
                config,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> Config {
        self.inner.config
    }

    /// Descriptions of the types this container constructs and mocks
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    #[inline]
    #[must_use]
    pub fn resolvers(&self) -> &Resolvers {
        &self.inner.resolvers
    }

    #[inline]
    #[must_use]
    pub fn downgrade(&self) -> WeakAutoMocker {
        WeakAutoMocker {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Creates an instance of `T` using its public constructors, resolving every parameter.
    /// The instance itself isn't cached, its dependencies are.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::NoViableConstructor`] if no constructor can be satisfied, including cyclic dependencies
    /// - [`ResolveErrorKind::Instantiate`] with the original error if a constructor failed
    pub fn create_instance<T>(&self) -> Result<Arc<T>, ResolveErrorKind>
    where
        T: Send + Sync + 'static,
    {
        self.create_instance_with(false)
    }

    /// Same as [`Self::create_instance`], non-public constructors are considered if `enable_private` is `true`
    #[allow(clippy::missing_errors_doc)]
    pub fn create_instance_with<T>(&self, enable_private: bool) -> Result<Arc<T>, ResolveErrorKind>
    where
        T: Send + Sync + 'static,
    {
        let span = info_span!("create_instance", dependency = type_name::<T>());
        let _guard = span.enter();

        let value = self.create_instance_any(TypeInfo::of::<T>(), enable_private)?;
        downcast_value(&value)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn create_instance_any(&self, type_info: TypeInfo, enable_private: bool) -> Result<AnyValue, ResolveErrorKind> {
        let descriptor = self.class_descriptor(type_info)?;
        self.construct(&descriptor, &ObjectGraphContext::new(enable_private))
    }

    /// Creates a partial mock of `T`: a real instance built like [`Self::create_instance`],
    /// wrapped in its [`SelfMock::Proxy`]
    #[allow(clippy::missing_errors_doc)]
    pub fn create_self_mock<T: SelfMock>(&self) -> Result<Mock<T::Proxy>, ResolveErrorKind> {
        self.create_self_mock_with::<T>(SelfMockOptions::default())
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn create_self_mock_with<T: SelfMock>(&self, options: SelfMockOptions) -> Result<Mock<T::Proxy>, ResolveErrorKind> {
        let span = info_span!("create_self_mock", dependency = type_name::<T>());
        let _guard = span.enter();

        let type_info = TypeInfo::of::<T>();
        let descriptor = self.class_descriptor(type_info)?;
        let base = downcast_value::<T>(&self.construct(&descriptor, &ObjectGraphContext::new(options.enable_private))?)?;

        let interceptor = Arc::new(Interceptor::new(type_info, options.apply(self.config()), self.downgrade()));
        let proxy = Arc::new(T::self_mock(base, interceptor.clone()));

        debug!("Self mock created");

        Ok(Mock::new(interceptor, proxy.clone(), proxy))
    }

    /// Resolves `T` through the resolver pipeline
    ///
    /// # Errors
    /// - [`ResolveErrorKind::Null`] if `T` was registered as null, see [`Self::get_optional`]
    /// - [`ResolveErrorKind::Unresolved`] if no resolver provides `T`
    pub fn get<T>(&self) -> Result<Arc<T>, ResolveErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let span = info_span!("get", dependency = type_name::<T>());
        let _guard = span.enter();

        let type_info = TypeInfo::of::<T>();
        match self.get_instance(type_info, false)?.value() {
            Some(value) => downcast_value(value),
            None => {
                let err = ResolveErrorKind::Null { type_info };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Same as [`Self::get`], a null registration resolves to `None`
    #[allow(clippy::missing_errors_doc)]
    pub fn get_optional<T>(&self) -> Result<Option<Arc<T>>, ResolveErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let span = info_span!("get_optional", dependency = type_name::<T>());
        let _guard = span.enter();

        self.get_instance(TypeInfo::of::<T>(), false)?
            .value()
            .map(downcast_value)
            .transpose()
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn get_any(&self, type_info: TypeInfo) -> Result<Option<AnyValue>, ResolveErrorKind> {
        let span = info_span!("get_any", dependency = type_info.name);
        let _guard = span.enter();

        self.get_instance(type_info, false).map(Instance::into_value)
    }

    /// Resolves a shaped parameter, for example `Vec<Arc<dyn Service>>`, `Lazy<T>` or `Func<(), T>`
    #[allow(clippy::missing_errors_doc)]
    pub fn resolve<P: Parameter>(&self) -> Result<P, ResolveErrorKind> {
        let dependency = P::dependency(self.registry());

        let span = info_span!("resolve", dependency = dependency.type_info.name);
        let _guard = span.enter();

        let instance = self.get_instance(dependency.type_info, false)?;
        P::extract(instance.value()).inspect_err(|err| error!("{}", err))
    }

    /// Resolves the mock of `T`
    ///
    /// # Errors
    /// - [`ResolveErrorKind::NotAMock`] if `T` is registered as a real instance
    /// - [`ResolveErrorKind::NullMock`] if `T` is registered as null
    pub fn get_mock<T>(&self) -> Result<Mock<T>, ResolveErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_mock_with(false)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn get_mock_with<T>(&self, enable_private: bool) -> Result<Mock<T>, ResolveErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let span = info_span!("get_mock", dependency = type_name::<T>());
        let _guard = span.enter();

        let type_info = TypeInfo::of::<T>();
        let err = match self.get_instance(type_info, enable_private)? {
            Instance::Mock { mock, value } => return Mock::from_parts(mock, &value),
            Instance::Real { value: None } => ResolveErrorKind::NullMock { type_info },
            Instance::Real { value: Some(value) } | Instance::Array { value, .. } => ResolveErrorKind::NotAMock {
                requested: type_info,
                actual: value.type_info(),
            },
        };
        error!("{}", err);
        Err(err)
    }

    /// Registers `value` for `T`, replacing any previous registration or resolved value
    ///
    /// # Errors
    /// [`ConfigErrorKind::MissingCacheResolver`] if the cache resolver was removed
    pub fn use_value<T>(&self, value: Arc<T>) -> Result<(), ConfigErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let value = self.with_registered_disposer(AnyValue::new(value));
        self.register(TypeInfo::of::<T>(), Instance::real(value))
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn use_instance<T>(&self, value: T) -> Result<(), ConfigErrorKind>
    where
        T: Send + Sync + 'static,
    {
        self.use_value(Arc::new(value))
    }

    /// Registers null for `T`: optional parameters get `None`, required ones fail
    #[allow(clippy::missing_errors_doc)]
    pub fn use_null<T>(&self) -> Result<(), ConfigErrorKind>
    where
        T: ?Sized + 'static,
    {
        self.register(TypeInfo::of::<T>(), Instance::null())
    }

    /// Same as [`Self::use_value`], the value is also disposed by the dispose sweep
    #[allow(clippy::missing_errors_doc)]
    pub fn use_disposable<T>(&self, value: Arc<T>) -> Result<(), ConfigErrorKind>
    where
        T: ?Sized + Disposable + 'static,
    {
        self.register(TypeInfo::of::<T>(), Instance::real(AnyValue::disposable(value)))
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn use_mock<T>(&self, mock: &Mock<T>) -> Result<(), ConfigErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.register(
            TypeInfo::of::<T>(),
            Instance::mock(mock.erased().clone(), AnyValue::new(mock.object())),
        )
    }

    /// Registers a new mock of `T` configured by `setup`, replacing any previous registration and its setups
    #[allow(clippy::missing_errors_doc)]
    pub fn use_setup<T, F>(&self, setup: F) -> Result<Mock<T>, ResolveErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
        F: FnOnce(&Mock<T>),
    {
        let span = info_span!("use_setup", dependency = type_name::<T>());
        let _guard = span.enter();

        let (mock, value) = self.new_mock(TypeInfo::of::<T>(), self.config())?;
        let mock = Mock::from_parts(mock, &value)?;
        setup(&mock);
        self.use_mock(&mock)?;
        Ok(mock)
    }

    /// Registers `value` for `type_info`. A value of another type is accepted if the registry can cast it.
    ///
    /// # Errors
    /// - [`ArgumentErrorKind::TypeMismatch`] if `value` can't be viewed as `type_info`
    /// - [`ConfigErrorKind::MissingCacheResolver`] if the cache resolver was removed
    pub fn use_any(&self, type_info: TypeInfo, value: AnyValue) -> Result<(), ResolveErrorKind> {
        let Some(value) = self.registry().cast_value(&value, &type_info) else {
            let err = ResolveErrorKind::from(ArgumentErrorKind::TypeMismatch {
                parameter: "value",
                expected: type_info,
                actual: value.type_info(),
            });
            error!("{}", err);
            return Err(err);
        };
        let value = self.with_registered_disposer(value);
        self.register(type_info, Instance::real(value)).map_err(Into::into)
    }

    /// Registers a factory of `Inst::Provides`, called on first access with its dependencies resolved.
    /// The previously resolved value, if any, is dropped from the cache.
    #[allow(clippy::missing_errors_doc)]
    pub fn use_factory<Inst, Deps>(&self, instantiator: Inst) -> Result<(), ConfigErrorKind>
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: Parameters,
    {
        self.use_factory_with_config(instantiator, FactoryConfig::default())
    }

    /// Same as [`Self::use_factory`]. With `cache_provides: false` the factory runs on every resolution.
    #[allow(clippy::missing_errors_doc)]
    pub fn use_factory_with_config<Inst, Deps>(&self, instantiator: Inst, config: FactoryConfig) -> Result<(), ConfigErrorKind>
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: Parameters,
    {
        let type_info = TypeInfo::of::<Inst::Provides>();
        let dependencies = Deps::dependencies(self.registry());
        self.register_callback(
            type_info,
            factory_callback(type_info, dependencies, boxed_instantiator(instantiator)),
            config,
        )
    }

    /// Same as [`Self::use_factory`] for factories returning `Arc<T>`, `T` may be a trait object
    #[allow(clippy::missing_errors_doc)]
    pub fn use_shared_factory<T, Inst, Deps>(&self, instantiator: Inst) -> Result<(), ConfigErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
        Inst: Instantiator<Deps, Provides = Arc<T>> + Send + Sync,
        Deps: Parameters,
    {
        let type_info = TypeInfo::of::<T>();
        let dependencies = Deps::dependencies(self.registry());
        self.register_callback(
            type_info,
            factory_callback(type_info, dependencies, boxed_shared_instantiator(instantiator)),
            FactoryConfig::default(),
        )
    }

    /// `T` is constructed instead of mocked when requested
    #[allow(clippy::missing_errors_doc)]
    pub fn with<T>(&self) -> Result<(), ResolveErrorKind>
    where
        T: Send + Sync + 'static,
    {
        self.with_type(TypeInfo::of::<T>())
    }

    /// `Impl` is constructed when `I` is requested
    #[allow(clippy::missing_errors_doc)]
    pub fn with_impl<I, Impl>(&self, cast: fn(Arc<Impl>) -> Arc<I>) -> Result<(), ResolveErrorKind>
    where
        I: ?Sized + Send + Sync + 'static,
        Impl: Send + Sync + 'static,
    {
        self.registry().cast(cast);
        self.with_type_impl(TypeInfo::of::<I>(), TypeInfo::of::<Impl>())
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn with_type(&self, type_info: TypeInfo) -> Result<(), ResolveErrorKind> {
        self.with_type_impl(type_info, type_info)
    }

    /// # Errors
    /// - [`ArgumentErrorKind::NotForwardable`] if no cast from `implementation` to `interface` is registered
    /// - [`ResolveErrorKind::NoViableConstructor`] if `implementation` isn't a class with constructors
    pub fn with_type_impl(&self, interface: TypeInfo, implementation: TypeInfo) -> Result<(), ResolveErrorKind> {
        let span = info_span!("with", dependency = interface.name, implementation = implementation.name);
        let _guard = span.enter();

        if !self.registry().can_cast(&implementation, &interface) {
            let err = ResolveErrorKind::from(ArgumentErrorKind::NotForwardable {
                proxy: implementation,
                target: interface,
            });
            error!("{}", err);
            return Err(err);
        }
        self.class_descriptor(implementation)?;

        let callback: Callback = Arc::new(move |mocker: &AutoMocker, graph: &ObjectGraphContext| {
            let descriptor = mocker.class_descriptor(implementation)?;
            let value = mocker.construct(&descriptor, graph)?;
            mocker
                .registry()
                .cast_value(&value, &interface)
                .map(Instance::real)
                .ok_or_else(|| {
                    ResolveErrorKind::from(ArgumentErrorKind::NotForwardable {
                        proxy: implementation,
                        target: interface,
                    })
                })
        });
        self.register_callback(interface, callback, FactoryConfig::default())
            .map_err(Into::into)
    }

    /// Registers one mock under `type_info` and every type of `forwards`, so all of them resolve
    /// to the same object. An already resolved mock of `type_info` is reused with its setups.
    ///
    /// # Errors
    /// - [`ConfigErrorKind::MissingCacheResolver`] if the cache resolver was removed
    /// - [`ArgumentErrorKind::NotForwardable`] if the proxy doesn't implement one of the types
    pub fn combine(&self, type_info: TypeInfo, forwards: &[TypeInfo]) -> Result<(), ResolveErrorKind> {
        let span = info_span!("combine", dependency = type_info.name);
        let _guard = span.enter();

        let cache = self.cache_resolver()?;
        let mock = match cache.get(&type_info) {
            Some(Instance::Mock { mock, .. }) => mock,
            _ => self.combined_mock(type_info, forwards)?,
        };

        let mut instances = Vec::with_capacity(forwards.len() + 1);
        for target in iter::once(type_info).chain(forwards.iter().copied()) {
            let Some(value) = self.registry().cast_value(mock.proxy(), &target) else {
                let err = ResolveErrorKind::from(ArgumentErrorKind::NotForwardable {
                    proxy: mock.proxy().type_info(),
                    target,
                });
                error!("{}", err);
                return Err(err);
            };
            instances.push((target, Instance::mock(mock.clone(), value)));
        }
        for (target, instance) in instances {
            cache.cache().insert(target, instance);
        }

        debug!(forwards = forwards.len(), "Combined");
        Ok(())
    }

    /// Typed form of [`Self::combine`]: `mocker.combine_with::<dyn Derived, (Arc<dyn Base>,)>()`
    #[allow(clippy::missing_errors_doc)]
    pub fn combine_with<T, F>(&self) -> Result<(), ResolveErrorKind>
    where
        T: ?Sized + 'static,
        F: ForwardTypes,
    {
        self.combine(TypeInfo::of::<T>(), &F::type_infos())
    }

    /// Adds a setup to the mock of `T`
    #[allow(clippy::missing_errors_doc)]
    pub fn setup<T>(&self, method: &'static str) -> Result<Setup, ResolveErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Ok(self.get_mock::<T>()?.setup(method))
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn setup_all_properties<T>(&self) -> Result<(), ResolveErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_mock::<T>()?.setup_all_properties();
        Ok(())
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn verify_calls<T>(&self, method: &'static str, times: Times) -> Result<(), VerifyErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_mock::<T>()?.verify_calls(method, times)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn verify_calls_with<T, A, F>(&self, method: &'static str, matcher: F, times: Times) -> Result<(), VerifyErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
        A: 'static,
        F: Fn(&A) -> bool,
    {
        self.get_mock::<T>()?.verify_calls_with(method, matcher, times)
    }

    /// Verifies the setups marked as verifiable on every resolved mock
    ///
    /// # Errors
    /// - [`VerifyErrorKind::UninvokedSetups`] on the first mock with an uninvoked verifiable setup
    /// - [`ConfigErrorKind::MissingCacheResolver`] if the cache resolver was removed
    pub fn verify(&self) -> Result<(), VerifyErrorKind> {
        let span = info_span!("verify");
        let _guard = span.enter();

        for interceptor in self.resolved_interceptors()? {
            interceptor.verify().inspect_err(|err| error!("{}", err))?;
        }
        Ok(())
    }

    /// Verifies every setup of every resolved mock
    ///
    /// # Errors
    /// - [`VerifyErrorKind::NoSetups`] if a mock has no setups, unless `ignore_missing_setups` is `true`
    /// - [`VerifyErrorKind::UninvokedSetups`] on the first mock with an uninvoked setup
    /// - [`ConfigErrorKind::MissingCacheResolver`] if the cache resolver was removed
    pub fn verify_all(&self, ignore_missing_setups: bool) -> Result<(), VerifyErrorKind> {
        let span = info_span!("verify_all", ignore_missing_setups);
        let _guard = span.enter();

        for interceptor in self.resolved_interceptors()? {
            if !interceptor.has_setups() {
                if ignore_missing_setups {
                    debug!(mock = interceptor.type_info().name, "Skipped, no setups");
                    continue;
                }
                let err = VerifyErrorKind::NoSetups {
                    type_info: interceptor.type_info(),
                };
                error!("{}", err);
                return Err(err);
            }
            interceptor.verify_all().inspect_err(|err| error!("{}", err))?;
        }
        Ok(())
    }

    /// Inserts `resolver` before the first resolver of type `R`
    ///
    /// # Errors
    /// [`ConfigErrorKind::ResolverNotFound`] naming `R` if it isn't in the list
    pub fn insert_resolver_before<R: Resolver, N: Resolver>(&self, resolver: N) -> Result<(), ConfigErrorKind> {
        self.inner
            .resolvers
            .insert_before::<R, N>(resolver)
            .inspect_err(|err| error!("{}", err))
    }

    /// Inserts `resolver` after the first resolver of type `R`
    ///
    /// # Errors
    /// [`ConfigErrorKind::ResolverNotFound`] naming `R` if it isn't in the list
    pub fn insert_resolver_after<R: Resolver, N: Resolver>(&self, resolver: N) -> Result<(), ConfigErrorKind> {
        self.inner
            .resolvers
            .insert_after::<R, N>(resolver)
            .inspect_err(|err| error!("{}", err))
    }

    /// Snapshot of the cache, empty if the cache resolver was removed
    #[must_use]
    pub fn resolved_objects(&self) -> BTreeMap<TypeInfo, Option<AnyValue>> {
        let Some(cache) = self.inner.resolvers.find::<CacheResolver>() else {
            return BTreeMap::new();
        };
        cache
            .cache()
            .snapshot()
            .into_iter()
            .map(|(type_info, instance)| (type_info, instance.into_value()))
            .collect()
    }

    /// Aggregator disposing every disposable resolved object, or the one registered for `dyn DisposableAggregator`
    #[allow(clippy::missing_errors_doc)]
    pub fn as_disposable(&self) -> Result<Arc<dyn DisposableAggregator>, ResolveErrorKind> {
        self.get::<dyn DisposableAggregator>()
    }

    /// Runs the resolver pipeline for `type_info`, writing the result back to the cache
    /// unless the providing resolver opted out.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::Unresolved`] if no resolver provides a value
    /// - Any error returned by a resolver, the pipeline stops on it
    pub fn resolve_type(&self, type_info: TypeInfo, graph: &ObjectGraphContext) -> Result<Instance, ResolveErrorKind> {
        let span = debug_span!("resolve_type", dependency = type_info.name);
        let _guard = span.enter();

        let mut context = MockResolutionContext::new(self, type_info, graph);
        for resolver in self.inner.resolvers.snapshot() {
            if let Err(err) = resolver.resolve(&mut context) {
                error!("{}", err);
                return Err(err);
            }
            if context.value_provided() {
                debug!(resolver = resolvers::name_of(&resolver), "Value provided");
                break;
            }
        }

        let (instance, no_cache) = context.into_parts();
        let Some(instance) = instance else {
            let err = ResolveErrorKind::Unresolved { type_info };
            error!("{}", err);
            return Err(err);
        };
        if no_cache {
            return Ok(instance);
        }

        match self.inner.resolvers.find::<CacheResolver>() {
            Some(cache) => {
                let instance = cache.cache().get_or_insert(type_info, instance);
                debug!("Cached");
                Ok(instance)
            }
            None => Ok(instance),
        }
    }
}

impl AutoMocker {
    pub(crate) fn cached(&self, type_info: &TypeInfo) -> Option<Instance> {
        self.inner.resolvers.find::<CacheResolver>()?.get(type_info)
    }

    pub(crate) fn is_known(&self, type_info: &TypeInfo) -> bool {
        self.inner.resolvers.any_provides(type_info)
    }

    pub(crate) fn resolve_dependencies(
        &self,
        dependencies: &[Dependency],
        graph: &ObjectGraphContext,
    ) -> Result<Arguments, ResolveErrorKind> {
        dependencies
            .iter()
            .map(|dependency| self.resolve_type(dependency.type_info, graph).map(Instance::into_value))
            .collect::<Result<Vec<_>, _>>()
            .map(Arguments::new)
    }

    /// Builds an instance with the best constructor of `descriptor`
    pub(crate) fn construct(&self, descriptor: &TypeDescriptor, graph: &ObjectGraphContext) -> Result<AnyValue, ResolveErrorKind> {
        let type_info = descriptor.type_info;
        if graph.is_constructing(&type_info) {
            let err = ResolveErrorKind::NoViableConstructor {
                type_info,
                cycle: graph.cycle_with(type_info),
            };
            error!("{}", err);
            return Err(err);
        }
        let _construction = graph.enter(type_info);

        let constructor = ConstructorSelector::new(self.registry(), |type_info: &TypeInfo| self.is_known(type_info))
            .select_for(descriptor, graph)
            .inspect_err(|err| error!("{}", err))?;
        let arguments = self.resolve_dependencies(&constructor.dependencies, graph)?;
        let value = (constructor.instantiator)(arguments).inspect_err(|err| error!("{}", err))?;

        debug!(dependency = type_info.name, "Constructed");

        Ok(match descriptor.disposer {
            Some(disposer) => value.with_disposer(disposer),
            None => value,
        })
    }

    /// Creates a mock of `type_info` with `proxy`, resolving the proxy's dependencies in `graph`
    pub(crate) fn create_mock(
        &self,
        type_info: TypeInfo,
        proxy: &ProxyDescriptor,
        graph: &ObjectGraphContext,
        config: Config,
    ) -> Result<(ErasedMock, AnyValue), ResolveErrorKind> {
        if graph.is_constructing(&type_info) {
            let err = ResolveErrorKind::NoViableConstructor {
                type_info,
                cycle: graph.cycle_with(type_info),
            };
            error!("{}", err);
            return Err(err);
        }
        let _construction = graph.enter(type_info);

        let arguments = self.resolve_dependencies(&proxy.dependencies, graph)?;
        let interceptor = Arc::new(Interceptor::new(type_info, config, self.downgrade()));
        let proxy_value = (proxy.instantiator)(interceptor.clone(), arguments)?;

        let Some(value) = self.registry().cast_value(&proxy_value, &type_info) else {
            let err = ResolveErrorKind::from(ArgumentErrorKind::NotForwardable {
                proxy: proxy.proxy_type,
                target: type_info,
            });
            error!("{}", err);
            return Err(err);
        };

        debug!(proxy = proxy.proxy_type.name, "Mock created");

        Ok((ErasedMock::new(interceptor, proxy_value), value))
    }

    /// Creates a mock of `type_info` outside of any resolution
    pub(crate) fn new_mock(&self, type_info: TypeInfo, config: Config) -> Result<(ErasedMock, AnyValue), ResolveErrorKind> {
        let Some(proxy) = self.registry().proxy_descriptor(&type_info) else {
            let err = ResolveErrorKind::Unresolved { type_info };
            error!("{}", err);
            return Err(err);
        };
        self.create_mock(type_info, &proxy, &ObjectGraphContext::new(false), config)
    }

    fn get_instance(&self, type_info: TypeInfo, enable_private: bool) -> Result<Instance, ResolveErrorKind> {
        self.resolve_type(type_info, &ObjectGraphContext::new(enable_private))
    }

    fn class_descriptor(&self, type_info: TypeInfo) -> Result<Arc<TypeDescriptor>, ResolveErrorKind> {
        match self.registry().get(&type_info) {
            Some(descriptor) if matches!(descriptor.kind, TypeKind::Class { .. }) => Ok(descriptor),
            _ => {
                let err = ResolveErrorKind::NoViableConstructor {
                    type_info,
                    cycle: Vec::new(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    fn combined_mock(&self, type_info: TypeInfo, forwards: &[TypeInfo]) -> Result<ErasedMock, ResolveErrorKind> {
        let types: Vec<TypeInfo> = iter::once(type_info).chain(forwards.iter().copied()).collect();
        if let Some(proxy) = self.registry().proxy_implementing(&types) {
            let (mock, _) = self.create_mock(type_info, &proxy, &ObjectGraphContext::new(false), self.config())?;
            return Ok(mock);
        }

        let err = match self.registry().proxy_type(&type_info) {
            Some(proxy) => {
                let target = types
                    .iter()
                    .find(|target| !self.registry().can_cast(&proxy, target))
                    .copied()
                    .unwrap_or(type_info);
                ResolveErrorKind::from(ArgumentErrorKind::NotForwardable { proxy, target })
            }
            None => ResolveErrorKind::Unresolved { type_info },
        };
        error!("{}", err);
        Err(err)
    }

    fn cache_resolver(&self) -> Result<Arc<CacheResolver>, ConfigErrorKind> {
        self.inner.resolvers.find::<CacheResolver>().ok_or_else(|| {
            let err = ConfigErrorKind::MissingCacheResolver;
            error!("{}", err);
            err
        })
    }

    /// Applies the disposer declared for the value's type when the value has none
    fn with_registered_disposer(&self, value: AnyValue) -> AnyValue {
        if value.is_disposable() {
            return value;
        }
        match self.registry().get(&value.type_info()).and_then(|descriptor| descriptor.disposer) {
            Some(disposer) => value.with_disposer(disposer),
            None => value,
        }
    }

    fn register(&self, type_info: TypeInfo, instance: Instance) -> Result<(), ConfigErrorKind> {
        let cache = self.cache_resolver()?;
        cache.cache().insert(type_info, instance);

        debug!(dependency = type_info.name, "Registered");
        Ok(())
    }

    fn register_callback(&self, type_info: TypeInfo, callback: Callback, config: FactoryConfig) -> Result<(), ConfigErrorKind> {
        let Some(callbacks) = self.inner.resolvers.find::<CallbackResolver>() else {
            let err = ConfigErrorKind::ResolverNotFound {
                name: type_name::<CallbackResolver>(),
            };
            error!("{}", err);
            return Err(err);
        };
        callbacks.register(type_info, callback, config);
        if let Some(cache) = self.inner.resolvers.find::<CacheResolver>() {
            cache.remove(&type_info);
        }

        debug!(dependency = type_info.name, "Factory registered");
        Ok(())
    }

    fn resolved_interceptors(&self) -> Result<Vec<Arc<Interceptor>>, ConfigErrorKind> {
        let cache = self.cache_resolver()?;
        let mut seen = BTreeSet::new();
        let mut interceptors = Vec::new();
        for (_, instance) in cache.cache().snapshot() {
            for mock in instance.mocks() {
                if seen.insert(Arc::as_ptr(mock.interceptor()) as usize) {
                    interceptors.push(mock.interceptor().clone());
                }
            }
        }
        Ok(interceptors)
    }
}

impl Default for AutoMocker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AutoMocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoMocker")
            .field("config", &self.inner.config)
            .field("resolvers", &self.inner.resolvers)
            .field("registry", &self.inner.registry)
            .finish()
    }
}

fn factory_callback(type_info: TypeInfo, dependencies: Vec<Dependency>, instantiator: BoxedInstantiator) -> Callback {
    Arc::new(move |mocker: &AutoMocker, graph: &ObjectGraphContext| {
        if graph.is_constructing(&type_info) {
            let err = ResolveErrorKind::NoViableConstructor {
                type_info,
                cycle: graph.cycle_with(type_info),
            };
            error!("{}", err);
            return Err(err);
        }
        let _construction = graph.enter(type_info);

        let arguments = mocker.resolve_dependencies(&dependencies, graph)?;
        let value = instantiator(arguments).inspect_err(|err| error!("{}", err))?;
        Ok(Instance::real(mocker.with_registered_disposer(value)))
    })
}

fn downcast_value<T>(value: &AnyValue) -> Result<Arc<T>, ResolveErrorKind>
where
    T: ?Sized + 'static,
{
    value.downcast::<T>().ok_or_else(|| {
        let err = ResolveErrorKind::IncorrectType {
            expected: TypeInfo::of::<T>(),
            actual: value.type_info(),
        };
        error!("{}", err);
        err
    })
}
