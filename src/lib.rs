#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod cache;
pub(crate) mod cancellation;
pub(crate) mod config;
pub(crate) mod constructor_selector;
pub(crate) mod container;
pub(crate) mod context;
pub(crate) mod dependency;
pub(crate) mod disposable;
pub(crate) mod errors;
pub(crate) mod instance;
pub(crate) mod instantiator;
pub(crate) mod mock;
pub(crate) mod parameter;
pub(crate) mod registry;
pub(crate) mod resolvers;
pub(crate) mod shapes;

pub use any::{AnyValue, TypeInfo};
pub use cancellation::CancellationTokenSource;
pub use config::{Config, FactoryConfig, SelfMockOptions};
pub use container::{AutoMocker, ForwardTypes, ServiceProvider, WeakAutoMocker};
pub use context::{MockResolutionContext, ObjectGraphContext};
pub use dependency::{Dependency, DependencyKind};
pub use disposable::{Disposable, DisposableAggregator};
pub use errors::{ArgumentErrorKind, ConfigErrorKind, InstantiateErrorKind, ResolveErrorKind, VerifyErrorKind};
pub use instance::Instance;
pub use instantiator::{Instantiator, ProxyInstantiator};
pub use mock::{DefaultValue, ErasedMock, Interceptor, Invocation, Mock, MockBehavior, SelfMock, Setup, Times};
pub use parameter::{Arguments, Parameter, Parameters};
pub use registry::{ClassBuilder, Describe, ProxyBuilder, Registry, Visibility};
pub use resolvers::{
    default_resolvers, ArrayResolver, AsAny, AutoMockerDisposableResolver, CacheResolver, CallbackResolver,
    CancellationTokenResolver, DelegateResolver, EnumerableResolver, FuncResolver, InstanceResolver, LazyResolver,
    MockResolver, Resolver, Resolvers, SelfResolver, SimpleTypeResolver,
};
pub use shapes::{Func, Lazy, Sequence};
pub use tokio_util::sync::CancellationToken;
