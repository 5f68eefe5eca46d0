#![allow(dead_code)]

use automocker::{AutoMocker, Config, Disposable, Interceptor, InstantiateErrorKind, SelfMock, Sequence};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

pub trait Service: Send + Sync {
    fn name(&self) -> String;
}

pub struct ServiceMock(Arc<Interceptor>);

impl Service for ServiceMock {
    fn name(&self) -> String {
        self.0.invoke("name", ())
    }
}

pub struct RealService;

impl Service for RealService {
    fn name(&self) -> String {
        "real".to_owned()
    }
}

pub trait Base: Send + Sync {
    fn foo(&self) -> String;
}

pub trait Derived: Base {
    fn bar(&self, value: u32) -> u32;
}

pub struct DerivedMock(Arc<Interceptor>);

impl Base for DerivedMock {
    fn foo(&self) -> String {
        self.0.invoke("foo", ())
    }
}

impl Derived for DerivedMock {
    fn bar(&self, value: u32) -> u32 {
        self.0.invoke("bar", value)
    }
}

pub trait ServiceFactory: Send + Sync {
    fn create(&self) -> Option<Arc<dyn Service>>;
}

pub struct ServiceFactoryMock(Arc<Interceptor>);

impl ServiceFactory for ServiceFactoryMock {
    fn create(&self) -> Option<Arc<dyn Service>> {
        self.0.invoke_mock::<_, dyn Service>("create", ())
    }
}

pub struct OneConstructor {
    pub service: Arc<dyn Service>,
}

impl std::fmt::Debug for OneConstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneConstructor").finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct WithSealedParams {
    pub value: Arc<String>,
}

pub struct WithServiceArray {
    pub services: Vec<Arc<dyn Service>>,
}

pub struct WithServiceAndArray {
    pub service: Arc<dyn Service>,
    pub services: Vec<Arc<dyn Service>>,
}

pub struct WithOptional {
    pub service: Option<Arc<dyn Service>>,
}

/// Two constructors, the widest takes a sealed `String`
pub struct Selective {
    pub value: Option<Arc<String>>,
    pub service: Arc<dyn Service>,
}

#[derive(Debug)]
pub struct Chicken(pub Arc<Egg>);
#[derive(Debug)]
pub struct Egg(pub Arc<Chicken>);

pub struct WithEnumerable {
    pub services: Sequence<dyn Service>,
}

pub struct Connection {
    pub closed: AtomicBool,
}

impl Connection {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Disposable for Connection {
    fn dispose(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

pub struct Repository {
    pub connection: Arc<Connection>,
}

pub struct Calculator;

impl Calculator {
    pub fn add(&self, a: i32, b: i32) -> i32 {
        a + b
    }
}

pub struct CalculatorProxy {
    base: Arc<Calculator>,
    interceptor: Arc<Interceptor>,
}

impl CalculatorProxy {
    pub fn add(&self, a: i32, b: i32) -> i32 {
        self.interceptor
            .invoke_base("add", (a, b), |&(a, b): &(i32, i32)| self.base.add(a, b))
    }
}

impl SelfMock for Calculator {
    type Proxy = CalculatorProxy;

    fn self_mock(base: Arc<Self>, interceptor: Arc<Interceptor>) -> Self::Proxy {
        CalculatorProxy { base, interceptor }
    }
}

pub fn mocker() -> AutoMocker {
    mocker_with_config(Config::default())
}

pub fn mocker_with_config(config: Config) -> AutoMocker {
    let mocker = AutoMocker::with_config(config);
    let registry = mocker.registry();

    registry
        .proxy(ServiceMock)
        .implements(|proxy| proxy as Arc<dyn Service>);
    registry
        .proxy(DerivedMock)
        .implements(|proxy| proxy as Arc<dyn Derived>)
        .implements(|proxy| proxy as Arc<dyn Base>);
    registry
        .proxy(ServiceFactoryMock)
        .implements(|proxy| proxy as Arc<dyn ServiceFactory>);

    registry
        .class::<RealService>()
        .constructor(|| Ok::<_, InstantiateErrorKind>(RealService))
        .implements(|service| service as Arc<dyn Service>);
    registry
        .class::<OneConstructor>()
        .constructor(|service: Arc<dyn Service>| Ok::<_, InstantiateErrorKind>(OneConstructor { service }));
    registry
        .class::<WithSealedParams>()
        .constructor(|value: Arc<String>| Ok::<_, InstantiateErrorKind>(WithSealedParams { value }));
    registry
        .class::<WithServiceArray>()
        .constructor(|services: Vec<Arc<dyn Service>>| Ok::<_, InstantiateErrorKind>(WithServiceArray { services }));
    registry.class::<WithServiceAndArray>().constructor(
        |service: Arc<dyn Service>, services: Vec<Arc<dyn Service>>| {
            Ok::<_, InstantiateErrorKind>(WithServiceAndArray { service, services })
        },
    );
    registry
        .class::<WithOptional>()
        .constructor(|service: Option<Arc<dyn Service>>| Ok::<_, InstantiateErrorKind>(WithOptional { service }));
    registry
        .class::<Selective>()
        .constructor(|service: Arc<dyn Service>| Ok::<_, InstantiateErrorKind>(Selective { value: None, service }))
        .constructor(|value: Arc<String>, service: Arc<dyn Service>| {
            Ok::<_, InstantiateErrorKind>(Selective {
                value: Some(value),
                service,
            })
        });
    registry
        .class::<Chicken>()
        .constructor(|egg: Arc<Egg>| Ok::<_, InstantiateErrorKind>(Chicken(egg)));
    registry
        .class::<Egg>()
        .constructor(|chicken: Arc<Chicken>| Ok::<_, InstantiateErrorKind>(Egg(chicken)));
    registry
        .class::<WithEnumerable>()
        .constructor(|services: Sequence<dyn Service>| Ok::<_, InstantiateErrorKind>(WithEnumerable { services }));
    registry
        .class::<Connection>()
        .constructor(|| {
            Ok::<_, InstantiateErrorKind>(Connection {
                closed: AtomicBool::new(false),
            })
        })
        .disposable();
    registry
        .class::<Repository>()
        .constructor(|connection: Arc<Connection>| Ok::<_, InstantiateErrorKind>(Repository { connection }));
    registry
        .class::<Calculator>()
        .constructor(|| Ok::<_, InstantiateErrorKind>(Calculator));

    mocker
}

/// Data address of a shared value, equal for every trait object view of one object
pub fn addr<T: ?Sized>(value: &Arc<T>) -> usize {
    Arc::as_ptr(value).cast::<()>() as usize
}
