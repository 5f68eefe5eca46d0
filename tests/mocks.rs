mod common;

use automocker::{
    ArgumentErrorKind, CacheResolver, Config, ConfigErrorKind, DefaultValue, MockBehavior, ResolveErrorKind,
    SelfMockOptions, Times, TypeInfo, VerifyErrorKind,
};
use common::{addr, mocker, mocker_with_config, Base, Calculator, Derived, RealService, Service, ServiceFactory};
use std::sync::Arc;

#[test]
fn test_setup_returns() {
    let mocker = mocker();
    let mock = mocker.get_mock::<dyn Derived>().unwrap();

    mock.setup("bar").with(|value: &u32| *value > 10).returns(1u32);
    mock.setup("bar").with(|value: &u32| *value > 20).returns(2u32);
    mock.setup("foo").returns_with(|_: &()| String::from("computed"));

    let derived = mocker.get::<dyn Derived>().unwrap();
    assert_eq!(derived.bar(5), 0);
    assert_eq!(derived.bar(15), 1);
    assert_eq!(derived.bar(25), 2);
    assert_eq!(derived.foo(), "computed");
}

#[test]
fn test_combine_after_setup() {
    let mocker = mocker();
    mocker
        .get_mock::<dyn Derived>()
        .unwrap()
        .setup("foo")
        .returns(String::from("42"));

    mocker.combine_with::<dyn Derived, (Arc<dyn Base>,)>().unwrap();

    let base = mocker.get::<dyn Base>().unwrap();
    let derived = mocker.get::<dyn Derived>().unwrap();
    assert_eq!(base.foo(), "42");
    assert_eq!(derived.foo(), "42");
    assert_eq!(addr(&base), addr(&derived));
}

#[test]
fn test_combine_creates_mock() {
    let mocker = mocker();

    mocker
        .combine(TypeInfo::of::<dyn Base>(), &[TypeInfo::of::<dyn Derived>()])
        .unwrap();

    let base = mocker.get_mock::<dyn Base>().unwrap();
    base.setup("foo").returns(String::from("shared"));
    assert_eq!(mocker.get::<dyn Derived>().unwrap().foo(), "shared");
    assert!(Arc::ptr_eq(base.interceptor(), mocker.get_mock::<dyn Derived>().unwrap().interceptor()));
}

#[test]
fn test_combine_not_forwardable() {
    let mocker = mocker();

    let err = mocker.combine_with::<dyn Service, (Arc<dyn Base>,)>().unwrap_err();

    assert!(matches!(
        err,
        ResolveErrorKind::Argument(ArgumentErrorKind::NotForwardable { target, .. }) if target.is::<dyn Base>()
    ));
    assert!(mocker.resolved_objects().is_empty());
}

#[test]
fn test_get_mock_of_real_instance() {
    let mocker = mocker();
    mocker.get_mock::<dyn Service>().unwrap();

    mocker.use_value(Arc::new(RealService) as Arc<dyn Service>).unwrap();

    assert_eq!(mocker.get::<dyn Service>().unwrap().name(), "real");
    let err = mocker.get_mock::<dyn Service>().unwrap_err();
    assert!(matches!(err, ResolveErrorKind::NotAMock { requested, .. } if requested.is::<dyn Service>()));
}

#[test]
fn test_get_mock_of_null() {
    let mocker = mocker();
    mocker.use_null::<dyn Service>().unwrap();

    assert!(matches!(
        mocker.get_mock::<dyn Service>(),
        Err(ResolveErrorKind::NullMock { .. })
    ));
}

#[test]
fn test_use_setup_replaces_mock() {
    let mocker = mocker();
    let first = mocker.get::<dyn Service>().unwrap();

    let mock = mocker
        .use_setup::<dyn Service, _>(|mock| {
            mock.setup("name").returns(String::from("configured"));
        })
        .unwrap();

    let second = mocker.get::<dyn Service>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&second, &mock.object()));
    assert_eq!(second.name(), "configured");
}

#[test]
fn test_verify() {
    let mocker = mocker();
    let mock = mocker.get_mock::<dyn Service>().unwrap();
    mocker.verify().unwrap();

    mock.setup("name").returns(String::from("mocked")).verifiable();
    assert!(matches!(
        mocker.verify(),
        Err(VerifyErrorKind::UninvokedSetups { methods, .. }) if methods == ["name"]
    ));

    assert_eq!(mocker.get::<dyn Service>().unwrap().name(), "mocked");
    mocker.verify().unwrap();
    mocker.verify_calls::<dyn Service>("name", Times::Once).unwrap();
    assert!(matches!(
        mocker.verify_calls::<dyn Service>("name", Times::AtLeast(2)),
        Err(VerifyErrorKind::CallCount { actual: 1, .. })
    ));
}

#[test]
fn test_verify_all() {
    let mocker = mocker();
    let service = mocker.get_mock::<dyn Service>().unwrap();
    let derived = mocker.get_mock::<dyn Derived>().unwrap();
    service.setup("name").returns(String::from("mocked"));
    service.object().name();

    let err = mocker.verify_all(false).unwrap_err();
    assert!(err.is_missing_setups());
    mocker.verify_all(true).unwrap();

    derived.setup("bar").returns(3u32);
    assert!(matches!(mocker.verify_all(true), Err(VerifyErrorKind::UninvokedSetups { .. })));

    derived.object().bar(1);
    mocker.verify_all(false).unwrap();
    mocker
        .verify_calls_with::<dyn Derived, u32, _>("bar", |value| *value == 1, Times::Once)
        .unwrap();
}

#[test]
fn test_verify_all_combined_once() {
    let mocker = mocker();
    mocker.combine_with::<dyn Derived, (Arc<dyn Base>,)>().unwrap();
    mocker.setup::<dyn Base>("foo").unwrap();

    mocker.get::<dyn Derived>().unwrap().foo();

    mocker.verify_all(false).unwrap();
}

#[test]
fn test_strict_mock_with_setup() {
    let mocker = mocker_with_config(Config {
        behavior: MockBehavior::Strict,
        ..Config::default()
    });
    mocker
        .setup::<dyn Service>("name")
        .unwrap()
        .returns(String::from("strict"));

    assert_eq!(mocker.get::<dyn Service>().unwrap().name(), "strict");
}

#[test]
#[should_panic]
fn test_strict_mock_without_setup() {
    let mocker = mocker_with_config(Config {
        behavior: MockBehavior::Strict,
        ..Config::default()
    });

    mocker.get::<dyn Service>().unwrap().name();
}

#[test]
fn test_default_value_mock() {
    let mocker = mocker_with_config(Config {
        default_value: DefaultValue::Mock,
        ..Config::default()
    });
    let factory = mocker.get::<dyn ServiceFactory>().unwrap();

    let first = factory.create().unwrap();
    let second = factory.create().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.name(), "");
    assert!(mocker.get::<dyn ServiceFactory>().unwrap().create().is_some());
}

#[test]
fn test_default_value_empty() {
    let mocker = mocker();
    let mock = mocker.get_mock::<dyn ServiceFactory>().unwrap();
    assert!(mock.create().is_none());

    let service: Arc<dyn Service> = Arc::new(RealService);
    mock.setup("create").returns(service.clone());
    assert!(Arc::ptr_eq(&mock.create().unwrap(), &service));
}

#[test]
fn test_self_mock() {
    let mocker = mocker();

    let calculator = mocker
        .create_self_mock_with::<Calculator>(SelfMockOptions {
            call_base: true,
            ..SelfMockOptions::default()
        })
        .unwrap();
    calculator
        .setup("add")
        .with(|&(a, _): &(i32, i32)| a == 0)
        .returns(42);

    assert_eq!(calculator.add(1, 2), 3);
    assert_eq!(calculator.add(0, 2), 42);
    calculator.verify_calls("add", Times::Exactly(2)).unwrap();
}

#[test]
fn test_self_mock_without_call_base() {
    let mocker = mocker();

    let calculator = mocker.create_self_mock::<Calculator>().unwrap();

    assert_eq!(calculator.add(1, 2), 0);
}

#[test]
fn test_missing_cache_resolver() {
    let mocker = mocker();
    mocker.resolvers().remove::<CacheResolver>().unwrap();

    assert_eq!(
        mocker.use_instance(String::from("value")).unwrap_err(),
        ConfigErrorKind::MissingCacheResolver
    );
    assert!(matches!(
        mocker.combine_with::<dyn Derived, (Arc<dyn Base>,)>(),
        Err(ResolveErrorKind::Config(ConfigErrorKind::MissingCacheResolver))
    ));
    assert!(matches!(
        mocker.verify_all(true),
        Err(VerifyErrorKind::Config(ConfigErrorKind::MissingCacheResolver))
    ));
}
