use core::{any::Any, fmt};
use parking_lot::Mutex;
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, warn};

use super::{DefaultValue, MockBehavior, Times};
use crate::{
    any::{AnyValue, TypeInfo},
    config::Config,
    container::WeakAutoMocker,
    errors::VerifyErrorKind,
};

pub(crate) type Matcher = Arc<dyn Fn(&dyn Any) -> bool + Send + Sync>;
pub(crate) type Response = Arc<dyn Fn(&dyn Any) -> Option<Box<dyn Any + Send>> + Send + Sync>;

pub(crate) struct SetupData {
    pub(crate) method: &'static str,
    pub(crate) matcher: Option<Matcher>,
    pub(crate) response: Option<Response>,
    pub(crate) verifiable: bool,
    pub(crate) invoked: usize,
}

/// Recorded call of a mocked method or property
#[derive(Clone)]
pub struct Invocation {
    method: &'static str,
    args: Arc<dyn Any + Send + Sync>,
}

impl Invocation {
    #[inline]
    #[must_use]
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Arguments of the call, if they were passed as `A`
    #[inline]
    #[must_use]
    pub fn args<A: 'static>(&self) -> Option<&A> {
        self.args.downcast_ref()
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation").field("method", &self.method).finish_non_exhaustive()
    }
}

enum Lookup {
    Matched(Option<Response>),
    Unmatched,
}

#[derive(Default)]
struct State {
    setups: Vec<SetupData>,
    invocations: Vec<Invocation>,
    properties: Option<BTreeMap<&'static str, Arc<dyn Any + Send + Sync>>>,
    default_mocks: BTreeMap<&'static str, AnyValue>,
}

/// Method table of a mock.
///
/// A proxy forwards each intercepted call to one of the `invoke*` methods, passing the method name
/// and its arguments (a tuple for several arguments). The interceptor records the call and answers
/// with the latest matching setup, or applies the mock's [`MockBehavior`] if none matches.
pub struct Interceptor {
    type_info: TypeInfo,
    config: Config,
    mocker: WeakAutoMocker,
    state: Mutex<State>,
}

impl Interceptor {
    #[must_use]
    pub fn new(type_info: TypeInfo, config: Config, mocker: WeakAutoMocker) -> Self {
        Self {
            type_info,
            config,
            mocker,
            state: Mutex::new(State::default()),
        }
    }

    /// Mocked type
    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> Config {
        self.config
    }

    /// # Panics
    /// If the mock is strict and no setup matches the call,
    /// or if the matching setup returns a value of another type than `R`
    pub fn invoke<A, R>(&self, method: &'static str, args: A) -> R
    where
        A: Send + Sync + 'static,
        R: Default + 'static,
    {
        self.invoke_or_else(method, args, |_| R::default())
    }

    /// Same as [`Interceptor::invoke`], but `fallback` provides the value if no setup answers the call
    pub fn invoke_or_else<A, R, F>(&self, method: &'static str, args: A, fallback: F) -> R
    where
        A: Send + Sync + 'static,
        R: 'static,
        F: FnOnce(&A) -> R,
    {
        let (lookup, args) = self.lookup(method, args);
        match lookup {
            Lookup::Matched(Some(response)) => self.respond(method, &response, &*args),
            Lookup::Matched(None) => fallback(&args),
            Lookup::Unmatched => {
                self.unmatched(method);
                fallback(&args)
            }
        }
    }

    /// Call of a member with a real implementation. `base` runs if no setup matches
    /// and the mock was created with `call_base`.
    ///
    /// # Panics
    /// If the mock is strict and no setup matches the call, `call_base` included
    pub fn invoke_base<A, R, F>(&self, method: &'static str, args: A, base: F) -> R
    where
        A: Send + Sync + 'static,
        R: Default + 'static,
        F: FnOnce(&A) -> R,
    {
        let (lookup, args) = self.lookup(method, args);
        match lookup {
            Lookup::Matched(Some(response)) => self.respond(method, &response, &*args),
            Lookup::Matched(None) if self.config.call_base => base(&args),
            Lookup::Matched(None) => R::default(),
            Lookup::Unmatched => {
                self.unmatched(method);
                if self.config.call_base {
                    base(&args)
                } else {
                    R::default()
                }
            }
        }
    }

    /// Call of a method returning a mockable type.
    ///
    /// A setup may return either `Arc<T>` or `Option<Arc<T>>`. Without a setup, a mock with
    /// [`DefaultValue::Mock`] returns a mock of `T` created by the container, the same one for every call.
    pub fn invoke_mock<A, T>(&self, method: &'static str, args: A) -> Option<Arc<T>>
    where
        A: Send + Sync + 'static,
        T: ?Sized + Send + Sync + 'static,
    {
        let (lookup, args) = self.lookup(method, args);
        let response = match lookup {
            Lookup::Matched(Some(response)) => response,
            Lookup::Matched(None) => return self.default_mock(method),
            Lookup::Unmatched => {
                self.unmatched(method);
                return self.default_mock(method);
            }
        };

        let Some(boxed) = response(&*args) else {
            panic!("Setup of `{}::{method}` expects other arguments", self.type_info);
        };
        let boxed = match boxed.downcast::<Arc<T>>() {
            Ok(value) => return Some(*value),
            Err(boxed) => boxed,
        };
        match boxed.downcast::<Option<Arc<T>>>() {
            Ok(value) => *value,
            Err(_) => panic!(
                "Setup of `{}::{method}` returns another type than `{}`",
                self.type_info,
                TypeInfo::of::<Arc<T>>(),
            ),
        }
    }

    /// Getter of a property. With [`Interceptor::setup_all_properties`] the stored value is returned,
    /// otherwise the call is answered like a method named `name`.
    pub fn property_get<T>(&self, name: &'static str) -> T
    where
        T: Clone + Default + Send + Sync + 'static,
    {
        {
            let mut state = self.state.lock();
            let stored = state.properties.as_ref().map(|properties| {
                properties
                    .get(name)
                    .and_then(|value| value.downcast_ref::<T>())
                    .cloned()
                    .unwrap_or_default()
            });
            if let Some(value) = stored {
                state.invocations.push(Invocation {
                    method: name,
                    args: Arc::new(()),
                });
                return value;
            }
        }
        self.invoke(name, ())
    }

    /// Setter of a property. The call is recorded under `name` with `(T,)` arguments.
    pub fn property_set<T>(&self, name: &'static str, value: T)
    where
        T: Clone + Send + Sync + 'static,
    {
        {
            let mut state = self.state.lock();
            if state.properties.is_some() {
                state.invocations.push(Invocation {
                    method: name,
                    args: Arc::new((value.clone(),)),
                });
                if let Some(properties) = state.properties.as_mut() {
                    properties.insert(name, Arc::new(value));
                }
                return;
            }
        }
        self.invoke::<_, ()>(name, (value,));
    }

    /// Makes every property store the last set value. Stored values are cleared.
    pub fn setup_all_properties(&self) {
        self.state.lock().properties = Some(BTreeMap::new());
    }

    #[must_use]
    pub fn has_setups(&self) -> bool {
        let state = self.state.lock();
        !state.setups.is_empty() || state.properties.is_some()
    }

    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.lock().invocations.clone()
    }

    /// Forgets recorded invocations, keeps setups
    pub fn reset_calls(&self) {
        let mut state = self.state.lock();
        state.invocations.clear();
        for setup in &mut state.setups {
            setup.invoked = 0;
        }
    }

    /// Checks that every setup marked as verifiable was invoked
    pub fn verify(&self) -> Result<(), VerifyErrorKind> {
        self.verify_setups(|setup| setup.verifiable)
    }

    /// Checks that every setup was invoked
    pub fn verify_all(&self) -> Result<(), VerifyErrorKind> {
        self.verify_setups(|_| true)
    }

    pub fn verify_calls(&self, method: &'static str, times: Times) -> Result<(), VerifyErrorKind> {
        let actual = self
            .state
            .lock()
            .invocations
            .iter()
            .filter(|invocation| invocation.method == method)
            .count();
        self.check_calls(method, times, actual)
    }

    /// Same as [`Interceptor::verify_calls`], but only counts calls whose arguments match
    pub fn verify_calls_with<A, F>(&self, method: &'static str, matcher: F, times: Times) -> Result<(), VerifyErrorKind>
    where
        A: 'static,
        F: Fn(&A) -> bool,
    {
        let invocations = self.invocations();
        let actual = invocations
            .iter()
            .filter(|invocation| invocation.method == method)
            .filter(|invocation| invocation.args::<A>().is_some_and(&matcher))
            .count();
        self.check_calls(method, times, actual)
    }

    pub(crate) fn add_setup(&self, method: &'static str) -> usize {
        let mut state = self.state.lock();
        state.setups.push(SetupData {
            method,
            matcher: None,
            response: None,
            verifiable: false,
            invoked: 0,
        });
        state.setups.len() - 1
    }

    pub(crate) fn update_setup(&self, index: usize, update: impl FnOnce(&mut SetupData)) {
        if let Some(setup) = self.state.lock().setups.get_mut(index) {
            update(setup);
        }
    }

    pub(crate) fn setup_invocations(&self, index: usize) -> usize {
        self.state.lock().setups.get(index).map_or(0, |setup| setup.invoked)
    }

    fn lookup<A>(&self, method: &'static str, args: A) -> (Lookup, Arc<A>)
    where
        A: Send + Sync + 'static,
    {
        let args = Arc::new(args);
        let candidates: Vec<(usize, Option<Matcher>)> = {
            let mut state = self.state.lock();
            state.invocations.push(Invocation {
                method,
                args: args.clone(),
            });
            state
                .setups
                .iter()
                .enumerate()
                .filter(|(_, setup)| setup.method == method)
                .map(|(index, setup)| (index, setup.matcher.clone()))
                .collect()
        };

        let erased: &dyn Any = &*args;
        let matched = candidates
            .into_iter()
            .rev()
            .find(|(_, matcher)| matcher.as_ref().map_or(true, |matcher| matcher(erased)));

        let lookup = match matched {
            Some((index, _)) => {
                let mut state = self.state.lock();
                let setup = &mut state.setups[index];
                setup.invoked += 1;
                Lookup::Matched(setup.response.clone())
            }
            None => Lookup::Unmatched,
        };
        (lookup, args)
    }

    fn respond<A: 'static, R: 'static>(&self, method: &'static str, response: &Response, args: &A) -> R {
        let Some(boxed) = response(args) else {
            panic!("Setup of `{}::{method}` expects other arguments", self.type_info);
        };
        match boxed.downcast::<R>() {
            Ok(value) => *value,
            Err(_) => panic!(
                "Setup of `{}::{method}` returns another type than `{}`",
                self.type_info,
                TypeInfo::of::<R>(),
            ),
        }
    }

    fn unmatched(&self, method: &'static str) {
        if self.config.behavior == MockBehavior::Strict {
            panic!(
                "`{}::{method}` invocation failed with mock behavior Strict. \
                 All invocations on the mock must have a corresponding setup",
                self.type_info,
            );
        }
        debug!(mock = self.type_info.name, method, "No setup matched");
    }

    fn default_mock<T>(&self, method: &'static str) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if self.config.default_value != DefaultValue::Mock {
            return None;
        }
        if let Some(value) = self.state.lock().default_mocks.get(method) {
            return value.downcast();
        }

        let mocker = self.mocker.upgrade()?;
        match mocker.new_mock(TypeInfo::of::<T>(), self.config) {
            Ok((_, value)) => {
                let value = self.state.lock().default_mocks.entry(method).or_insert(value).clone();
                value.downcast()
            }
            Err(err) => {
                warn!(mock = self.type_info.name, method, "Default mock isn't available: {}", err);
                None
            }
        }
    }

    fn verify_setups(&self, filter: impl Fn(&SetupData) -> bool) -> Result<(), VerifyErrorKind> {
        let methods: Vec<&'static str> = self
            .state
            .lock()
            .setups
            .iter()
            .filter(|setup| filter(setup) && setup.invoked == 0)
            .map(|setup| setup.method)
            .collect();

        if methods.is_empty() {
            Ok(())
        } else {
            Err(VerifyErrorKind::UninvokedSetups {
                type_info: self.type_info,
                methods,
            })
        }
    }

    fn check_calls(&self, method: &'static str, times: Times, actual: usize) -> Result<(), VerifyErrorKind> {
        if times.matches(actual) {
            Ok(())
        } else {
            Err(VerifyErrorKind::CallCount {
                type_info: self.type_info,
                method,
                expected: times,
                actual,
            })
        }
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("type_info", &self.type_info)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::Interceptor;
    use crate::{
        any::TypeInfo,
        config::Config,
        container::WeakAutoMocker,
        mock::{MockBehavior, Setup, Times},
    };

    use std::sync::Arc;
    use tracing_test::traced_test;

    trait Greeter: Send + Sync {}

    fn interceptor(config: Config) -> Arc<Interceptor> {
        Arc::new(Interceptor::new(TypeInfo::of::<dyn Greeter>(), config, WeakAutoMocker::new()))
    }

    #[test]
    #[traced_test]
    fn test_latest_matching_setup_wins() {
        let interceptor = interceptor(Config::default());
        Setup::new(&interceptor, "greet").returns("first".to_owned());
        Setup::new(&interceptor, "greet").returns("second".to_owned());
        Setup::new(&interceptor, "greet")
            .with(|(name,): &(&'static str,)| *name == "admin")
            .returns("admin".to_owned());

        assert_eq!(interceptor.invoke::<_, String>("greet", ("user",)), "second");
        assert_eq!(interceptor.invoke::<_, String>("greet", ("admin",)), "admin");
        assert_eq!(interceptor.invoke::<_, String>("other", ()), "");
    }

    #[test]
    #[traced_test]
    fn test_returns_with_args() {
        let interceptor = interceptor(Config::default());
        Setup::new(&interceptor, "add").returns_with(|(a, b): &(i32, i32)| a + b);

        assert_eq!(interceptor.invoke::<_, i32>("add", (2, 3)), 5);
    }

    #[test]
    #[traced_test]
    #[should_panic(expected = "mock behavior Strict")]
    fn test_strict_unmatched() {
        let interceptor = interceptor(Config {
            behavior: MockBehavior::Strict,
            ..Config::default()
        });
        let _: i32 = interceptor.invoke("value", ());
    }

    #[test]
    #[traced_test]
    fn test_invoke_base() {
        let called_base = interceptor(Config {
            call_base: true,
            ..Config::default()
        });
        let defaulted = interceptor(Config::default());

        assert_eq!(called_base.invoke_base("len", ("abc",), |(value,)| value.len()), 3);
        assert_eq!(defaulted.invoke_base("len", ("abc",), |(value,)| value.len()), 0);
    }

    #[test]
    #[traced_test]
    #[should_panic(expected = "mock behavior Strict")]
    fn test_strict_unmatched_with_call_base() {
        let interceptor = interceptor(Config {
            behavior: MockBehavior::Strict,
            call_base: true,
            ..Config::default()
        });
        let _ = interceptor.invoke_base("len", ("abc",), |(value,)| value.len());
    }

    #[test]
    #[traced_test]
    fn test_strict_matched_with_call_base() {
        let interceptor = interceptor(Config {
            behavior: MockBehavior::Strict,
            call_base: true,
            ..Config::default()
        });
        Setup::new(&interceptor, "len").returns(7usize);

        assert_eq!(interceptor.invoke_base("len", ("abc",), |(value,)| value.len()), 7);
    }

    #[test]
    #[traced_test]
    fn test_properties() {
        let interceptor = interceptor(Config::default());
        assert_eq!(interceptor.property_get::<u32>("count"), 0);
        interceptor.property_set("count", 5u32);
        assert_eq!(interceptor.property_get::<u32>("count"), 0);

        interceptor.setup_all_properties();
        interceptor.property_set("count", 5u32);
        assert_eq!(interceptor.property_get::<u32>("count"), 5);
        assert!(interceptor.has_setups());
    }

    #[test]
    #[traced_test]
    fn test_verify() {
        let interceptor = interceptor(Config::default());
        Setup::new(&interceptor, "load").returns(1u8).verifiable();
        Setup::new(&interceptor, "save").returns(());

        assert!(interceptor.verify().is_err());
        let _: u8 = interceptor.invoke("load", ());
        interceptor.verify().unwrap();

        let err = interceptor.verify_all().unwrap_err();
        assert!(err.to_string().contains("save"));

        interceptor.verify_calls("load", Times::Once).unwrap();
        interceptor.verify_calls("save", Times::Never).unwrap();
        assert!(interceptor.verify_calls("load", Times::AtLeast(2)).is_err());
    }

    #[test]
    #[traced_test]
    fn test_verify_calls_with() {
        let interceptor = interceptor(Config::default());
        interceptor.invoke::<_, ()>("send", (1u32,));
        interceptor.invoke::<_, ()>("send", (2u32,));
        interceptor.invoke::<_, ()>("send", (2u32,));

        interceptor
            .verify_calls_with("send", |(value,): &(u32,)| *value == 2, Times::Exactly(2))
            .unwrap();
        assert_eq!(interceptor.invocations().len(), 3);

        interceptor.reset_calls();
        interceptor.verify_calls("send", Times::Never).unwrap();
    }

    #[test]
    #[traced_test]
    fn test_invoke_mock_without_container() {
        let interceptor = interceptor(Config::default());
        assert!(interceptor.invoke_mock::<_, dyn Greeter>("child", ()).is_none());
    }
}
