use crate::mock::{DefaultValue, MockBehavior};

/// Container-wide defaults applied to every mock created by [`crate::resolvers::MockResolver`]
/// ## Fields
/// - `behavior`:
///   [`MockBehavior::Strict`] mocks panic on invocations without a matching setup,
///   [`MockBehavior::Loose`] ones return a default value.
/// - `default_value`:
///   What a loose mock returns for an invocation without a matching setup.
/// - `call_base`:
///   If `true`, proxies that wrap a real implementation call it when no setup matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub behavior: MockBehavior,
    pub default_value: DefaultValue,
    pub call_base: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            behavior: MockBehavior::Loose,
            default_value: DefaultValue::Empty,
            call_base: false,
        }
    }
}

/// Config for a factory registered with [`crate::AutoMocker::use_factory_with_config`]
/// ## Fields
/// - `cache_provides`:
///   If `true`, the instance provided by the factory will be cached and reused.
///
///   This does **not** affect the dependencies of the instance.
///   Only the final result is cached if caching is applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactoryConfig {
    pub cache_provides: bool,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self { cache_provides: true }
    }
}

/// Options of [`crate::AutoMocker::create_self_mock_with`].
/// Unset `behavior` and `default_value` fall back to the container [`Config`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelfMockOptions {
    pub enable_private: bool,
    pub behavior: Option<MockBehavior>,
    pub default_value: Option<DefaultValue>,
    pub call_base: bool,
}

impl SelfMockOptions {
    #[inline]
    #[must_use]
    pub(crate) fn apply(self, config: Config) -> Config {
        Config {
            behavior: self.behavior.unwrap_or(config.behavior),
            default_value: self.default_value.unwrap_or(config.default_value),
            call_base: self.call_base,
        }
    }
}
