#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigErrorKind {
    #[error("Cache resolver is not present in the resolvers list. Registrations, type forwarding and verification require it")]
    MissingCacheResolver,
    #[error("Resolver `{name}` not found in the resolvers list")]
    ResolverNotFound { name: &'static str },
}
