mod argument;
mod config;
mod instantiate;
mod resolve;
mod verify;

pub use argument::ArgumentErrorKind;
pub use config::ConfigErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use resolve::ResolveErrorKind;
pub use verify::VerifyErrorKind;
