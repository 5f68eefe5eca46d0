mod behavior;
mod handle;
mod interceptor;
mod setup;
mod times;

pub use behavior::{DefaultValue, MockBehavior};
pub use handle::{ErasedMock, Mock, SelfMock};
pub use interceptor::{Interceptor, Invocation};
pub use setup::Setup;
pub use times::Times;
