//! Logging setup and tagged spans for services using ctxlog.

pub mod config;
pub mod spans;
pub mod subscriber;

pub use config::{LogFormat, TracingConfig};
pub use spans::display_tags;
pub use subscriber::init_tracing;

#[doc(hidden)]
pub use tracing;
