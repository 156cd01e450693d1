mod app;
pub mod audio;
pub mod captions;
pub mod config;
pub mod events;
pub mod exhibit;
pub mod jack;
mod lock;
pub mod panel;
pub mod script;
pub mod session;
mod telemetry;
pub mod timer;

pub use app::{init_logging, log_debug, log_debug_content, log_file_path, log_panic};
pub(crate) use lock::lock_or_recover;
pub use telemetry::init_tracing;
