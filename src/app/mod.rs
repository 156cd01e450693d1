//! Process-level plumbing shared by the exhibit binary: debug log and crash log.

mod logging;

pub use logging::{init_logging, log_debug, log_debug_content, log_file_path, log_panic};
