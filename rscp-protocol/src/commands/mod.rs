//! Request builders and input types of the supported commands

mod authentication;
mod history;
mod module_dump;
mod power_settings;
mod read_tags;

pub use authentication::*;
pub use history::*;
pub use module_dump::*;
pub use power_settings::*;
pub use read_tags::*;
