//! CLI command implementations.

mod config;
mod doctor;
mod extract;
mod narrate;
mod serve;
mod speak;

pub use config::run_config;
pub use doctor::run_doctor;
pub use extract::run_extract;
pub use narrate::run_narrate;
pub use serve::run_serve;
pub use speak::run_speak;
