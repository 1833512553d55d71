//! CLI command implementations.

mod analyze;
mod ask;
mod config;
mod doctor;
mod generate;
mod list;
mod repl;
mod serve;

pub use analyze::run_analyze;
pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use generate::run_generate;
pub use list::run_list;
pub use repl::run_repl;
pub use serve::run_serve;
