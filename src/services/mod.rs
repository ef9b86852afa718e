// DanceAI Services
// Business logic layer

mod events;
mod session_cache;
mod preference_store;
mod style_templates;
mod history_ledger;
mod generation_pipeline;
mod playback_controller;
mod log_manager;

pub use events::*;
pub use session_cache::*;
pub use preference_store::*;
pub use style_templates::*;
pub use history_ledger::*;
pub use generation_pipeline::*;
pub use playback_controller::*;
pub use log_manager::*;

#[cfg(test)]
pub(crate) use events::testing;
