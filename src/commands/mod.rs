// DanceAI Commands
// Command handlers shared by the HTTP server

mod context;
mod invoke;

pub use context::*;
pub use invoke::*;
