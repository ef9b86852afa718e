// DanceAI Models
// Data structures for the application

mod preferences;
mod catalog;
mod generation;
mod playback;
mod settings;

pub use preferences::*;
pub use catalog::*;
pub use generation::*;
pub use playback::*;
pub use settings::*;
