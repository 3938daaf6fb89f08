pub mod actions;
pub mod metadata;
pub mod orchestrator;
pub mod progress_poller;
pub mod status;

pub use actions::{action_failure_text, ActionDispatcher};
pub use metadata::MetadataFetcher;
pub use orchestrator::{Effect, Orchestrator};
pub use progress_poller::{PollEvent, ProgressPoller};
pub use status::{StatusView, Tone};
