//! Shared test doubles and fixtures for the Guidebook interpreter.

mod clock;
mod guide;
mod repository;

pub use clock::{FixedClock, SteppingClock};
pub use guide::{SAMPLE_GUIDE_YAML, sample_guide};
pub use repository::{
    EmptyEventRepository, FailingEventRepository, InMemoryEventRepository,
    RecordingEventRepository,
};
