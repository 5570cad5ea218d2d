//! Shared test mocks and utilities for the Storyboard API.

mod clock;
mod provider;
mod repository;

pub use clock::{FixedClock, StepClock};
pub use provider::{ScriptedSpeechProvider, ScriptedStoryGenerator};
pub use repository::{FailingUserRepository, InMemoryUserRepository};
