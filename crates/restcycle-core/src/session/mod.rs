mod dispatch;
mod engine;

pub use dispatch::{dispatch, Effect, Phase, Transition, Trigger};
pub use engine::Session;
