mod countdown;

pub use countdown::{format_mmss, Countdown, Tick, FAST_TEST_SECONDS};
