//! Shared test doubles for ACNH Orders.

mod clock;
mod notifier;

pub use clock::{FixedClock, SteppingClock};
pub use notifier::{FailingNotifier, Notification, RecordingNotifier};
