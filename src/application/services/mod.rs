//! Application services - the message repeat pipeline

pub mod history;
pub mod delivery;
pub mod repeat;

#[cfg(test)]
pub(crate) mod test_support;

pub use history::fetch_window;
pub use delivery::{deliver, select_strategy, DeliveryOutcome, Strategy, Target};
pub use repeat::{RepeatHandler, RepeatState};
