//! Booking core: availability rules, per-chat session state and the
//! conversation that ties them to the reservation store.

pub mod calendar;
pub mod controller;
pub mod error;
pub mod reply;
pub mod session;
pub mod slot;

pub use calendar::{SlotCalendar, WorkingHours};
pub use controller::{ConversationController, UserIdentity};
pub use error::BookingError;
pub use reply::{Choice, Reply};
pub use session::{BookingSession, BookingStep};
pub use slot::Slot;
