pub mod clock;
pub mod health;
pub mod reminder;
