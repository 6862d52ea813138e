pub mod reservation;

pub use reservation::*;
