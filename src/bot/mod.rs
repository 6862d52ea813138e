pub mod callback_data;
pub mod commands;
pub mod handlers;
