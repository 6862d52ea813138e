//! # Playroom Booking Bot
//!
//! A Telegram bot for reserving the cafe playroom in one-hour slots.
//!
//! ## Features
//! - Pick a date, then a free hourly slot, within the booking horizon
//! - One reservation per slot, enforced by the database
//! - Personal details and a (simulated) payment choice per reservation
//! - View and cancel your reservations
//! - Reminders shortly before a reserved slot starts
//! - Booking sessions persisted per chat, surviving restarts

/// Slot availability, booking sessions and the booking conversation
pub mod booking;
/// Telegram commands, callback payloads and update handlers
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database connection, reservation model and store
pub mod database;
/// Background and auxiliary services: clock, reminders, health checks
pub mod services;
/// Utility functions for dates, validation, formatting and logging
pub mod utils;
