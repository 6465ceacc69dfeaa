//! API endpoint modules organized by backend resource.
//!
//! Each module provides typed methods for a group of related routes.

pub mod auth;
pub mod chatbot;
pub mod meetings;
pub mod teams;
pub mod users;
pub mod whatsapp;
