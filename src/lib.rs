//! Trash-can map backend.
//!
//! Users register and log in, pin trash cans on the map (optionally with a
//! photo), browse the ones near them and like or dislike them.
//!
//! Layout follows the usual split:
//! - `database`: SQL constants and thin sqlx wrappers, one file per table.
//! - `models`: `FromRow` row structs.
//! - `services`: everything that is not HTTP, including the nearby ranking.
//! - `web`: axum routes, middleware and the response envelope.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod web;
