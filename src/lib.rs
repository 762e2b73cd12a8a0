//! Terminal client for Speak Football: find football events around you.
//!
//! The [`api`] module talks to the backend (session cookies, CSRF, errors).
//! [`page`] and [`modal`] hold the landing page and auth dialog state, and
//! [`commands`] drives them from the terminal.

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod modal;
pub mod models;
pub mod page;
pub mod session;

pub use api::ApiClient;
pub use error::ApiError;
