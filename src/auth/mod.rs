//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Google sign-in and JWT issuance
//! - AuthedUser extractor for protected routes
//! - Account linking: OAuth code exchange and refresh-token storage

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;


pub use extractors::AuthedUser;
pub use models::User;
pub use routes::auth_routes;
