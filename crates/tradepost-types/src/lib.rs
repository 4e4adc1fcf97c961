//! Shared types for the Tradepost marketplace client.
//!
//! This crate defines the data that crosses the boundary between the
//! client and the authentication backend:
//!
//! - **Identity** ([`UserId`], [`ItemId`]): newtype wrappers around the
//!   backend's numeric keys.
//! - **Users** ([`UserRecord`], [`User`]): the snake_case record the
//!   server sends and the camelCase projection the client holds.
//! - **Auth payloads** ([`LoginRequest`], [`RegisterData`],
//!   [`RegisterRequest`], [`AuthResponse`], [`ApiErrorBody`]).
//!
//! # Architecture
//!
//! ```text
//! Session (who is logged in) → Api (HTTP calls) → Types (this crate)
//! ```
//!
//! Nothing here performs I/O. Other crates own the behavior; this one
//! only owns the shapes.

mod auth;
mod ids;
mod user;

pub use auth::{
    ApiErrorBody, AuthResponse, LoginRequest, RegisterData, RegisterRequest,
};
pub use ids::{ItemId, UserId};
pub use user::{User, UserRecord};
