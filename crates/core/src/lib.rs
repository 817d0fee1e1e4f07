//! Core business logic for the stokvel backend.
//!
//! This crate has no web or database dependencies. Persistence is reached
//! only through the async traits declared here and implemented in
//! `stokvel-db`.
//!
//! # Modules
//!
//! - `contribution` - Monthly payment status evaluation
//! - `withdrawal` - Emergency withdrawal simulation and execution
//! - `assistant` - Typed query capability set for the chat front end
//! - `stokvel` - Fund, enrollment and contribution rules
//! - `credentials` - Member password hashing

pub mod assistant;
pub mod contribution;
pub mod credentials;
pub mod stokvel;
pub mod withdrawal;
