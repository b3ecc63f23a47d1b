//! Core library components.
//!
//! Everything below the command line: reference grammar, data input,
//! the secret store, environment resolution, and child supervision.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod context;
pub mod dotenv;
pub mod env;
pub mod exit;
pub mod identity;
pub mod input;
pub mod reference;
pub mod runtime;
pub mod store;
pub mod supervisor;
