//! `sojourner-core`: configuration, shared error type, and the reminder
//! payload passed between the scheduler and dispatcher implementations.

pub mod config;
pub mod error;
pub mod reminder;

pub use error::{Result, SojournerError};
