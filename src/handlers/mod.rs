//! HTTP request handlers.

pub mod login;
pub mod patients;
