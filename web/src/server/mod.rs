//! HTTP server plumbing.

pub mod health;
