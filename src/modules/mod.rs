//! Modules layer - Infrastructure components for external resources
//!
//! Contains adapters for resources outside the database, such as the image store.

pub mod storage;
