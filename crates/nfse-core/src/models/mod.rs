//! Data models shared by the naming and batch modules.

pub mod config;
pub mod outcome;
