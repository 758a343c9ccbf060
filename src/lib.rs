pub mod address;
pub mod chains;
pub mod config;
pub mod error_utils;
pub mod loader;
pub mod logo;
pub mod models;
pub mod remote;
pub mod transform;
pub mod validation;
