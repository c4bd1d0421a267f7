//! Command handlers.

pub mod cleanup;
pub mod config;
pub mod gallery;
pub mod interactive;
pub mod plan;
pub mod run;
pub mod stock;
