//! Vitrine - vehicle listing API
//!
//! REST backend for vehicles and their lookup tables, with an in-process
//! read-through TTL cache in front of list and search queries.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::{spawn_sweep_task, SweepHandle};
