// src/lib.rs
pub mod analytics;
pub mod api;
pub mod app;
pub mod cid;
pub mod config;
pub mod error;
pub mod library;
pub mod listing;
pub mod nav;
pub mod preview;
pub mod session;
pub mod upload;
pub mod utils;

pub use error::{Error, Result};
