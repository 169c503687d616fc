// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod learning;
pub mod mapping;
pub mod persistence;
pub mod service;
pub mod writer;

pub use crate::config::EngineConfig;
pub use crate::core::engine::MarkovEngine;
pub use crate::core::types::{MentionFormat, Token};
pub use crate::error::{MarkovError, Result};
pub use crate::service::SharedEngine;
