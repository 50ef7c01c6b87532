//! Shared library for QnABot Lambda functions.
//!
//! This crate provides common utilities, types, and clients used across all Lambda functions.

pub mod config;
pub mod error;
pub mod models;
pub mod settings;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{Card, ChannelFields, ChannelType, LexClient, Req, Res, ResponseType};
pub use settings::{get_settings, Settings};
