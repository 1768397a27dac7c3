//! Candlelens AI - Unified AI Provider Facade for OHLCV Analysis
//!
//! This crate fronts several chat-completion APIs behind one contract:
//! callers submit an OHLCV series plus an analysis intent and language,
//! and get back a single normalized result regardless of which vendor
//! answered.
//!
//! ## Supported Providers
//! - OpenAI (`gpt-3.5-turbo` by default)
//! - Aliyun DashScope compatible mode (`qwen-turbo`)
//! - DeepSeek (`deepseek-chat`)
//!
//! ## Key Design Principles
//!
//! 1. One request envelope for all providers; replies are shape-matched,
//!    never dispatched on vendor identity
//! 2. `analyze` never raises - every failure becomes a structured result
//! 3. No retries, streaming, or caching; each call is stateless
//! 4. Provider credentials live in an immutable registry built at startup

pub mod chat;
pub mod prompt;
pub mod providers;
pub mod service;
pub mod types;

pub use chat::*;
pub use providers::*;
pub use service::*;
pub use types::*;
