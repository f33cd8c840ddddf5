//! # newshound
//!
//! A small chat agent service with web search and news lookup.
//!
//! This library provides:
//! - An HTTP API with a chat endpoint and a health probe
//! - A bounded ReAct tool-use loop driven by an Anthropic model
//! - Tavily web search and NewsAPI tools
//! - Optional per-session conversation history (memory, SQLite or Redis)
//!
//! ## Architecture
//!
//! Each chat call flows through:
//! 1. Validate the request
//! 2. Read prior turns for the session, if any, and record the new message
//! 3. Run the agent: think, act with a tool, observe, until a final answer or a limit
//! 4. Record the answer and respond
//!
//! ## Example
//!
//! ```rust,ignore
//! use newshound::{chat::ChatService, config::Config};
//!
//! let config = Config::from_env()?;
//! let service = ChatService::from_config(&config)?;
//! let reply = service.chat("What's in the news about Rust?", None).await?;
//! ```

pub mod agent;
pub mod api;
pub mod chat;
pub mod config;
pub mod history;
pub mod llm;
pub mod tools;

pub use config::Config;
