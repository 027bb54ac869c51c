//! Uniform access to remote chat-completion providers

mod error;
mod gateway;
mod provider;

pub use error::GatewayError;
pub use gateway::{CompletionGateway, CompletionResult, GatewayConfig, DEFAULT_MAX_TOKENS};
pub use provider::{Credentials, ProviderId};
