//! LLM Integration
//!
//! Vendor backends behind [`LLMProvider`] and the [`LLMGateway`] that picks
//! one per request.

pub mod custom;
pub mod gateway;
pub mod mock;
pub mod provider;

pub use gateway::{LLMGateway, LLMResponse, NO_PROVIDER};
pub use mock::MockProvider;
pub use provider::{create_provider, Completion, LLMProvider, VendorProvider};
