//! Intent model port
//!
//! A locally hosted generation model used only for intent classification.
//! It may not be running yet; callers probe it and can ask for one warm-up.

use super::llm_gateway::{GatewayError, StreamHandle};
use async_trait::async_trait;

#[async_trait]
pub trait IntentModel: Send + Sync {
    /// Cheap reachability probe.
    async fn is_ready(&self) -> bool;

    /// Try to start the backend and wait for it to come up.
    async fn warm_up(&self) -> Result<(), GatewayError>;

    /// Stream a completion for a raw prompt.
    async fn generate(&self, prompt: &str) -> Result<StreamHandle, GatewayError>;
}
