//! Wire messages exchanged with the remote display surface.
//!
//! Outbound frames are tagged by `method`:
//!
//! ```text
//! { "method": "RenderBatch", "rendererId": 1, "renderId": 7, "batch": "0a0b..." }
//! { "method": "AttachRootComponentToElement", "rendererId": 1, "selector": "#app", "componentId": 3 }
//! ```
//!
//! The only inbound call is the render acknowledgment:
//!
//! ```text
//! { "method": "OnRenderCompleted", "renderId": 7, "errorMessage": null }
//! ```

use crate::domain::{RenderId, RendererId};
use crate::error::TransportError;
use serde::{Deserialize, Serialize};

/// Opaque serialized render batch produced by the rendering engine.
///
/// Hex-encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderBatch(#[serde(with = "hex::serde")] Vec<u8>);

impl RenderBatch {
    /// Wrap an engine-produced payload
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self(payload.into())
    }

    /// Raw payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for RenderBatch {
    fn from(payload: Vec<u8>) -> Self {
        Self(payload)
    }
}

/// Frames sent to the remote surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum OutboundMessage {
    RenderBatch(RenderBatchFrame),
    AttachRootComponentToElement(AttachComponentFrame),
}

/// Payload of a `RenderBatch` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderBatchFrame {
    /// Renderer that produced the batch
    pub renderer_id: RendererId,
    /// Id the remote surface echoes back in its acknowledgment
    pub render_id: RenderId,
    /// Opaque serialized UI changes
    pub batch: RenderBatch,
}

/// Payload of an `AttachRootComponentToElement` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachComponentFrame {
    /// Renderer that owns the component
    pub renderer_id: RendererId,
    /// Target element selector on the remote surface
    pub selector: String,
    /// Component to attach
    pub component_id: u32,
}

impl OutboundMessage {
    /// Build a `RenderBatch` frame
    pub fn render_batch(renderer_id: RendererId, render_id: RenderId, batch: RenderBatch) -> Self {
        Self::RenderBatch(RenderBatchFrame {
            renderer_id,
            render_id,
            batch,
        })
    }

    /// Build an `AttachRootComponentToElement` frame
    pub fn attach_component(renderer_id: RendererId, selector: &str, component_id: u32) -> Self {
        Self::AttachRootComponentToElement(AttachComponentFrame {
            renderer_id,
            selector: selector.to_string(),
            component_id,
        })
    }

    /// Method name, for logging.
    pub fn method(&self) -> &'static str {
        match self {
            Self::RenderBatch(_) => "RenderBatch",
            Self::AttachRootComponentToElement(_) => "AttachRootComponentToElement",
        }
    }

    /// Renderer the frame belongs to
    pub fn renderer_id(&self) -> RendererId {
        match self {
            Self::RenderBatch(frame) => frame.renderer_id,
            Self::AttachRootComponentToElement(frame) => frame.renderer_id,
        }
    }

    /// Encode as a JSON text frame
    pub fn to_json(&self) -> Result<String, TransportError> {
        serde_json::to_string(self).map_err(|e| TransportError::Encode(e.to_string()))
    }

    /// Decode a JSON text frame
    pub fn from_json(text: &str) -> Result<Self, TransportError> {
        serde_json::from_str(text).map_err(|e| TransportError::Encode(e.to_string()))
    }
}

/// Calls the remote surface makes into the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all_fields = "camelCase")]
pub enum InboundCall {
    /// Outcome of one render. A missing or null `errorMessage` is success.
    OnRenderCompleted {
        render_id: RenderId,
        #[serde(default)]
        error_message: Option<String>,
    },
}

impl InboundCall {
    /// Build an `OnRenderCompleted` call
    pub fn render_completed(render_id: RenderId, error_message: Option<String>) -> Self {
        Self::OnRenderCompleted {
            render_id,
            error_message,
        }
    }

    pub fn to_json(&self) -> Result<String, TransportError> {
        serde_json::to_string(self).map_err(|e| TransportError::Encode(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self, TransportError> {
        serde_json::from_str(text).map_err(|e| TransportError::Encode(e.to_string()))
    }
}
