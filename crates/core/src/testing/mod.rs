//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every external collaborator
//! the pipeline talks to, allowing end-to-end tests without Redis, a browser
//! or the Bot API.
//!
//! # Example
//!
//! ```rust,ignore
//! use textshot_core::testing::{MockCache, MockMessenger, MockRenderer, MockUpdateSource};
//!
//! let cache = MockCache::new();
//! let renderer = MockRenderer::new();
//! let source = MockUpdateSource::new();
//! let messenger = MockMessenger::new();
//!
//! renderer.fail_for(42).await;
//! source.push(vec![fixtures::event(42, 7, "hello")]);
//! ```

mod mock_cache;
mod mock_messenger;
mod mock_renderer;
mod mock_update_source;

pub use mock_cache::MockCache;
pub use mock_messenger::{MockMessenger, SentMessage};
pub use mock_renderer::{MockRenderer, RecordedRender};
pub use mock_update_source::MockUpdateSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::messaging::InboundEvent;
    use crate::pipeline::IncomingRequest;

    /// Bytes the mock renderer returns by default: a PNG signature.
    pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    /// Create an inbound text message.
    pub fn event(update_id: i64, chat_id: i64, text: &str) -> InboundEvent {
        InboundEvent {
            update_id,
            chat_id,
            username: Some("tester".to_string()),
            text: text.to_string(),
        }
    }

    /// Create a render request.
    pub fn request(id: i64, chat_id: i64, text: &str) -> IncomingRequest {
        IncomingRequest {
            id,
            chat_id,
            text: text.to_string(),
        }
    }
}
