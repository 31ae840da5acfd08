//! Transport layer — how invoke activities reach the channel.
//!
//! The runtime only needs one operation: send a request, get a response.
//! Bindings:
//! - HTTP (`http`) — JSON POST to an endpoint
//! - anything else — implement [`ChannelAdapter`]

pub mod http;

use async_trait::async_trait;

use crate::activity::{ActivityRequest, ActivityResponse};
use crate::error::ProtocolResult;

/// Pluggable transport between an applet and its backend.
///
/// A returned `Err` means the request could not be delivered at all; a
/// delivered request that the channel could not serve comes back as an
/// [`ActivityResponse`] with a failure status.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Send one attempt of an invocation.
    async fn send(&self, request: &ActivityRequest) -> ProtocolResult<ActivityResponse>;
}
