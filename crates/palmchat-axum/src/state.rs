//! Shared per-instance state.

use std::sync::Arc;

use palmchat_session::SessionBridge;

/// State one service instance hands to its handlers.
///
/// Everything here was captured from a single settings snapshot when the
/// instance was built; it never changes for the instance's lifetime.
#[derive(Debug)]
pub struct InstanceState {
    /// Bridge onto the inference engine, fresh per instance.
    pub bridge: SessionBridge,
}

/// Handler state type: an Arc-wrapped [`InstanceState`].
pub type ApiState = Arc<InstanceState>;
