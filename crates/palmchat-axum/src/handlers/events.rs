//! Mirror event channel - reserved, not implemented.

use crate::error::HttpError;

/// GET /events
///
/// Reserved for a push-style mirror of the conversation stream. The route
/// exists only while the secondary surface is enabled; until the channel
/// is built it answers 501.
pub async fn mirror() -> HttpError {
    HttpError::NotImplemented("the event mirror channel is not available yet".into())
}
