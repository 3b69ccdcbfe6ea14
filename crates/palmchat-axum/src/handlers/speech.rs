//! Text-to-speech endpoint - reserved, not implemented.

use crate::error::HttpError;

/// POST /v1/speech
///
/// The speech surface is reserved; answering 501 keeps the contract
/// explicit instead of silently succeeding.
pub async fn synthesize() -> HttpError {
    HttpError::NotImplemented("text-to-speech is not available yet".into())
}
