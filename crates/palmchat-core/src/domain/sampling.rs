//! Sampling parameter types.
//!
//! `SamplingConfig` is reused across three layers: hardcoded fallbacks,
//! per-snapshot defaults in [`crate::settings::ApiSettings`], and
//! request-level overrides carried on the wire. Resolution prefers the
//! request, then the snapshot, then the fallbacks.

use serde::{Deserialize, Serialize};

/// Sampling parameters for one inference turn.
///
/// All fields are optional to support partial configuration and fallback
/// chains. Wire names follow the API contract (`top_p`, `top_k`,
/// `max_tokens`, `context_window`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SamplingConfig {
    /// Sampling temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Nucleus sampling threshold (0.0 - 1.0).
    pub top_p: Option<f32>,

    /// Top-K sampling limit.
    pub top_k: Option<i32>,

    /// Maximum tokens to generate in one reply.
    pub max_tokens: Option<u32>,

    /// Requested context window, in tokens. Engines that fix their context
    /// at load time may ignore this.
    pub context_window: Option<u32>,
}

impl SamplingConfig {
    /// Merge another config into this one, preferring values already set
    /// on `self`. Useful for applying fallback chains.
    pub fn merge_with(&mut self, other: &Self) {
        if self.temperature.is_none() {
            self.temperature = other.temperature;
        }
        if self.top_p.is_none() {
            self.top_p = other.top_p;
        }
        if self.top_k.is_none() {
            self.top_k = other.top_k;
        }
        if self.max_tokens.is_none() {
            self.max_tokens = other.max_tokens;
        }
        if self.context_window.is_none() {
            self.context_window = other.context_window;
        }
    }

    /// The hardcoded fallback values used when neither the request nor the
    /// settings snapshot specifies a field.
    #[must_use]
    pub const fn with_hardcoded_defaults() -> Self {
        Self {
            temperature: Some(0.7),
            top_p: Some(0.9),
            top_k: Some(40),
            max_tokens: Some(512),
            context_window: Some(8192),
        }
    }
}
