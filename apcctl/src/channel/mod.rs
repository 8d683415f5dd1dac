//! Channel layer for prompt matching on the telnet byte stream.
//!
//! This module handles marker detection, buffering of unconsumed output,
//! and stripping of telnet option negotiation.

mod buffer;
mod negotiation;
mod patterns;

pub use buffer::PatternBuffer;
pub use negotiation::NegotiationFilter;
pub use patterns::{MarkerSet, PromptMatcher};
