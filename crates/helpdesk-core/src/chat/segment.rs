//! Reply segmentation for streamed delivery.
//!
//! Streaming is segment-then-emit: the reply is complete before the first
//! chunk goes out. Chunks split after each space and keep it, so
//! concatenating them gives back the reply exactly.

/// Split `reply` into word chunks, each ending in its trailing space
/// (except possibly the last).
pub fn segment_reply(reply: &str) -> Vec<String> {
    reply.split_inclusive(' ').map(str::to_string).collect()
}
