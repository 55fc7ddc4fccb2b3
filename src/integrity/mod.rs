//! Content-integrity primitives.
//!
//! - `hasher`: deterministic SHA-256 fingerprints of document content
//! - `align`: placement of oracle-flagged segments onto the source text
//!
//! # Design Principles
//!
//! - **Deterministic**: same text, same fingerprint, in every process.
//! - **Exact placement only**: a segment is highlighted only where its text
//!   occurs verbatim; otherwise it is dropped and counted, never guessed.
//! - **Lossless**: aligned runs always concatenate back to the source.

pub mod align;
pub mod hasher;

pub use align::{align, offset_to_line_col, Alignment, DropReason, DroppedSegment, LineCol, Run};
pub use hasher::{
    hash_bytes, hash_content, EncodingError, Fingerprint, InvalidFingerprint, FINGERPRINT_HEX_LEN,
};
