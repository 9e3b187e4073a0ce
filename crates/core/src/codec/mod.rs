//! PHP `serialize()` codec
//!
//! # Wire Format
//!
//! Every node starts with a one-character tag:
//!
//! ```text
//! N;                          null
//! b:<0|1>;                    bool
//! i:<decimal>;                int
//! d:<decimal|INF|-INF|NAN>;   float
//! s:<len>:"<len bytes>";      byte string
//! a:<count>:{<key><value>...} ordered map (keys are i: or s: nodes)
//! ```
//!
//! Decoding is length-driven: byte strings are read by their declared length
//! (so embedded `"` and `;` are fine) and maps by their declared pair count.
//! Encoding recomputes every length and count from the value, so a value that
//! was mutated after decoding re-encodes with consistent headers.
//!
//! For input this codec produced, or that PHP produced, `encode(decode(b))`
//! reproduces `b` byte for byte.

mod decode;
mod encode;

pub use decode::decode;
pub use encode::{encode, encode_into};

/// Maximum map nesting accepted by the decoder
///
/// Deeper input is rejected with a `DecodeError` instead of recursing until
/// the stack runs out.
pub const MAX_NESTING_DEPTH: usize = 512;
