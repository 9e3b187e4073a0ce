//! Core types for wikivault
//!
//! This crate defines the value model shared by the rest of the system:
//! - StructuredValue: one decoded node of the PHP `serialize()` format
//! - codec: length-driven decoder and header-recomputing encoder
//! - DecodeError: the single error kind produced by the decoder
//!
//! Nothing here touches disk. Filters, the tree walker and the archive
//! writer live in `wikivault-durability`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod value;

pub use codec::{decode, encode, encode_into, MAX_NESTING_DEPTH};
pub use error::{DecodeError, DecodeResult};
pub use value::StructuredValue;
