//! Serialization of responses and deserialization of variables.
#[doc(hidden)]
pub mod serde;
