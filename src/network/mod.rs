//! Network Layer
//!
//! Message types exchanged between host and peers. Transport is left to
//! the embedding application; everything here is serde data.

pub mod protocol;

pub use protocol::{
    ClientMessage, ServerMessage, Lifecycle, ProtocolError,
    encode, decode, encode_json, decode_json, decode_slice,
};
