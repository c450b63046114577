//! Protocol module containing event kinds, message types, and the JSON codec.

pub mod codec;
pub mod event;
pub mod messages;

pub use codec::{decode_command, decode_inbound, encode_command, encode_inbound, CodecError};
pub use event::{Direction, EventKind};
pub use messages::*;
