//! Protocol module containing the control-channel frame types and the codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_agent_frame, decode_host_frame, encode_frame, CodecError, MAX_FRAME_LEN};
pub use messages::*;
