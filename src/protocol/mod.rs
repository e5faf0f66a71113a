//! RFC 6455 framing: header decoding, payload accumulation, validation and
//! message reassembly.

pub mod assembler;
pub mod frame;
pub mod header;
pub mod mask;
pub mod opcode;
pub mod payload;
pub mod role;
pub mod utf8;
pub mod validation;

pub use assembler::MessageAssembler;
pub use frame::Frame;
pub use header::{Decode, FrameHeader};
pub use mask::{apply_mask, apply_mask_at, apply_mask_fast};
pub use opcode::OpCode;
pub use payload::PayloadAccumulator;
pub use role::Role;
pub use utf8::{Utf8Validator, validate_utf8};
pub use validation::{FrameValidator, MAX_CONTROL_FRAME_PAYLOAD};
