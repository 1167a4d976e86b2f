//! `vb810-core`: NEC V810 CPU pipeline, decoder, system-register file,
//! cache-control command processor, and bus router, as used by the Virtual
//! Boy. No host I/O, no rendering, no audio — this crate is the CPU alone;
//! an embedding frontend supplies ROM/RAM buffers and drives [`Context::emulate`]
//! one budget at a time.

mod bus;
mod condition;
mod context;
mod cpu;
mod decode;
mod error;
mod primitives;
mod psw;

pub use bus::{BusAccess, FORMAT_32, FORMAT_S8, FORMAT_S16, FORMAT_U8, FORMAT_U16};
pub use condition::evaluate_condition;
pub use context::{Context, ContextConfig};
pub use decode::{Instruction, InstructionId, InstructionIdRepr};
pub use error::ContextError;
pub use psw::Psw;

/// Re-exports the small set of types a host embedding this crate needs on
/// every call site, mirroring the donor's `phosphor_core::prelude`.
pub mod prelude {
    pub use crate::{
        BusAccess, Context, ContextConfig, ContextError, FORMAT_32, FORMAT_S8, FORMAT_S16, FORMAT_U8, FORMAT_U16,
        evaluate_condition,
    };
}
