// LS-8 execution core.
// Memory, register file, ALU and the fetch-decode-execute engine.
// Listing files, assembling and output formatting belong to the shells.

pub mod alu;
pub mod config;
pub mod error;
pub mod flags;
pub mod isa;
pub mod memory;
pub mod registers;
pub mod sink;
pub mod vm;

/// Number of addressable memory cells.
pub const MEMORY_SIZE: usize = 256;
/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 8;
/// Register the engine uses as the stack pointer.
pub const SP: u8 = 7;
/// Initial stack pointer value.
pub const STACK_TOP: u8 = 0xF4;

pub use alu::AluOp;
pub use config::MachineConfig;
pub use error::{FaultKind, VmError};
pub use flags::Flags;
pub use isa::{Instruction, Opcode};
pub use memory::Memory;
pub use registers::RegisterFile;
pub use sink::{LineSink, OutputSink};
pub use vm::{Machine, RunSummary, VMStatus};
