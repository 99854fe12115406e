//! LS-8 facade.
//!
//! Glues the listing loader to the execution core and condenses a run into
//! an [`Execution`] report that the shells print, serialize or check.

use ls8_cpu::{FaultKind, Flags, Machine, MachineConfig, REGISTER_COUNT, VmError};
use ls8_loader::LoadError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub use ls8_cpu as cpu;
pub use ls8_loader as loader;

/// Errors raised before the first instruction executes.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Image(#[from] VmError),
}

/// A fault that ended a run early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    pub kind: FaultKind,
    pub pc: Option<usize>,
    pub message: String,
}

impl From<&VmError> for Fault {
    fn from(err: &VmError) -> Self {
        Self {
            kind: err.kind(),
            pc: err.pc(),
            message: err.to_string(),
        }
    }
}

/// Outcome of running one program on a fresh machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    /// Values printed by `PRN`, in order. Kept up to a fault.
    pub output: Vec<u8>,
    pub steps: u64,
    pub pc: usize,
    pub registers: [u8; REGISTER_COUNT],
    pub flags: Flags,
    pub fault: Option<Fault>,
}

impl Execution {
    pub fn halted(&self) -> bool {
        self.fault.is_none()
    }

    /// Output rendered the way the line sink prints it.
    pub fn output_lines(&self) -> String {
        self.output.iter().map(|v| format!("{v}\n")).collect()
    }
}

/// Runs `program` from address 0 until it halts or faults.
pub fn execute(program: &[u8], config: MachineConfig) -> Result<Execution, Error> {
    let mut vm = Machine::with_config(config);
    vm.load(program)?;

    let mut output = Vec::new();
    let fault = match vm.run(&mut output) {
        Ok(_) => None,
        Err(err) => {
            warn!(pc = ?err.pc(), "run aborted: {err}");
            Some(Fault::from(&err))
        }
    };

    Ok(Execution {
        output,
        steps: vm.steps(),
        pc: vm.pc(),
        registers: vm.registers().snapshot(),
        flags: vm.flags(),
        fault,
    })
}

/// Parses an `.ls8` listing and runs it.
pub fn execute_listing(listing: &str, config: MachineConfig) -> Result<Execution, Error> {
    let program = ls8_loader::parse_listing(listing)?;
    execute(&program, config)
}
