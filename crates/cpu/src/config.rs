use serde::{Deserialize, Serialize};

use crate::STACK_TOP;

/// Run-time knobs for a [`crate::Machine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Abort `run` after this many executed instructions.
    pub max_steps: Option<u64>,
    /// Initial value of the stack pointer register.
    pub stack_top: u8,
}

impl MachineConfig {
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_stack_top(mut self, stack_top: u8) -> Self {
        self.stack_top = stack_top;
        self
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            stack_top: STACK_TOP,
        }
    }
}
