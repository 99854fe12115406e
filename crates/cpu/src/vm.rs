use tracing::{debug, trace};

use crate::alu;
use crate::config::MachineConfig;
use crate::error::VmError;
use crate::flags::Flags;
use crate::isa::{Instruction, Opcode};
use crate::memory::Memory;
use crate::registers::RegisterFile;
use crate::sink::OutputSink;
use crate::{MEMORY_SIZE, SP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VMStatus {
    Running,
    Halted,
    Output(u8), // PRN: the host decides where the value goes
}

/// How the PC moves after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Emit(u8),
    Jump(usize),
    Halt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub pc: usize,
}

/// The LS-8 engine. Owns memory, registers, PC and flags.
#[derive(Debug, Clone)]
pub struct Machine {
    memory: Memory,
    registers: RegisterFile,
    flags: Flags,
    pc: usize,
    halted: bool,
    steps: u64,
    config: MachineConfig,
}

impl Machine {
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default())
    }

    pub fn with_config(config: MachineConfig) -> Self {
        Self {
            memory: Memory::new(),
            registers: RegisterFile::new(config.stack_top),
            flags: Flags::default(),
            pc: 0,
            halted: false,
            steps: 0,
            config,
        }
    }

    /// Writes a program image at address 0.
    pub fn load(&mut self, program: &[u8]) -> Result<(), VmError> {
        self.memory.load(0, program)?;
        debug!(bytes = program.len(), "program loaded");
        Ok(())
    }

    // The heartbeat: execute one instruction
    pub fn step(&mut self) -> Result<VMStatus, VmError> {
        if self.halted {
            return Ok(VMStatus::Halted);
        }

        let pc = self.pc;
        trace!("{}", self.trace_line());

        // Fetch & Decode
        let instruction = self.fetch(pc)?;
        self.steps += 1;

        // Execute
        let flow = self.execute(pc, instruction).map_err(|e| e.at(pc))?;
        let status = match flow {
            Flow::Next => {
                self.pc = pc + instruction.byte_len();
                VMStatus::Running
            }
            Flow::Emit(value) => {
                self.pc = pc + instruction.byte_len();
                VMStatus::Output(value)
            }
            Flow::Jump(target) => {
                self.pc = target;
                VMStatus::Running
            }
            Flow::Halt => {
                self.pc = pc + instruction.byte_len();
                self.halted = true;
                debug!(pc, steps = self.steps, "halted");
                VMStatus::Halted
            }
        };
        Ok(status)
    }

    /// Steps until `HLT`, forwarding printed values to `sink`.
    pub fn run<S: OutputSink + ?Sized>(&mut self, sink: &mut S) -> Result<RunSummary, VmError> {
        loop {
            if let Some(limit) = self.config.max_steps {
                if !self.halted && self.steps >= limit {
                    return Err(VmError::StepLimitExceeded { limit });
                }
            }
            match self.step()? {
                VMStatus::Running => {}
                VMStatus::Output(value) => sink.emit(value)?,
                VMStatus::Halted => break,
            }
        }
        Ok(RunSummary {
            steps: self.steps,
            pc: self.pc,
        })
    }

    fn fetch(&self, pc: usize) -> Result<Instruction, VmError> {
        let byte = self.memory.read(pc).map_err(|e| e.at(pc))?;
        let opcode = Opcode::from_byte(byte).ok_or(VmError::UnknownOpcode { opcode: byte, pc })?;

        let mut operands = [0u8; 2];
        for (offset, slot) in operands.iter_mut().take(opcode.operand_count()).enumerate() {
            *slot = self.memory.read(pc + 1 + offset).map_err(|e| e.at(pc))?;
        }
        Ok(Instruction::decode(opcode, operands[0], operands[1]))
    }

    fn execute(&mut self, pc: usize, instruction: Instruction) -> Result<Flow, VmError> {
        match instruction {
            Instruction::Halt => Ok(Flow::Halt),

            Instruction::LoadImmediate { reg, value } => {
                self.registers.set(reg, value)?;
                Ok(Flow::Next)
            }

            Instruction::Print { reg } => Ok(Flow::Emit(self.registers.get(reg)?)),

            Instruction::Alu { op, reg_a, reg_b } => {
                alu::execute(op, reg_a, reg_b, &mut self.registers, &mut self.flags)?;
                Ok(Flow::Next)
            }

            // --- Stack ---
            Instruction::Push { reg } => {
                self.registers.get(reg)?;
                let sp = self.decrement_sp(pc)?;
                // Read after the decrement: PUSH R7 stores the new SP.
                let value = self.registers.get(reg)?;
                self.memory.write(sp, value)?;
                Ok(Flow::Next)
            }
            Instruction::Pop { reg } => {
                self.registers.get(reg)?;
                let value = self.pop_byte(pc)?;
                self.registers.set(reg, value)?;
                self.increment_sp(pc)?;
                Ok(Flow::Next)
            }

            // --- Control Flow ---
            Instruction::Call { reg } => {
                self.registers.get(reg)?;
                let return_address = pc + instruction.byte_len();
                let return_byte = u8::try_from(return_address)
                    .map_err(|_| VmError::MemoryOutOfBounds { address: return_address })?;
                let sp = self.decrement_sp(pc)?;
                self.memory.write(sp, return_byte)?;
                Ok(Flow::Jump(self.registers.get(reg)? as usize))
            }
            Instruction::Return => {
                let target = self.pop_byte(pc)?;
                self.increment_sp(pc)?;
                Ok(Flow::Jump(target as usize))
            }
            Instruction::Jump { reg } => Ok(Flow::Jump(self.registers.get(reg)? as usize)),
            Instruction::JumpIfEqual { reg } => self.branch(reg, self.flags.equal()),
            Instruction::JumpIfNotEqual { reg } => self.branch(reg, !self.flags.equal()),
        }
    }

    fn branch(&self, reg: u8, taken: bool) -> Result<Flow, VmError> {
        let target = self.registers.get(reg)?;
        Ok(if taken {
            Flow::Jump(target as usize)
        } else {
            Flow::Next
        })
    }

    /// Moves SP down one cell and returns the new top.
    fn decrement_sp(&mut self, pc: usize) -> Result<usize, VmError> {
        let sp = self.registers.get(SP)?;
        let sp = sp.checked_sub(1).ok_or(VmError::StackOverflow { pc })?;
        self.registers.set(SP, sp)?;
        Ok(sp as usize)
    }

    /// Reads the byte at SP, refusing when SP cannot be incremented afterwards.
    fn pop_byte(&self, pc: usize) -> Result<u8, VmError> {
        let sp = self.registers.get(SP)? as usize;
        if sp + 1 >= MEMORY_SIZE {
            return Err(VmError::StackUnderflow { pc });
        }
        self.memory.read(sp)
    }

    fn increment_sp(&mut self, pc: usize) -> Result<(), VmError> {
        let sp = self.registers.get(SP)?;
        let sp = sp.checked_add(1).ok_or(VmError::StackUnderflow { pc })?;
        self.registers.set(SP, sp)
    }

    /// One-line state dump: `TRACE: PC | op a b | R0 .. R7`.
    pub fn trace_line(&self) -> String {
        let peek = |address: usize| self.memory.read(address).unwrap_or_default();
        let registers: String = self
            .registers
            .snapshot()
            .iter()
            .map(|value| format!(" {value:02X}"))
            .collect();
        format!(
            "TRACE: {:02X} | {:02X} {:02X} {:02X} |{registers}",
            self.pc,
            peek(self.pc),
            peek(self.pc + 1),
            peek(self.pc + 2)
        )
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
