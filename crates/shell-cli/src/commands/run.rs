use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use ls8_cpu::{LineSink, Machine, MachineConfig};

#[derive(Args, Debug)]
pub struct RunCmd {
    /// Path to the program listing
    pub program: PathBuf,

    /// Log a state dump before every instruction
    #[arg(long, env = "LS8_TRACE")]
    pub trace: bool,

    /// Abort after this many instructions
    #[arg(long, env = "LS8_MAX_STEPS")]
    pub max_steps: Option<u64>,

    /// Print the execution report as JSON instead of the program output
    #[arg(long)]
    pub json: bool,
}

impl RunCmd {
    pub fn config(&self) -> MachineConfig {
        MachineConfig {
            max_steps: self.max_steps,
            ..MachineConfig::default()
        }
    }

    pub fn run(&self) -> Result<()> {
        let program = super::read_listing(&self.program)?;

        if self.json {
            let report = ls8::execute(&program, self.config())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if let Some(fault) = report.fault {
                bail!("{}", fault.message);
            }
            return Ok(());
        }

        let mut vm = Machine::with_config(self.config());
        vm.load(&program)?;
        let mut sink = LineSink::new(io::stdout().lock());
        let summary = vm
            .run(&mut sink)
            .with_context(|| format!("{} faulted", self.program.display()))?;
        tracing::debug!(steps = summary.steps, pc = summary.pc, "run complete");
        Ok(())
    }
}
