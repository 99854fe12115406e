mod commands;
mod logger;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::{AsmCmd, DisasmCmd, RunCmd};

#[derive(Parser, Debug)]
#[command(name = "ls8", about = "Run, assemble and inspect LS-8 programs", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute an `.ls8` listing and print what it outputs
    Run(RunCmd),
    /// Assemble mnemonic source into an `.ls8` listing
    Asm(AsmCmd),
    /// Disassemble an `.ls8` listing
    Disasm(DisasmCmd),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let trace = matches!(&cli.command, Command::Run(cmd) if cmd.trace);
    logger::setup_logger(trace);

    let result = match &cli.command {
        Command::Run(cmd) => cmd.run(),
        Command::Asm(cmd) => cmd.run(),
        Command::Disasm(cmd) => cmd.run(),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from(["ls8", "run", "demos/print8.ls8", "--trace", "--max-steps", "10"])
            .unwrap();
        let Command::Run(cmd) = cli.command else {
            panic!("expected run");
        };
        assert!(cmd.trace);
        assert_eq!(cmd.max_steps, Some(10));
        assert!(!cmd.json);
    }

    #[test]
    fn parses_asm_output() {
        let cli = Cli::try_parse_from(["ls8", "asm", "prog.asm", "-o", "prog.ls8"]).unwrap();
        let Command::Asm(cmd) = cli.command else {
            panic!("expected asm");
        };
        assert_eq!(cmd.output.as_deref(), Some(std::path::Path::new("prog.ls8")));
    }

    #[test]
    fn rejects_missing_program() {
        assert!(Cli::try_parse_from(["ls8", "run"]).is_err());
    }
}
