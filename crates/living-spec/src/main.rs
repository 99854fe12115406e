use colored::*;
use ls8::Execution;
use ls8_cpu::{FaultKind, MachineConfig, Opcode};

const MANIFESTO: &str = r#"
================================================================================
LS-8 // LIVING SPECIFICATION
================================================================================

[ MACHINE ]
256 bytes of RAM, 8 registers (R7 = SP, starts at 0xF4), flags 00000LGE.
Registers are 8 bits wide; arithmetic wraps. DIV truncates, /0 faults.

[ CONTRACT ]
[x] Unknown opcodes, division by zero and address faults stop the run.
[x] JMP / CALL / RET / taken branches never also advance the PC.
[x] Every demo under demos/ assembles from its .asm and prints what it says.

================================================================================
CONFORMANCE SUITE
================================================================================
"#;

struct Demo {
    name: &'static str,
    source: &'static str,
    listing: &'static str,
    expected: Result<&'static [u8], FaultKind>,
}

const DEMOS: &[Demo] = &[
    Demo {
        name: "print8",
        source: include_str!("../../../demos/print8.asm"),
        listing: include_str!("../../../demos/print8.ls8"),
        expected: Ok(&[8]),
    },
    Demo {
        name: "mult",
        source: include_str!("../../../demos/mult.asm"),
        listing: include_str!("../../../demos/mult.ls8"),
        expected: Ok(&[72]),
    },
    Demo {
        name: "stack",
        source: include_str!("../../../demos/stack.asm"),
        listing: include_str!("../../../demos/stack.ls8"),
        expected: Ok(&[2, 4, 1]),
    },
    Demo {
        name: "call",
        source: include_str!("../../../demos/call.asm"),
        listing: include_str!("../../../demos/call.ls8"),
        expected: Ok(&[20, 30, 36, 60]),
    },
    Demo {
        name: "sctest",
        source: include_str!("../../../demos/sctest.asm"),
        listing: include_str!("../../../demos/sctest.ls8"),
        expected: Ok(&[1, 4, 5]),
    },
    Demo {
        name: "countdown",
        source: include_str!("../../../demos/countdown.asm"),
        listing: include_str!("../../../demos/countdown.ls8"),
        expected: Ok(&[3, 2, 1]),
    },
    Demo {
        name: "divzero",
        source: include_str!("../../../demos/divzero.asm"),
        listing: include_str!("../../../demos/divzero.ls8"),
        expected: Err(FaultKind::Arithmetic),
    },
];

fn main() {
    println!("{}", MANIFESTO);
    let mut passed = 0;
    let mut failed = 0;

    run_test("ISA_OPCODE_MAPPING", test_opcodes, &mut passed, &mut failed);
    run_test("UNKNOWN_OPCODE_AT_4", test_unknown_opcode, &mut passed, &mut failed);
    run_test("STEP_BUDGET", test_step_budget, &mut passed, &mut failed);
    for demo in DEMOS {
        let name = format!("DEMO_{}", demo.name.to_uppercase());
        run_test(&name, || check_demo(demo), &mut passed, &mut failed);
    }

    println!("\n--------------------------------------------------------------------------------");
    println!("{} passed, {} failed", passed, failed);
    if failed == 0 {
        println!("{}", "ALL SYSTEMS NOMINAL.".green().bold());
    } else {
        std::process::exit(1);
    }
}

// --- TEST INFRASTRUCTURE ---

fn run_test<F>(name: &str, test_fn: F, passed: &mut i32, failed: &mut i32)
where F: Fn() -> Result<(), String> {
    print!("TEST: {:<30} ... ", name);
    match test_fn() {
        Ok(_) => { println!("{}", "PASS".green()); *passed += 1; }
        Err(e) => { println!("{}", "FAIL".red()); println!("  -> {}", e); *failed += 1; }
    }
}

fn config() -> MachineConfig {
    MachineConfig::default().with_max_steps(10_000)
}

fn execute(listing: &str) -> Result<Execution, String> {
    ls8::execute_listing(listing, config()).map_err(|e| e.to_string())
}

fn check_demo(demo: &Demo) -> Result<(), String> {
    let assembled = ls8_asm::assemble(demo.source).map_err(|e| e.to_string())?;
    let listed = ls8::loader::parse_listing(demo.listing).map_err(|e| e.to_string())?;
    if assembled != listed {
        return Err(format!("{}.asm does not assemble to {}.ls8", demo.name, demo.name));
    }

    let run = execute(demo.listing)?;
    match (demo.expected, &run.fault) {
        (Ok(expected), None) if run.output == expected => Ok(()),
        (Err(kind), Some(fault)) if fault.kind == kind => Ok(()),
        (_, Some(fault)) => Err(format!("faulted: {}", fault.message)),
        (_, None) => Err(format!("printed {:?}", run.output)),
    }
}

fn test_opcodes() -> Result<(), String> {
    if (Opcode::Hlt as u8) != 0b0000_0001 { return Err("HLT != 0b00000001".into()); }
    if (Opcode::Ldi as u8) != 0b1000_0010 { return Err("LDI != 0b10000010".into()); }
    if Opcode::Call.byte_len() != 2 || !Opcode::Call.sets_pc() { return Err("CALL shape".into()); }
    Ok(())
}

fn test_unknown_opcode() -> Result<(), String> {
    let program = [Opcode::Prn as u8, 0, Opcode::Prn as u8, 0, 0xFF, Opcode::Prn as u8, 0, Opcode::Hlt as u8];
    let run = ls8::execute(&program, config()).map_err(|e| e.to_string())?;
    match run.fault {
        Some(fault) if fault.kind == FaultKind::Opcode && fault.pc == Some(4) && run.output.len() == 2 => Ok(()),
        other => Err(format!("unexpected outcome {:?}", other)),
    }
}

fn test_step_budget() -> Result<(), String> {
    let program = [Opcode::Ldi as u8, 0, 3, Opcode::Jmp as u8, 0];
    let run = ls8::execute(&program, config()).map_err(|e| e.to_string())?;
    match run.fault {
        Some(fault) if fault.kind == FaultKind::Budget => Ok(()),
        other => Err(format!("loop was not stopped: {:?}", other)),
    }
}
