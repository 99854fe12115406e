use ls8_cpu::MachineConfig;
use wasm_bindgen::prelude::*;

// Browser pages have no Ctrl-C; every run gets a budget.
const STEP_BUDGET: u64 = 100_000;

fn config() -> MachineConfig {
    MachineConfig::default().with_max_steps(STEP_BUDGET)
}

/// Runs an `.ls8` listing and returns its output lines, followed by an
/// `error:` line if the run did not halt cleanly.
#[wasm_bindgen]
pub fn run_listing(listing: &str) -> String {
    match ls8::execute_listing(listing, config()) {
        Ok(run) => {
            let mut text = run.output_lines();
            if let Some(fault) = run.fault {
                text.push_str(&format!("error: {}\n", fault.message));
            }
            text
        }
        Err(err) => format!("error: {err}\n"),
    }
}

/// Runs an `.ls8` listing and returns the full execution report as JSON.
#[wasm_bindgen]
pub fn run_listing_json(listing: &str) -> String {
    let value = match ls8::execute_listing(listing, config()) {
        Ok(run) => serde_json::to_value(&run)
            .unwrap_or_else(|err| serde_json::json!({ "error": err.to_string() })),
        Err(err) => serde_json::json!({ "error": err.to_string() }),
    };
    value.to_string()
}
