use crate::cli::InfoArgs;
use crate::exit_codes;
use crate::output;
use scratchpad_rs::{FilterMode, PadConfig};
use serde::Serialize;

#[derive(Serialize)]
struct InfoOutput {
    cli_version: String,
    platform: String,
    arch: String,
    config: PadConfig,
}

pub fn execute(args: InfoArgs) -> i32 {
    let config = args.session.to_config();
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return exit_codes::INPUT_ERROR;
    }

    let info = InfoOutput {
        cli_version: env!("CARGO_PKG_VERSION").to_string(),
        platform: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        config,
    };

    if args.json {
        if let Err(e) = output::print_json(&info, false) {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
        return exit_codes::SUCCESS;
    }

    let config = &info.config;
    let filter = match config.filter {
        FilterMode::Passthrough => "none".to_string(),
        FilterMode::MovingAverage { window } => format!("moving average over {} samples", window),
    };

    println!("scratchpad CLI v{}", info.cli_version);
    println!("Platform: {} ({})", info.platform, info.arch);
    println!();
    println!("State feed: {}", config.address());
    println!("Dimensions: {}", config.dimensions);
    println!("Smoothing: {}", filter);
    println!("View slots: {}", config.view_slots);
    println!("Continuous save every {} ms", config.save_interval_ms);
    println!("Continuous view every {} ms", config.view_interval_ms);

    exit_codes::SUCCESS
}
