use crate::cli::SimulateArgs;
use crate::exit_codes;
use scratchpad_rs::StateSimulator;
use std::net::TcpListener;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

pub fn execute(args: SimulateArgs) -> i32 {
    if args.dimensions == 0 {
        eprintln!("Error: --dimensions must be at least 1");
        return exit_codes::INPUT_ERROR;
    }
    if !args.step.is_finite() {
        eprintln!("Error: --step must be a finite number");
        return exit_codes::INPUT_ERROR;
    }

    let address = format!("{}:{}", args.bind, args.port);
    let listener = match TcpListener::bind(&address) {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Error: Failed to listen on {}: {}", address, e);
            return exit_codes::EXECUTION_ERROR;
        }
    };

    let interval = Duration::from_millis(args.interval_ms);
    let mut simulator = match args.seed {
        Some(seed) => StateSimulator::seeded(args.dimensions, args.step, interval, seed),
        None => StateSimulator::new(args.dimensions, args.step, interval),
    };

    eprintln!(
        "Serving {}-dimensional state on {} every {} ms",
        simulator.dimensions(),
        address,
        args.interval_ms
    );

    let shutdown = AtomicBool::new(false);
    let result = if args.once {
        match listener.accept() {
            Ok((stream, _)) => simulator
                .serve_connection(stream, &shutdown, args.max_lines)
                .map(|sent| log::info!("Sent {} records", sent)),
            Err(e) => Err(e.into()),
        }
    } else {
        simulator.serve(&listener, &shutdown, args.max_lines)
    };

    match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::EXECUTION_ERROR
        }
    }
}
