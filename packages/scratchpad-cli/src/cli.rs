use clap::{Args, Parser, Subcommand};
use scratchpad_rs::config::{
    DEFAULT_DIMENSIONS, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SAVE_INTERVAL_MS,
    DEFAULT_VIEW_INTERVAL_MS, DEFAULT_VIEW_SLOTS,
};
use scratchpad_rs::filter::DEFAULT_WINDOW;
use scratchpad_rs::simulator::{DEFAULT_INTERVAL_MS, DEFAULT_STEP};
use scratchpad_rs::{FilterMode, PadConfig};

#[derive(Parser)]
#[command(
    name = "scratchpad",
    version,
    about = "Brain scratchpad: bookmark pages with your brain state and retrieve them by state",
    long_about = "Bookmark pages together with a live brain/body state vector and list them\n\
                  nearest-first to the current state. The state arrives as newline-delimited\n\
                  comma-separated floats over TCP (see `scratchpad simulate`)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start an interactive session (commands on stdin, `help` lists them)
    Run(RunArgs),
    /// Serve a simulated state stream
    Simulate(SimulateArgs),
    /// Show the effective session configuration
    Info(InfoArgs),
}

#[derive(Args, Clone)]
pub struct SessionArgs {
    /// State feed host
    #[arg(long, env = "SCRATCHPAD_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// State feed port
    #[arg(long, env = "SCRATCHPAD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Number of components in every state vector
    #[arg(long, env = "SCRATCHPAD_DIMENSIONS", default_value_t = DEFAULT_DIMENSIONS)]
    pub dimensions: usize,

    /// Moving average window over the feed (0 disables smoothing)
    #[arg(long, env = "SCRATCHPAD_FILTER_WINDOW", default_value_t = DEFAULT_WINDOW)]
    pub filter_window: usize,

    /// Bookmark slots shown per view
    #[arg(long, env = "SCRATCHPAD_VIEW_SLOTS", default_value_t = DEFAULT_VIEW_SLOTS)]
    pub view_slots: usize,

    /// Continuous-save period in milliseconds
    #[arg(long, env = "SCRATCHPAD_SAVE_INTERVAL_MS", default_value_t = DEFAULT_SAVE_INTERVAL_MS)]
    pub save_interval_ms: u64,

    /// Continuous-view refresh period in milliseconds
    #[arg(long, env = "SCRATCHPAD_VIEW_INTERVAL_MS", default_value_t = DEFAULT_VIEW_INTERVAL_MS)]
    pub view_interval_ms: u64,
}

impl SessionArgs {
    pub fn to_config(&self) -> PadConfig {
        let filter = match self.filter_window {
            0 => FilterMode::Passthrough,
            window => FilterMode::MovingAverage { window },
        };

        PadConfig {
            host: self.host.clone(),
            port: self.port,
            dimensions: self.dimensions,
            filter,
            view_slots: self.view_slots,
            save_interval_ms: self.save_interval_ms,
            view_interval_ms: self.view_interval_ms,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Do not connect to the state feed; drive the state with `slider` only
    #[arg(long, default_value_t = false)]
    pub no_feed: bool,

    /// Start with three demo bookmarks
    #[arg(long, default_value_t = false)]
    pub demo: bool,

    /// Print each view as one line of JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Address to listen on
    #[arg(long, env = "SCRATCHPAD_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on
    #[arg(long, env = "SCRATCHPAD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Number of components per record
    #[arg(long, env = "SCRATCHPAD_DIMENSIONS", default_value_t = DEFAULT_DIMENSIONS)]
    pub dimensions: usize,

    /// Delay between records in milliseconds
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Largest per-record change of a component
    #[arg(long, default_value_t = DEFAULT_STEP)]
    pub step: f64,

    /// Seed for a reproducible walk
    #[arg(long)]
    pub seed: Option<u64>,

    /// Close each connection after this many records
    #[arg(long)]
    pub max_lines: Option<u64>,

    /// Exit after serving the first client
    #[arg(long, default_value_t = false)]
    pub once: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_zero_window_means_passthrough() {
        let cli = Cli::parse_from(["scratchpad", "info", "--filter-window", "0"]);
        let Command::Info(args) = cli.command else {
            panic!("expected info");
        };
        assert_eq!(args.session.to_config().filter, FilterMode::Passthrough);
    }

    #[test]
    fn test_session_flags_reach_config() {
        let cli = Cli::parse_from([
            "scratchpad",
            "run",
            "--host",
            "sensor.local",
            "--port",
            "9000",
            "--dimensions",
            "16",
            "--view-slots",
            "3",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = args.session.to_config();
        assert_eq!(config.address(), "sensor.local:9000");
        assert_eq!(config.dimensions, 16);
        assert_eq!(config.view_slots, 3);
        assert_eq!(
            config.filter,
            FilterMode::MovingAverage {
                window: DEFAULT_WINDOW
            }
        );
    }
}
