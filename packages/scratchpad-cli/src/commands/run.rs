use crate::browser::ScriptedBrowser;
use crate::cli::RunArgs;
use crate::exit_codes;
use crate::input::{self, UiCommand};
use crate::output;
use crate::render::{format_state, TerminalRenderer};
use crossbeam::channel;
use scratchpad_rs::{
    FeedHandle, FeedStats, FeedStatus, MovingAverageFilter, PadConfig, Scratchpad,
    SharedStateCell, StateFeed,
};
use serde::Serialize;
use std::io::BufRead;
use std::sync::Arc;

type Session = Scratchpad<ScriptedBrowser, TerminalRenderer>;

/// What `status` reports
#[derive(Serialize)]
struct StatusOutput {
    feed: Option<FeedStatus>,
    feed_stats: Option<FeedStats>,
    bookmarks: usize,
    state_version: u64,
    continuous_view: bool,
    continuous_save: bool,
    current_page: Option<String>,
}

enum Flow {
    Continue,
    Quit,
}

pub fn execute(args: RunArgs) -> i32 {
    let config = args.session.to_config();
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return exit_codes::INPUT_ERROR;
    }

    let cell = Arc::new(SharedStateCell::new(config.dimensions));

    let feed = if args.no_feed {
        log::info!("State feed disabled; use 'slider' to set the state");
        None
    } else {
        match start_feed(&config, &cell) {
            Ok(handle) => Some(handle),
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
        }
    };

    let mut pad = match Scratchpad::new(
        config.clone(),
        Arc::clone(&cell),
        ScriptedBrowser::new(),
        TerminalRenderer::new(args.json),
    ) {
        Ok(pad) => pad,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    if args.demo {
        if let Err(e) = pad.seed_demo_bookmarks() {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    }

    if !args.json {
        println!("scratchpad v{}: type 'help' for commands", env!("CARGO_PKG_VERSION"));
    }
    pad.on_view_requested();

    // Stdin reader; the channel disconnects at end of input
    let (line_tx, line_rx) = channel::unbounded::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    let save_tick = channel::tick(config.save_interval());
    let view_tick = channel::tick(config.view_interval());

    'main: loop {
        crossbeam::select! {
            recv(line_rx) -> line => {
                let Ok(line) = line else {
                    log::debug!("End of input");
                    break 'main;
                };
                match input::parse_command(&line) {
                    Ok(Some(command)) => {
                        if let Flow::Quit = handle_command(&mut pad, command, feed.as_ref(), args.json) {
                            break 'main;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => notice(args.json, &e),
                }
            }

            recv(save_tick) -> _ => {
                pad.on_save_tick();
            }

            recv(view_tick) -> _ => {
                pad.on_view_tick();
            }
        }
    }

    if let Some(feed) = feed {
        feed.stop();
        log::info!("State feed stopped ({:?})", feed.stats());
    }

    exit_codes::SUCCESS
}

fn start_feed(
    config: &PadConfig,
    cell: &Arc<SharedStateCell>,
) -> scratchpad_rs::Result<FeedHandle> {
    let filter = MovingAverageFilter::new(config.filter)?;
    log::info!("Connecting to state feed at {}", config.address());
    StateFeed::spawn(config, Arc::clone(cell), filter)
}

/// Messages that are not views; kept off stdout in JSON mode so stdout
/// stays one frame per line.
fn notice(json: bool, message: &str) {
    if json {
        eprintln!("{}", message);
    } else if let Err(e) = output::write_line(message) {
        log::error!("{}", e);
    }
}

fn handle_command(
    pad: &mut Session,
    command: UiCommand,
    feed: Option<&FeedHandle>,
    json: bool,
) -> Flow {
    let result = match command {
        UiCommand::Open { url, title } => {
            pad.pages_mut().open(&url, title.as_deref());
            Ok(())
        }
        UiCommand::Select(text) => pad.pages_mut().select(&text),
        UiCommand::Thumb(handle) => pad.pages_mut().set_thumbnail(&handle),
        UiCommand::Save => pad.on_save(),
        UiCommand::View => {
            if !pad.view_enabled() {
                log::debug!("View requested while continuous view is on");
            }
            pad.on_view_requested();
            Ok(())
        }
        UiCommand::Live(enabled) => {
            pad.on_continuous_view_toggled(enabled);
            Ok(())
        }
        UiCommand::AutoSave(enabled) => {
            pad.on_continuous_save_toggled(enabled);
            Ok(())
        }
        UiCommand::Slider { index, position } => {
            pad.on_slider_changed(index, f64::from(position) / 100.0)
        }
        UiCommand::Go(slot) => pad.on_bookmark_selected(slot - 1).map(|_| {
            if let Some(page) = pad.pages().current() {
                notice(json, &format!("Opened {}", page.url));
            }
        }),
        UiCommand::State => {
            notice(json, &format_state(&pad.cell().get()));
            Ok(())
        }
        UiCommand::Status => {
            print_status(pad, feed, json);
            Ok(())
        }
        UiCommand::Help => {
            notice(json, input::HELP);
            Ok(())
        }
        UiCommand::Quit => return Flow::Quit,
    };

    if let Err(e) = result {
        notice(json, &format!("Error: {}", e));
    }
    Flow::Continue
}

fn print_status(pad: &Session, feed: Option<&FeedHandle>, json: bool) {
    let status = StatusOutput {
        feed: feed.map(|f| f.status()),
        feed_stats: feed.map(|f| f.stats()),
        bookmarks: pad.store().len(),
        state_version: pad.cell().version(),
        continuous_view: pad.continuous_view(),
        continuous_save: pad.continuous_save(),
        current_page: pad.pages().current().map(|p| p.url.clone()),
    };

    if json {
        match output::to_json(&status, true) {
            Ok(text) => eprintln!("{}", text),
            Err(e) => log::error!("{}", e),
        }
        return;
    }

    let feed_line = match (&status.feed, &status.feed_stats) {
        (Some(state), Some(stats)) => format!(
            "Feed: {:?} ({} received, {} applied, {} dropped)",
            state, stats.lines_received, stats.lines_applied, stats.lines_dropped
        ),
        _ => "Feed: disabled".to_string(),
    };
    let lines = [
        feed_line,
        format!("Bookmarks: {}", status.bookmarks),
        format!("State updates: {}", status.state_version),
        format!(
            "Continuous view: {}, continuous save: {}",
            on_off(status.continuous_view),
            on_off(status.continuous_save)
        ),
        format!(
            "Current page: {}",
            status.current_page.as_deref().unwrap_or("(none)")
        ),
    ];
    notice(false, &lines.join("\n"));
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
