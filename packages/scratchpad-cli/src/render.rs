use crate::output;
use scratchpad_rs::{RankedBookmark, RankedView, Renderer, StatePoint};
use serde::Serialize;

/// One rendered view, as printed in `--json` mode
#[derive(Serialize)]
struct ViewFrame<'a> {
    state: &'a StatePoint,
    max_distance: Option<f64>,
    slots: Vec<Option<&'a RankedBookmark<'a>>>,
}

/// Prints views to stdout, as text or one JSON object per line
pub struct TerminalRenderer {
    json: bool,
    /// Last state line printed, so an unchanged mirror is not repeated
    last_state: Option<String>,
}

impl TerminalRenderer {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            last_state: None,
        }
    }

    fn emit(&self, text: &str) {
        if let Err(e) = output::write_line(text) {
            log::error!("{}", e);
        }
    }
}

/// Slider positions in percent, the way the state is shown to the user
pub fn format_state(state: &StatePoint) -> String {
    let sliders: Vec<String> = state
        .components()
        .iter()
        .map(|v| format!("{:>3.0}%", v * 100.0))
        .collect();
    format!("State: [{}]", sliders.join(" "))
}

/// Bar whose length grows with the distance relative to the farthest bookmark
fn shade(distance: f64, max_distance: Option<f64>) -> String {
    const WIDTH: usize = 10;
    let fraction = match max_distance {
        Some(max) if max > 0.0 => (distance / max).clamp(0.0, 1.0),
        _ => 0.0,
    };
    let filled = (fraction * WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(WIDTH - filled))
}

impl Renderer for TerminalRenderer {
    fn render_bookmarks(&mut self, view: &RankedView<'_>, slots: usize) {
        let viewport = view.viewport(slots);

        if self.json {
            let frame = ViewFrame {
                state: &view.state,
                max_distance: view.max_distance(),
                slots: viewport,
            };
            match output::to_json(&frame, true) {
                Ok(json) => self.emit(&json),
                Err(e) => log::error!("{}", e),
            }
            return;
        }

        let mut lines = vec![format!(
            "Bookmarks ({} saved, nearest first):",
            view.len()
        )];
        for (i, slot) in viewport.iter().enumerate() {
            match slot {
                Some(entry) => {
                    let bookmark = entry.bookmark;
                    lines.push(format!(
                        "  {}. {} [{}] d={:.4}",
                        i + 1,
                        bookmark.title,
                        shade(entry.distance, view.max_distance()),
                        entry.distance
                    ));
                    lines.push(format!("     {}", bookmark.url));
                    if let Some(selection) = &bookmark.selection {
                        lines.push(format!("     \"{}\"", selection));
                    }
                    if let Some(thumbnail) = &bookmark.thumbnail {
                        lines.push(format!("     thumbnail: {}", thumbnail));
                    }
                    lines.push(format!(
                        "     saved {}",
                        bookmark.created_at.format("%Y-%m-%d %H:%M:%S")
                    ));
                }
                None => lines.push(format!("  {}. (empty)", i + 1)),
            }
        }
        self.emit(&lines.join("\n"));
    }

    fn render_state(&mut self, state: &StatePoint) {
        if self.json {
            return;
        }
        let line = format_state(state);
        if self.last_state.as_deref() != Some(line.as_str()) {
            self.emit(&line);
            self.last_state = Some(line);
        }
    }
}
