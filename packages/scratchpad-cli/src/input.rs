/// One line typed at the session prompt
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    Open { url: String, title: Option<String> },
    Select(String),
    Thumb(String),
    Save,
    View,
    /// Continuous view on/off
    Live(bool),
    /// Continuous save on/off
    AutoSave(bool),
    /// Slider position in percent of the `[0, 1]` range
    Slider { index: usize, position: u8 },
    /// 1-based viewport slot
    Go(usize),
    State,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  open <url> [title]      make <url> the current page
  select <text>           set the current page's selected text
  thumb <handle>          attach a thumbnail handle to the current page
  save                    bookmark the current page with the current state
  view                    rank bookmarks against the current state
  live on|off             continuous view
  autosave on|off         continuous save (one bookmark per URL)
  slider <n> <0-100>      set state component <n> (0-based)
  go <slot>               open the bookmark shown in <slot> (1-based)
  state                   print the current state
  status                  print feed and session status
  help                    show this help
  quit                    end the session";

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<UiCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "open" => {
            let (url, title) = match rest.split_once(char::is_whitespace) {
                Some((url, title)) => (url, Some(title.trim().to_string())),
                None => (rest, None),
            };
            if url.is_empty() {
                return Err("usage: open <url> [title]".to_string());
            }
            UiCommand::Open {
                url: url.to_string(),
                title,
            }
        }
        "select" => UiCommand::Select(required(rest, "select <text>")?),
        "thumb" => UiCommand::Thumb(required(rest, "thumb <handle>")?),
        "save" => UiCommand::Save,
        "view" => UiCommand::View,
        "live" => UiCommand::Live(parse_switch(rest, "live on|off")?),
        "autosave" => UiCommand::AutoSave(parse_switch(rest, "autosave on|off")?),
        "slider" => parse_slider(rest)?,
        "go" => {
            let slot: usize = rest
                .parse()
                .map_err(|_| "usage: go <slot>".to_string())?;
            if slot == 0 {
                return Err("slots are numbered from 1".to_string());
            }
            UiCommand::Go(slot)
        }
        "state" => UiCommand::State,
        "status" => UiCommand::Status,
        "help" | "?" => UiCommand::Help,
        "quit" | "exit" => UiCommand::Quit,
        other => return Err(format!("unknown command '{}' (try 'help')", other)),
    };

    Ok(Some(command))
}

fn required(rest: &str, usage: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("usage: {}", usage))
    } else {
        Ok(rest.to_string())
    }
}

fn parse_switch(rest: &str, usage: &str) -> Result<bool, String> {
    match rest.to_ascii_lowercase().as_str() {
        "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        _ => Err(format!("usage: {}", usage)),
    }
}

fn parse_slider(rest: &str) -> Result<UiCommand, String> {
    const USAGE: &str = "usage: slider <n> <0-100>";
    let mut parts = rest.split_whitespace();
    let (Some(index), Some(position), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(USAGE.to_string());
    };

    let index: usize = index.parse().map_err(|_| USAGE.to_string())?;
    let position: u8 = position.parse().map_err(|_| USAGE.to_string())?;
    if position > 100 {
        return Err("slider position must be between 0 and 100".to_string());
    }
    Ok(UiCommand::Slider { index, position })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comment_lines_are_ignored() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(parse_command("# note"), Ok(None));
    }

    #[test]
    fn test_open_with_and_without_title() {
        assert_eq!(
            parse_command("open http://a/ A page title").unwrap(),
            Some(UiCommand::Open {
                url: "http://a/".to_string(),
                title: Some("A page title".to_string()),
            })
        );
        assert_eq!(
            parse_command("open http://a/").unwrap(),
            Some(UiCommand::Open {
                url: "http://a/".to_string(),
                title: None,
            })
        );
        assert!(parse_command("open").is_err());
    }

    #[test]
    fn test_slider_bounds() {
        assert_eq!(
            parse_command("slider 2 75").unwrap(),
            Some(UiCommand::Slider {
                index: 2,
                position: 75
            })
        );
        assert!(parse_command("slider 2 101").is_err());
        assert!(parse_command("slider 2").is_err());
        assert!(parse_command("slider x 10").is_err());
    }

    #[test]
    fn test_switches_and_slots() {
        assert_eq!(parse_command("LIVE on").unwrap(), Some(UiCommand::Live(true)));
        assert_eq!(
            parse_command("autosave off").unwrap(),
            Some(UiCommand::AutoSave(false))
        );
        assert!(parse_command("live maybe").is_err());
        assert_eq!(parse_command("go 3").unwrap(), Some(UiCommand::Go(3)));
        assert!(parse_command("go 0").is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_command("bookmark").unwrap_err();
        assert!(err.contains("unknown command"));
    }
}
