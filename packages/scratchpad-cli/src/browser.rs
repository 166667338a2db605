use scratchpad_rs::{PageCapture, PageSource, Result, ScratchpadError};

/// Browser stand-in driven by `open`, `select`, and `thumb` commands.
///
/// Navigation from a bookmark click just makes that URL the current page.
#[derive(Debug, Default)]
pub struct ScriptedBrowser {
    current: Option<PageCapture>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, url: &str, title: Option<&str>) {
        log::info!("Opened {}", url);
        self.current = Some(PageCapture::new(url, title.unwrap_or(url)));
    }

    pub fn select(&mut self, text: &str) -> Result<()> {
        let page = self.current_mut()?;
        page.selection = Some(text.to_string());
        Ok(())
    }

    pub fn set_thumbnail(&mut self, handle: &str) -> Result<()> {
        let page = self.current_mut()?;
        page.thumbnail = Some(handle.to_string());
        Ok(())
    }

    pub fn current(&self) -> Option<&PageCapture> {
        self.current.as_ref()
    }

    fn current_mut(&mut self) -> Result<&mut PageCapture> {
        self.current.as_mut().ok_or_else(no_page)
    }
}

fn no_page() -> ScratchpadError {
    ScratchpadError::Capture("no page is open; use 'open <url> [title]'".to_string())
}

impl PageSource for ScriptedBrowser {
    fn capture_current_page(&mut self) -> Result<PageCapture> {
        self.current.clone().ok_or_else(no_page)
    }

    fn navigate_to(&mut self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(ScratchpadError::Navigation("empty URL".to_string()));
        }
        log::info!("Navigating to {}", url);
        self.current = Some(PageCapture::new(url, url));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_requires_open_page() {
        let mut browser = ScriptedBrowser::new();
        assert!(browser.capture_current_page().is_err());
        assert!(browser.select("text").is_err());
    }

    #[test]
    fn test_capture_carries_selection_and_thumbnail() {
        let mut browser = ScriptedBrowser::new();
        browser.open("http://example.org/", Some("Example"));
        browser.select("some words").unwrap();
        browser.set_thumbnail("thumb-1.png").unwrap();

        let capture = browser.capture_current_page().unwrap();
        assert_eq!(capture.title, "Example");
        assert_eq!(capture.selection.as_deref(), Some("some words"));
        assert_eq!(capture.thumbnail.as_deref(), Some("thumb-1.png"));
    }

    #[test]
    fn test_navigation_replaces_page() {
        let mut browser = ScriptedBrowser::new();
        browser.open("http://a/", None);
        browser.select("x").unwrap();
        browser.navigate_to("http://b/").unwrap();

        let page = browser.current().unwrap();
        assert_eq!(page.url, "http://b/");
        assert_eq!(page.selection, None);
    }
}
