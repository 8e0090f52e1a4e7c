//! State of the embedded web view.

use crate::plugins::web_tools::{OpenMode, WebTool};
use std::time::{Duration, Instant};

/// Capabilities granted to embedded frames.
pub const SANDBOX_PERMISSIONS: &str = "allow-same-origin allow-scripts allow-popups allow-forms allow-modals allow-downloads allow-popups-to-escape-sandbox";

pub trait UrlOpener {
    fn open_window(&mut self, url: &str) -> anyhow::Result<()>;
}

/// Opens URLs with the platform default browser.
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open_window(&mut self, url: &str) -> anyhow::Result<()> {
        open::that(url)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Handed off to a separate window; nothing is rendered in-app.
    Window,
    Embedded,
}

#[derive(Debug)]
pub struct EmbedHost {
    tool: Option<WebTool>,
    src: Option<String>,
    loading: bool,
    refresh_delay: Duration,
    restore_at: Option<Instant>,
}

impl Default for EmbedHost {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

impl EmbedHost {
    pub fn new(refresh_delay: Duration) -> Self {
        Self {
            tool: None,
            src: None,
            loading: false,
            refresh_delay,
            restore_at: None,
        }
    }

    pub fn tool(&self) -> Option<&WebTool> {
        self.tool.as_ref()
    }

    /// URL currently assigned to the frame, `None` while cleared.
    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn sandbox_attribute(&self) -> &'static str {
        SANDBOX_PERMISSIONS
    }

    pub fn select(
        &mut self,
        tool: &WebTool,
        opener: &mut dyn UrlOpener,
    ) -> anyhow::Result<Selection> {
        match tool.open_mode {
            OpenMode::Window => {
                opener.open_window(&tool.url)?;
                tracing::debug!(id = %tool.id, "opened web tool in a new window");
                Ok(Selection::Window)
            }
            OpenMode::Iframe => {
                self.tool = Some(tool.clone());
                self.src = Some(tool.url.clone());
                self.loading = true;
                self.restore_at = None;
                tracing::debug!(id = %tool.id, url = %tool.url, "embedding web tool");
                Ok(Selection::Embedded)
            }
        }
    }

    pub fn on_load_complete(&mut self) {
        self.loading = false;
    }

    /// Clear the frame source; [`EmbedHost::poll`] restores it once the
    /// refresh delay has elapsed.
    pub fn refresh(&mut self, now: Instant) {
        if self.tool.is_none() {
            return;
        }
        self.src = None;
        self.loading = true;
        self.restore_at = Some(now + self.refresh_delay);
    }

    /// Finish a pending refresh. Returns true when the source was restored.
    pub fn poll(&mut self, now: Instant) -> bool {
        match (self.restore_at, &self.tool) {
            (Some(at), Some(tool)) if now >= at => {
                self.src = Some(tool.url.clone());
                self.restore_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn open_externally(&self, opener: &mut dyn UrlOpener) -> anyhow::Result<()> {
        match &self.tool {
            Some(tool) => opener.open_window(&tool.url),
            None => Ok(()),
        }
    }

    pub fn close(&mut self) {
        self.tool = None;
        self.src = None;
        self.loading = false;
        self.restore_at = None;
    }
}
