use crate::actions::Action;
use crate::hotkey::Key;
use crate::plugin::Plugin;
use crate::plugins::web_tools::{WebTool, WebToolRegistry};
use crate::store::KeyValueStore;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Built-in screens of the toolbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolView {
    #[default]
    Dashboard,
    Calculator,
    Timestamp,
    BaseConverter,
    WebTools,
    Translator,
    Settings,
}

impl ToolView {
    pub const ALL: [ToolView; 7] = [
        ToolView::Dashboard,
        ToolView::Calculator,
        ToolView::Timestamp,
        ToolView::BaseConverter,
        ToolView::WebTools,
        ToolView::Translator,
        ToolView::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolView::Dashboard => "dashboard",
            ToolView::Calculator => "calculator",
            ToolView::Timestamp => "timestamp",
            ToolView::BaseConverter => "base_converter",
            ToolView::WebTools => "web_tools",
            ToolView::Translator => "translator",
            ToolView::Settings => "settings",
        }
    }
}

impl fmt::Display for ToolView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolView {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolView::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown view: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemCommand {
    pub view: ToolView,
    pub name: &'static str,
    pub icon: &'static str,
    pub shortcut: Option<char>,
}

pub fn system_commands() -> Vec<SystemCommand> {
    let cmd = |view, name, icon, shortcut| SystemCommand {
        view,
        name,
        icon,
        shortcut: Some(shortcut),
    };
    vec![
        cmd(ToolView::Dashboard, "Dashboard", "🏠", 'H'),
        cmd(ToolView::Calculator, "Calculator", "🧮", 'C'),
        cmd(ToolView::Timestamp, "Timestamp Converter", "⏱", 'T'),
        cmd(ToolView::BaseConverter, "Base Converter", "🔢", 'B'),
        cmd(ToolView::WebTools, "Manage Web Tools", "🌐", 'W'),
        cmd(ToolView::Translator, "Translator", "🌍", 'L'),
        cmd(ToolView::Settings, "Settings", "⚙", 'S'),
    ]
}

/// One row of the launcher list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    System(SystemCommand),
    WebTool(WebTool),
}

impl Command {
    pub fn name(&self) -> &str {
        match self {
            Command::System(c) => c.name,
            Command::WebTool(t) => &t.name,
        }
    }

    pub fn icon(&self) -> &str {
        match self {
            Command::System(c) => c.icon,
            Command::WebTool(t) => &t.icon,
        }
    }

    pub fn shortcut(&self) -> Option<char> {
        match self {
            Command::System(c) => c.shortcut,
            Command::WebTool(_) => None,
        }
    }

    /// Action string understood by [`crate::actions::parse_action_kind`].
    pub fn action(&self) -> String {
        match self {
            Command::System(c) => format!("view:{}", c.view),
            Command::WebTool(t) => format!("tool:{}", t.id),
        }
    }
}

/// Receives the outcome of activating a launcher entry.
pub trait LauncherTarget {
    fn on_view_change(&mut self, view: ToolView);
    fn on_tool_open(&mut self, tool: &WebTool);
}

#[derive(Debug, Default)]
pub struct Launcher {
    open: bool,
    query: String,
    selected: usize,
    commands: Vec<Command>,
}

impl Launcher {
    pub fn new(tools: &[WebTool]) -> Self {
        let mut launcher = Self::default();
        launcher.rebuild(tools);
        launcher
    }

    /// Recompute the entry list after the web tool registry changed.
    pub fn rebuild(&mut self, tools: &[WebTool]) {
        self.commands = system_commands()
            .into_iter()
            .map(Command::System)
            .chain(tools.iter().cloned().map(Command::WebTool))
            .collect();
        self.clamp_selection();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn open(&mut self) {
        self.open = true;
        self.selected = 0;
        tracing::debug!("launcher opened");
    }

    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
        self.selected = 0;
        tracing::debug!("launcher closed");
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.clamp_selection();
    }

    /// Entries whose name contains the query, ignoring case.
    pub fn filtered(&self) -> Vec<&Command> {
        let needle = self.query.to_lowercase();
        self.commands
            .iter()
            .filter(|c| needle.is_empty() || c.name().to_lowercase().contains(&needle))
            .collect()
    }

    pub fn selected_command(&self) -> Option<&Command> {
        self.filtered().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.filtered().len() {
            self.selected = 0;
        }
    }

    /// Handle a navigation key while the launcher is open. Returns whether
    /// the key was consumed.
    pub fn handle_key(&mut self, key: Key, target: &mut dyn LauncherTarget) -> bool {
        if !self.open {
            return false;
        }
        match key {
            Key::ArrowDown => {
                let len = self.filtered().len();
                if len > 0 {
                    self.selected = (self.selected + 1) % len;
                }
                true
            }
            Key::ArrowUp => {
                let len = self.filtered().len();
                if len > 0 {
                    self.selected = (self.selected + len - 1) % len;
                }
                true
            }
            Key::Enter => {
                self.activate_selected(target);
                true
            }
            Key::Escape => {
                self.close();
                true
            }
            _ => false,
        }
    }

    /// Run the selected entry, if any, and close the launcher.
    pub fn activate_selected(&mut self, target: &mut dyn LauncherTarget) -> bool {
        let Some(command) = self.selected_command().cloned() else {
            return false;
        };
        self.activate(&command, target);
        true
    }

    pub fn activate(&mut self, command: &Command, target: &mut dyn LauncherTarget) {
        match command {
            Command::System(c) => target.on_view_change(c.view),
            Command::WebTool(t) => target.on_tool_open(t),
        }
        self.close();
    }
}

/// Exposes the launcher list to plugin queries (prefix: `go`).
pub struct PalettePlugin {
    store: Arc<dyn KeyValueStore>,
}

impl PalettePlugin {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl Plugin for PalettePlugin {
    fn search(&self, query: &str) -> Vec<Action> {
        let trimmed = query.trim_start();
        let Some(rest) = crate::common::strip_prefix_ci(trimmed, "go") else {
            return Vec::new();
        };
        if !rest.is_empty() && !rest.starts_with(' ') {
            return Vec::new();
        }
        let registry = WebToolRegistry::load(self.store.as_ref());
        let mut launcher = Launcher::new(registry.tools());
        launcher.set_query(rest.trim());
        launcher
            .filtered()
            .into_iter()
            .map(|c| Action {
                label: format!("{} {}", c.icon(), c.name()),
                desc: match c.shortcut() {
                    Some(key) => format!("Go to ({key})"),
                    None => "Go to".into(),
                },
                action: c.action(),
                args: None,
            })
            .collect()
    }

    fn name(&self) -> &str {
        "palette"
    }

    fn description(&self) -> &str {
        "Jump to a tool or web tool (prefix: `go`)"
    }

    fn commands(&self) -> Vec<Action> {
        vec![Action::new("go", "Go to", "query:go ")]
    }
}
