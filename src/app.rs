use crate::embed::{EmbedHost, Selection, UrlOpener};
use crate::hotkey::{Hotkey, KeyEvent};
use crate::launcher::{Launcher, LauncherTarget, ToolView};
use crate::plugins::base_convert::BaseConverter;
use crate::plugins::calculator::{CalcKey, Calculator};
use crate::plugins::timestamp::TimestampConverter;
use crate::plugins::web_tools::{NewWebTool, WebTool, WebToolRegistry};
use crate::settings::Settings;
use crate::store::{KeyValueStore, Persisted, AI_CONFIG_KEY};
use crate::translator::{AiConfig, Translator, TranslationWorker};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// What the main area currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveView {
    View(ToolView),
    WebTool(String),
}

/// Collects the result of a launcher activation.
#[derive(Default)]
struct Navigation {
    view: Option<ToolView>,
    tool: Option<WebTool>,
}

impl LauncherTarget for Navigation {
    fn on_view_change(&mut self, view: ToolView) {
        self.view = Some(view);
    }

    fn on_tool_open(&mut self, tool: &WebTool) {
        self.tool = Some(tool.clone());
    }
}

pub struct App {
    store: Arc<dyn KeyValueStore>,
    settings: Settings,
    hotkey: Hotkey,
    cache_dir: Option<PathBuf>,
    view: ActiveView,
    pub launcher: Launcher,
    registry: WebToolRegistry,
    pub embed: EmbedHost,
    pub calculator: Calculator,
    pub base_converter: BaseConverter,
    pub timestamp: TimestampConverter,
    ai_config: Persisted<AiConfig>,
    pub translator: Translator,
}

impl App {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        settings: Settings,
        cache_dir: Option<PathBuf>,
    ) -> Self {
        let mut registry = WebToolRegistry::load(store.as_ref());
        registry.subscribe(|tools| tracing::debug!(count = tools.len(), "web tools changed"));
        let launcher = Launcher::new(registry.tools());
        let ai_config = Persisted::load(store.as_ref(), AI_CONFIG_KEY, AiConfig::default());
        let translator =
            Translator::load(store.as_ref(), settings.debounce(), settings.history_limit);
        Self {
            hotkey: settings.launcher_hotkey(),
            embed: EmbedHost::new(settings.refresh_delay()),
            calculator: Calculator::new(settings.history_limit),
            base_converter: BaseConverter::default(),
            timestamp: TimestampConverter::default(),
            view: ActiveView::View(ToolView::Dashboard),
            launcher,
            registry,
            ai_config,
            translator,
            store,
            settings,
            cache_dir,
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    pub fn web_tools(&self) -> &[WebTool] {
        self.registry.tools()
    }

    pub fn ai_config(&self) -> &AiConfig {
        self.ai_config.get()
    }

    pub fn set_view(&mut self, view: ToolView) {
        if let ActiveView::WebTool(_) = self.view {
            self.embed.close();
        }
        tracing::debug!(%view, "switching view");
        self.view = ActiveView::View(view);
    }

    /// Show a web tool, either embedded or in its own window.
    pub fn select_tool(
        &mut self,
        tool: &WebTool,
        opener: &mut dyn UrlOpener,
    ) -> anyhow::Result<()> {
        if let Selection::Embedded = self.embed.select(tool, opener)? {
            self.view = ActiveView::WebTool(tool.id.clone());
        }
        Ok(())
    }

    pub fn open_tool(&mut self, id: &str, opener: &mut dyn UrlOpener) -> anyhow::Result<()> {
        let tool = self
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no web tool with id {id}"))?;
        self.select_tool(&tool, opener)
    }

    pub fn add_web_tool(&mut self, new: NewWebTool) -> anyhow::Result<WebTool> {
        let tool = self
            .registry
            .add(self.store.as_ref(), new, crate::common::now_millis())?;
        self.launcher.rebuild(self.registry.tools());
        Ok(tool)
    }

    pub fn remove_web_tool(&mut self, id: &str) -> anyhow::Result<bool> {
        let removed = self.registry.remove(self.store.as_ref(), id)?;
        if removed {
            if self.view == ActiveView::WebTool(id.to_string()) {
                self.embed.close();
                self.view = ActiveView::View(ToolView::WebTools);
            }
            self.launcher.rebuild(self.registry.tools());
        }
        Ok(removed)
    }

    /// Overwrite the AI configuration and persist it.
    pub fn set_ai_config(&mut self, config: AiConfig) -> anyhow::Result<()> {
        self.ai_config.replace(self.store.as_ref(), config)?;
        tracing::info!(provider = ?self.ai_config.get().provider, "AI config saved");
        Ok(())
    }

    pub fn set_launcher_query(&mut self, query: impl Into<String>) {
        self.launcher.set_query(query);
    }

    /// Activate the launcher's current selection.
    pub fn activate_launcher(&mut self, opener: &mut dyn UrlOpener) -> anyhow::Result<()> {
        let mut nav = Navigation::default();
        self.launcher.activate_selected(&mut nav);
        self.apply_navigation(nav, opener)
    }

    fn apply_navigation(
        &mut self,
        nav: Navigation,
        opener: &mut dyn UrlOpener,
    ) -> anyhow::Result<()> {
        if let Some(view) = nav.view {
            self.set_view(view);
        }
        if let Some(tool) = nav.tool {
            self.select_tool(&tool, opener)?;
        }
        Ok(())
    }

    /// Route a key press. Returns whether it was consumed.
    pub fn handle_key(
        &mut self,
        event: &KeyEvent,
        opener: &mut dyn UrlOpener,
    ) -> anyhow::Result<bool> {
        if self.hotkey.matches(event) {
            self.launcher.toggle();
            return Ok(true);
        }
        if event.composing {
            return Ok(false);
        }
        let Some(key) = event.key else {
            return Ok(false);
        };
        if self.launcher.is_open() {
            let mut nav = Navigation::default();
            let consumed = self.launcher.handle_key(key, &mut nav);
            self.apply_navigation(nav, opener)?;
            return Ok(consumed);
        }
        let modified = event.ctrl || event.meta || event.alt;
        if self.view == ActiveView::View(ToolView::Calculator) && !modified {
            if let Some(calc_key) = CalcKey::from_key(key) {
                self.calculator.press(calc_key);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Drive timers: debounced translations, worker results and frame refreshes.
    pub fn tick(&mut self, now: Instant, worker: &TranslationWorker) {
        self.translator.tick(now, self.ai_config.get(), worker);
        self.translator.drain(worker, self.store.as_ref());
        self.embed.poll(now);
    }

    /// Wipe every persisted key and the offline cache, then rebuild from
    /// defaults. Does nothing unless `confirmed`.
    pub fn reset(&mut self, confirmed: bool) -> anyhow::Result<bool> {
        if !confirmed {
            tracing::debug!("reset not confirmed");
            return Ok(false);
        }
        self.store.clear()?;
        if let Some(dir) = &self.cache_dir {
            if dir.exists() {
                std::fs::remove_dir_all(dir)?;
            }
        }
        *self = App::new(self.store.clone(), self.settings.clone(), self.cache_dir.clone());
        tracing::info!("application data reset");
        Ok(true)
    }
}
