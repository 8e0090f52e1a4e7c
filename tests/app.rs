use multi_toolbox::app::{ActiveView, App};
use multi_toolbox::embed::UrlOpener;
use multi_toolbox::hotkey::{Key, KeyEvent};
use multi_toolbox::launcher::ToolView;
use multi_toolbox::plugins::web_tools::{NewWebTool, OpenMode};
use multi_toolbox::settings::Settings;
use multi_toolbox::store::{load_or, FileStore, KeyValueStore, MemoryStore, AI_CONFIG_KEY};
use multi_toolbox::translator::{AiConfig, Provider};
use std::sync::Arc;

#[derive(Default)]
struct RecordingOpener {
    opened: Vec<String>,
}

impl UrlOpener for RecordingOpener {
    fn open_window(&mut self, url: &str) -> anyhow::Result<()> {
        self.opened.push(url.to_string());
        Ok(())
    }
}

fn memory_app() -> App {
    App::new(Arc::new(MemoryStore::new()), Settings::default(), None)
}

fn press(app: &mut App, event: KeyEvent) -> bool {
    app.handle_key(&event, &mut RecordingOpener::default())
        .unwrap()
}

#[test]
fn starts_on_dashboard_with_default_tools() {
    let app = memory_app();
    assert_eq!(app.view(), &ActiveView::View(ToolView::Dashboard));
    assert_eq!(app.web_tools().len(), 2);
    assert_eq!(app.launcher.commands().len(), 9);
}

#[test]
fn hotkey_toggles_launcher() {
    let mut app = memory_app();
    assert!(press(&mut app, KeyEvent::with_ctrl(Key::Char('K'))));
    assert!(app.launcher.is_open());
    assert!(press(&mut app, KeyEvent::with_meta(Key::Char('K'))));
    assert!(!app.launcher.is_open());

    let composing = KeyEvent {
        composing: true,
        ..KeyEvent::with_ctrl(Key::Char('K'))
    };
    assert!(!press(&mut app, composing));
    assert!(!app.launcher.is_open());
}

#[test]
fn launcher_enter_switches_view() {
    let mut app = memory_app();
    press(&mut app, KeyEvent::with_ctrl(Key::Char('K')));
    app.set_launcher_query("calc");
    assert!(press(&mut app, KeyEvent::plain(Key::Enter)));
    assert_eq!(app.view(), &ActiveView::View(ToolView::Calculator));
    assert!(!app.launcher.is_open());
    assert_eq!(app.launcher.query(), "");
}

#[test]
fn calculator_receives_plain_keys() {
    let mut app = memory_app();
    app.set_view(ToolView::Calculator);
    for c in ['1', '2', '+', '3'] {
        assert!(press(&mut app, KeyEvent::plain(Key::Char(c))));
    }
    press(&mut app, KeyEvent::plain(Key::Enter));
    assert_eq!(app.calculator.display(), "15");
    assert_eq!(app.calculator.history().len(), 1);

    // Modified keys are left alone.
    assert!(!press(&mut app, KeyEvent::with_ctrl(Key::Char('1'))));
    assert_eq!(app.calculator.display(), "15");
}

#[test]
fn keys_outside_calculator_are_not_consumed() {
    let mut app = memory_app();
    assert!(!press(&mut app, KeyEvent::plain(Key::Char('1'))));
    assert_eq!(app.calculator.display(), "0");
}

#[test]
fn embedded_tool_becomes_active_view() {
    let mut app = memory_app();
    let mut opener = RecordingOpener::default();
    app.open_tool("2", &mut opener).unwrap();
    assert_eq!(app.view(), &ActiveView::WebTool("2".into()));
    assert_eq!(app.embed.src(), Some("https://github.com"));
    assert!(opener.opened.is_empty());

    app.set_view(ToolView::Translator);
    assert_eq!(app.embed.src(), None);
    assert!(app.open_tool("missing", &mut opener).is_err());
}

#[test]
fn window_tool_keeps_current_view() {
    let mut app = memory_app();
    let tool = app
        .add_web_tool(NewWebTool {
            name: "Docs".into(),
            url: "docs.rs".into(),
            icon: None,
            open_mode: OpenMode::Window,
        })
        .unwrap();
    assert_eq!(app.launcher.commands().len(), 10);

    let mut opener = RecordingOpener::default();
    app.open_tool(&tool.id, &mut opener).unwrap();
    assert_eq!(opener.opened, vec!["https://docs.rs"]);
    assert_eq!(app.view(), &ActiveView::View(ToolView::Dashboard));
}

#[test]
fn removing_active_tool_returns_to_manager() {
    let mut app = memory_app();
    app.open_tool("1", &mut RecordingOpener::default()).unwrap();
    assert!(app.remove_web_tool("1").unwrap());
    assert_eq!(app.view(), &ActiveView::View(ToolView::WebTools));
    assert!(app.embed.tool().is_none());
    assert_eq!(app.launcher.commands().len(), 8);
    assert!(!app.remove_web_tool("1").unwrap());
}

#[test]
fn ai_config_is_persisted() {
    let store = Arc::new(MemoryStore::new());
    let mut app = App::new(store.clone(), Settings::default(), None);
    let cfg = AiConfig {
        provider: Provider::Custom,
        base_url: "https://api.example.com/v1".into(),
        api_key: "sk-test".into(),
        model: "gpt-test".into(),
    };
    app.set_ai_config(cfg.clone()).unwrap();
    assert_eq!(app.ai_config(), &cfg);

    let saved: AiConfig = load_or(store.as_ref(), AI_CONFIG_KEY, AiConfig::default());
    assert_eq!(saved, cfg);
    let reopened = App::new(store, Settings::default(), None);
    assert_eq!(reopened.ai_config(), &cfg);
}

#[test]
fn reset_requires_confirmation_and_restores_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path().join("store")).unwrap());
    let cache = dir.path().join("cache");
    std::fs::create_dir_all(&cache).unwrap();
    std::fs::write(cache.join("page.html"), "<html></html>").unwrap();

    let mut app = App::new(store.clone(), Settings::default(), Some(cache.clone()));
    app.add_web_tool(NewWebTool {
        name: "Docs".into(),
        url: "https://docs.rs".into(),
        ..Default::default()
    })
    .unwrap();
    app.set_view(ToolView::Settings);

    assert!(!app.reset(false).unwrap());
    assert_eq!(app.web_tools().len(), 3);
    assert!(cache.exists());

    assert!(app.reset(true).unwrap());
    assert_eq!(app.web_tools().len(), 2);
    assert_eq!(app.view(), &ActiveView::View(ToolView::Dashboard));
    assert!(!cache.exists());
    assert!(store.keys().unwrap().is_empty());
}
