pub mod actions;
pub mod app;
pub mod common;
pub mod embed;
pub mod history;
pub mod hotkey;
pub mod launcher;
pub mod logging;
pub mod plugin;
pub mod plugins;
pub mod settings;
pub mod store;
pub mod translator;

use plugin::PluginManager;
use std::sync::Arc;
use store::KeyValueStore;

/// Plugin manager with every built-in query plugin registered.
pub fn default_plugins(store: Arc<dyn KeyValueStore>) -> PluginManager {
    let mut pm = PluginManager::new();
    pm.register(Box::new(plugins::calculator::CalculatorPlugin));
    pm.register(Box::new(plugins::base_convert::BaseConvertPlugin));
    pm.register(Box::new(plugins::timestamp::TimestampPlugin));
    pm.register(Box::new(plugins::web_tools::WebToolsPlugin::new(store.clone())));
    pm.register(Box::new(launcher::PalettePlugin::new(store)));
    pm
}
