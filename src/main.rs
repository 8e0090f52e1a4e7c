use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use multi_toolbox::actions::{parse_action_kind, Action, ActionKind};
use multi_toolbox::app::{ActiveView, App};
use multi_toolbox::embed::SystemOpener;
use multi_toolbox::launcher::ToolView;
use multi_toolbox::plugins::base_convert::{convert_all, is_supported};
use multi_toolbox::plugins::calculator::{evaluate, format_result};
use multi_toolbox::plugins::timestamp::{convert, now_string, TimeUnit, TimestampResult};
use multi_toolbox::plugins::web_tools::{NewWebTool, OpenMode};
use multi_toolbox::settings::{data_dir, Settings, SETTINGS_FILE};
use multi_toolbox::store::{FileStore, KeyValueStore};
use multi_toolbox::translator::prompt::{language_name, AUTO_DETECT};
use multi_toolbox::translator::ProviderRouter;
use multi_toolbox::{default_plugins, logging};

const STORE_DIR: &str = "store";
const CACHE_DIR: &str = "cache";
const LOG_DIR: &str = "logs";

#[derive(Debug, Parser)]
#[command(name = "multi_toolbox", version, about = "Keyboard-driven productivity toolbox")]
struct Cli {
    /// Directory holding settings, stored data and logs.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate an arithmetic expression.
    Calc { expr: Vec<String> },
    /// Show an integer in every supported radix.
    Base {
        value: String,
        #[arg(long, default_value_t = 10)]
        radix: u32,
    },
    /// Convert a unix timestamp; defaults to now.
    Ts {
        value: Option<String>,
        #[arg(long)]
        ms: bool,
    },
    Tools {
        #[command(subcommand)]
        command: ToolsCommands,
    },
    /// Filter the launcher list; `--open` activates the first match.
    Palette {
        query: Vec<String>,
        #[arg(long)]
        open: bool,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    Translate {
        text: Vec<String>,
        #[arg(long, default_value = AUTO_DETECT)]
        from: String,
        #[arg(long, default_value = "zh")]
        to: String,
    },
    /// Delete all stored data and the offline cache.
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ToolsCommands {
    List,
    Add {
        name: String,
        url: String,
        #[arg(long)]
        icon: Option<String>,
        /// Open in a separate window instead of embedding.
        #[arg(long)]
        window: bool,
    },
    Remove { id: String },
    Open { id: String },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    Show,
    /// Set one AI config field: provider, baseUrl, apiKey or model.
    Set { field: String, value: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let dir = data_dir(cli.data_dir.as_deref());
    let settings = Settings::load(dir.join(SETTINGS_FILE))?;
    let log_dir = settings.log_to_file.then(|| dir.join(LOG_DIR));
    let _guard = logging::init(settings.debug_logging || cli.debug, log_dir.as_deref());
    tracing::debug!(dir = %dir.display(), "using data directory");

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.join(STORE_DIR))?);
    let mut app = App::new(store.clone(), settings, Some(dir.join(CACHE_DIR)));

    match cli.command {
        None => run_repl(&mut app, store),
        Some(Commands::Calc { expr }) => {
            let expr = expr.join(" ");
            match evaluate(&expr) {
                Ok(v) => println!("{}", format_result(v)),
                Err(e) => bail!("{e}"),
            }
            Ok(())
        }
        Some(Commands::Base { value, radix }) => {
            if !is_supported(radix) {
                bail!("unsupported radix {radix}");
            }
            let rows = convert_all(&value, radix);
            if rows.is_empty() {
                println!("Invalid number for base {radix}");
            }
            for c in rows {
                println!("{:<12} {}", c.name, c.value);
            }
            Ok(())
        }
        Some(Commands::Ts { value, ms }) => {
            let unit = if ms {
                TimeUnit::Milliseconds
            } else {
                TimeUnit::Seconds
            };
            let input = value.unwrap_or_else(|| now_string(unit, chrono::Utc::now()));
            match convert(&input, unit) {
                TimestampResult::Valid(view) => {
                    for (label, value) in view.rows() {
                        println!("{label:<15} {value}");
                    }
                }
                TimestampResult::Invalid => println!("Invalid Date"),
            }
            Ok(())
        }
        Some(Commands::Tools { command }) => run_tools(&mut app, command),
        Some(Commands::Palette { query, open }) => {
            app.launcher.open();
            app.set_launcher_query(query.join(" "));
            for c in app.launcher.filtered() {
                let hint = c.shortcut().map(|k| format!("[{k}]")).unwrap_or_default();
                println!("{:<4} {} {}", hint, c.icon(), c.name());
            }
            if open {
                app.activate_launcher(&mut SystemOpener)?;
                print_view(&app);
            }
            Ok(())
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => {
                println!("{}", serde_json::to_string_pretty(&app.ai_config().redacted())?);
                Ok(())
            }
            ConfigCommands::Set { field, value } => {
                let mut cfg = app.ai_config().clone();
                cfg.set_field(&field, &value)?;
                app.set_ai_config(cfg)
            }
        },
        Some(Commands::Translate { text, from, to }) => {
            if language_name(&from).is_none() {
                bail!("unknown source language: {from}");
            }
            if to == AUTO_DETECT || language_name(&to).is_none() {
                bail!("unknown target language: {to}");
            }
            let router = ProviderRouter::from_settings(app.settings())?;
            let cfg = app.ai_config().clone();
            let now = Instant::now();
            app.translator.set_source_lang(from, now);
            app.translator.set_target_lang(to, now);
            app.translator.set_source_text(text.join(" "), now);
            app.translator
                .translate_blocking(&router, &cfg, store.as_ref());
            if let Some(err) = app.translator.error() {
                bail!("{err}");
            }
            println!("{}", app.translator.output());
            Ok(())
        }
        Some(Commands::Reset { yes }) => {
            let confirmed = yes || confirm("Delete all stored data? Type 'yes' to confirm: ")?;
            if app.reset(confirmed)? {
                println!("All data has been reset.");
            } else {
                println!("Reset cancelled.");
            }
            Ok(())
        }
    }
}

fn run_tools(app: &mut App, command: ToolsCommands) -> Result<()> {
    match command {
        ToolsCommands::List => {
            for t in app.web_tools() {
                let mode = match t.open_mode {
                    OpenMode::Iframe => "iframe",
                    OpenMode::Window => "window",
                };
                println!("{:<15} {} {:<24} {:<7} {}", t.id, t.icon, t.name, mode, t.url);
            }
        }
        ToolsCommands::Add {
            name,
            url,
            icon,
            window,
        } => {
            let tool = app.add_web_tool(NewWebTool {
                name,
                url,
                icon,
                open_mode: if window {
                    OpenMode::Window
                } else {
                    OpenMode::Iframe
                },
            })?;
            println!("Added {} ({}) as {}", tool.name, tool.url, tool.id);
        }
        ToolsCommands::Remove { id } => {
            if !app.remove_web_tool(&id)? {
                bail!("no web tool with id {id}");
            }
            println!("Removed {id}");
        }
        ToolsCommands::Open { id } => {
            let mut opener = SystemOpener;
            app.open_tool(&id, &mut opener)?;
            if let ActiveView::WebTool(_) = app.view() {
                // No frame to render into from the terminal.
                app.embed.open_externally(&mut opener)?;
            }
            print_view(app);
        }
    }
    Ok(())
}

fn print_view(app: &App) {
    match app.view() {
        ActiveView::View(view) => println!("View: {view}"),
        ActiveView::WebTool(id) => {
            let url = app.embed.src().unwrap_or_default();
            println!("Web tool {id}: {url} (sandbox: {})", app.embed.sandbox_attribute());
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("yes"))
}

fn execute_action(app: &mut App, action: &Action) -> Result<()> {
    match parse_action_kind(action) {
        ActionKind::Clipboard(text) => {
            let mut cb = arboard::Clipboard::new()?;
            cb.set_text(text.to_string())?;
            println!("Copied {text}");
        }
        ActionKind::View(view) => {
            app.set_view(view.parse::<ToolView>()?);
            print_view(app);
        }
        ActionKind::Tool(id) => run_tools(app, ToolsCommands::Open { id: id.to_string() })?,
        ActionKind::Query(q) => println!("Try: {q}"),
        ActionKind::Url(url) => open::that(url)?,
    }
    Ok(())
}

fn run_repl(app: &mut App, store: Arc<dyn KeyValueStore>) -> Result<()> {
    let plugins = default_plugins(store);
    let mut last: Vec<Action> = Vec::new();
    println!("Type a query, `:N` to run result N, `help` or `quit`.");
    print!("> ");
    io::stdout().flush()?;
    for line in io::stdin().lock().lines() {
        let line = line?;
        let input = line.trim();
        match input {
            "" => {}
            "quit" | "exit" => break,
            "help" => {
                for p in plugins.plugins() {
                    println!("{:<14} {}", p.name(), p.description());
                }
                let prefixes: Vec<_> = plugins.commands().into_iter().map(|a| a.label).collect();
                println!("Prefixes: {}", prefixes.join(", "));
            }
            _ if input.starts_with(':') => {
                let picked = input[1..]
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| last.get(i).cloned());
                match picked {
                    Some(action) => {
                        if let Err(e) = execute_action(app, &action) {
                            tracing::warn!("action failed: {e}");
                            eprintln!("Error: {e}");
                        }
                    }
                    None => eprintln!("No such result"),
                }
            }
            _ => {
                last = plugins.search(input);
                if last.is_empty() {
                    println!("No results");
                }
                for (i, a) in last.iter().enumerate() {
                    println!("{:>2}. {}  ({})", i + 1, a.label, a.desc);
                }
            }
        }
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(())
}
