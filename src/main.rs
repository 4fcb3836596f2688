//! appie - find installed applications and their icons.
//!
//! Thin command line front end over appie-apps.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use appie_apps::{App, AppData, AppSource, DataDirs, FdoProvider, Provider};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::debug;
use serde::Serialize;

const DEFAULT_THEME: &str = "hicolor";
const DEFAULT_ICON_SIZE: u32 = 32;

#[derive(Parser, Debug)]
#[command(name = "appie")]
#[command(author, version, about = "Find installed applications and their icons", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Colon separated data dirs to search instead of XDG_DATA_DIRS
    #[arg(long, global = true)]
    data_dirs: Option<String>,

    /// Icon theme used for icon lookups
    #[arg(long, global = true, default_value = DEFAULT_THEME)]
    theme: String,

    /// Icon size in pixels
    #[arg(long, global = true, default_value_t = DEFAULT_ICON_SIZE)]
    size: u32,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List installed applications
    List {
        /// Include apps marked NoDisplay
        #[arg(long)]
        all: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show one application by name
    Find {
        name: String,

        #[arg(long)]
        json: bool,
    },

    /// List applications whose name or command contains a pattern
    Search {
        pattern: String,

        #[arg(long)]
        json: bool,
    },

    /// Show the preferred terminal, browser, mail and graphics apps
    Defaults,

    /// List applications grouped by main category
    Categories,

    /// List installed icon themes
    Themes,

    /// Resolve an application's icon
    Icon {
        name: String,

        /// Write the icon bytes to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Launch an application
    Run {
        name: String,

        /// Parameters substituted for %u/%f/%U/%F
        params: Vec<String>,
    },
}

/// What the JSON output shows for one app.
#[derive(Serialize)]
struct AppSummary {
    name: String,
    categories: Vec<String>,
    hidden: bool,
    mime_types: Vec<String>,
    icon: Option<String>,
    source: Option<AppSource>,
}

impl AppSummary {
    fn new(app: &App, theme: &str, size: u32) -> Self {
        Self {
            name: app.name().to_string(),
            categories: app.categories().to_vec(),
            hidden: app.hidden(),
            mime_types: app.mime_types().to_vec(),
            icon: app.icon(theme, size).map(|i| i.name.clone()),
            source: app.source().cloned(),
        }
    }
}

/// A provider over `--data-dirs` when given, else the shared system one.
fn build_provider(cli: &Cli) -> Option<Arc<dyn Provider>> {
    match &cli.data_dirs {
        Some(dirs) => {
            let dirs = DataDirs::from_value(Some(dirs.as_str()), None);
            debug!("Using data dirs {:?}", dirs);
            Some(Arc::new(FdoProvider::new(dirs)))
        }
        None => appie_apps::get_provider(),
    }
}

fn print_apps(apps: &[App], cli: &Cli, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        let summaries: Vec<AppSummary> = apps
            .iter()
            .map(|app| AppSummary::new(app, &cli.theme, cli.size))
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for app in apps {
        if app.categories().is_empty() {
            println!("{}", app.name());
        } else {
            println!("{} ({})", app.name(), app.categories().join(", "));
        }
    }
    Ok(())
}

fn run(cli: &Cli, provider: &dyn Provider) -> Result<(), Box<dyn Error>> {
    match &cli.command {
        Commands::List { all, json } => {
            let apps: Vec<App> = provider
                .available_apps()
                .into_iter()
                .filter(|app| *all || !app.hidden())
                .collect();
            print_apps(&apps, cli, *json)
        }
        Commands::Find { name, json } => {
            let app = provider
                .find_app_from_name(name)
                .ok_or_else(|| format!("No application named {}", name))?;
            print_apps(&[app], cli, *json)
        }
        Commands::Search { pattern, json } => {
            print_apps(&provider.find_apps_matching(pattern), cli, *json)
        }
        Commands::Defaults => print_apps(&provider.default_apps(), cli, false),
        Commands::Categories => {
            let mut categories: Vec<(String, Vec<App>)> =
                provider.categorized_apps().into_iter().collect();
            categories.sort_by(|a, b| a.0.cmp(&b.0));

            for (category, apps) in categories {
                println!("{} ({})", category, apps.len());
                for app in apps {
                    println!("  {}", app.name());
                }
            }
            Ok(())
        }
        Commands::Themes => {
            for theme in provider.available_themes() {
                println!("{}", theme);
            }
            Ok(())
        }
        Commands::Icon { name, out } => {
            let app = provider
                .find_app_from_name(name)
                .ok_or_else(|| format!("No application named {}", name))?;
            let icon = app
                .icon(&cli.theme, cli.size)
                .ok_or_else(|| format!("No icon found for {}", name))?;

            match out {
                Some(path) => {
                    fs::write(path, &icon.content)?;
                    println!("Wrote {} ({} bytes) to {}", icon.name, icon.content.len(), path.display());
                }
                None => println!("{} ({} bytes)", icon.name, icon.content.len()),
            }
            Ok(())
        }
        Commands::Run { name, params } => {
            let app = provider
                .find_app_from_name(name)
                .ok_or_else(|| format!("No application named {}", name))?;
            app.run_with_parameters(params, &[])?;
            Ok(())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let Some(provider) = build_provider(&cli) else {
        eprintln!("No application provider for this platform");
        return Err("unsupported platform".into());
    };

    run(&cli, provider.as_ref())
}
