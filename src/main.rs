use clap::{Parser, Subcommand};
use slideforge::config::StudioConfig;
use slideforge::export::{ExportOptions, Exporter};
use slideforge::raster::ChromeBackend;
use slideforge::session::{JsonFileStore, SessionStore};
use slideforge::substitute::{self, SlideTokens};
use slideforge::template::TemplateRegistry;
use slideforge::{output, types::SessionData};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slideforge")]
#[command(about = "Compose and export AI-written carousel slides")]
#[command(long_about = "\
Compose and export AI-written carousel slides

Sessions are JSON documents keyed by opaque token under the store
directory. Upstream tooling creates them; slideforge renders their slides
onto a template, applies the user's position/style overrides, and exports
one PNG per slide.

Session document shape:

  {
    \"token\": \"tok-1\",
    \"templateId\": \"notebook\",        # see 'slideforge templates'
    \"format\": \"square\",              # square | portrait
    \"slides\": [
      { \"type\": \"hook\",
        \"title\": \"Five rules\",
        \"content\": \"Details here\",
        \"titlePosition\": { \"x\": 35.0, \"y\": 40.0 },   # optional
        \"titleStyle\": { \"fontSize\": 64 } }             # optional
    ]
  }

Run 'slideforge gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Session store directory
    #[arg(long, default_value = "sessions", global = true)]
    store: PathBuf,

    /// Output directory for exported images
    #[arg(long, default_value = "export", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (browser scratch pages)
    #[arg(long, default_value = ".slideforge-temp", global = true)]
    temp_dir: PathBuf,

    /// Path to config.toml
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in templates
    Templates,
    /// Print one slide's resolved markup
    Resolve {
        /// Session token
        token: String,
        /// 1-based slide position
        #[arg(long, default_value_t = 1)]
        slide: usize,
    },
    /// Validate a session document and summarize its slides
    Check {
        /// Session token
        token: String,
    },
    /// Rasterize every slide of a session to PNG files
    Export {
        /// Session token
        token: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn load_session(store: &JsonFileStore, token: &str) -> Result<SessionData, Box<dyn std::error::Error>> {
    store
        .get(token)?
        .ok_or_else(|| format!("session '{token}' not found").into())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let registry = TemplateRegistry::builtin();

    match cli.command {
        Command::Templates => {
            output::print_templates(&registry);
        }
        Command::Resolve { token, slide } => {
            let store = JsonFileStore::new(&cli.store);
            let session = load_session(&store, &token)?;
            if slide == 0 || slide > session.slides.len() {
                return Err(format!(
                    "slide {} out of range (session has {})",
                    slide,
                    session.slides.len()
                )
                .into());
            }
            let s = &session.slides[slide - 1];
            let tokens = SlideTokens {
                title: &s.title,
                content: &s.content,
                kind: s.kind,
                slide_number: slide,
                total_slides: session.slides.len(),
                format: session.format,
            };
            match substitute::resolve_id(&registry, &session.template_id, &tokens) {
                Some(markup) => println!("{markup}"),
                None => {
                    return Err(format!("unknown template '{}'", session.template_id).into());
                }
            }
        }
        Command::Check { token } => {
            let store = JsonFileStore::new(&cli.store);
            let session = load_session(&store, &token)?;
            let known = registry.get(&session.template_id).is_some();
            output::print_session(&session, known);
        }
        Command::Export { token } => {
            let config = StudioConfig::load(&cli.config)?;
            let store = JsonFileStore::new(&cli.store);
            let session = load_session(&store, &token)?;

            let backend = ChromeBackend::new(
                &cli.temp_dir,
                config.settle_delay(),
                (config.browser.window[0], config.browser.window[1]),
            )?;
            let exporter = Exporter::new(&backend, &registry);
            let options = ExportOptions {
                output_dir: cli.output.clone(),
                pacing_delay: config.pacing_delay(),
            };

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_export_event(&event) {
                        println!("{line}");
                    }
                }
            });
            let report = exporter.export(&session, &options, Some(tx))?;
            printer.join().unwrap();
            output::print_export_report(&report);
            if report.is_partial() {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {
            print!("{}", StudioConfig::stock_toml());
        }
    }

    Ok(())
}
