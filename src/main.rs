use anyhow::Context;
use clap::{Parser, Subcommand};
use obsplot::{Config, Obsplot, Renderer, Theme, Value, Widget, diagnostics, normalize};
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "obsplot")]
#[command(about = "Normalize and render declarative plot specs", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tagged JSON tree for a spec.
    Normalize {
        #[arg(long)]
        spec: String,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },

    /// Write a self-contained HTML document for a spec.
    Render {
        #[arg(long)]
        spec: String,

        #[arg(short = 'o', long)]
        out: String,

        #[arg(long)]
        config: Option<String>,

        #[arg(long)]
        theme: Option<Theme>,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,
    },

    /// Print the synchronized widget state for a spec.
    Widget {
        #[arg(long)]
        spec: String,

        #[arg(long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    diagnostics::init(cli.verbose);

    match cli.cmd {
        Commands::Normalize { spec, out } => {
            let value = read_spec(&spec)?;
            let json = serde_json::to_string_pretty(&normalize(&value)?)?;
            match out {
                Some(out) => {
                    std::fs::write(&out, json).with_context(|| format!("write {}", out))?;
                    println!("Wrote {}", out);
                }
                None => println!("{}", json),
            }
        }
        Commands::Render {
            spec,
            out,
            config,
            theme,
            width,
            height,
        } => {
            // 1) Config: file (if any), then command-line overrides.
            let mut config = load_config(config.as_deref(), Renderer::Document)?;
            if let Some(theme) = theme {
                config = config.with_theme(theme);
            }
            if let Some(width) = width {
                config = config.with_default("width", width)?;
            }
            if let Some(height) = height {
                config = config.with_default("height", height)?;
            }

            // 2) Parse spec.
            let value = read_spec(&spec)?;

            // 3) Render HTML.
            let op = Obsplot::new(config)?;
            let file = std::fs::File::create(&out).with_context(|| format!("create {}", out))?;
            op.render_to(value, &mut BufWriter::new(file))?;
            info!(out = %out, "document rendered");
            println!("Wrote {}", out);
        }
        Commands::Widget { spec, config } => {
            let config = load_config(config.as_deref(), Renderer::Widget)?;
            let widget = Widget::new(&read_spec(&spec)?, &config)?;
            println!("{}", serde_json::to_string_pretty(widget.state())?);
        }
    }

    Ok(())
}

fn read_spec(path: &str) -> Result<Value> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read spec file {}", path))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parse spec file {}", path))?;
    Value::from_json(json).with_context(|| format!("bad spec in {}", path))
}

/// Load a config file (or defaults) and force the renderer the command needs.
fn load_config(path: Option<&str>, renderer: Renderer) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(Path::new(path))
            .with_context(|| format!("load config file {}", path))?,
        None => Config::default(),
    };
    Ok(config.with_renderer(renderer)?)
}
