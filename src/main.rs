//! exrandr - Density-aware xrandr layouts
//!
//! Computes a multi-monitor layout (scaling, pixel density normalization,
//! rotation, relative positioning) and renders it as an xrandr invocation.

mod command;
mod completion;
mod config;
mod desktop;
mod layout;
mod xrandr;

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use command::{CommandRunner, SystemRunner};
use config::{DisplayEntry, LayoutConfig};
use layout::{normalize, Display};

/// exrandr - Density-aware xrandr layouts
#[derive(Parser)]
#[command(name = "exrandr")]
#[command(version)]
#[command(about = "Compute scaled, density-matched xrandr layouts", long_about = None)]
struct Cli {
    /// Path to a layout profile
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the layout and print (or apply) the xrandr command
    Layout {
        /// Display spec: NAME,inches=N,res=WxH[,zoom=F][,gamma=F][,rotate=R]
        /// [,primary][,default-ppi][,off][,above|below|left-of|right-of=NAME]
        #[arg(short, long = "display", value_name = "SPEC")]
        displays: Vec<Display>,

        /// Desktop scale applied to every display (1 = 100%)
        #[arg(short, long)]
        scale: Option<f64>,

        /// Target ppi; 0 or less disables density normalization
        #[arg(long, allow_hyphen_values = true)]
        ppi: Option<f64>,

        /// Run xrandr and gsettings instead of printing the commands
        #[arg(long)]
        apply: bool,

        /// Do not check display names against connected outputs
        #[arg(long)]
        no_probe: bool,

        /// Print the resolved layout as JSON
        #[arg(long)]
        json: bool,
    },

    /// List connected outputs
    List,

    /// Show the current state of every output
    Status,

    /// Show the effective layout profile
    Config {
        /// Generate sample profile
        #[arg(long)]
        generate: bool,

        /// Output path for generated profile
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print shell completions for $SHELL
    Completion,
}

/// Options of the `layout` command
struct LayoutArgs {
    displays: Vec<Display>,
    scale: Option<f64>,
    ppi: Option<f64>,
    apply: bool,
    no_probe: bool,
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for commands
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        LayoutConfig::load(config_path)?
    } else {
        LayoutConfig::load_default()?
    };

    let runner = SystemRunner;

    match cli.command {
        Commands::Layout {
            displays,
            scale,
            ppi,
            apply,
            no_probe,
            json,
        } => {
            let args = LayoutArgs {
                displays,
                scale,
                ppi,
                apply,
                no_probe,
                json,
            };
            run_layout(config, args, &runner).await?;
        }
        Commands::List => {
            for name in xrandr::list_connected(&runner).await? {
                println!("{}", name);
            }
        }
        Commands::Status => {
            for status in xrandr::query_status(&runner, &[]).await? {
                println!("{}", status);
            }
        }
        Commands::Config { generate, output } => {
            if generate {
                let sample = config::generate_sample_config()?;
                if let Some(path) = output {
                    std::fs::write(&path, &sample)?;
                    println!("Configuration written to: {}", path.display());
                } else {
                    println!("{}", sample);
                }
            } else {
                println!("{}", config.to_toml()?);
            }
        }
        Commands::Completion => {
            let shell = completion::detect_shell(std::env::var("SHELL").ok().as_deref())?;
            completion::write_completions(shell, &mut Cli::command(), &mut io::stdout());
        }
    }

    Ok(())
}

/// Merge command line values over the profile
fn merge_args(mut config: LayoutConfig, args: &mut LayoutArgs) -> LayoutConfig {
    config
        .displays
        .extend(args.displays.drain(..).map(DisplayEntry::from));
    if let Some(scale) = args.scale {
        config.desktop_scale = scale;
    }
    if args.ppi.is_some() {
        config.ppi = args.ppi;
    }
    config.apply |= args.apply;
    config
}

/// Resolve the layout, then print or apply it
async fn run_layout(
    config: LayoutConfig,
    mut args: LayoutArgs,
    runner: &dyn CommandRunner,
) -> anyhow::Result<()> {
    let config = merge_args(config, &mut args);

    let displays = config.displays()?;
    if displays.is_empty() {
        anyhow::bail!("No displays declared. Pass --display or write a layout profile.");
    }

    // Every invariant is checked here, before anything touches the system
    let layout = normalize(displays, config.normalize_options())?;

    if !args.no_probe {
        let connected = xrandr::list_connected(runner).await?;
        for resolved in &layout.displays {
            if !connected.contains(&resolved.display.name) {
                anyhow::bail!(
                    "Display '{}' is not connected (connected: {})",
                    resolved.display.name,
                    connected.join(", ")
                );
            }
        }
    }

    if args.json {
        println!("{}", layout.to_json()?);
    }

    if !config.apply {
        if !args.json {
            println!("{}", xrandr::render_command(&layout, false));
            if let Some(scale) = layout.integer_desktop_scale {
                for command in desktop::scale_commands(scale) {
                    println!("# {}", command);
                }
            }
        }
        return Ok(());
    }

    tracing::info!("{}", xrandr::render_command(&layout, true));
    if let Some(scale) = layout.integer_desktop_scale {
        desktop::apply_scale(runner, scale).await?;
    }

    // The system has changed by now; mismatches are reported, not fatal
    let mismatches = xrandr::apply(runner, &layout).await?;
    if mismatches.is_empty() {
        tracing::info!("Layout applied to {} display(s)", layout.displays.len());
    } else {
        tracing::warn!(
            "Layout applied, but xrandr reports {} display(s) differing from the computed geometry",
            mismatches.len()
        );
    }

    Ok(())
}
