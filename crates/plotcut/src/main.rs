use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use plotcut::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "plotcut")]
#[command(version, about, long_about = None)]
struct Opts {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an SVG file to G-code
    Convert {
        /// SVG file to convert
        svg: PathBuf,

        /// Configuration file (defaults to the user configuration, if present)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output file; G-code goes to stdout when omitted
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Write the default configuration as TOML
    Config {
        /// Destination file; printed to stdout when omitted
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print the positions visited by a G-code file as JSON
    Trace {
        /// G-code file to read
        gcode: PathBuf,
    },
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(opts.verbose.tracing_level_filter().into())
                .from_env_lossy(),
        )
        .init();

    match opts.command {
        Command::Convert {
            svg,
            config,
            output,
        } => run_convert(&svg, config.as_deref(), output.as_deref()),
        Command::Config { output } => run_config(output.as_deref()),
        Command::Trace { gcode } => run_trace(&gcode),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match Config::default_config_path() {
            Some(path) => path,
            None => return Ok(Config::default()),
        },
    };

    let config = Config::load_from_path(&path)
        .with_context(|| format!("read configuration {}", path.display()))?;
    for problem in config.validate() {
        warn!("{}", problem);
    }
    Ok(config)
}

fn run_convert(svg: &Path, config: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let path_set =
        PathSet::from_svg_file(svg).with_context(|| format!("import SVG {}", svg.display()))?;
    let conversion =
        convert(&path_set, &config).with_context(|| format!("convert {}", svg.display()))?;

    match output {
        Some(path) => {
            conversion
                .save_to_path(path)
                .with_context(|| format!("write G-code {}", path.display()))?;
            info!(path = %path.display(), "created G-code file");
        }
        None => println!("{}", conversion.to_gcode_string()),
    }
    Ok(())
}

fn run_config(output: Option<&Path>) -> Result<()> {
    let config = Config::default();
    match output {
        Some(path) => {
            config
                .save_to_path(path)
                .with_context(|| format!("write configuration {}", path.display()))?;
            info!(path = %path.display(), "wrote default configuration");
        }
        None => print!(
            "{}",
            config
                .to_toml_string()
                .context("serialize configuration to TOML")?
        ),
    }
    Ok(())
}

fn run_trace(gcode: &Path) -> Result<()> {
    let text =
        fs::read_to_string(gcode).with_context(|| format!("read G-code {}", gcode.display()))?;
    let trajectory = parse_trajectory(text.lines());
    let json =
        serde_json::to_string_pretty(&trajectory).context("serialize trajectory to JSON")?;
    println!("{}", json);
    Ok(())
}
