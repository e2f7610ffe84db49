use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use readpref::config::{Config, ConfigError};
use readpref::{utils, ReadMode, ReadPreference, ServerSelector, TagSet};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "readpref")]
#[command(about = "Client-side read preference and server selection for MongoDB replica sets")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "readpref Team")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select one server from the configured topology
    Select {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Show the ordered servers inside the latency window
    Candidates {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Generate an example configuration file
    Config {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Validate configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show version information
    Version,
}

#[derive(clap::Args)]
struct SelectionArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: PathBuf,
    /// Read preference mode, overriding the configured one
    #[arg(short, long)]
    mode: Option<String>,
    /// Tag set such as "dc:east,rack:2"; repeat to try several in order
    #[arg(short, long = "tags")]
    tags: Vec<String>,
    /// Seed for the random pick
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Select { selection } => select(selection)?,
        Commands::Candidates { selection } => candidates(selection)?,
        Commands::Config { output } => generate_config(output)?,
        Commands::Validate { config } => validate_config(config)?,
        Commands::Version => show_version(),
    }

    Ok(())
}

/// Load the configuration and resolve the effective read preference
fn prepare(args: &SelectionArgs) -> anyhow::Result<(Config, ReadPreference)> {
    let mut config = Config::load_from_file(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    init_logging(&config)?;
    info!("Configuration loaded from: {:?}", args.config);

    if args.seed.is_some() {
        config.selection.seed = args.seed;
    }

    let mut rp = config.read_preference()?;
    if let Some(mode) = &args.mode {
        rp.mode = mode.parse::<ReadMode>()?;
    }
    if !args.tags.is_empty() {
        let mut overridden = ReadPreference::new(rp.mode);
        for tags in &args.tags {
            overridden.add_tag_set(tags.parse::<TagSet>()?);
        }
        overridden.replace_into(&mut rp);
    }

    info!("Read preference: {}", rp);
    Ok((config, rp))
}

fn select(args: SelectionArgs) -> anyhow::Result<()> {
    let (config, rp) = prepare(&args)?;
    let connections = config.build_connections();
    let mut selector = ServerSelector::from_config(&config.selection);

    let chosen = selector
        .select(&connections, &rp)
        .with_context(|| format!("No server selected for read preference {}", rp))?;
    println!("{}", utils::format_connection(chosen));

    Ok(())
}

fn candidates(args: SelectionArgs) -> anyhow::Result<()> {
    let (config, rp) = prepare(&args)?;
    let connections = config.build_connections();
    let selector = ServerSelector::from_config(&config.selection);

    let window = selector
        .eligible(&connections, &rp)
        .with_context(|| format!("No eligible servers for read preference {}", rp))?;
    println!(
        "{} eligible server(s) for {} within {}:",
        window.len(),
        rp,
        utils::format_latency(selector.cutoff_ms())
    );
    println!("{}", utils::format_candidates(&window));

    Ok(())
}

fn generate_config(output: PathBuf) -> anyhow::Result<()> {
    println!("Generating configuration file: {:?}", output);

    Config::create_example_config(&output).context("Failed to generate config")?;

    println!("Configuration file generated successfully!");
    println!("Edit the file to match your topology and run:");
    println!("  readpref select --config {:?}", output);

    Ok(())
}

fn validate_config(config_path: PathBuf) -> anyhow::Result<()> {
    println!("Validating configuration file: {:?}", config_path);

    match Config::load_from_file(&config_path) {
        Ok(config) => {
            println!("✓ Configuration file is valid");
            println!("  Read preference mode: {}", config.read_preference.mode);
            println!("  Tag sets: {}", config.read_preference.tag_sets.len());
            println!("  Latency window: {}", utils::format_latency(config.selection.cutoff_ms));
            println!("  Servers: {}", config.servers.len());
            for (i, server) in config.build_connections().iter().enumerate() {
                println!("    {}: {}", i + 1, utils::format_connection(server));
            }
        }
        Err(e) => {
            eprintln!("✗ Configuration file validation failed:");
            match &e {
                ConfigError::IoError(msg) => eprintln!("  File error: {}", msg),
                ConfigError::ParseError(msg) => eprintln!("  Parse error: {}", msg),
                ConfigError::ValidationError(msg) => eprintln!("  Validation error: {}", msg),
                ConfigError::SerializeError(msg) => eprintln!("  Serialization error: {}", msg),
            }
            bail!(e);
        }
    }

    Ok(())
}

fn show_version() {
    println!("readpref v{}", env!("CARGO_PKG_VERSION"));
    println!("Client-side read preference and server selection for MongoDB replica sets");
    println!();
    println!(
        "Built with Rust {}",
        option_env!("CARGO_PKG_RUST_VERSION").unwrap_or("unknown")
    );
    println!("Target: {}", std::env::consts::ARCH);
    println!();
    println!("Read preference modes:");
    for mode in ReadMode::ALL {
        println!("  • {}", mode);
    }
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.logging.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized at level: {}", config.logging.level);
    Ok(())
}
