//! # confgen
//!
//! CLI tool for generating type-safe Rust code from TOML configuration
//! files.
//!
//! ## Usage
//!
//! ```bash
//! # Generate once
//! confgen generate --input config.toml --output src/config_gen.rs
//!
//! # Runtime-overridable accessors instead of baked values
//! confgen generate --mode getter
//!
//! # Watch the input file and regenerate on change
//! confgen watch --input config.toml --output src/config_gen.rs
//!
//! # Initialize configuration
//! confgen init
//!
//! # Check that the generated file is up to date
//! confgen validate
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;

use confgen::{GenerateOptions, Generator};
use confgen_cli::{
    config::{parse_size, CliArgs, Config, ConfigManager, Mode},
    error::CliError,
    writer::{FileWriter, WriteResult},
    NotifyBackend, RegenerationCoordinator,
};

#[derive(Parser)]
#[command(name = "confgen")]
#[command(author, version, about = "Generate type-safe Rust code from TOML configuration files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Input TOML file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output Rust file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Generation mode
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Disable environment variable overrides
    #[arg(long)]
    no_env: bool,

    /// Environment variable prefix
    #[arg(long)]
    env_prefix: Option<String>,

    /// Maximum file size for file: references (e.g. 10MB, 1GB, 512KB)
    #[arg(long)]
    max_file_size: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Rust source from a TOML configuration file
    Generate {
        #[command(flatten)]
        args: GenerateArgs,

        /// Preview the generated source without writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Watch the input file and regenerate on changes
    Watch {
        #[command(flatten)]
        args: GenerateArgs,

        /// Debounce delay in milliseconds
        #[arg(long)]
        debounce: Option<u64>,
    },

    /// Initialize a confgen configuration file
    Init {
        /// Output path for the configuration file
        #[arg(short, long, default_value = "confgen.toml")]
        output: PathBuf,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Validate that the generated file is up to date
    Validate {
        #[command(flatten)]
        args: GenerateArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            match e {
                CliError::Validation(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate { args, dry_run } => cmd_generate(args, dry_run),
        Commands::Watch { args, debounce } => cmd_watch(args, debounce),
        Commands::Init { output, force } => cmd_init(output, force),
        Commands::Validate { args } => cmd_validate(args),
    }
}

/// Resolve tool configuration from file and flags.
fn load_config(args: &GenerateArgs, debounce: Option<u64>) -> Result<Config, CliError> {
    let config = ConfigManager::load(args.config.as_deref())?;
    Ok(ConfigManager::merge_cli_args(
        config,
        &CliArgs {
            input: args.input.clone(),
            output: args.output.clone(),
            mode: args.mode,
            no_env: args.no_env,
            env_prefix: args.env_prefix.clone(),
            max_file_size: args.max_file_size.clone(),
            debounce_ms: debounce,
        },
    ))
}

/// Build pipeline options from resolved configuration.
fn generate_options(config: &Config) -> Result<GenerateOptions, CliError> {
    let mut opts = GenerateOptions::new(&config.generate.input, &config.generate.output);
    opts.mode = config.generate.mode.into();
    opts.env_override = config.env.enabled;
    opts.env_prefix = config.env.prefix.clone();
    opts.max_file_size = parse_size(&config.generate.max_file_size)?;
    Ok(opts)
}

/// Run the pipeline in memory, leaving the output file untouched.
fn render(opts: &GenerateOptions) -> Result<String, CliError> {
    let text = std::fs::read_to_string(&opts.input)?;
    let base_dir = opts
        .input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));

    let source = Generator::new()
        .with_mode(opts.mode)
        .with_env_override(opts.env_override)
        .with_env_prefix(&opts.env_prefix)
        .with_base_dir(base_dir)
        .with_max_file_size(opts.max_file_size)
        .generate(&text)?;
    Ok(source)
}

/// Generate command implementation.
fn cmd_generate(args: GenerateArgs, dry_run: bool) -> Result<(), CliError> {
    let config = load_config(&args, None)?;
    let opts = generate_options(&config)?;

    println!(
        "{} {}",
        "Generating from".cyan(),
        opts.input.display()
    );

    let source = render(&opts)?;
    let writer = FileWriter::new(dry_run);
    match writer.write(&opts.output, &source)? {
        WriteResult::Written { path, bytes } => {
            println!(
                "{} Written {} bytes to {}",
                "✓".green(),
                bytes,
                path.display()
            );
        }
        WriteResult::DryRun { content, path } => {
            println!(
                "{} Would write to {}:",
                "[dry-run]".yellow(),
                path.display()
            );
            println!("{}", "─".repeat(60).dimmed());
            println!("{content}");
            println!("{}", "─".repeat(60).dimmed());
        }
    }

    Ok(())
}

/// Watch command implementation.
fn cmd_watch(args: GenerateArgs, debounce: Option<u64>) -> Result<(), CliError> {
    let config = load_config(&args, debounce)?;
    let opts = generate_options(&config)?;

    // Initial generation; a failure is reported but the watch still
    // starts, so fixing the input recovers without restarting.
    println!("{} {}", "Generating".cyan(), opts.output.display());
    match confgen::generate_file(&opts) {
        Ok(()) => println!("{} Generated {}", "✓".green(), opts.output.display()),
        Err(e) => {
            eprintln!("{} {e}", "✗ Error:".red());
            println!("Continuing to watch for changes...");
        }
    }

    let (coordinator, handle) = RegenerationCoordinator::new(
        &opts.input,
        Duration::from_millis(config.watch.debounce_ms),
    );
    let coordinator = coordinator.with_retry(
        config.watch.retry_attempts,
        Duration::from_millis(config.watch.retry_interval_ms),
    );

    let shutdown_handle = handle.clone();
    if let Err(e) = ctrlc::set_handler(move || shutdown_handle.shutdown()) {
        eprintln!("{} {e}", "Warning: no Ctrl+C handler:".yellow());
    }

    println!(
        "\n{} {} (Ctrl+C to stop)",
        "Watching".cyan(),
        opts.input.display()
    );

    let backend = NotifyBackend::new(&opts.input, handle);
    let output = opts.output.clone();
    coordinator.run(backend, move || {
        confgen::generate_file(&opts)
            .with_context(|| format!("regenerating {}", output.display()))?;
        println!("{} Generated {}", "✓".green(), output.display());
        Ok(())
    })?;

    println!("\nStopping watch...");
    Ok(())
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        println!(
            "{} Configuration file already exists: {}",
            "Error:".red(),
            output.display()
        );
        println!("  Use --force to overwrite");
        return Err(CliError::Validation(
            "configuration file already exists".to_string(),
        ));
    }

    std::fs::write(&output, ConfigManager::default_config_content())?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Validate command implementation: regenerate in memory and compare
/// against the file on disk.
fn cmd_validate(args: GenerateArgs) -> Result<(), CliError> {
    let config = load_config(&args, None)?;
    let opts = generate_options(&config)?;

    println!("{}", "Validating generated file...".cyan());

    if !opts.output.exists() {
        return Err(CliError::Validation(format!(
            "generated file not found: {}",
            opts.output.display()
        )));
    }

    let existing = std::fs::read_to_string(&opts.output)?;
    let fresh = render(&opts)?;

    if existing.trim() == fresh.trim() {
        println!("{} Generated file is up-to-date", "✓".green());
        Ok(())
    } else {
        println!("{} Generated file is out of date", "✗".red());
        println!("  Run 'confgen generate' to update");
        Err(CliError::Validation(
            "generated file is out of date".to_string(),
        ))
    }
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
