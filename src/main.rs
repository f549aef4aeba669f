use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use versioned_wrapper::config::{Config, LOG_FILE_NAME, LogConfig, log_path};
use versioned_wrapper::{
    Function, Host, Invocation, RangeSyntax, VersionResolver, Wrapper, find_with, manage, unwrap,
    wrap,
};

#[derive(Parser)]
#[command(name = "versioned-wrapper")]
#[command(version, about = "Resolve and exercise version-aware function wrappers")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the highest version satisfying a range
    Resolve {
        #[arg(long)]
        range: String,
        /// Overrides the configured range syntax
        #[arg(long, value_enum)]
        syntax: Option<RangeSyntax>,
        versions: Vec<String>,
    },
    /// Register two wrapper versions on a sample host and call through the one a range selects
    Demo {
        #[arg(long, default_value = "^1.0.0")]
        range: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let _guard = init_logging(&config.log)?;

    let mut resolver_config = config.resolver.clone();
    match cli.command {
        Command::Resolve {
            range,
            syntax,
            versions,
        } => {
            if let Some(syntax) = syntax {
                resolver_config.syntax = syntax;
            }
            let resolver = VersionResolver::from_config(&resolver_config);
            match resolver.max_satisfying(&versions, &range) {
                Some(version) => println!("{version}"),
                None => bail!("no match for {range} among {versions:?}"),
            }
        }
        Command::Demo { range } => run_demo(&VersionResolver::from_config(&resolver_config), &range)?,
    }

    Ok(())
}

fn init_logging(config: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (writer, guard) = if config.file {
        let path = log_path();
        let dir = path.parent().unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .unwrap_or_else(|| OsStr::new(LOG_FILE_NAME));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {dir:?}"))?;
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        (BoxMakeWriter::new(non_blocking), Some(guard))
    } else {
        (BoxMakeWriter::new(std::io::stderr), None)
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(!config.file);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}

fn run_demo(resolver: &VersionResolver, range: &str) -> anyhow::Result<()> {
    let host: Host<i64, i64> =
        Host::new().with("add", Function::native(|_, args: &[i64]| args.iter().sum()));

    // Two loader copies patching the same property
    wrap(
        &host,
        "add",
        Wrapper::new(|inv: Invocation<'_, i64, i64>| inv.call_raw().unwrap_or_default() * 2),
        "1.0.0",
    );
    wrap(
        &host,
        "add",
        Wrapper::new(|inv: Invocation<'_, i64, i64>| inv.call_raw().unwrap_or_default() + 100),
        "2.0.0",
    );

    let before = host.call("add", &[2, 3])?;
    println!("add(2, 3) before manage: {before}");

    let Some(wrapper) = find_with(resolver, &host, "add", range) else {
        bail!("no registered wrapper satisfies {range}");
    };
    info!("Selected wrapper for range {}", range);
    manage(&host, "add", wrapper);

    let after = host.call("add", &[2, 3])?;
    println!("add(2, 3) through {range}: {after}");

    if let Some(original) = unwrap(&host, "add") {
        println!("add(2, 3) unwrapped: {}", original.call(&host, &[2, 3]));
    }

    Ok(())
}
