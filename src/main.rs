//! CLI entry point for sharpdoc.
//!
//! Commands initialize settings, scan C# sources into the SQLite catalog and
//! list the named types the catalog holds.

use anyhow::{Context, anyhow};
use clap::{
    Parser, Subcommand, ValueEnum,
    builder::styling::{AnsiColor, Effects, Styles},
};
use sharpdoc::catalog::{CatalogSession, NamedTypeKind};
use sharpdoc::config::CONFIG_DIR;
use sharpdoc::display::{THEME, TypeRow, create_scan_table, create_types_table, with_spinner};
use sharpdoc::{FileWalker, ScanError, Scanner, Settings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// C# type catalog for documentation
#[derive(Parser)]
#[command(
    name = "sharpdoc",
    version = env!("CARGO_PKG_VERSION"),
    about = "C# type catalog for documentation",
    long_about = "Catalog C# declarations and resolve every type they reference.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log resolution details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .sharpdoc directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Scan C# sources into the catalog
    #[command(
        about = "Catalog declarations and resolve type references",
        after_help = "Examples:\n  sharpdoc scan src\n  sharpdoc scan . --force\n  sharpdoc scan Models --no-create --dry-run"
    )]
    Scan {
        /// File or directory to scan
        path: PathBuf,

        /// Rebuild the catalog from scratch
        #[arg(short, long)]
        force: bool,

        /// Do not catalogue unseen external or tuple types
        #[arg(long)]
        no_create: bool,

        /// Only list the files that would be scanned
        #[arg(long)]
        dry_run: bool,
    },

    /// List catalogued named types
    #[command(
        about = "List named types in the catalog",
        after_help = "Examples:\n  sharpdoc types\n  sharpdoc types --kind external\n  sharpdoc types --json | jq '.[].name'"
    )]
    Types {
        /// Only list types of this kind
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .sharpdoc/settings.toml")]
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Documented,
    External,
    Local,
    Tuple,
}

impl From<KindArg> for NamedTypeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Documented => NamedTypeKind::Documented,
            KindArg::External => NamedTypeKind::External,
            KindArg::Local => NamedTypeKind::Local,
            KindArg::Tuple => NamedTypeKind::Tuple,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", THEME.error_with_icon(&format!("{e:#}")));

        if let Some(scan_error) = e.downcast_ref::<ScanError>() {
            let suggestions = scan_error.recovery_suggestions();
            if !suggestions.is_empty() {
                eprintln!("\nSuggestions:");
                for suggestion in suggestions {
                    eprintln!("  • {suggestion}");
                }
            }
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .map_err(|e| anyhow!("configuration error in {}: {e}", path.display()))?,
        None => Settings::load().unwrap_or_else(|e| {
            eprintln!("{}", THEME.warning_with_icon(&format!("Configuration error: {e}")));
            Settings::default()
        }),
    };
    init_logging(&settings, cli.verbose);

    match cli.command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(force).map_err(|e| anyhow!("{e}"))?;
            println!(
                "{}",
                THEME.success_with_icon(&format!(
                    "Created configuration file at: {}",
                    path.display()
                ))
            );
            println!("Edit this file to customize your settings.");
        }

        Commands::Config => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            println!("{}", toml::to_string_pretty(&settings)?);
        }

        Commands::Scan {
            path,
            force,
            no_create,
            dry_run,
        } => {
            if no_create {
                settings.resolution.allow_create = false;
            }
            scan(&settings, &path, force, dry_run)?;
        }

        Commands::Types { kind, json } => list_types(&settings, kind.map(Into::into), json)?,
    }
    Ok(())
}

/// Install the fmt subscriber. `RUST_LOG` wins over settings and flags.
fn init_logging(settings: &Settings, verbose: bool) {
    let level = if verbose || settings.debug {
        "debug"
    } else {
        settings.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn scan(settings: &Settings, path: &Path, force: bool, dry_run: bool) -> anyhow::Result<()> {
    let root = path
        .canonicalize()
        .with_context(|| format!("path does not exist: {}", path.display()))?;

    let walker = FileWalker::new(Arc::new(settings.clone()));
    let files = walker.walk(&root);

    if dry_run {
        for file in &files {
            println!("{}", THEME.apply(&THEME.path, file.display()));
        }
        println!(
            "\n{} files would be scanned",
            THEME.apply(&THEME.number, files.len())
        );
        return Ok(());
    }

    let catalog_path = settings.resolved_catalog_path();
    if force && catalog_path.exists() {
        std::fs::remove_file(&catalog_path).with_context(|| {
            format!("could not remove catalog at {}", catalog_path.display())
        })?;
        eprintln!("Force rescan requested, rebuilding catalog");
    }

    let mut session = CatalogSession::open(&catalog_path)?;
    let mut scanner = Scanner::from_settings(settings)?;

    let message = format!("Scanning {} files in {}", files.len(), root.display());
    let summary = with_spinner(&message, || scanner.scan_files(&mut session, &files))?;
    let written = session.save_changes()?;

    println!("{}", create_scan_table(&summary));
    for failure in summary.failures.iter().take(5) {
        let location = match failure.range {
            Some(range) => format!("{}:{range}", failure.path.display()),
            None => failure.path.display().to_string(),
        };
        eprintln!(
            "{}",
            THEME.warning_with_icon(&format!("{location}: {}", failure.message))
        );
    }
    if summary.failure_count > 5 {
        eprintln!("  ... and {} more failures", summary.failure_count - 5);
    }

    println!(
        "{}",
        THEME.success_with_icon(&format!(
            "Wrote {written} rows to {}",
            catalog_path.display()
        ))
    );
    Ok(())
}

fn list_types(
    settings: &Settings,
    kind: Option<NamedTypeKind>,
    json: bool,
) -> anyhow::Result<()> {
    let catalog_path = settings.resolved_catalog_path();
    if !catalog_path.exists() {
        return Err(anyhow!(
            "no catalog at {}; run 'sharpdoc scan <path>' first (settings live in {CONFIG_DIR})",
            catalog_path.display()
        ));
    }

    let session = CatalogSession::open(&catalog_path)?;
    let rows: Vec<TypeRow> = session
        .named_types()
        .filter(|(_, ty)| kind.is_none_or(|kind| ty.kind() == kind))
        .map(|(id, ty)| TypeRow::new(&session, id, ty))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("No named types found");
    } else {
        println!("{}", create_types_table(&rows));
        let breakdown: Vec<String> = [
            NamedTypeKind::Documented,
            NamedTypeKind::External,
            NamedTypeKind::Local,
            NamedTypeKind::Tuple,
        ]
        .into_iter()
        .filter_map(|kind| {
            let count = rows.iter().filter(|row| row.kind == kind.as_str()).count();
            (count > 0).then(|| format!("{count} {}", THEME.apply(THEME.kind_style(kind), kind)))
        })
        .collect();
        println!(
            "{} named types ({})",
            THEME.apply(&THEME.number, rows.len()),
            breakdown.join(", ")
        );
    }
    Ok(())
}
