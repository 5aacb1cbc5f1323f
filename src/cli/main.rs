//! CLI binary entry point for doc-migration-cli

#[cfg(feature = "cli")]
use anyhow::Context;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use doc_migration_sdk::{
    BatchCoordinator, CommentMigrationDeps, DocumentMigrator, MigrationSettings, RegistrySource,
    SchemaVersion, VersionedDocument, create_comment_migrations,
};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "doc-migration-cli")]
#[command(about = "CLI wrapper for the Document Migration SDK")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Migrate a batch of documents read from a JSON file
    Migrate {
        /// Input file: JSON array of {sourceVersion, document} objects
        input: PathBuf,
        /// Settings YAML file (defaults to the built-in settings)
        #[arg(short, long)]
        settings: Option<PathBuf>,
        /// Output file for per-document outcomes (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Show the ordered migration steps between two versions
    Plan {
        /// Source schema version
        #[arg(long)]
        from: SchemaVersion,
        /// Target schema version (defaults to the configured target)
        #[arg(long)]
        to: Option<SchemaVersion>,
        /// Settings YAML file (defaults to the built-in settings)
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<MigrationSettings> {
    match path {
        Some(path) => MigrationSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => Ok(MigrationSettings::default()),
    }
}

#[cfg(feature = "cli")]
fn build_migrator(settings: &MigrationSettings) -> anyhow::Result<DocumentMigrator> {
    // The CLI has no embedded-content owner to query; comment bodies pass
    // through untouched.
    let registry = create_comment_migrations(CommentMigrationDeps {
        embedded_migrations: RegistrySource::default(),
        min_deferred_version: settings.min_deferred_version,
    })
    .context("failed to assemble migration registry")?;
    Ok(DocumentMigrator::new(registry, settings.target_version))
}

#[cfg(feature = "cli")]
fn handle_migrate(
    input: &PathBuf,
    settings: Option<&PathBuf>,
    output: Option<&PathBuf>,
    pretty: bool,
) -> anyhow::Result<()> {
    let settings = load_settings(settings)?;
    let migrator = build_migrator(&settings)?;
    let coordinator = BatchCoordinator::new(migrator, settings.worker_threads)?;

    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let documents: Vec<VersionedDocument> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse documents from {}", input.display()))?;

    let (outcomes, report) = coordinator.migrate_with_report(documents);

    let rendered = if pretty {
        serde_json::to_string_pretty(&outcomes)?
    } else {
        serde_json::to_string(&outcomes)?
    };
    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }

    eprintln!(
        "{} documents: {} migrated, {} failed, {} cancelled",
        report.total, report.migrated, report.failed, report.cancelled
    );
    if report.failed > 0 {
        anyhow::bail!("{} documents failed to migrate", report.failed);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn handle_plan(
    from: SchemaVersion,
    to: Option<SchemaVersion>,
    settings: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let settings = load_settings(settings)?;
    let migrator = build_migrator(&settings)?;
    let to = to.unwrap_or_else(|| migrator.target_version());

    let path = migrator.registry().resolve_path(from, to);
    if path.is_empty() {
        println!("no migration steps between {from} and {to}");
        return Ok(());
    }
    for (version, entry) in path {
        let class = if entry.deferred { "deferred" } else { "eager" };
        println!("{version} ({class})");
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Migrate {
            input,
            settings,
            output,
            pretty,
        } => handle_migrate(input, settings.as_ref(), output.as_ref(), *pretty),
        Commands::Plan { from, to, settings } => handle_plan(*from, *to, settings.as_ref()),
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("doc-migration-cli requires the 'cli' feature");
}
