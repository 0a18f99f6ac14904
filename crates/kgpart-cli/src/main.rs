use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use kgpart_core::config::DEFAULT_SIMILAR_DISPLAY_LIMIT;
use kgpart_core::{Config, MergeOutcome, OntologyKind, PipelineManager, SimilarityReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kgpart")]
#[command(about = "Validate document partitions and consolidate their ontologies")]
#[command(long_about = None)]
#[command(version)]
struct Cli {
    /// Workspace root containing the data, partitions and ontologies directories
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Data source to work on (required when the data directory holds several)
    #[arg(long, global = true)]
    data_source: Option<String>,

    /// Configuration file (defaults to ./kgpart.toml or the user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that every data file is in exactly one partition
    Validate {
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a partition claiming the given paths (end directories with '/')
    CreatePartition {
        title: String,
        description: String,
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// List partitions
    ListPartitions,
    /// Add an entity type to a partition's ontology
    AddEntity {
        partition_id: u32,
        #[arg(value_name = "TYPE")]
        type_name: String,
        description: String,
        example_file: String,
        example_in_file: String,
    },
    /// Add a relationship type to a partition's ontology
    AddRelationship {
        partition_id: u32,
        #[arg(value_name = "TYPE")]
        type_name: String,
        source_entity_type: String,
        target_entity_type: String,
        description: String,
        example_file: String,
        example_in_file: String,
    },
    /// Check a candidate type against the master ontology
    Check {
        kind: KindArg,
        #[arg(value_name = "TYPE")]
        type_name: String,
        #[arg(default_value = "")]
        description: String,
        /// Minimum combined score to report a candidate
        #[arg(long)]
        threshold: Option<f64>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Merge a partition's ontology into the master ontology
    Merge {
        partition_id: u32,
        target: MergeTarget,
    },
    /// Create empty master ontologies
    InitMaster,
    /// Delete the documents of a pipeline stage
    Reset { stage: ResetStage },
    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Entity,
    Relationship,
}

impl From<KindArg> for OntologyKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Entity => OntologyKind::Entity,
            KindArg::Relationship => OntologyKind::Relationship,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MergeTarget {
    Entity,
    Relationship,
    Both,
}

#[derive(Clone, Copy, ValueEnum)]
enum ResetStage {
    Partitions,
    Ontologies,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().wrap_err("Failed to load config")?,
    };

    if let Commands::Config = cli.command {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let manager = PipelineManager::open(&cli.root, config, cli.data_source.as_deref())
        .wrap_err("Failed to open workspace")?;

    match cli.command {
        Commands::Validate { json } => {
            let report = manager.validate()?;
            let valid = report.is_valid();

            if json {
                let output = serde_json::json!({ "is_valid": valid, "report": report });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                let limit = manager.config().validation.summary_preview_limit;
                println!("{}", report.summary(limit));
                if !valid {
                    println!();
                    println!(
                        "{}",
                        report.feedback(manager.config().validation.feedback_preview_limit)
                    );
                }
            }

            if !valid {
                process::exit(1);
            }
        }
        Commands::CreatePartition {
            title,
            description,
            paths,
        } => {
            let partition = manager.create_partition(&title, &description, &paths)?;
            println!("Created partition {}: {}", partition.partition_id, partition.title);
            println!("  Paths: {}", partition.paths.len());
        }
        Commands::ListPartitions => {
            let partitions = manager.list_partitions()?;
            if partitions.is_empty() {
                println!("No partitions found. Use 'kgpart create-partition' to create one.");
            }
            for p in partitions {
                println!(
                    "{:>4}  {}  ({} paths, {} entities, {} relationships)",
                    p.partition_id, p.title, p.path_count, p.entity_count, p.relationship_count
                );
            }
        }
        Commands::AddEntity {
            partition_id,
            type_name,
            description,
            example_file,
            example_in_file,
        } => {
            let (entity, created) = manager.add_entity(
                partition_id,
                &type_name,
                &description,
                &example_file,
                &example_in_file,
            )?;
            if created {
                println!(
                    "Added entity {} '{}' to partition {}",
                    entity.entity_id, entity.type_name, partition_id
                );
            } else {
                println!(
                    "Entity '{}' already exists in partition {} (id {})",
                    entity.type_name, partition_id, entity.entity_id
                );
            }
        }
        Commands::AddRelationship {
            partition_id,
            type_name,
            source_entity_type,
            target_entity_type,
            description,
            example_file,
            example_in_file,
        } => {
            let (rel, created) = manager.add_relationship(
                partition_id,
                &type_name,
                &source_entity_type,
                &target_entity_type,
                &description,
                &example_file,
                &example_in_file,
            )?;
            let triple = format!(
                "{} -> {} -> {}",
                rel.source_entity_type, rel.type_name, rel.target_entity_type
            );
            if created {
                println!(
                    "Added relationship {} '{}' to partition {}",
                    rel.relationship_id, triple, partition_id
                );
            } else {
                println!(
                    "Relationship '{}' already exists in partition {} (id {})",
                    triple, partition_id, rel.relationship_id
                );
            }
        }
        Commands::Check {
            kind,
            type_name,
            description,
            threshold,
            json,
        } => {
            let report =
                manager.check_similarity(kind.into(), &type_name, &description, threshold)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_similarity(&report);
            }
        }
        Commands::Merge {
            partition_id,
            target,
        } => {
            let outcomes = match target {
                MergeTarget::Entity => vec![manager.merge(partition_id, OntologyKind::Entity)?],
                MergeTarget::Relationship => {
                    vec![manager.merge(partition_id, OntologyKind::Relationship)?]
                }
                MergeTarget::Both => manager.merge_both(partition_id)?,
            };
            for outcome in &outcomes {
                print_merge(outcome);
            }
        }
        Commands::InitMaster => {
            for master in manager.init_master_ontologies()? {
                println!(
                    "Initialized master {} ontology at version {}",
                    master.ontology_type, master.version
                );
            }
        }
        Commands::Reset { stage } => {
            let (removed, what) = match stage {
                ResetStage::Partitions => (manager.reset_partitions()?, "partition"),
                ResetStage::Ontologies => (manager.reset_ontologies()?, "ontology"),
            };
            println!(
                "Removed {} {} document(s) for data source '{}'",
                removed,
                what,
                manager.data_source().name
            );
        }
        Commands::Config => {}
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_similarity(report: &SimilarityReport) {
    println!("Recommendation: {}", report.recommendation);
    println!("{}", report.message);

    if let Some(exact) = &report.exact_match {
        println!();
        println!("Existing element: {}", exact.type_name);
        if !exact.description.is_empty() {
            println!("  Description: {}", exact.description);
        }
        println!("  Partitions: {:?}", exact.source_partitions);
    }

    if !report.similar_elements.is_empty() {
        println!();
        println!("Similar elements:");
        for m in report.similar_elements.iter().take(DEFAULT_SIMILAR_DISPLAY_LIMIT) {
            println!(
                "  - {} (score {:.2}; type {:.2}, description {:.2})",
                m.type_name, m.similarity_score, m.type_similarity, m.description_similarity
            );
            if !m.description.is_empty() {
                println!("    {}", m.description);
            }
        }
    }
}

fn print_merge(outcome: &MergeOutcome) {
    println!(
        "Merged partition {} into master {} ontology: {} added, {} updated",
        outcome.partition_id, outcome.kind, outcome.stats.added, outcome.stats.updated
    );
    if outcome.saved {
        println!(
            "  Version {} ({} elements)",
            outcome.version, outcome.total_elements
        );
    } else {
        println!(
            "  Nothing changed; version {} kept ({} elements)",
            outcome.version, outcome.total_elements
        );
    }
}
