use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use leafvault_core::DataVaultGenerator;
use leafvault_export::{JsonExporter, RdfExporter, SqlExporter};
use leafvault_matcher::{OntologyMatcher, OntologyVocabulary, Thresholds};
use leafvault_similarity::{
    Algorithm, OllamaEmbedder, SimilarityCalculator, DEFAULT_EMBEDDING_MODEL, DEFAULT_OLLAMA_URL,
};

/// Classify plant-health lemmas into a Data Vault schema
#[derive(Parser, Debug)]
#[command(name = "leafvault")]
#[command(about = "Ontology-guided lemma classification into Data Vault schemas", long_about = None)]
struct Args {
    /// Lemmas to classify
    lemmas: Vec<String>,

    /// Read lemmas from a file instead (one per line)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Record source identifier (typically the image file name)
    #[arg(short, long, default_value = "unknown")]
    source: String,

    /// Similarity algorithm: lexical, semantic, ngram_cosine, jaro_winkler, jaro_cosine, hybrid
    #[arg(short, long, default_value = "hybrid")]
    algorithm: Algorithm,

    /// Ollama base URL for semantic embeddings
    #[arg(long, default_value = DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    /// Embedding model name
    #[arg(long, default_value = DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// Entity (hub) rescue threshold
    #[arg(long, default_value_t = 0.75)]
    entity_threshold: f32,

    /// Attribute (satellite) rescue threshold
    #[arg(long, default_value_t = 0.65)]
    attribute_threshold: f32,

    /// Export format: json, json-compact, sql, rdf or all
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Output directory for exports
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("LeafVault v{}", env!("CARGO_PKG_VERSION"));

    let lemmas = load_lemmas(&args)?;
    info!(count = lemmas.len(), source = %args.source, "lemmas loaded");

    let embedder = OllamaEmbedder::new(&args.ollama_url, &args.embedding_model);
    let calculator = SimilarityCalculator::with_embedder(args.algorithm, Box::new(embedder));
    let thresholds = Thresholds {
        entities: args.entity_threshold,
        attributes: args.attribute_threshold,
        ..Thresholds::default()
    };
    let matcher = OntologyMatcher::new(OntologyVocabulary::default(), calculator, thresholds);

    let classification = matcher.classify_lemmas(&lemmas, &args.source)?;
    info!(
        hubs = classification.hubs.len(),
        links = classification.links.len(),
        satellites = classification.satellites.len(),
        "classification complete"
    );

    let generator = DataVaultGenerator::new();
    let schema = generator.generate_schema(
        classification.hubs,
        classification.links,
        classification.satellites,
        &args.source,
        &lemmas,
    );

    for diagnostic in generator.validate_schema(&schema) {
        if diagnostic.is_error() {
            error!("{diagnostic}");
        } else {
            warn!("{diagnostic}");
        }
    }

    let stats = schema.statistics();
    info!(
        hubs = stats.total_hubs,
        links = stats.total_links,
        satellites = stats.total_satellites,
        avg_hub_confidence = stats.average_confidence.hubs,
        "schema statistics"
    );

    write_exports(&args, &schema)?;
    Ok(())
}

fn load_lemmas(args: &Args) -> anyhow::Result<Vec<String>> {
    if !args.lemmas.is_empty() {
        return Ok(args.lemmas.clone());
    }
    let Some(input) = &args.input else {
        anyhow::bail!("no lemmas given: pass them as arguments or via --input");
    };
    let content = fs::read_to_string(input)
        .with_context(|| format!("reading lemma file {}", input.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

fn write_exports(args: &Args, schema: &leafvault_core::DataVaultSchema) -> anyhow::Result<()> {
    let formats: Vec<&str> = match args.format.as_str() {
        "all" => vec!["json", "json-compact", "sql", "rdf"],
        other => vec![other],
    };
    for format in formats {
        let path = match format {
            "json" => {
                let path = args.output.join("schema.json");
                JsonExporter::new().export(schema, &path)?;
                path
            }
            "json-compact" => {
                let path = args.output.join("schema.compact.json");
                JsonExporter::new().export_compact(schema, &path)?;
                path
            }
            "sql" => {
                let path = args.output.join("schema.sql");
                SqlExporter::new().export(schema, &path)?;
                path
            }
            "rdf" => {
                let path = args.output.join("schema.ttl");
                RdfExporter::default().export(schema, &path)?;
                path
            }
            other => anyhow::bail!("unknown export format: {other}"),
        };
        info!(format, path = %path.display(), "export written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_with_defaults() {
        let args = Args::try_parse_from(["leafvault", "corn", "necrose"]).unwrap();
        assert_eq!(args.lemmas, ["corn", "necrose"]);
        assert_eq!(args.entity_threshold, 0.75);
        assert_eq!(args.attribute_threshold, 0.65);
        assert_eq!(args.format, "json");
    }

    #[test]
    fn test_every_exposed_threshold_flag_is_consumed() {
        let args = Args::try_parse_from([
            "leafvault",
            "corn",
            "--entity-threshold",
            "0.8",
            "--attribute-threshold",
            "0.5",
        ])
        .unwrap();
        let thresholds = Thresholds {
            entities: args.entity_threshold,
            attributes: args.attribute_threshold,
            ..Thresholds::default()
        };
        assert_eq!(thresholds.entities, 0.8);
        assert_eq!(thresholds.attributes, 0.5);
        assert_eq!(thresholds.relations, Thresholds::default().relations);
    }
}
