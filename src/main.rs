use clap::{Parser, Subcommand};
use percolator::api;
use percolator::backend::client::{ElasticClient, SearchBackend};
use percolator::config::{debug_from_env, Settings};
use percolator::domains::registry::{DomainRegistry, COUNTRY_DOMAIN, SPECIES_DOMAIN};
use percolator::extraction::tika::TikaExtractor;
use percolator::indexer::types::IndexSources;
use percolator::tagger::types::TagRequest;
use percolator::vocabulary::loader::{load_column, write_terms};
use percolator::vocabulary::types::TableOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const SCIENTIFIC_NAME_COLUMN: &str = "Scientific Name";

#[derive(Parser)]
#[command(name = "percolator", version, about = "Percolation-based text tagging")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP tagging API
    Serve {
        /// Overrides PERCOLATOR_BIND
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Rebuild the species percolator index from a vocabulary file
    IndexSpecies {
        vocabulary: PathBuf,
        /// Also write the generated synonym rules into this directory
        #[arg(long)]
        dump_dir: Option<PathBuf>,
    },
    /// Rebuild the country percolator index
    IndexCountries {
        countries: PathBuf,
        synonyms: PathBuf,
        #[arg(long)]
        dump_dir: Option<PathBuf>,
    },
    /// Rebuild the species taxonomy index from a `;`-delimited table
    IndexTaxa { table: PathBuf },
    /// Tag a text file with relevance scores
    Tag {
        domain: String,
        file: PathBuf,
        #[arg(long)]
        min_score: Option<f64>,
    },
    /// Write the scientific names of a taxonomy table one per line
    ExtractSpecies {
        table: PathBuf,
        #[arg(long, default_value = "species.txt")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let default_level = if debug_from_env() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => {
            let (settings, registry) = connect()?;
            let bind_addr = bind.unwrap_or(settings.bind_addr);
            let extractor = Arc::new(TikaExtractor::new(&settings.tika_url, settings.tika_timeout)?);
            let app = api::router(Arc::new(registry), extractor);

            tracing::info!("Elasticsearch hosts: {:?}", settings.elasticsearch_hosts);
            tracing::info!("Tika server: {}", settings.tika_url);
            tracing::info!("HTTP server listening on {}", bind_addr);
            tracing::info!("Press Ctrl+C to shutdown");

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, app).await?;
        }
        Command::IndexSpecies {
            vocabulary,
            dump_dir,
        } => {
            let (_, registry) = connect()?;
            let stored = registry
                .get(SPECIES_DOMAIN)?
                .query_indexer
                .index_queries(&with_dump_dir(IndexSources::vocabulary(vocabulary), dump_dir))
                .await?;
            tracing::info!("Indexed {} species queries", stored);
        }
        Command::IndexCountries {
            countries,
            synonyms,
            dump_dir,
        } => {
            let (_, registry) = connect()?;
            let sources = IndexSources::vocabulary(countries).with_synonyms(synonyms);
            let stored = registry
                .get(COUNTRY_DOMAIN)?
                .query_indexer
                .index_queries(&with_dump_dir(sources, dump_dir))
                .await?;
            tracing::info!("Indexed {} country queries", stored);
        }
        Command::IndexTaxa { table } => {
            let (_, registry) = connect()?;
            let domain = registry.get(SPECIES_DOMAIN)?;
            let indexer = domain
                .taxon_indexer
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("Domain {} has no taxonomy index", domain.name))?;
            let stored = indexer.index_taxa(&table).await?;
            tracing::info!("Indexed {} taxa into {}", stored, indexer.index_name());
        }
        Command::Tag {
            domain,
            file,
            min_score,
        } => {
            let (_, registry) = connect()?;
            let domain = registry.get(&domain)?;
            let text = std::fs::read_to_string(&file)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", file.display(), e))?;

            let tags = domain
                .tagger
                .get_tags(&TagRequest::new(text).relevance(min_score))
                .await?;
            for (term, score) in &tags {
                println!("{:50} {:.2}", term, score);
            }
        }
        Command::ExtractSpecies { table, output } => {
            let options = TableOptions {
                lowercase: false,
                ..TableOptions::default()
            };
            let names = load_column(&table, SCIENTIFIC_NAME_COLUMN, &options)?;
            let processed = write_terms(&output, &names)?;
            println!("processed={}", processed);
        }
    }

    Ok(())
}

/// Reads the settings and builds the domain registry over one shared backend client.
fn connect() -> anyhow::Result<(Settings, DomainRegistry)> {
    let settings = Settings::from_env()?;
    let client: Arc<dyn SearchBackend> = Arc::new(ElasticClient::new(
        &settings.elasticsearch_hosts,
        settings.elasticsearch_timeout,
    )?);
    let registry = DomainRegistry::standard(client)?;
    Ok((settings, registry))
}

fn with_dump_dir(sources: IndexSources, dump_dir: Option<PathBuf>) -> IndexSources {
    match dump_dir {
        Some(dir) => sources.with_dump_dir(dir),
        None => sources,
    }
}
