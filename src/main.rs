use clap::{Parser, Subcommand};
use dokkan_scraper::config::Config;
use dokkan_scraper::crawler::Crawler;
use dokkan_scraper::error::{Result, ScrapeError};
use dokkan_scraper::store::{self, CharacterStore};
use dokkan_scraper::{api, extract};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "dokkan-scraper")]
#[command(author, version, about = "Dokkan Battle wiki character scraper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl category listings and extract every character page
    Scrape {
        /// Category to crawl; repeat for several. Defaults to the configured list
        #[arg(long = "category", value_name = "CATEGORY")]
        categories: Vec<String>,

        /// Stop after this many characters
        #[arg(long)]
        limit: Option<usize>,

        /// Write the JSON snapshot only, skip the database
        #[arg(long)]
        no_store: bool,
    },

    /// Import snapshot files into the database
    Import {
        /// A snapshot path, `latest`, or `all`
        source: String,
    },

    /// Extract one saved character page and print it as JSON
    Extract {
        file: PathBuf,
    },

    /// Serve the read-only character API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

fn init_logging() {
    if let Err(e) = log4rs::init_file("log4rs.yml", Default::default()) {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        warn!("log4rs.yml not loaded ({}), logging to stderr", e);
    }
}

async fn scrape(config: &Config, categories: Vec<String>, limit: Option<usize>, no_store: bool) -> Result<()> {
    let categories = if categories.is_empty() {
        config.scraper.categories.clone()
    } else {
        categories
    };
    let crawler = Crawler::from_config(config.scraper.clone())?;
    let result = crawler.scrape_all(&categories, limit).await;

    let path = store::write_json(Path::new(&config.storage.data_dir), &result.characters)?;
    println!(
        "Scraped {} characters in {}ms ({} failed fetches) -> {}",
        result.stats.total_characters,
        result.stats.processing_time,
        result.stats.errors.len(),
        path.display()
    );

    if !no_store {
        let mut db = CharacterStore::open(Path::new(&config.storage.database_path))?;
        let summary = db.persist(&result.characters);
        println!(
            "Stored: {} imported, {} skipped, {} errors",
            summary.imported, summary.skipped, summary.errors
        );
    }
    Ok(())
}

fn import(config: &Config, source: &str) -> Result<()> {
    let data_dir = Path::new(&config.storage.data_dir);
    let files = match source {
        "latest" => store::latest_data_file(data_dir)?.into_iter().collect(),
        "all" => store::data_files(data_dir)?,
        path => vec![PathBuf::from(path)],
    };
    if files.is_empty() {
        return Err(ScrapeError::InvalidData(format!(
            "No data files found in {}",
            data_dir.display()
        )));
    }

    let mut db = CharacterStore::open(Path::new(&config.storage.database_path))?;
    for file in files {
        info!("Importing {}", file.display());
        let characters = store::read_json(&file)?;
        let summary = db.persist(&characters);
        println!(
            "{}: {} imported, {} skipped, {} errors",
            file.display(),
            summary.imported,
            summary.skipped,
            summary.errors
        );
    }
    Ok(())
}

fn extract_file(file: &Path) -> Result<()> {
    let html = std::fs::read_to_string(file)?;
    let character = extract::extract_character_page(&html).ok_or_else(|| {
        ScrapeError::InvalidData(format!("No character card in {}", file.display()))
    })?;
    println!("{}", serde_json::to_string_pretty(&character)?);
    Ok(())
}

#[actix_web::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();
    let config = Config::load();

    let outcome = match cli.command {
        Command::Scrape {
            categories,
            limit,
            no_store,
        } => scrape(&config, categories, limit, no_store).await,
        Command::Import { source } => import(&config, &source),
        Command::Extract { file } => extract_file(&file),
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            match CharacterStore::open(Path::new(&config.storage.database_path)) {
                Ok(db) => api::serve(db, &config.server.host, port)
                    .await
                    .map_err(ScrapeError::from),
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = outcome {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
