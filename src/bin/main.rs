use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use medrec_core::config::Config;
use medrec_core::curation::Curator;
use medrec_core::persistence::{backup_store, load_medicines, save_medicines};
use medrec_core::repl::Repl;
use medrec_core::report::{
    render_comparison, render_curation_summary, render_quality_report, render_recommendation, render_statistics,
};
use medrec_core::stats::StoreStatistics;
use medrec_core::validation::validate_path;
use medrec_core::RecommenderEngine;
use std::io::{stdin, stdout};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "medrec")]
#[command(about = "Recommend similar medicines by uses and active components", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML config file; `medrec.yaml` is used when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Medicine store, overriding the config
    #[arg(short, long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Interactive recommendation session (default)")]
    Interactive,

    #[command(about = "Recommend medicines similar to NAME")]
    Recommend {
        name: String,
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    #[command(about = "Compare two medicines")]
    Compare { first: String, second: String },

    #[command(about = "Print a data quality report for the store")]
    Validate {
        #[arg(long, help = "Emit the report as JSON")]
        json: bool,
    },

    #[command(about = "Show counts, averages and categories of the store")]
    Stats {
        #[arg(long, help = "Emit the statistics as JSON")]
        json: bool,
    },

    #[command(about = "Normalise terms, merge duplicates and fill categories")]
    Curate {
        #[arg(long, help = "Report changes without writing the store or a backup")]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("medrec_core=warn")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => Config::load_or_default().context("Failed to load config")?,
    };
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => interactive(&config),
        Commands::Recommend { name, count } => recommend(&config, &name, count),
        Commands::Compare { first, second } => compare(&config, &first, &second),
        Commands::Validate { json } => validate(&config, json),
        Commands::Stats { json } => stats(&config, json),
        Commands::Curate { dry_run } => curate(&config, dry_run),
    }
}

fn load_engine(config: &Config) -> Result<RecommenderEngine> {
    let engine = RecommenderEngine::from_path(&config.database_path, config.vectorizer)
        .context("Failed to load database")?;
    Ok(engine)
}

fn interactive(config: &Config) -> Result<()> {
    let rule = "=".repeat(70);
    println!("{rule}");
    println!("{}", "ML-Based Medicine Recommendation System".bold().green());
    println!("{rule}\n");

    let engine = load_engine(config)?;
    let session = engine.session()?;
    println!("Loaded {} medicines from database.", session.len());
    println!("Feature space: {} dimensions.", session.feature_dimensions());
    println!("\n{}\n", "Model ready! You can now search for medicines.".green());

    let stdin = stdin();
    let mut repl = Repl::new(&engine, stdin.lock(), stdout(), config.default_top_n)?;
    repl.run()?;
    Ok(())
}

fn recommend(config: &Config, name: &str, count: Option<usize>) -> Result<()> {
    let engine = load_engine(config)?;
    let top_n = count.filter(|&n| n > 0).unwrap_or(config.default_top_n);
    let rec = engine.recommend(name, top_n)?;
    println!("{}", render_recommendation(&rec));
    Ok(())
}

fn compare(config: &Config, first: &str, second: &str) -> Result<()> {
    let engine = load_engine(config)?;
    let session = engine.session()?;
    let (score, cmp) = session.compare(first, second)?;
    let left = &session.medicines()[session.find(first)?];
    let right = &session.medicines()[session.find(second)?];
    println!("{}", render_comparison(left, right, score, &cmp));
    Ok(())
}

fn validate(config: &Config, json: bool) -> Result<()> {
    let report = validate_path(&config.database_path).context("Failed to validate database")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_quality_report(&report));
    }
    Ok(())
}

fn stats(config: &Config, json: bool) -> Result<()> {
    let medicines = load_medicines(&config.database_path).context("Failed to load database")?;
    let stats = StoreStatistics::from_records(&medicines);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", render_statistics(&stats));
    }
    Ok(())
}

fn curate(config: &Config, dry_run: bool) -> Result<()> {
    let path = &config.database_path;
    let medicines = load_medicines(path).context("Failed to load database")?;

    println!("Starting data curation...");
    let (curated, summary) = Curator::new(&config.curation).curate(medicines);
    print!("{}", render_curation_summary(&summary));

    if dry_run {
        println!("{}", "Dry run: store left unchanged.".yellow());
    } else if summary.changed() {
        let backup = backup_store(path, &config.backup_dir()).context("Failed to back up database")?;
        println!("{} Backup created: {}", "✓".green().bold(), backup.display());
        save_medicines(path, &curated).context("Failed to write database")?;
        println!("{} Saved '{}'", "✓".green().bold(), path.display());
    } else {
        println!("Nothing to change.");
    }
    Ok(())
}
