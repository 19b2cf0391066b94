use std::path::PathBuf;

use clap::{builder::ArgAction, Parser, Subcommand};
use console::{style, Emoji};
use errors::HarvestErrors;
use harvester::{
  endpoint::Endpoint,
  identifier::{classify, fix_key},
  record::field,
  Config, OaiClient, Record,
};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod errors;

static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");
static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("✨ ", "");

/// Fields shown for a harvested record, in display order.
const DISPLAY_FIELDS: &[(&str, &str)] = &[
  (field::TITLE, "Title:"),
  (field::AUTHOR, "Authors:"),
  (field::JOURNAL, "Journal:"),
  (field::VOLUME, "Volume:"),
  (field::PAGES, "Pages:"),
  (field::YEAR, "Year:"),
  (field::MONTH, "Month:"),
  (field::DOI, "DOI:"),
  (field::REPORTNO, "Report:"),
  (field::COMMENT, "Comment:"),
];

#[derive(Parser)]
#[command(author, version, about = "Harvest arXiv metadata over OAI-PMH")]
struct Cli {
  /// Verbose mode (-v, -vv, -vvv)
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Configuration file to use instead of the default one
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Fetch records from the repository
  Fetch {
    /// arXiv identifiers, legacy or modern
    #[arg(required = true)]
    identifiers: Vec<String>,
    /// Print the records as JSON
    #[arg(long)]
    json:        bool,
    /// Minimum time between requests in milliseconds
    #[arg(long)]
    interval:    Option<u64>,
    /// OAI-PMH endpoint to query
    #[arg(long)]
    base_url:    Option<String>,
  },
  /// Print the request URL for an identifier
  Url {
    /// arXiv identifier
    identifier: String,
    /// Use the identifier as given, without normalizing it
    #[arg(long)]
    raw:        bool,
  },
  /// Print the canonical form of an identifier
  Normalize {
    /// arXiv identifier
    identifier: String,
  },
  /// Write a configuration file with the default settings
  Init {
    /// Where to write the file
    #[arg(long, short)]
    path:  Option<PathBuf>,
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
  },
}

/// Setup logging with the specified verbosity level
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  // stdout is reserved for records
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true)
    .init();
}

fn print_record(record: &Record) {
  let eprint = record.field(field::EPRINT).unwrap_or("unknown");
  println!("\n{} {}", style(PAPER).green(), style(eprint).yellow().bold());
  for (name, label) in DISPLAY_FIELDS {
    if let Some(value) = record.field(name) {
      println!("   {} {}", style(label).green().bold(), style(value).white());
    }
  }
  if let Some(abstract_text) = record.field(field::ABSTRACT) {
    let preview = abstract_text.chars().take(100).collect::<String>();
    let preview =
      if abstract_text.chars().count() > 100 { format!("{}...", preview) } else { preview };
    println!("   {} {}", style("Abstract:").green().bold(), style(preview).white().italic());
  }
}

#[tokio::main]
async fn main() -> Result<(), HarvestErrors> {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  match cli.command {
    Commands::Fetch { identifiers, json, interval, base_url } => {
      let mut config = Config::load_or_default(cli.config.as_deref())?;
      if let Some(interval) = interval {
        config.min_interval_ms = interval;
      }
      if let Some(base_url) = base_url {
        config.base_url = base_url;
      }
      debug!("Using configuration: {:?}", config);

      let client = OaiClient::from_config(&config)?;
      if !json {
        println!(
          "{} Fetching {} record(s) from {}",
          style(LOOKING_GLASS).cyan(),
          style(identifiers.len()).yellow(),
          style(client.endpoint().base_url()).blue().underlined()
        );
      }

      let results = client.fetch_many(identifiers.as_slice()).await;
      let total = results.len();
      let mut records = Vec::with_capacity(total);
      for (identifier, result) in identifiers.iter().zip(results) {
        match result {
          Ok(record) => {
            trace!("Harvested {identifier}: {record:?}");
            if !json {
              print_record(&record);
            }
            records.push(record);
          },
          Err(e) => {
            eprintln!(
              "{} Could not fetch {}: {}",
              style(WARNING).yellow(),
              style(identifier).yellow(),
              style(e).red()
            );
          },
        }
      }

      if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
      }

      let failed = total - records.len();
      if failed > 0 {
        return Err(HarvestErrors::Incomplete { failed, total });
      }
      if !json {
        println!("\n{} Harvested {} record(s)", style(SUCCESS).green(), style(total).yellow());
      }
      Ok(())
    },

    Commands::Url { identifier, raw } => {
      let config = Config::load_or_default(cli.config.as_deref())?;
      let endpoint = Endpoint::from_config(&config)?;
      let identifier = if raw { identifier } else { fix_key(&identifier) };
      println!("{}", endpoint.construct_url(&identifier));
      Ok(())
    },

    Commands::Normalize { identifier } => {
      let key = fix_key(&identifier);
      println!("{} {}", style(&key).yellow(), style(format!("({})", classify(&identifier))).dim());
      Ok(())
    },

    Commands::Init { path, force } => {
      let path = path.or(cli.config).unwrap_or_else(Config::default_path);
      if path.exists() && !force {
        println!(
          "{} Configuration already exists at: {}",
          style(WARNING).yellow(),
          style(path.display()).yellow()
        );
        println!("{} Use --force to overwrite it", style("ℹ").blue());
        return Ok(());
      }

      Config::default().save(&path)?;
      println!(
        "{} Configuration written to: {}",
        style(SAVE).green(),
        style(path.display()).yellow()
      );
      Ok(())
    },
  }
}
