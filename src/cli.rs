mod saved;

use std::{
    fs,
    io::{Read as _, stdin},
    path::PathBuf,
    time,
};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use slicingdice::{Client, Profile, parse_response};
use tracing::debug;

#[derive(Debug, Parser)]
#[command(
    name = "slicingdice",
    about = "The SlicingDice CLI",
    version = env!("CARGO_PKG_VERSION"),
    propagate_version = true
)]
pub(crate) struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Args)]
#[command(next_help_heading = "Global Options")]
pub(crate) struct GlobalArgs {
    /// Name of the profile to use
    #[arg(long, short = 'P', global = true)]
    pub profile: Option<String>,
    /// Timeout (in seconds) for each request
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
    /// Do not verify TLS certificates
    #[arg(long, global = true)]
    pub insecure: bool,
    /// Print verbose logs
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Print version
    Version,
    /// Show the database the keys belong to
    Database,
    /// List columns
    Columns,
    /// Create one or more columns
    CreateColumn(PayloadArgs),
    /// Insert entities
    Insert(PayloadArgs),
    /// Count entities matching each query
    CountEntity(PayloadArgs),
    /// Count all entities
    CountEntityTotal(CountTotalArgs),
    /// Count events matching each query
    CountEvent(PayloadArgs),
    /// Run an aggregation
    Aggregation(PayloadArgs),
    /// Fetch the most frequent values of some columns
    TopValues(PayloadArgs),
    /// Check whether entities exist
    ExistsEntity(ExistsArgs),
    /// Manage saved queries
    Saved(saved::SavedArgs),
    /// Fetch column values of matching entities
    Result(PayloadArgs),
    /// Fetch scores of matching entities
    Score(PayloadArgs),
    /// Run an SQL query
    Sql(SqlArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct PayloadArgs {
    /// JSON file to read the payload from. Reads stdin if omitted
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    pub(crate) fn read(&self) -> anyhow::Result<Value> {
        let text = read_input(self.file.as_ref())?;
        serde_json::from_str(&text).context("Invalid JSON payload")
    }
}

#[derive(Debug, clap::Args)]
pub(crate) struct CountTotalArgs {
    /// Dimension to count in (can be repeated)
    #[arg(long = "dimension", short = 'd')]
    pub dimensions: Vec<String>,
}

#[derive(Debug, clap::Args)]
pub(crate) struct ExistsArgs {
    /// Dimension to look in
    #[arg(long, short = 'd')]
    pub dimension: Option<String>,
    /// Entity ids
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Debug, clap::Args)]
pub(crate) struct SqlArgs {
    /// Read the query from a file
    #[arg(short, long, conflicts_with = "query")]
    pub file: Option<PathBuf>,
    /// The query
    pub query: Option<String>,
}

pub(crate) struct Cli {
    pub(crate) client: Client,
}

pub(crate) fn run(args: Args) -> anyhow::Result<()> {
    if let Command::Version = args.command {
        println!("slicingdice {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let profile = if let Some(name) = args.global.profile.as_deref() {
        Profile::from_env(name)
    } else {
        Profile::from_default_env()
    };

    let mut profile = profile?.with_ua_product("slicingdice-cli");
    if let Some(secs) = args.global.timeout {
        if secs == 0 {
            bail!("Invalid timeout value: {secs}");
        }

        profile = profile.with_timeout(time::Duration::from_secs(secs));
    }

    if args.global.insecure {
        profile = profile.with_verify_tls(false);
    }

    debug!(profile = %profile.name, endpoint = %profile.api_endpoint, "cli invocation");
    let cli = Cli {
        client: Client::new(profile)?,
    };

    let body = with_rt(cli.dispatch(args.command))??;
    println!("{body}");

    parse_response(&body)?;
    Ok(())
}

fn with_rt<T, F: Future<Output = T>>(f: F) -> anyhow::Result<T> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    Ok(rt.block_on(f))
}

fn read_input(file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut text = String::new();
            stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

impl Cli {
    async fn dispatch(&self, command: Command) -> anyhow::Result<String> {
        let client = &self.client;
        let body = match command {
            Command::Version => unreachable!(),
            Command::Database => client.get_database().await?,
            Command::Columns => client.get_columns().await?,
            Command::CreateColumn(args) => client.create_column(&args.read()?).await?,
            Command::Insert(args) => client.insert(&args.read()?).await?,
            Command::CountEntity(args) => client.count_entity(&args.read()?).await?,
            Command::CountEntityTotal(args) => {
                let dimensions: Vec<&str> = args.dimensions.iter().map(String::as_str).collect();
                let dimensions = (!dimensions.is_empty()).then_some(dimensions.as_slice());
                client.count_entity_total(dimensions).await?
            }
            Command::CountEvent(args) => client.count_event(&args.read()?).await?,
            Command::Aggregation(args) => client.aggregation(&args.read()?).await?,
            Command::TopValues(args) => client.top_values(&args.read()?).await?,
            Command::ExistsEntity(args) => {
                let ids: Vec<&str> = args.ids.iter().map(String::as_str).collect();
                client
                    .exists_entity(&ids, args.dimension.as_deref())
                    .await?
            }
            Command::Saved(args) => saved::handle(self, args).await?,
            Command::Result(args) => client.result(&args.read()?).await?,
            Command::Score(args) => client.score(&args.read()?).await?,
            Command::Sql(args) => {
                let query = match args.query {
                    Some(q) => q,
                    None => read_input(args.file.as_ref())?,
                };
                client.sql(query.trim()).await?
            }
        };

        Ok(body)
    }
}
