use crate::cli::{Cli, PayloadArgs};

#[derive(Debug, clap::Args)]
pub(crate) struct SavedArgs {
    #[command(subcommand)]
    pub command: SavedCommand,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum SavedCommand {
    /// List all saved queries
    List,
    /// Run a saved query
    Get(SavedNameArgs),
    /// Create a saved query
    Create(PayloadArgs),
    /// Update a saved query
    Update(SavedUpdateArgs),
    /// Delete a saved query
    Delete(SavedNameArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct SavedNameArgs {
    /// Saved query name
    pub name: String,
}

#[derive(Debug, clap::Args)]
pub(crate) struct SavedUpdateArgs {
    /// Saved query name
    pub name: String,
    #[command(flatten)]
    pub payload: PayloadArgs,
}

pub(crate) async fn handle(cli: &Cli, args: SavedArgs) -> anyhow::Result<String> {
    let client = &cli.client;
    let body = match args.command {
        SavedCommand::List => client.get_saved_queries().await?,
        SavedCommand::Get(args) => client.get_saved_query(&args.name).await?,
        SavedCommand::Create(args) => client.create_saved_query(&args.read()?).await?,
        SavedCommand::Update(args) => {
            client
                .update_saved_query(&args.name, &args.payload.read()?)
                .await?
        }
        SavedCommand::Delete(args) => client.delete_saved_query(&args.name).await?,
    };

    Ok(body)
}
