mod cli;
mod commands;
mod comments;
mod editor;
mod error;
mod format;
mod github;
mod remote;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let repo = match &cli.repo {
        Some(slug) => remote::RemoteRepo::from_slug(slug)?.full_name(),
        None => remote::detect()?.full_name(),
    };
    let client = github::Client::new()?;

    match cli.command {
        Commands::View { pr, file, line } => {
            commands::view(&client, &repo, pr, file, line).await?;
        }
        Commands::Comment {
            pr,
            file,
            line,
            comment_text,
        } => {
            commands::comment(&client, &repo, pr, file, line, comment_text).await?;
        }
        Commands::Edit {
            pr,
            file,
            line,
            comment_text,
        } => {
            commands::edit(&client, &repo, pr, file, line, comment_text).await?;
        }
        Commands::Approve { pr, comment_text } => {
            commands::approve(&client, &repo, pr, comment_text).await?;
        }
    }

    Ok(())
}
