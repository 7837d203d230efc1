use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lgtm", about = "View, write and reply to GitHub PR review comments")]
pub struct Cli {
    /// Repository in owner/repo format (detected from the origin remote by default)
    #[arg(short, long, global = true)]
    pub repo: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the comment threads in a scope: the PR, a file, or a line range
    View {
        /// PR number
        #[arg(short, long)]
        pr: u64,
        /// Path of a file in the PR
        #[arg(short, long)]
        file: Option<String>,
        /// Line or line range (N, N-M or N:M); requires --file
        #[arg(short, long)]
        line: Option<String>,
    },
    /// Comment on the PR, a file, or a line range
    Comment {
        /// PR number
        #[arg(short, long)]
        pr: u64,
        /// Path of a file in the PR
        #[arg(short, long)]
        file: Option<String>,
        /// Line or line range (N, N-M or N:M); requires --file
        #[arg(short, long)]
        line: Option<String>,
        /// Comment body; opens $EDITOR when omitted
        #[arg(short = 'm', long)]
        comment_text: Option<String>,
    },
    /// Edit the latest comment in a scope
    Edit {
        /// PR number
        #[arg(short, long)]
        pr: u64,
        /// Path of a file in the PR
        #[arg(short, long)]
        file: Option<String>,
        /// Line or line range (N, N-M or N:M); requires --file
        #[arg(short, long)]
        line: Option<String>,
        /// Replacement body; opens $EDITOR on the current body when omitted
        #[arg(short = 'm', long)]
        comment_text: Option<String>,
    },
    /// Approve the PR, optionally with a comment
    Approve {
        /// PR number
        #[arg(short, long)]
        pr: u64,
        /// Review body to attach to the approval
        #[arg(short = 'm', long)]
        comment_text: Option<String>,
    },
}
