use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "silt",
    about = "A local workspace with Git-like sync to GitHub or GitLab",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Storage root directory.
    #[arg(long, global = true, default_value = ".silt")]
    pub root: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a storage root
    Init,
    /// Show head, pending changes, and conflicts
    Status,
    /// List visible paths
    Ls,
    /// Print a file's effective content
    Cat(CatArgs),
    /// Write a file (content from argument or stdin)
    Write(WriteArgs),
    /// Delete a file
    Rm(RmArgs),
    /// Rename a file
    Mv(MvArgs),
    /// Fetch the remote branch and reconcile
    Pull(RemoteArgs),
    /// Push accumulated changes as one commit
    Push(PushArgs),
    /// Settle a conflicted path
    Resolve(ResolveArgs),
}

#[derive(Args)]
pub struct CatArgs {
    pub path: String,
}

#[derive(Args)]
pub struct WriteArgs {
    pub path: String,
    /// Content; read from stdin when omitted.
    pub content: Option<String>,
}

#[derive(Args)]
pub struct RmArgs {
    pub path: String,
}

#[derive(Args)]
pub struct MvArgs {
    pub from: String,
    pub to: String,
}

#[derive(Args)]
pub struct PushArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Commit message.
    #[arg(short, long)]
    pub message: String,
}

#[derive(Args)]
pub struct ResolveArgs {
    pub path: String,

    /// Discard the local side and accept the remote bytes.
    #[arg(long)]
    pub take_remote: bool,
}

#[derive(Args, Clone)]
pub struct RemoteArgs {
    /// Hosting provider.
    #[arg(long, value_enum)]
    pub provider: Provider,

    /// Access token; falls back to $SILT_TOKEN.
    #[arg(long, env = "SILT_TOKEN")]
    pub token: String,

    /// Branch to track.
    #[arg(long)]
    pub branch: Option<String>,

    /// GitHub: repository owner.
    #[arg(long)]
    pub owner: Option<String>,

    /// GitHub: repository name.
    #[arg(long)]
    pub repo: Option<String>,

    /// GitLab: path-with-namespace, e.g. group/project.
    #[arg(long)]
    pub project_id: Option<String>,

    /// GitLab: host, e.g. https://gitlab.example.com.
    #[arg(long)]
    pub host: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum Provider {
    Github,
    Gitlab,
}
