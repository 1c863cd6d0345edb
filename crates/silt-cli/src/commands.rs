use std::io::Read;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use silt_vfs::{
    ChangeKind, ConflictResolution, FsBackend, GitHubOptions, GitHubRemote, GitLabOptions,
    GitLabRemote, PushRequest, RemoteAdapter, StorageBackend, Vfs,
};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init => cmd_init(&cli.root),
        Command::Status => cmd_status(&cli.root),
        Command::Ls => cmd_ls(&cli.root),
        Command::Cat(args) => cmd_cat(&cli.root, args),
        Command::Write(args) => cmd_write(&cli.root, args),
        Command::Rm(args) => cmd_rm(&cli.root, args),
        Command::Mv(args) => cmd_mv(&cli.root, args),
        Command::Pull(args) => cmd_pull(&cli.root, args).await,
        Command::Push(args) => cmd_push(&cli.root, args).await,
        Command::Resolve(args) => cmd_resolve(&cli.root, args),
    }
}

fn open_vfs(root: &str) -> anyhow::Result<Vfs> {
    let backend = Arc::new(FsBackend::create(root)) as Arc<dyn StorageBackend>;
    let mut vfs = Vfs::new(backend);
    vfs.init().with_context(|| format!("opening storage root {root}"))?;
    Ok(vfs)
}

fn open_vfs_with_remote(root: &str, remote: &RemoteArgs) -> anyhow::Result<Vfs> {
    let adapter = build_remote(remote)?;
    let backend = Arc::new(FsBackend::create(root)) as Arc<dyn StorageBackend>;
    let mut vfs = Vfs::new(backend).with_remote(adapter);
    vfs.init().with_context(|| format!("opening storage root {root}"))?;
    Ok(vfs)
}

fn build_remote(args: &RemoteArgs) -> anyhow::Result<Arc<dyn RemoteAdapter>> {
    match args.provider {
        Provider::Github => {
            let (Some(owner), Some(repo)) = (args.owner.clone(), args.repo.clone()) else {
                bail!("github remotes need --owner and --repo");
            };
            let remote = GitHubRemote::new(GitHubOptions {
                owner,
                repo,
                token: args.token.clone(),
                branch: args.branch.clone(),
            })?;
            Ok(Arc::new(remote))
        }
        Provider::Gitlab => {
            let Some(project_id) = args.project_id.clone() else {
                bail!("gitlab remotes need --project-id");
            };
            let remote = GitLabRemote::new(GitLabOptions {
                project_id,
                token: args.token.clone(),
                host: args.host.clone(),
                branch: args.branch.clone(),
            })?;
            Ok(Arc::new(remote))
        }
    }
}

fn cmd_init(root: &str) -> anyhow::Result<()> {
    let vfs = open_vfs(root)?;
    println!("{} Initialized silt root in {}", "✓".green().bold(), root.bold());
    if !vfs.head().is_empty() {
        println!("  Head: {}", vfs.head().yellow());
    }
    Ok(())
}

fn cmd_status(root: &str) -> anyhow::Result<()> {
    let vfs = open_vfs(root)?;
    let head = if vfs.head().is_empty() { "(none)".to_string() } else { vfs.head().to_string() };
    println!("Head: {}", head.yellow());

    let conflicts = vfs.conflict_paths();
    for path in &conflicts {
        println!("  {} {}", "conflict:".red().bold(), path);
    }

    let changes = vfs.change_set();
    if changes.is_empty() && conflicts.is_empty() {
        println!("\nWorkspace clean.");
        return Ok(());
    }
    for change in &changes {
        let tag = match change.kind {
            ChangeKind::Create => "create:".green(),
            ChangeKind::Update => "update:".cyan(),
            ChangeKind::Delete => "delete:".red(),
        };
        println!("  {tag} {}", change.path);
    }
    Ok(())
}

fn cmd_ls(root: &str) -> anyhow::Result<()> {
    let vfs = open_vfs(root)?;
    for path in vfs.list_paths() {
        println!("{path}");
    }
    Ok(())
}

fn cmd_cat(root: &str, args: CatArgs) -> anyhow::Result<()> {
    let vfs = open_vfs(root)?;
    match vfs.read_file(&args.path)? {
        Some(content) => {
            print!("{content}");
            Ok(())
        }
        None => bail!("no such file: {}", args.path),
    }
}

fn cmd_write(root: &str, args: WriteArgs) -> anyhow::Result<()> {
    let content = match args.content {
        Some(content) => content,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer).context("reading stdin")?;
            buffer
        }
    };
    let mut vfs = open_vfs(root)?;
    vfs.write_file(&args.path, &content)?;
    println!("  {} {}", "wrote:".green(), args.path);
    Ok(())
}

fn cmd_rm(root: &str, args: RmArgs) -> anyhow::Result<()> {
    let mut vfs = open_vfs(root)?;
    vfs.delete_file(&args.path)?;
    println!("  {} {}", "deleted:".red(), args.path);
    Ok(())
}

fn cmd_mv(root: &str, args: MvArgs) -> anyhow::Result<()> {
    let mut vfs = open_vfs(root)?;
    vfs.rename(&args.from, &args.to)?;
    println!("  {} {} -> {}", "renamed:".cyan(), args.from, args.to);
    Ok(())
}

async fn cmd_pull(root: &str, args: RemoteArgs) -> anyhow::Result<()> {
    let mut vfs = open_vfs_with_remote(root, &args)?;
    let outcome = vfs.pull().await?;
    println!(
        "{} Pulled {} ({} path(s) fetched)",
        "✓".green().bold(),
        outcome.head.yellow(),
        outcome.fetched_paths.len()
    );
    for conflict in &outcome.conflicts {
        println!("  {} {}", "conflict:".red().bold(), conflict.path);
    }
    if !outcome.conflicts.is_empty() {
        println!("Resolve with `silt resolve <path> [--take-remote]` before pushing.");
    }
    Ok(())
}

async fn cmd_push(root: &str, args: PushArgs) -> anyhow::Result<()> {
    let mut vfs = open_vfs_with_remote(root, &args.remote)?;
    let parent = vfs.head().to_string();
    let outcome = vfs.push(PushRequest::new(args.message, parent)).await?;
    if outcome.noop {
        println!("Nothing to push.");
    } else {
        println!("{} Pushed {}", "✓".green().bold(), outcome.commit_sha.yellow());
    }
    Ok(())
}

fn cmd_resolve(root: &str, args: ResolveArgs) -> anyhow::Result<()> {
    let mut vfs = open_vfs(root)?;
    let resolution = if args.take_remote {
        ConflictResolution::TakeRemote
    } else {
        ConflictResolution::KeepWorkspace
    };
    vfs.resolve_conflict(&args.path, resolution)?;
    println!("  {} {}", "resolved:".green(), args.path);
    Ok(())
}
