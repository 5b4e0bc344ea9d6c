use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use nvx::config::Settings;
use nvx::local;
use nvx::version::catalog::VersionCatalog;
use nvx::version::resolver::VersionResolver;
use nvx::version::spec::SpecParser;
use nvx::version::types::VersionEntry;

#[derive(Parser)]
#[command(name = "nvx")]
#[command(version, about = "Download, cache, and switch between Node.js runtimes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List installed versions, optionally narrowed by a specifier
    Ls { filter: Option<String> },
    /// List versions available from a remote
    LsRemote { remote: Option<String> },
    /// Resolve a version specifier to one concrete version
    Resolve { spec: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Arc::new(Settings::load()?);
    nvx::log::init(&settings)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli, settings))
}

async fn run(cli: Cli, settings: Arc<Settings>) -> anyhow::Result<()> {
    let resolver = VersionResolver::new();
    match cli.command {
        Command::Ls { filter } => {
            let entries = local::entries(&settings);
            let entries = match filter {
                Some(spec) => {
                    let filter = SpecParser::new(&settings).parse(&spec, false)?;
                    resolver.list(&filter, &entries)
                }
                None => entries,
            };
            print_listing(&entries);
        }
        Command::LsRemote { remote } => {
            let remote = remote
                .or_else(|| settings.default_remote().map(str::to_string))
                .context("no default remote configured")?;
            let state = local::scan(&settings);
            let catalog = VersionCatalog::new(settings.clone());
            let entries = catalog.remote_versions(&remote, &state).await?;
            print_listing(&entries);
        }
        Command::Resolve { spec } => {
            let filter = SpecParser::new(&settings).parse(&spec, false)?;
            let candidates = match &filter.remote_name {
                Some(remote) => {
                    let state = local::scan(&settings);
                    let catalog = VersionCatalog::new(settings.clone());
                    catalog.remote_versions(remote, &state).await?
                }
                None => local::entries(&settings),
            };
            match resolver.find(&filter, &candidates) {
                Some(found) => println!("{}", found.ident),
                None => anyhow::bail!("no version matching {filter}"),
            }
        }
    }
    Ok(())
}

fn print_listing(entries: &[VersionEntry]) {
    for entry in entries {
        let mark = if entry.current {
            '>'
        } else if entry.default {
            '#'
        } else if entry.local {
            '*'
        } else {
            ' '
        };
        match &entry.label {
            Some(label) => println!("{mark} {} ({label})", entry.ident),
            None => println!("{mark} {}", entry.ident),
        }
    }
}
