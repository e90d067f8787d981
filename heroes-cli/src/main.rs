//! hero-desk: terminal front end for the heroes collection.
//!
//! Runs one command against the remote collection, prints the result, then
//! prints the notification log.
//!
//! Usage:
//!   hero-desk --base-url http://localhost:8080/api/heroes list
//!   hero-desk add "Dr Nice"
//!   hero-desk live            # one search term per stdin line

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use heroes_client::{ClientConfig, HeroClient, MessageLog};
use heroes_model::{Hero, HeroDraft, HeroId};
use heroes_search::{SearchConfig, SearchPipeline};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "hero-desk")]
#[command(about = "Browse and edit the heroes collection")]
struct Args {
    /// Base URL of the heroes collection
    #[arg(long, default_value = "http://localhost:8080/api/heroes")]
    base_url: String,

    /// Name used as the prefix of every message
    #[arg(long, default_value = "HeroService")]
    service_name: String,

    /// Per-request timeout in milliseconds (none by default)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Quiet window before a live search term is used
    #[arg(long, default_value = "300")]
    debounce_ms: u64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every hero
    List,
    /// Show one hero
    Get { id: HeroId },
    /// Create a hero
    Add { name: String },
    /// Change a hero's name
    Rename { id: HeroId, name: String },
    /// Delete a hero
    Delete { id: HeroId },
    /// Search heroes by name
    Search { term: String },
    /// Live search: each stdin line is a keystroke-level term
    Live {
        /// How long to wait for results after stdin closes
        #[arg(long, default_value = "2000")]
        settle_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = ClientConfig {
        base_url: args.base_url,
        service_name: args.service_name,
        timeout_ms: args.timeout_ms,
        ..Default::default()
    };
    let log = Arc::new(MessageLog::with_capacity(config.log_capacity));
    let client = HeroClient::new(config, log.clone()).context("failed to build client")?;
    debug!("Using collection at {}", client.config().collection_url());

    match args.command {
        Command::List => print_heroes(&client.list().await),
        Command::Get { id } => match client.get(id).await {
            Some(hero) => print_hero(&hero),
            None => println!("No hero with id {id}"),
        },
        Command::Add { name } => {
            let draft = HeroDraft::new(&name).context("cannot add hero")?;
            if let Some(hero) = client.create(&draft).await {
                print_hero(&hero);
            }
        }
        Command::Rename { id, name } => match client.get(id).await {
            Some(hero) => {
                let renamed = hero.renamed(&name).context("cannot rename hero")?;
                client.update(&renamed).await;
            }
            None => println!("No hero with id {id}"),
        },
        Command::Delete { id } => {
            client.delete(id).await;
        }
        Command::Search { term } => print_heroes(&client.search(&term).await),
        Command::Live { settle_ms } => {
            let search = SearchConfig {
                debounce_ms: args.debounce_ms,
                ..Default::default()
            };
            live_search(client, search, Duration::from_millis(settle_ms)).await?;
        }
    }

    print_messages(&log);
    Ok(())
}

async fn live_search(client: HeroClient, config: SearchConfig, settle: Duration) -> Result<()> {
    let quiet = config.debounce();
    let pipeline = SearchPipeline::spawn(Arc::new(client), config);
    let mut results = pipeline.subscribe();

    let printer = tokio::spawn(async move {
        while let Some(batch) = results.next().await {
            print_heroes(&batch);
        }
    });

    info!("Reading search terms from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        pipeline.push(line);
    }

    tokio::time::sleep(quiet + settle).await;
    drop(pipeline);
    printer.abort();
    Ok(())
}

fn print_hero(hero: &Hero) {
    println!("{:>4}  {}", hero.id, hero.name);
}

fn print_heroes(heroes: &[Hero]) {
    if heroes.is_empty() {
        println!("(no heroes)");
        return;
    }
    for hero in heroes {
        print_hero(hero);
    }
}

fn print_messages(log: &MessageLog) {
    let notifications = log.notifications();
    if notifications.is_empty() {
        return;
    }
    println!();
    println!("Messages");
    for n in notifications {
        println!("  {}  {}", n.at.format("%H:%M:%S%.3f"), n.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_rename_with_typed_id() {
        let args = Args::try_parse_from(["hero-desk", "rename", "12", "Narco"]).unwrap();
        match args.command {
            Command::Rename { id, name } => {
                assert_eq!(id, HeroId::new(12));
                assert_eq!(name, "Narco");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(args.base_url, "http://localhost:8080/api/heroes");
        assert_eq!(args.timeout_ms, None);
    }

    #[test]
    fn rejects_non_numeric_id() {
        assert!(Args::try_parse_from(["hero-desk", "delete", "seven"]).is_err());
    }
}
