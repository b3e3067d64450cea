use std::sync::Arc;

use forum_store::directory::StaticDirectory;
use forum_store::models::PinScope;
use forum_store::{Config, Repository, Result};

const USAGE: &str =
    "usage: forum-store [--expire-top | --stats | --hot <limit> | --pin <topic-id> <tab|node|homePage> [until]]";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    ExpireTop,
    Stats,
    Hot(u32),
    Pin {
        id: i64,
        scope: PinScope,
        until: String,
    },
    Usage,
}

fn parse_args(args: &[String]) -> Result<Command> {
    let command = match args.get(1).map(String::as_str) {
        Some("--expire-top") => Command::ExpireTop,
        Some("--stats") => Command::Stats,
        Some("--hot") => Command::Hot(
            args.get(2)
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(10),
        ),
        Some("--pin") if args.len() >= 4 => Command::Pin {
            id: args[2]
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid topic id: {}", args[2]))?,
            scope: args[3].parse()?,
            until: args.get(4).cloned().unwrap_or_default(),
        },
        // Missing operands
        Some("--pin") => Command::Usage,
        Some(other) => {
            eprintln!("{}", USAGE);
            return Err(anyhow::anyhow!("Unknown argument: {}", other).into());
        }
        None => Command::Usage,
    };
    Ok(command)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = parse_args(&args)?;

    let config = Config::load()?;

    // Member lookups belong to the web layer; maintenance runs need none.
    let repository = Repository::from_config(&config, Arc::new(StaticDirectory::new())).await?;

    match command {
        Command::ExpireTop => {
            let cleared = repository.expire_top_topics().await?;
            println!("Cleared {} expired pin timers", cleared);
        }
        Command::Stats => {
            println!("Topics (all): {}", repository.get_topic_count().await?);
            println!("Topics (visible): {}", repository.get_topic_num().await?);
            println!(
                "Highest online: {}",
                repository.get_highest_online_num().await?
            );
        }
        Command::Hot(limit) => {
            let topics = repository.get_hot_topics(limit).await?;
            println!("{}", serde_json::to_string_pretty(&topics)?);
        }
        Command::Pin { id, scope, until } => {
            if repository
                .change_topic_top_expired_time(id, &until, scope)
                .await?
            {
                println!("Set {} pin of topic {} to {:?}", scope, id, until);
            } else {
                println!("Topic {} not found", id);
            }
        }
        Command::Usage => {
            eprintln!("{}", USAGE);
        }
    }

    Ok(())
}
