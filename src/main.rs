use clap::Parser;
use clubdesk::adapters::{HttpRelayMailer, HttpSheetSource, JsonFileMessageStore};
use clubdesk::config::cli::{CliArgs, CliCommand};
use clubdesk::core::aggregate;
use clubdesk::core::broadcast::Broadcaster;
use clubdesk::core::snapshot::SnapshotStore;
use clubdesk::domain::model::TargetSelector;
use clubdesk::domain::ports::MessageStore;
use clubdesk::utils::{logger, validation::Validate};
use clubdesk::AppConfig;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    logger::init_cli_logger(args.verbose);

    let config = AppConfig::from_file(&args.config)?;
    config.validate()?;

    let source = HttpSheetSource::new(
        config.sources.responses_url.clone(),
        config.sources.roster_url.clone(),
        config.fetch_timeout(),
    )?;
    let snapshots = Arc::new(SnapshotStore::new(source, config.ttl()));

    match args.command {
        CliCommand::Aggregates => {
            let snapshot = snapshots.get().await?;
            let views = aggregate::dashboard(&snapshot);
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        CliCommand::Clubs => {
            let snapshot = snapshots.get().await?;
            for club in &snapshot.clubs {
                println!("{}", club);
            }
        }
        CliCommand::Send {
            text,
            target,
            sent_by,
        } => {
            let boards = config.board_table();
            let selector = TargetSelector::parse(&target, &boards);
            let mailer = HttpRelayMailer::new(config.mail.relay_url.clone(), config.send_timeout())?;
            let messages = JsonFileMessageStore::new(config.messages_path());
            let broadcaster = Broadcaster::new(
                snapshots,
                mailer,
                messages,
                boards,
                config.mail.from.clone(),
                config.send_timeout(),
            );

            let report = broadcaster.send(&text, &selector, &sent_by).await?;
            println!(
                "✅ Message sent to {} recipients ({} delivered)",
                report.recipient_count, report.delivered
            );
            for failure in &report.failures {
                eprintln!("⚠️  {}: {}", failure.email, failure.reason);
            }
        }
        CliCommand::Messages => {
            let store = JsonFileMessageStore::new(config.messages_path());
            for message in store.list().await? {
                println!(
                    "[{}] {} ({}): {}",
                    message.created_at.format("%Y-%m-%d %H:%M"),
                    message.sent_by,
                    message.target,
                    message.text
                );
            }
        }
    }

    Ok(())
}
