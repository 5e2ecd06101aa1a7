use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hubbot::{Bot, BotConfig, Event};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hubbot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BotConfig::parse();
    tracing::debug!(?config, "loaded configuration");

    let bot = Bot::from_config(&config)?;

    bot.register("ready", |event| async move {
        if let Event::Ready { host, port } = event.as_ref() {
            tracing::info!("ready on {host}:{port}");
        }
        Ok::<_, anyhow::Error>(())
    })?;

    bot.register("comment_create", |event| async move {
        if let Event::CommentCreate { comment, .. } = event.as_ref() {
            tracing::info!(
                author = %comment.author().login,
                issue = comment.issue.number,
                repo = %comment.issue.repository.full_name,
                "new comment"
            );
        }
        Ok::<_, anyhow::Error>(())
    })?;

    bot.run().await?;
    Ok(())
}
