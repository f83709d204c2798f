//! CLI `ask` command: run one chat turn without the HTTP server.

use anyhow::{bail, Result};

use rejoinder::config::RejoinderConfig;
use rejoinder::routes::chat;
use rejoinder::server;

/// Answer `message` and print the reply with its source.
///
/// The exchange is only logged when `record` is set.
pub async fn ask(config: RejoinderConfig, message: &str, user_id: &str, record: bool) -> Result<()> {
    if message.trim().is_empty() {
        bail!("message must not be empty");
    }

    let state = server::setup_state(config)?;
    let turn = chat::respond(&state, message, user_id, !record).await?;

    println!("{}", turn.response);
    eprintln!("(source: {})", turn.source.as_str());
    Ok(())
}
