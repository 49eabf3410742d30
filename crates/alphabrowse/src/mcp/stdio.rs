use crate::backend::BrowseBackend;
use crate::prelude::*;
use crate::service::BrowseService;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub async fn run_stdio<B: BrowseBackend>(service: Arc<BrowseService<B>>) -> Result<()> {
    log::info!("Starting MCP server with stdio transport");

    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        log::debug!("Received: {trimmed}");

        let response = super::handle_request(trimmed, service.as_ref()).await;
        let response_json = serde_json::to_string(&response)?;

        log::debug!("Sending: {response_json}");

        stdout.write_all(response_json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
