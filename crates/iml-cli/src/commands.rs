use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use iml_chain::{BlockJournal, HashChain, SyncMode};
use iml_server::{ImlServer, ServerConfig};
use serde_json::Value;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Record(args) => cmd_record(&cli.server, &cli.format, args).await,
        Command::Chain(args) => cmd_chain(&cli.server, &cli.format, args).await,
        Command::Verify(args) => cmd_verify(&cli.server, &cli.format, args).await,
        Command::Logs(args) => cmd_logs(&cli.server, &cli.format, args).await,
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(Path::new(path))
            .with_context(|| format!("failed to load config from {path}"))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind}"))?;
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(PathBuf::from(dir));
    }
    let server = ImlServer::new(config)?;
    server.serve().await?;
    Ok(())
}

async fn cmd_record(server: &str, format: &OutputFormat, args: RecordArgs) -> anyhow::Result<()> {
    let body = serde_json::json!({
        "type": args.kind.as_str(),
        "product_id": args.product,
        "amount": args.amount,
    });
    let (status, value) = post_json(server, "/v1/movements", &body).await?;
    if !status.is_success() {
        bail!("{}", server_error(&value, status));
    }
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    println!("{} Movement recorded", "✓".green().bold());
    println!(
        "  {} {} of product {}",
        value["entry"]["type"].as_str().unwrap_or("?"),
        value["entry"]["amount"].as_u64().unwrap_or(0).to_string().bold(),
        value["entry"]["product_id"].as_u64().unwrap_or(0).to_string().bold(),
    );
    println!(
        "  Block: {} {}",
        format!("#{}", value["block"]["index"].as_u64().unwrap_or(0)).yellow(),
        short_hash(value["block"]["hash"].as_str().unwrap_or("")).dimmed(),
    );
    if value["anchored"].as_bool().unwrap_or(false) {
        println!("  Anchor: {}", value["anchor_id"].as_str().unwrap_or("?").cyan());
        if let Some(gateway) = value["gateway_url"].as_str() {
            println!("  Gateway: {}", gateway.blue());
        }
    } else {
        let warning = value["warning"].as_str().unwrap_or("anchoring skipped");
        println!("  Anchor: {} ({})", "none".red(), warning);
    }
    Ok(())
}

async fn cmd_chain(server: &str, format: &OutputFormat, args: ChainArgs) -> anyhow::Result<()> {
    let (status, value) = get_json(server, "/v1/chain").await?;
    if !status.is_success() {
        bail!("{}", server_error(&value, status));
    }
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    let length = value["length"].as_u64().unwrap_or(0);
    let empty = Vec::new();
    let blocks = value["blocks"].as_array().unwrap_or(&empty);
    let shown = blocks.len().min(args.limit);
    if shown < blocks.len() {
        println!("Chain length: {} (showing last {shown})", length.to_string().bold());
    } else {
        println!("Chain length: {}", length.to_string().bold());
    }
    for block in blocks.iter().skip(blocks.len() - shown) {
        render_block(block);
    }
    Ok(())
}

async fn cmd_verify(server: &str, format: &OutputFormat, args: VerifyArgs) -> anyhow::Result<()> {
    let report = match &args.journal {
        Some(path) => verify_journal(Path::new(path))?,
        None => {
            let (status, value) = get_json(server, "/v1/chain/verify").await?;
            if !status.is_success() {
                bail!("{}", server_error(&value, status));
            }
            value
        }
    };
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_verify(&report);
    }
    if !report["valid"].as_bool().unwrap_or(false) {
        bail!("hash chain verification failed");
    }
    Ok(())
}

async fn cmd_logs(server: &str, format: &OutputFormat, args: LogsArgs) -> anyhow::Result<()> {
    let path = match args.product {
        Some(product) => format!("/v1/logs?product_id={product}"),
        None => "/v1/logs".to_string(),
    };
    let (status, value) = get_json(server, &path).await?;
    if !status.is_success() {
        bail!("{}", server_error(&value, status));
    }
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    let count = value["count"].as_u64().unwrap_or(0);
    println!("{} entries", count.to_string().bold());
    let empty = Vec::new();
    for entry in value["entries"].as_array().unwrap_or(&empty) {
        render_entry(entry);
    }
    Ok(())
}

/// Loads and verifies a journal file without going through a server.
/// Produces the same report shape as `GET /v1/chain/verify`.
fn verify_journal(path: &Path) -> anyhow::Result<Value> {
    if !path.exists() {
        bail!("no journal at {}", path.display());
    }
    let journal = BlockJournal::open(path, SyncMode::OsDefault)?;
    let blocks = journal.load()?;
    if blocks.is_empty() {
        bail!("journal at {} holds no blocks", path.display());
    }
    let chain = HashChain::from_blocks(blocks)?;
    let fault = chain.verify().err();
    Ok(serde_json::json!({
        "valid": fault.is_none(),
        "length": chain.len(),
        "first_invalid_index": fault.and_then(|f| f.failing_index()),
        "fault": fault.map(|f| f.to_string()),
    }))
}

fn render_block(block: &Value) {
    let index = block["index"].as_u64().unwrap_or(0);
    let payload = &block["payload"];
    let note = if index == 0 {
        "  (genesis)".dimmed().to_string()
    } else {
        match payload["anchor_id"].as_str() {
            Some(id) => format!("  anchor {id}").cyan().to_string(),
            None => String::new(),
        }
    };
    println!(
        "  {:>6}  {}  {:<6} product {:<8} amount {:<8}{}",
        format!("#{index}").yellow(),
        short_hash(block["hash"].as_str().unwrap_or("")).dimmed(),
        payload["type"].as_str().unwrap_or("?"),
        payload["product_id"].as_u64().unwrap_or(0),
        payload["amount"].as_u64().unwrap_or(0),
        note,
    );
}

fn render_entry(entry: &Value) {
    let anchor = match entry["anchor_id"].as_str() {
        Some(id) => format!("  anchor {id}").cyan().to_string(),
        None => String::new(),
    };
    println!(
        "  {}  {}  {:<6} product {:<8} amount {:<8}{}",
        short_id(entry["id"].as_str().unwrap_or("")).yellow(),
        entry["created_at"].as_str().unwrap_or("?").dimmed(),
        entry["type"].as_str().unwrap_or("?"),
        entry["product_id"].as_u64().unwrap_or(0),
        entry["amount"].as_u64().unwrap_or(0),
        anchor,
    );
}

fn render_verify(report: &Value) {
    let length = report["length"].as_u64().unwrap_or(0);
    if report["valid"].as_bool().unwrap_or(false) {
        println!("{} Hash chain verified", "✓".green().bold());
        println!("  Blocks: {}", length.to_string().bold());
    } else {
        println!("{} Hash chain INVALID", "✗".red().bold());
        println!("  Blocks: {}", length.to_string().bold());
        if let Some(index) = report["first_invalid_index"].as_u64() {
            println!("  First invalid block: {}", format!("#{index}").yellow());
        }
        if let Some(fault) = report["fault"].as_str() {
            println!("  Fault: {}", fault.red());
        }
    }
}

async fn get_json(server: &str, path: &str) -> anyhow::Result<(reqwest::StatusCode, Value)> {
    let url = format!("{}{}", server.trim_end_matches('/'), path);
    tracing::debug!(%url, "GET");
    let response = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?;
    let status = response.status();
    let body = response
        .json()
        .await
        .with_context(|| format!("malformed response from {url}"))?;
    Ok((status, body))
}

async fn post_json(
    server: &str,
    path: &str,
    body: &Value,
) -> anyhow::Result<(reqwest::StatusCode, Value)> {
    let url = format!("{}{}", server.trim_end_matches('/'), path);
    tracing::debug!(%url, "POST");
    let response = reqwest::Client::new()
        .post(&url)
        .json(body)
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?;
    let status = response.status();
    let body = response
        .json()
        .await
        .with_context(|| format!("malformed response from {url}"))?;
    Ok((status, body))
}

fn server_error(value: &Value, status: reqwest::StatusCode) -> String {
    match value.get("error").and_then(Value::as_str) {
        Some(message) => message.to_string(),
        None => format!("server responded with {status}"),
    }
}

fn short_hash(hex: &str) -> &str {
    &hex[..hex.len().min(12)]
}

fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use iml_chain::Block;
    use serde_json::json;

    #[test]
    fn server_error_prefers_body_message() {
        let body = json!({"error": "insufficient stock for product 42"});
        let message = server_error(&body, reqwest::StatusCode::CONFLICT);
        assert_eq!(message, "insufficient stock for product 42");
    }

    #[test]
    fn server_error_falls_back_to_status() {
        let message = server_error(&json!({}), reqwest::StatusCode::BAD_GATEWAY);
        assert!(message.contains("502"));
    }

    #[test]
    fn short_hash_truncates() {
        assert_eq!(short_hash("abcdef0123456789"), "abcdef012345");
        assert_eq!(short_hash("abc"), "abc");
    }

    #[test]
    fn verify_journal_reports_missing_path() {
        let result = verify_journal(Path::new("/nonexistent/chain.journal"));
        assert!(result.is_err());
    }

    #[test]
    fn verify_journal_reads_a_valid_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.journal");
        let journal = BlockJournal::open(&path, SyncMode::OsDefault).unwrap();
        journal.append(&Block::genesis()).unwrap();
        let report = verify_journal(&path).unwrap();
        assert_eq!(report["valid"], json!(true));
        assert_eq!(report["length"], json!(1));
    }

    #[test]
    fn verify_journal_flags_a_broken_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.journal");
        let journal = BlockJournal::open(&path, SyncMode::OsDefault).unwrap();
        journal.append(&Block::genesis()).unwrap();
        journal.append(&Block::genesis()).unwrap();
        let report = verify_journal(&path).unwrap();
        assert_eq!(report["valid"], json!(false));
        assert_eq!(report["first_invalid_index"], json!(1));
    }
}
