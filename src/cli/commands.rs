use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use tokio::io::AsyncWriteExt;

use super::args::{normalize_folder, normalize_remote, OutputFormat};
use crate::rest::{FileEntry, FileKind, UpyunClient};

/// Format bytes as human-readable string (e.g., "1.50 MB")
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f64 = bytes as f64;
    let exponent = (bytes_f64.ln() / 1024_f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);

    let value = bytes_f64 / 1024_f64.powi(exponent as i32);

    if exponent == 0 {
        format!("{} {}", bytes, UNITS[exponent])
    } else {
        format!("{:.2} {}", value, UNITS[exponent])
    }
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// One `ls` output line
pub fn format_entry(entry: &FileEntry) -> String {
    let size = match entry.kind {
        FileKind::Folder => "DIR".to_string(),
        FileKind::File => format_bytes(entry.size),
    };
    let suffix = if entry.is_folder() { "/" } else { "" };
    format!(
        "[{}] {:>10}  {}{}",
        format_time(entry.last_modified),
        size,
        entry.name,
        suffix
    )
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Upload command
pub async fn cmd_put(client: &UpyunClient, local: &str, remote: &str) -> Result<()> {
    let remote = normalize_remote(remote);
    client
        .upload_file(local, &remote)
        .await
        .with_context(|| format!("Failed to upload {} to {}", local, remote))?;

    tracing::info!(local, remote = %remote, "Upload complete");
    println!("Uploaded: {} -> {}", local, remote);
    Ok(())
}

/// Stream `remote` into a new local file; the file is removed again if the
/// download fails
async fn download_to_file(client: &UpyunClient, remote: &str, local: &str) -> Result<u64> {
    let mut file = tokio::fs::File::create(local)
        .await
        .with_context(|| format!("Failed to create {}", local))?;

    let result = async {
        let written = client.download_to(remote, &mut file).await?;
        file.flush().await?;
        Ok::<_, crate::rest::UpyunError>(written)
    }
    .await;

    match result {
        Ok(written) => Ok(written),
        Err(e) => {
            drop(file);
            if let Err(remove_err) = tokio::fs::remove_file(local).await {
                tracing::warn!(local, error = %remove_err, "Failed to remove partial download");
            }
            Err(e).with_context(|| format!("Failed to download {}", remote))
        }
    }
}

/// Download command; streams to a file or stdout
pub async fn cmd_get(client: &UpyunClient, remote: &str, local: Option<&str>) -> Result<()> {
    let remote = normalize_remote(remote);

    match local {
        Some(local) => {
            let written = download_to_file(client, &remote, local).await?;

            tracing::info!(remote = %remote, local, bytes = written, "Download complete");
            eprintln!("Downloaded: {} -> {} ({})", remote, local, format_bytes(written));
        }
        None => {
            let mut stdout = tokio::io::stdout();
            client
                .download_to(&remote, &mut stdout)
                .await
                .with_context(|| format!("Failed to download {}", remote))?;
            stdout.flush().await?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct StatOutput<'a> {
    path: &'a str,
    status: u16,
    exists: bool,
    #[serde(flatten)]
    info: &'a crate::rest::FileInfo,
}

/// Stat command
pub async fn cmd_stat(client: &UpyunClient, remote: &str, format: OutputFormat) -> Result<()> {
    let remote = normalize_remote(remote);
    let stat = client.stat(&remote).await?;

    match format {
        OutputFormat::Json => print_json(&StatOutput {
            path: &remote,
            status: stat.status.as_u16(),
            exists: stat.exists(),
            info: &stat.info,
        })?,
        OutputFormat::Text => {
            if !stat.exists() {
                anyhow::bail!("Not found: {} ({})", remote, stat.status);
            }
            println!("Path: {}", remote);
            println!("Type: {}", stat.info.kind.as_str());
            println!("Size: {} ({})", format_bytes(stat.info.size), stat.info.size);
            println!("Last Modified: {}", format_time(stat.info.last_modified));
        }
    }

    Ok(())
}

/// Delete file command
pub async fn cmd_rm(client: &UpyunClient, remote: &str) -> Result<()> {
    let remote = normalize_remote(remote);
    client
        .delete_file(&remote)
        .await
        .with_context(|| format!("Failed to delete {}", remote))?;
    println!("Removed: {}", remote);
    Ok(())
}

/// Create folder command
pub async fn cmd_mkdir(client: &UpyunClient, remote: &str) -> Result<()> {
    let remote = normalize_folder(remote);
    client
        .create_folder(&remote)
        .await
        .with_context(|| format!("Failed to create folder {}", remote))?;
    println!("Folder created: {}", remote);
    Ok(())
}

/// Delete folder command
pub async fn cmd_rmdir(client: &UpyunClient, remote: &str) -> Result<()> {
    let remote = normalize_folder(remote);
    client
        .delete_folder(&remote)
        .await
        .with_context(|| format!("Failed to delete folder {}", remote))?;
    println!("Folder removed: {}", remote);
    Ok(())
}

/// List folder command
pub async fn cmd_ls(client: &UpyunClient, remote: &str, format: OutputFormat) -> Result<()> {
    let remote = normalize_folder(remote);
    let entries = client
        .list_folder(&remote)
        .await
        .with_context(|| format!("Failed to list {}", remote))?;

    match format {
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Text => {
            let stdout = std::io::stdout();
            let mut out = std::io::BufWriter::new(stdout.lock());
            for entry in &entries {
                writeln!(out, "{}", format_entry(entry))?;
            }
            out.flush()?;
        }
    }

    Ok(())
}

/// Bucket usage command
pub async fn cmd_usage(client: &UpyunClient, format: OutputFormat) -> Result<()> {
    let used = client.usage().await.context("Failed to query bucket usage")?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "bucket": client.bucket(),
            "usage": used,
        }))?,
        OutputFormat::Text => {
            println!("Bucket: {}", client.bucket());
            println!("Usage: {} ({})", format_bytes(used), used);
        }
    }

    Ok(())
}
