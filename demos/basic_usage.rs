//! Basic usage example for the UpYun client
//!
//! Reads credentials from `UPYUN_OPERATOR`, `UPYUN_PASSWORD` and
//! `UPYUN_BUCKET` (a `.env` file works too), then walks through every
//! storage operation against a scratch folder.
//!
//! Run with:
//! ```
//! cargo run --example basic_usage
//! ```

use upyun::config;
use upyun::rest::{HttpTransport, UpyunError};
use upyun::UpyunClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load_from_env()?;
    let profile = config
        .get_profile(None)
        .ok_or_else(|| anyhow::anyhow!("no profile configured"))?;

    let transport = HttpTransport::new()?.with_timeout(config.timeout());
    let client = UpyunClient::from_profile(profile, transport);

    println!("UpYun - Basic Usage Example");
    println!("===========================\n");
    println!("Bucket: {} via {}\n", client.bucket(), client.endpoint());

    // 1. Folder
    println!("1. Creating folder...");
    client.create_folder("/demo/").await?;
    println!("   ✓ /demo/ created\n");

    // 2. Upload from memory
    println!("2. Uploading from a buffer...");
    client.upload_bytes(&b"Hello, UpYun!"[..], "/demo/hello.txt").await?;
    println!("   ✓ /demo/hello.txt uploaded\n");

    // 3. Stat
    println!("3. Getting file info...");
    let stat = client.stat("/demo/hello.txt").await?;
    println!("   ✓ status {} type {} size {}", stat.status, stat.info.kind.as_str(), stat.info.size);
    if let Some(at) = stat.info.last_modified {
        println!("     Last modified: {}", at);
    }
    println!();

    // 4. Download into memory
    println!("4. Downloading...");
    let data = client.download("/demo/hello.txt").await?;
    println!("   ✓ {}\n", String::from_utf8_lossy(&data));

    // 5. Stream into any AsyncWrite
    println!("5. Streaming download...");
    let mut sink = Vec::new();
    let written = client.download_to("/demo/hello.txt", &mut sink).await?;
    println!("   ✓ {} bytes streamed\n", written);

    // 6. List
    println!("6. Listing /demo/...");
    for entry in client.list_folder("/demo/").await? {
        println!("   - {} ({}, {} bytes)", entry.name, entry.kind.as_str(), entry.size);
    }
    println!();

    // 7. Usage
    println!("7. Bucket usage...");
    println!("   ✓ {} bytes\n", client.usage().await?);

    // 8. Cleanup
    println!("8. Cleaning up...");
    client.delete_file("/demo/hello.txt").await?;
    client.delete_folder("/demo/").await?;
    println!("   ✓ removed\n");

    // 9. Errors carry the HTTP status
    println!("9. Downloading a deleted file...");
    match client.download("/demo/hello.txt").await {
        Err(UpyunError::Api { status, message }) => {
            println!("   ✓ rejected with {}: {}", status, message.trim())
        }
        Err(e) => println!("   ✗ unexpected error: {}", e),
        Ok(_) => println!("   ✗ file still exists"),
    }

    Ok(())
}
