use anyhow::Context;
use clap::Parser;

use fakebook_crawler::config::Config;
use fakebook_crawler::crawl::{CrawlSession, Crawler, RegexExtractor};
use fakebook_crawler::http::client::HttpClient;

/// Log into Fakebook and collect its secret flags
#[derive(Parser, Debug)]
#[command(name = "fakebook-crawler", version, long_about = None)]
struct Cli {
    /// Account username
    username: String,

    /// Account password
    password: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.tracing_level())
        .with_writer(std::io::stderr)
        .init();

    let extractor = RegexExtractor::new(&cfg.site.host, &cfg.site.link_prefix)
        .context("building extraction patterns")?;
    let client = HttpClient::connect(cfg.site.clone())
        .await
        .context("connecting to site")?;

    let mut session = CrawlSession::new(cfg.crawl.flag_target);
    let mut crawler = Crawler::new(client, extractor, &cfg);

    crawler
        .login(&mut session, &cli.username, &cli.password)
        .await
        .context("login failed")?;

    let summary = crawler.run(&mut session).await.context("crawl failed")?;

    let mut client = crawler.into_transport();
    if let Err(e) = client.shutdown().await {
        tracing::warn!(error = %e, "Failed to close connection");
    }

    for flag in &summary.flags {
        println!("{}", flag);
    }

    Ok(())
}
