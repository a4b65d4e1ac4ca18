//! Command-line interface

use anyhow::Result;
use clap::{Parser, Subcommand};
use fedengine::{Aggregator, Region, SearchRequest, SourceFilter};
use serde_json::{Value, json};

#[derive(Parser, Debug)]
#[command(name = "fedmusic")]
#[command(about = "Federated search over public music providers")]
#[command(version)]
pub struct Cli {
    /// Configuration directory (defaults to FEDMUSIC_CONFIG, ./.fedmusic or ~/.fedmusic)
    #[arg(short, long, env = "FEDMUSIC_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search every source, or one with --source
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = fedengine::DEFAULT_PAGE_SIZE)]
        page_size: u32,
        /// Language token, `all` disables the filter
        #[arg(long, default_value = "all")]
        language: String,
        #[arg(long, default_value = "all")]
        source: String,
    },
    /// Trending tracks for a region (global or local)
    Trending {
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value = "global")]
        region: Region,
    },
    /// Trending tracks from a single source
    TrendingSource {
        source: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Probe every source
    Health,
    /// Registered sources, circuit and cache state
    Sources,
}

/// Runs `command` and returns its JSON output
pub async fn run(engine: &Aggregator, command: Command) -> Result<Value> {
    let output = match command {
        Command::Search {
            query,
            page,
            page_size,
            language,
            source,
        } => {
            let request = SearchRequest::new(query)
                .page(page)
                .page_size(page_size)
                .language(language)
                .source(SourceFilter::parse(&source));
            let tracks = engine.search(&request).await?;
            json!({
                "query": request.query,
                "page": request.page,
                "pageSize": request.page_size,
                "source": request.source.to_string(),
                "hasMore": tracks.len() == request.page_size as usize,
                "tracks": tracks,
            })
        }
        Command::Trending { limit, region } => {
            let tracks = engine.trending(limit, region).await?;
            json!({ "region": region, "tracks": tracks })
        }
        Command::TrendingSource { source, limit } => {
            let filter = SourceFilter::parse(&source);
            let tracks = engine.trending_by_source(filter, limit).await?;
            json!({ "source": filter.to_string(), "tracks": tracks })
        }
        Command::Health => serde_json::to_value(engine.check_health().await)?,
        Command::Sources => serde_json::to_value(engine.status())?,
    };
    Ok(output)
}
