use clap::{Parser, Subcommand};
use eyre::Context;
use std::io::IsTerminal;
use std::path::PathBuf;
use tokio_stream::StreamExt;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_dashboard::Config;
use youtube_dashboard::enrich::Enricher;
use youtube_dashboard::youtube_api::YouTubeClient;
use ytdash_sdk::format::compact_number;
use ytdash_sdk::http::HttpPageSource;
use ytdash_sdk::selection::{ChannelSelection, JsonFileStore};
use ytdash_sdk::{EnrichedVideo, FeedView, PageSource, RetryPolicy, VideoFeed};

#[derive(Parser)]
#[command(version, about = "Browse a YouTube channel's videos from the terminal")]
struct Cli {
    /// Channel to show; remembered for next time
    #[arg(short, long, global = true)]
    channel: Option<String>,

    /// Number of pages to load
    #[arg(short, long, default_value_t = 1, global = true)]
    pages: usize,

    /// File the selected channel is remembered in
    #[arg(
        long,
        env = "YTDASH_SELECTION",
        default_value = "ytdash-selection.json",
        global = true
    )]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Page through videos served by a running ytdash-server
    Feed {
        /// Base URL of the dashboard server
        #[arg(long, env = "YTDASH_SERVER", default_value = "http://127.0.0.1:3000")]
        server: String,

        /// Give up on further pages after this many failed attempts in a row
        #[arg(long, default_value_t = 3)]
        max_retries: u32,
    },
    /// Query the YouTube API directly, without a server
    Direct {
        /// YouTube Data API key
        #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
        api_key: String,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::TRACE.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    let cli = Cli::parse();

    let store = JsonFileStore::open(&cli.store).context("open selection store")?;
    let mut selection = ChannelSelection::load(store, "")?;
    if let Some(channel_id) = cli.channel {
        selection.set_channel_id(channel_id)?;
    }
    let channel_id = selection.channel_id().to_string();
    if channel_id.is_empty() {
        eyre::bail!("no channel selected yet; pass --channel");
    }

    let videos = match cli.command {
        Command::Feed {
            server,
            max_retries,
        } => {
            let source = HttpPageSource::new(server)?;
            feed(&source, &channel_id, cli.pages, RetryPolicy::StopAfter(max_retries)).await
        }
        Command::Direct { api_key } => direct(api_key, &channel_id, cli.pages).await?,
    };

    if let Some(title) = videos.iter().find_map(|v| v.snippet.channel_title.as_deref()) {
        selection.set_channel_name(title)?;
    }
    let name = match selection.channel_name() {
        "" => channel_id.as_str(),
        name => name,
    };
    eprintln!("==> {name}");
    for (i, video) in videos.iter().enumerate() {
        print_video(i, video);
    }

    Ok(())
}

/// Loads up to `pages` pages the way a scrolling view would: the next page is requested only
/// after the previous one has arrived.
async fn feed<S: PageSource>(
    source: &S,
    channel_id: &str,
    pages: usize,
    retry_policy: RetryPolicy,
) -> Vec<EnrichedVideo> {
    let mut feed = VideoFeed::new(retry_policy);
    let mut loaded = 0;
    let mut next = feed.select_channel(channel_id);
    while let Some(request) = next.take() {
        let result = source
            .fetch_page(&request.channel_id, request.page_token.as_deref())
            .await;
        if result.is_ok() {
            loaded += 1;
        }
        // no channel change can happen mid-fetch here, so there is never a follow-up
        feed.complete(request, result);
        if loaded < pages {
            next = feed.sentinel_visible();
        }
    }

    match feed.view() {
        FeedView::Empty => eprintln!("no videos"),
        FeedView::Partial { .. } => eprintln!("more videos available; pass --pages to load them"),
        FeedView::Complete => eprintln!("all videos loaded"),
        FeedView::Idle | FeedView::Loading => {}
    }
    feed.videos().to_vec()
}

async fn direct(
    api_key: String,
    channel_id: &str,
    pages: usize,
) -> eyre::Result<Vec<EnrichedVideo>> {
    let config = Config::builder()
        .api_key(api_key)
        .build()
        .context("configure YouTube client")?;
    let client = YouTubeClient::new(&config)?;
    let enricher = Enricher::new(client.clone(), config.statistics_chunk_size);

    let mut videos = Vec::new();
    let mut stream = std::pin::pin!(client.channel_videos(channel_id, pages));
    while let Some(page) = stream.next().await {
        let page = page.context("fetch channel videos")?;
        videos.extend(enricher.enrich(page.items).await.context("enrich videos")?);
    }
    Ok(videos)
}

fn print_video(index: usize, video: &EnrichedVideo) {
    let count = |c: Option<u64>| c.map_or_else(|| "-".to_string(), compact_number);
    let statistics = video.statistics.unwrap_or_default();
    let published = video
        .snippet
        .published_at
        .map(|at| at.strftime("%Y-%m-%d").to_string())
        .unwrap_or_default();

    println!("{:>3}. {}", index + 1, video.display_title());
    println!("     {}", video.watch_url());
    println!(
        "     {published}  {} views  {} likes  {} comments",
        count(statistics.view_count),
        count(statistics.like_count),
        count(statistics.comment_count),
    );
    for comment in &video.comments {
        let text = comment.text.lines().next().unwrap_or_default();
        println!("       {}: {text}", comment.author_name);
    }
}
