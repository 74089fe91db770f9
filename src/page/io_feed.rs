// Primitives for reading the participant feed.

use std::fmt::Display;

use crate::page::*;

/// Where the feed is published.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FeedSource {
    Remote(String),
    Local(PathBuf),
}

impl FeedSource {
    /// Addresses starting with `http://` or `https://` are fetched over the
    /// network, anything else is a file path relative to `root`.
    pub fn resolve(location: &str, root: &Path) -> FeedSource {
        if location.starts_with("http://") || location.starts_with("https://") {
            FeedSource::Remote(location.to_string())
        } else {
            FeedSource::Local(root.join(location))
        }
    }
}

impl Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedSource::Remote(url) => write!(f, "{}", url),
            FeedSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Reads and parses the feed. One attempt, no retry.
pub async fn fetch_feed(source: &FeedSource) -> PageResult<Feed> {
    info!("Attempting to read feed {}", source);
    let body = match source {
        FeedSource::Remote(url) => fetch_remote(url).await?,
        FeedSource::Local(path) => {
            let path_s = path.display().to_string();
            tokio::fs::read_to_string(path)
                .await
                .context(FeedReadSnafu { path: path_s })?
        }
    };
    debug!("fetch_feed: {} bytes", body.len());
    let feed: Feed = serde_json::from_str(&body).context(ParsingFeedSnafu {
        location: source.to_string(),
    })?;
    info!("Read {} participants from {}", feed.data.len(), source);
    Ok(feed)
}

async fn fetch_remote(url: &str) -> PageResult<String> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("fazenda/", env!("CARGO_PKG_VERSION")))
        .build()
        .context(FeedRequestSnafu { url })?;
    let resp = client
        .get(url)
        .send()
        .await
        .context(FeedRequestSnafu { url })?;
    let status = resp.status();
    if !status.is_success() {
        return FeedStatusSnafu {
            url,
            status: status.as_u16(),
        }
        .fail();
    }
    resp.text().await.context(FeedRequestSnafu { url })
}
