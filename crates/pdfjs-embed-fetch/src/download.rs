use std::path::Path;

use futures::StreamExt;
use reqwest::header::LOCATION;
use reqwest::{StatusCode, Url};
use tokio::io::AsyncWriteExt;

use crate::error::FetchError;

/// Redirect hops followed before a download is abandoned.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// HTTP client that streams release archives to disk.
///
/// Redirects are followed by hand so the hop limit and the relative
/// `Location` handling stay visible; the underlying client never redirects.
/// Cloning shares the connection pool.
#[derive(Clone)]
pub struct Downloader {
    client: reqwest::Client,
    max_redirects: usize,
}

impl Downloader {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pdfjs-embed/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        })
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Download `url` into `dest`, returning the number of bytes written.
    ///
    /// A partially written `dest` is removed when the transfer fails.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let response = self.resolve(url).await?;

        match stream_to_file(response, dest).await {
            Ok(written) => Ok(written),
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(dest).await
                    && cleanup.kind() != std::io::ErrorKind::NotFound
                {
                    tracing::warn!(
                        path = %dest.display(),
                        error = %cleanup,
                        "could not remove partial download"
                    );
                }
                Err(e)
            }
        }
    }

    /// Follow redirects until a terminal response, which must be `200 OK`.
    async fn resolve(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let mut current = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_owned(),
            message: e.to_string(),
        })?;
        let mut hops = 0usize;

        loop {
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|source| FetchError::Transport {
                    url: current.to_string(),
                    source,
                })?;

            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(|loc| current.join(loc));

                if let Some(next) = location {
                    let next = next.map_err(|e| FetchError::InvalidUrl {
                        url: current.to_string(),
                        message: format!("bad redirect location: {e}"),
                    })?;

                    if hops >= self.max_redirects {
                        return Err(FetchError::TooManyRedirects {
                            url: url.to_owned(),
                            limit: self.max_redirects,
                        });
                    }

                    tracing::debug!(from = %current, to = %next, hop = hops + 1, "following redirect");
                    // Dropping the response discards its body.
                    drop(response);
                    current = next;
                    hops += 1;
                    continue;
                }
            }

            if status != StatusCode::OK {
                return Err(FetchError::Download {
                    url: current.to_string(),
                    status: status.as_u16(),
                });
            }

            return Ok(response);
        }
    }
}

async fn stream_to_file(response: reqwest::Response, dest: &Path) -> Result<u64, FetchError> {
    let url = response.url().to_string();
    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(FetchError::fs(dest))?;

    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| FetchError::Transport {
            url: url.clone(),
            source,
        })?;
        file.write_all(&chunk).await.map_err(FetchError::fs(dest))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(FetchError::fs(dest))?;

    Ok(written)
}
