//! HTTP transport with byte-range resume.

use std::io::SeekFrom;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use haul_core::transfer::{
    ResumeToken, TransferDescriptor, TransferError, TransferProgress,
};

use super::{TransportOutcome, TransportPort};

/// Continuation state carried inside a [`ResumeToken`] produced by this
/// transport.
///
/// `offset` is the byte count durably on disk at suspend time. `etag` (when
/// the server sent one) guards the resumed range request with `If-Range` so
/// a changed artifact restarts instead of splicing mismatched bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResumeState {
    pub offset: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl HttpResumeState {
    fn encode(&self) -> Result<ResumeToken, TransferError> {
        let json = serde_json::to_string(self)
            .map_err(|e| TransferError::internal(format!("encoding resume state: {e}")))?;
        Ok(ResumeToken::new(json))
    }

    fn decode(token: &ResumeToken) -> Result<Self, TransferError> {
        serde_json::from_str(token.as_str()).map_err(|_| {
            TransferError::transfer_failed("continuation token not recognized by http transport")
        })
    }
}

/// Streams an artifact over HTTP(S), resuming with `Range` requests.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Reuse an externally configured client (proxies, timeouts).
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Open the destination positioned at `offset`, verifying the partial
    /// file actually covers the checkpoint.
    async fn open_destination(
        descriptor: &TransferDescriptor,
        offset: u64,
    ) -> Result<File, TransferError> {
        let path = &descriptor.destination_path;
        if offset == 0 {
            return File::create(path).await.map_err(|e| {
                TransferError::transfer_failed(format!(
                    "creating destination {}: {e}",
                    path.display()
                ))
            });
        }

        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .await
            .map_err(|e| {
                TransferError::transfer_failed(format!(
                    "opening partial file {}: {e}",
                    path.display()
                ))
            })?;
        let len = file
            .metadata()
            .await
            .map_err(|e| TransferError::transfer_failed(format!("stat partial file: {e}")))?
            .len();
        if len < offset {
            return Err(TransferError::transfer_failed(format!(
                "partial file is {len} bytes but checkpoint expects at least {offset}"
            )));
        }
        // Drop any bytes past the checkpoint; they were never acknowledged.
        file.set_len(offset)
            .await
            .map_err(|e| TransferError::transfer_failed(format!("truncating partial file: {e}")))?;
        Ok(file)
    }

    fn build_request(
        &self,
        descriptor: &TransferDescriptor,
        offset: u64,
        etag: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let mut request = self.client.get(&descriptor.source_url);
        for (name, value) in &descriptor.options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(agent) = &descriptor.options.user_agent {
            request = request.header(reqwest::header::USER_AGENT, agent.as_str());
        }
        if offset > 0 {
            request = request.header(reqwest::header::RANGE, format!("bytes={offset}-"));
            if let Some(etag) = etag {
                request = request.header(reqwest::header::IF_RANGE, etag);
            }
        }
        request
    }
}

#[async_trait]
impl TransportPort for HttpTransport {
    async fn run(
        &self,
        descriptor: &TransferDescriptor,
        resume_from: Option<&ResumeToken>,
        progress_tx: watch::Sender<TransferProgress>,
        suspend: CancellationToken,
    ) -> Result<TransportOutcome, TransferError> {
        let checkpoint = match resume_from {
            Some(token) => HttpResumeState::decode(token)?,
            None => HttpResumeState {
                offset: 0,
                total: None,
                etag: None,
            },
        };
        let mut position = checkpoint.offset;

        let response = self
            .build_request(descriptor, position, checkpoint.etag.as_deref())
            .send()
            .await
            .map_err(|e| TransferError::transfer_failed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::transfer_failed(format!(
                "server responded with {status}"
            )));
        }

        // A 200 to a ranged request means the server (or a changed artifact
        // behind If-Range) is sending the whole body; restart from zero.
        if position > 0 && status != reqwest::StatusCode::PARTIAL_CONTENT {
            tracing::info!(
                target: "haul.transport",
                url = %descriptor.source_url,
                "server ignored range request, restarting from zero"
            );
            position = 0;
        }

        let total = response
            .content_length()
            .map(|remaining| remaining + position)
            .or(checkpoint.total);
        let etag = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned)
            .or(checkpoint.etag);

        let mut file = Self::open_destination(descriptor, position).await?;
        if position > 0 {
            file.seek(SeekFrom::Start(position))
                .await
                .map_err(|e| TransferError::transfer_failed(format!("seek failed: {e}")))?;
        }

        let expected = total.unwrap_or(0);
        progress_tx.send_replace(TransferProgress::new(position, expected));

        tracing::debug!(
            target: "haul.transport",
            url = %descriptor.source_url,
            offset = position,
            total = ?total,
            "streaming body"
        );

        let mut stream = response.bytes_stream();
        loop {
            tokio::select! {
                biased;

                () = suspend.cancelled() => {
                    file.flush().await.map_err(|e| {
                        TransferError::transfer_failed(format!("flush on suspend: {e}"))
                    })?;
                    let token = HttpResumeState {
                        offset: position,
                        total,
                        etag,
                    }
                    .encode()?;
                    tracing::info!(
                        target: "haul.transport",
                        url = %descriptor.source_url,
                        offset = position,
                        "run suspended"
                    );
                    return Ok(TransportOutcome::Suspended { token });
                }

                chunk = stream.next() => {
                    match chunk {
                        Some(Ok(bytes)) => {
                            file.write_all(&bytes).await.map_err(|e| {
                                TransferError::transfer_failed(format!("write failed: {e}"))
                            })?;
                            position += bytes.len() as u64;
                            progress_tx.send_replace(TransferProgress::new(position, expected));
                        }
                        Some(Err(e)) => {
                            return Err(TransferError::transfer_failed(format!(
                                "stream failed at byte {position}: {e}"
                            )));
                        }
                        None => break,
                    }
                }
            }
        }

        file.flush()
            .await
            .map_err(|e| TransferError::transfer_failed(format!("final flush: {e}")))?;

        if let Some(total) = total {
            if position < total {
                return Err(TransferError::transfer_failed(format!(
                    "connection closed after {position} of {total} bytes"
                )));
            }
        }

        progress_tx.send_replace(TransferProgress::new(position, expected));
        Ok(TransportOutcome::Completed)
    }
}
