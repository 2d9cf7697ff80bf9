use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::PipelineError;

/// Downloads an archive with a single GET request.
///
/// No retries and no timeout beyond what the transport does by default.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, PipelineError> {
        let client = Client::builder().build().map_err(PipelineError::Request)?;
        Ok(Self { client })
    }

    /// Fetch the whole body at `url`.
    ///
    /// Anything other than `200 OK` is treated as a failure.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, PipelineError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(PipelineError::Request)?;

        if resp.status() != StatusCode::OK {
            return Err(PipelineError::Status(resp.status()));
        }

        let body = resp.bytes().await.map_err(PipelineError::Body)?;
        debug!(url, bytes = body.len(), "downloaded archive");

        Ok(body.to_vec())
    }
}
