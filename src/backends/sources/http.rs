// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::errors::FetchError;
use crate::observability::messages::fragment::FragmentFetched;
use crate::observability::messages::StructuredLog;
use crate::traits::FragmentSource;

/// Fetches fragments with `GET <base_url><identifier>`.
///
/// No timeout is applied to the request; a slow server delays the load that
/// asked for the fragment and nothing else.
#[derive(Debug, Clone)]
pub struct HttpFragmentSource {
    base_url: String,
    client: reqwest::Client,
    max_size: usize,
}

impl HttpFragmentSource {
    pub fn new(base_url: &str, max_size: usize) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        Self {
            base_url,
            client: reqwest::Client::new(),
            max_size,
        }
    }

    pub fn url_for(&self, identifier: &str) -> String {
        let relative = identifier.trim_start_matches("./").trim_start_matches('/');
        format!("{}{}", self.base_url, relative)
    }
}

#[async_trait]
impl FragmentSource for HttpFragmentSource {
    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, FetchError> {
        let http_error = |source: reqwest::Error| FetchError::Http {
            identifier: identifier.to_string(),
            source,
        };

        let response = self
            .client
            .get(self.url_for(identifier))
            .send()
            .await
            .map_err(http_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(identifier.to_string()));
        }
        let response = response.error_for_status().map_err(http_error)?;

        if let Some(length) = response.content_length() {
            if length as usize > self.max_size {
                return Err(FetchError::TooLarge {
                    identifier: identifier.to_string(),
                    size: length as usize,
                    max: self.max_size,
                });
            }
        }

        let bytes = response.bytes().await.map_err(http_error)?;
        if bytes.len() > self.max_size {
            return Err(FetchError::TooLarge {
                identifier: identifier.to_string(),
                size: bytes.len(),
                max: self.max_size,
            });
        }

        FragmentFetched {
            identifier,
            size_bytes: bytes.len(),
        }
        .log();
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_identifier() {
        let source = HttpFragmentSource::new("https://cdn.example.com/ui", 1024);
        assert_eq!(
            source.url_for("./templates/tile.frag"),
            "https://cdn.example.com/ui/templates/tile.frag"
        );
        assert_eq!(
            source.url_for("tile.frag"),
            "https://cdn.example.com/ui/tile.frag"
        );
    }
}
