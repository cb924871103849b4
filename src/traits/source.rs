// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::FetchError;

/// Where fragment source bytes come from.
#[async_trait]
pub trait FragmentSource: Send + Sync {
    /// Fetches the bytes of a normalized fragment identifier.
    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, FetchError>;

    fn name(&self) -> &'static str;
}
