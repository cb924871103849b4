// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::observability::messages::fragment::FragmentFetched;
use crate::observability::messages::StructuredLog;
use crate::traits::FragmentSource;

/// Reads fragments from files below a root directory.
///
/// Identifiers are relative paths (`templates/mainSlider.frag`,
/// `./tile.frag`). Absolute identifiers and any `..` component are refused
/// so a fragment cannot reach outside the root.
#[derive(Debug, Clone)]
pub struct FsFragmentSource {
    root: PathBuf,
    max_size: usize,
}

impl FsFragmentSource {
    pub fn new(root: impl Into<PathBuf>, max_size: usize) -> Self {
        Self {
            root: root.into(),
            max_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, identifier: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(identifier);
        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(FetchError::OutsideRoot(identifier.to_string()));
                }
            }
        }
        Ok(path)
    }
}

#[async_trait]
impl FragmentSource for FsFragmentSource {
    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.locate(identifier)?;
        let io_error = |source: std::io::Error| match source.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound(identifier.to_string()),
            _ => FetchError::Io {
                identifier: identifier.to_string(),
                source,
            },
        };

        let metadata = tokio::fs::metadata(&path).await.map_err(io_error)?;
        let size = metadata.len() as usize;
        if size > self.max_size {
            return Err(FetchError::TooLarge {
                identifier: identifier.to_string(),
                size,
                max: self.max_size,
            });
        }

        let bytes = tokio::fs::read(&path).await.map_err(io_error)?;
        FragmentFetched {
            identifier,
            size_bytes: bytes.len(),
        }
        .log();
        Ok(bytes)
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}
