// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// Problems found while validating a loaded configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An attribute name was configured as an empty string
    EmptyAttributeName {
        /// Which attribute role was left empty (bind, toggle, ...)
        role: &'static str,
    },
    /// Two attribute roles share the same attribute name
    DuplicateAttributeName {
        /// The shared attribute name
        name: String,
        /// The roles that collide
        roles: Vec<&'static str>,
    },
    /// The fragment extension is empty or just a dot
    EmptyExtension,
    /// Both a filesystem root and a base URL were configured for fragments
    ConflictingFragmentSources {
        root: String,
        base_url: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyAttributeName { role } => {
                write!(f, "Attribute name for '{}' must not be empty", role)
            }
            ValidationError::DuplicateAttributeName { name, roles } => {
                write!(
                    f,
                    "Attribute name '{}' is used by more than one role: {}",
                    name,
                    roles.join(", ")
                )
            }
            ValidationError::EmptyExtension => {
                write!(f, "Fragment extension must not be empty")
            }
            ValidationError::ConflictingFragmentSources { root, base_url } => {
                write!(
                    f,
                    "Fragments configure both root '{}' and base_url '{}'; pick one",
                    root, base_url
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Loading a configuration file failed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration validation failed:\n{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n"))]
    Invalid(Vec<ValidationError>),
}
