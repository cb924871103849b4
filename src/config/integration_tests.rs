// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io::Write;

use tempfile::NamedTempFile;

use crate::config::{load_and_validate_config, load_config};
use crate::errors::{ConfigError, ValidationError};

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

/// A config file round-trips from disk into a usable configuration
#[test]
fn test_load_config_from_file() {
    let file = write_config(
        r#"
fragments:
  root: ./public
  max_size_bytes: 4096
store:
  counter: "0"
"#,
    );

    let config = load_and_validate_config(file.path()).unwrap();
    assert_eq!(config.fragments.max_size_bytes, 4096);
    assert_eq!(
        config.fragments.root.as_deref(),
        Some(std::path::Path::new("./public"))
    );
    assert_eq!(config.store["counter"], "0");
}

/// Validation failures surface as a single error listing every problem
#[test]
fn test_invalid_config_is_rejected() {
    let file = write_config(
        r#"
attributes:
  bind: data-x
  toggle: data-x
fragments:
  extension: ""
"#,
    );

    // Plain loading does not validate
    assert!(load_config(file.path()).is_ok());

    match load_and_validate_config(file.path()) {
        Err(ConfigError::Invalid(errors)) => {
            assert_eq!(errors.len(), 2);
            assert!(errors.contains(&ValidationError::EmptyExtension));
        }
        other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let result = load_config("/nonexistent/soulbind.yaml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_malformed_yaml_is_yaml_error() {
    let file = write_config("attributes: [unclosed");
    assert!(matches!(load_config(file.path()), Err(ConfigError::Yaml(_))));
}
