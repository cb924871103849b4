// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation.
//!
//! Collects every problem instead of stopping at the first one, so a user
//! fixing a config file sees the whole list in one run.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::errors::ValidationError;

/// Validates a loaded configuration.
///
/// Checks performed:
/// * no attribute name is empty
/// * no two roles share an attribute name
/// * the fragment extension is not empty (or a bare dot)
/// * at most one of `fragments.root` and `fragments.base_url` is set
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut by_name: BTreeMap<&str, Vec<&'static str>> = BTreeMap::new();
    for (role, name) in config.attributes.roles() {
        if name.trim().is_empty() {
            errors.push(ValidationError::EmptyAttributeName { role });
            continue;
        }
        by_name.entry(name).or_default().push(role);
    }
    for (name, roles) in by_name {
        if roles.len() > 1 {
            errors.push(ValidationError::DuplicateAttributeName {
                name: name.to_string(),
                roles,
            });
        }
    }

    let extension = config.fragments.extension.trim();
    if extension.is_empty() || extension == "." {
        errors.push(ValidationError::EmptyExtension);
    }

    if let (Some(root), Some(base_url)) = (&config.fragments.root, &config.fragments.base_url) {
        errors.push(ValidationError::ConflictingFragmentSources {
            root: root.display().to_string(),
            base_url: base_url.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&Config::default()), Ok(()));
    }

    #[test]
    fn test_empty_attribute_name() {
        let mut config = Config::default();
        config.attributes.toggle = "  ".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::EmptyAttributeName { role: "toggle" }]
        );
    }

    #[test]
    fn test_duplicate_attribute_names() {
        let mut config = Config::default();
        config.attributes.action = "data-bind".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateAttributeName {
                name: "data-bind".to_string(),
                roles: vec!["bind", "action"],
            }]
        );
        assert!(errors[0].to_string().contains("bind, action"));
    }

    #[test]
    fn test_collects_every_problem() {
        let mut config = Config::default();
        config.fragments.extension = ".".to_string();
        config.fragments.root = Some(PathBuf::from("public"));
        config.fragments.base_url = Some("https://example.com/".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], ValidationError::EmptyExtension);
        assert!(matches!(
            errors[1],
            ValidationError::ConflictingFragmentSources { .. }
        ));
    }
}
