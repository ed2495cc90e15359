use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Descriptor file scaffolded at the root of every project generated with the
/// new layout.
pub const PROJECT_FILE: &str = "PROJECT";

/// The narrow slice of the PROJECT descriptor this crate consults. The file
/// belongs to the scaffolding machinery; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectDescriptor {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub layout: String,
}

impl ProjectDescriptor {
    /// Whether the descriptor declares the newer config scheme. The
    /// scaffolder writes the version quoted, so it deserializes as a string.
    pub fn is_v2(&self) -> bool {
        self.version == "2"
    }
}

pub fn read_descriptor(root: &Path) -> Result<ProjectDescriptor> {
    let path = root.join(PROJECT_FILE);
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_fields() {
        let descriptor: ProjectDescriptor =
            serde_yaml::from_str("version: \"2\"\nlayout: go.kubebuilder.io/v2\n").unwrap();
        assert!(descriptor.is_v2());
        assert_eq!(descriptor.layout, "go.kubebuilder.io/v2");
    }

    #[test]
    fn test_descriptor_defaults_and_unknown_fields() {
        let descriptor: ProjectDescriptor =
            serde_yaml::from_str("domain: example.com\nrepo: github.com/example/app\n").unwrap();
        assert!(!descriptor.is_v2());
        assert!(descriptor.layout.is_empty());
    }
}
