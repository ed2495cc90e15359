//! Project root detection and classification.
//!
//! Commands run from a project root and branch on the project's type. The
//! type is recomputed from the filesystem and the PROJECT descriptor on every
//! call; nothing is cached. A missing file is a negative signal, any other
//! I/O failure is a real error.

mod config;
mod module_path;

pub use config::{read_descriptor, ProjectDescriptor, PROJECT_FILE};

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::env::Environment;

const MAIN_FILE: &str = "main.go";
const ROLES_DIR: &str = "roles";
const MOLECULE_DIR: &str = "molecule";
const REQUIREMENTS_FILE: &str = "requirements.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Go,
    Ansible,
    Helm,
    Unknown,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Go => "go",
            ProjectType::Ansible => "ansible",
            ProjectType::Helm => "helm",
            ProjectType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a project's layout information comes from: the PROJECT descriptor
/// for projects scaffolded with the new layout, or filesystem heuristics for
/// legacy trees.
#[derive(Debug, Clone)]
pub enum LayoutSource {
    Config(ProjectDescriptor),
    LegacyHeuristic,
}

/// Maps a plugin key to a project type by prefix. Loose on purpose: keys
/// carry versions ("go.kubebuilder.io/v2") and only the family matters.
pub fn layout_prefix_to_type(key: &str) -> ProjectType {
    if key.starts_with("go") {
        ProjectType::Go
    } else if key.starts_with("helm") {
        ProjectType::Helm
    } else if key.starts_with("ansible") {
        ProjectType::Ansible
    } else {
        ProjectType::Unknown
    }
}

/// A project rooted at a fixed directory, usually the working directory of
/// the CLI invocation.
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True when the root looks like the top of a managed project: the
    /// PROJECT descriptor is present, or (legacy scaffold) build/Dockerfile.
    pub fn is_project_root(&self) -> Result<bool> {
        if entry_exists(&self.root.join(PROJECT_FILE))? {
            return Ok(true);
        }
        entry_exists(&self.root.join("build").join("Dockerfile"))
    }

    /// The layout source classification dispatches on. Descriptor read
    /// failures propagate; a missing descriptor selects the legacy
    /// heuristics.
    pub fn layout_source(&self) -> Result<LayoutSource> {
        if entry_exists(&self.root.join(PROJECT_FILE))? {
            return Ok(LayoutSource::Config(read_descriptor(&self.root)?));
        }
        Ok(LayoutSource::LegacyHeuristic)
    }

    /// Classifies the project. Predicates run in fixed priority order and the
    /// first match wins; legacy layouts can nominally satisfy more than one.
    pub fn project_type(&self) -> Result<ProjectType> {
        let source = self.layout_source()?;
        let kind = if self.is_go_from(&source)? {
            ProjectType::Go
        } else if self.is_ansible_from(&source)? {
            ProjectType::Ansible
        } else if self.is_helm_from(&source)? {
            ProjectType::Helm
        } else {
            ProjectType::Unknown
        };
        debug!(project_type = %kind, root = %self.root.display(), "classified project");
        Ok(kind)
    }

    pub fn is_go(&self) -> Result<bool> {
        self.is_go_from(&self.layout_source()?)
    }

    pub fn is_ansible(&self) -> Result<bool> {
        self.is_ansible_from(&self.layout_source()?)
    }

    pub fn is_helm(&self) -> Result<bool> {
        self.is_helm_from(&self.layout_source()?)
    }

    /// The project's module path, from go.mod or the GOPATH source tree.
    pub fn module_path(&self, env: &dyn Environment) -> Result<String> {
        module_path::resolve(&self.root, env)
    }

    fn is_go_from(&self, source: &LayoutSource) -> Result<bool> {
        match source {
            LayoutSource::Config(descriptor) => Ok(descriptor.is_v2()
                || layout_prefix_to_type(&descriptor.layout) == ProjectType::Go),
            LayoutSource::LegacyHeuristic => {
                if entry_exists(&self.root.join("cmd").join("manager").join(MAIN_FILE))? {
                    return Ok(true);
                }
                // Alternative location for the entrypoint in older scaffolds.
                entry_exists(&self.root.join(MAIN_FILE))
            }
        }
    }

    fn is_ansible_from(&self, source: &LayoutSource) -> Result<bool> {
        match source {
            LayoutSource::Config(descriptor) => {
                Ok(layout_prefix_to_type(&descriptor.layout) == ProjectType::Ansible)
            }
            LayoutSource::LegacyHeuristic => {
                if dir_exists(&self.root.join(ROLES_DIR))? {
                    return Ok(true);
                }
                if dir_exists(&self.root.join(MOLECULE_DIR))? {
                    return Ok(true);
                }
                entry_exists(&self.root.join(REQUIREMENTS_FILE))
            }
        }
    }

    // Helm has no legacy scaffold, the descriptor is the only signal.
    fn is_helm_from(&self, source: &LayoutSource) -> Result<bool> {
        match source {
            LayoutSource::Config(descriptor) => {
                Ok(layout_prefix_to_type(&descriptor.layout) == ProjectType::Helm)
            }
            LayoutSource::LegacyHeuristic => Ok(false),
        }
    }
}

fn entry_exists(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => {
            Err(err).with_context(|| format!("failed to check for {}", path.display()))
        }
    }
}

fn dir_exists(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(metadata.is_dir()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => {
            Err(err).with_context(|| format!("failed to check for {}", path.display()))
        }
    }
}
