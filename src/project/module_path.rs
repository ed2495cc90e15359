use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::env::{Environment, GOPATH_ENV};

const GO_MOD_FILE: &str = "go.mod";
const SRC_DIR: &str = "src";

/// Resolves the project's module path: the go.mod module directive when the
/// project uses modules, otherwise the root-relative location of the project
/// under one of the GOPATH source trees.
pub(crate) fn resolve(root: &Path, env: &dyn Environment) -> Result<String> {
    let go_mod = root.join(GO_MOD_FILE);
    match fs::read_to_string(&go_mod) {
        Ok(contents) => {
            if let Some(path) = module_directive(&contents)? {
                debug!(module = %path, "module path from go.mod");
                return Ok(path);
            }
            warn!("go.mod has no module directive, falling back to GOPATH");
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", go_mod.display()));
        }
    }

    from_source_roots(root, &source_roots(env)?)
}

/// Extracts the module directive from go.mod contents. Quoted paths are
/// unquoted; a missing or empty directive is not an error here, the caller
/// falls back to GOPATH.
fn module_directive(contents: &str) -> Result<Option<String>> {
    let module_re = Regex::new(r"(?m)^\s*module\s+(.+)$")?;
    Ok(module_re
        .captures(contents)
        .map(|caps| caps[1].trim().trim_matches('"').to_string())
        .filter(|path| !path.is_empty()))
}

/// Candidate source roots, in order: `<entry>/src` for every entry of the
/// GOPATH path list, or the conventional `$HOME/go/src` when the variable is
/// unset or empty.
fn source_roots(env: &dyn Environment) -> Result<Vec<PathBuf>> {
    if let Some(gopath) = env.get(GOPATH_ENV).filter(|value| !value.is_empty()) {
        return Ok(env::split_paths(&gopath)
            .map(|entry| entry.join(SRC_DIR))
            .collect());
    }
    let home = dirs::home_dir().ok_or_else(|| anyhow!("could not determine home directory"))?;
    Ok(vec![home.join("go").join(SRC_DIR)])
}

fn from_source_roots(root: &Path, candidates: &[PathBuf]) -> Result<String> {
    for candidate in candidates {
        if let Ok(relative) = root.strip_prefix(candidate) {
            let slashed = relative.to_string_lossy().replace('\\', "/");
            let module = slashed.trim_matches('/');
            if !module.is_empty() {
                debug!(module = %module, source_root = %candidate.display(), "module path from source root");
                return Ok(module.to_string());
            }
        }
    }
    Err(anyhow!(
        "could not determine module path: no go.mod module directive and {} is not under a GOPATH source tree",
        root.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_directive() {
        let contents = "module github.com/example-inc/app-operator\n\ngo 1.13\n";
        assert_eq!(
            module_directive(contents).unwrap().as_deref(),
            Some("github.com/example-inc/app-operator")
        );
    }

    #[test]
    fn test_module_directive_quoted() {
        let contents = "module \"github.com/example-inc/app-operator\"\n";
        assert_eq!(
            module_directive(contents).unwrap().as_deref(),
            Some("github.com/example-inc/app-operator")
        );
    }

    #[test]
    fn test_module_directive_absent() {
        assert_eq!(module_directive("go 1.13\n").unwrap(), None);
        assert_eq!(module_directive("").unwrap(), None);
    }

    #[test]
    fn test_from_source_roots_strips_prefix() {
        let candidates = vec![PathBuf::from("/home/dev/go/src")];
        let module = from_source_roots(
            Path::new("/home/dev/go/src/github.com/example/app"),
            &candidates,
        )
        .unwrap();
        assert_eq!(module, "github.com/example/app");
    }

    #[test]
    fn test_from_source_roots_outside_all_roots() {
        let candidates = vec![PathBuf::from("/home/dev/go/src")];
        let err = from_source_roots(Path::new("/tmp/elsewhere/app"), &candidates).unwrap_err();
        assert!(err.to_string().contains("module path"));
    }
}
