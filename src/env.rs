use anyhow::{anyhow, Result};
use regex::Regex;
use std::collections::HashMap;
use std::env;

pub const GOPATH_ENV: &str = "GOPATH";
pub const GOFLAGS_ENV: &str = "GOFLAGS";
pub const GO_MOD_ENV: &str = "GO111MODULE";

/// Process-environment access for the classifier and the Go toolchain
/// helpers. Injected so callers and tests can substitute an in-memory
/// environment instead of mutating real process state.
pub trait Environment {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// The real process environment.
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        env::set_var(key, value);
    }
}

/// In-memory environment backed by a map.
#[derive(Debug, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl Environment for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }
}

/// Sets GOFLAGS="${GOFLAGS} -v" unless GOFLAGS already carries "-v", so that
/// `go` invocations driven by the generator become verbose.
pub fn set_go_verbose(env: &mut dyn Environment) -> Result<()> {
    let flag_re = Regex::new("(.* )?-v(.* )?")?;
    match env.get(GOFLAGS_ENV) {
        None => env.set(GOFLAGS_ENV, "-v"),
        Some(flags) if flags.is_empty() => env.set(GOFLAGS_ENV, "-v"),
        Some(flags) => {
            if !flag_re.is_match(&flags) {
                env.set(GOFLAGS_ENV, &format!("{} -v", flags));
            }
        }
    }
    Ok(())
}

/// Whether the Go toolchain would run in module-aware mode.
pub fn go_mod_on(env: &dyn Environment) -> Result<bool> {
    match env.get(GO_MOD_ENV).as_deref() {
        None | Some("") | Some("auto") | Some("on") => Ok(true),
        Some("off") => Ok(false),
        Some(other) => Err(anyhow!("invalid value for {}: {:?}", GO_MOD_ENV, other)),
    }
}

/// Ensures Go modules are enabled before running module-dependent commands.
pub fn check_go_modules(env: &dyn Environment) -> Result<()> {
    if !go_mod_on(env)? {
        return Err(anyhow!(
            "using Go modules requires {}=\"on\", \"auto\", or unset",
            GO_MOD_ENV
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_go_verbose_unset() -> Result<()> {
        let mut env = MapEnv::new();
        set_go_verbose(&mut env)?;
        assert_eq!(env.get(GOFLAGS_ENV).as_deref(), Some("-v"));
        Ok(())
    }

    #[test]
    fn test_set_go_verbose_appends() -> Result<()> {
        let mut env = MapEnv::new().with(GOFLAGS_ENV, "-mod=vendor");
        set_go_verbose(&mut env)?;
        assert_eq!(env.get(GOFLAGS_ENV).as_deref(), Some("-mod=vendor -v"));
        Ok(())
    }

    #[test]
    fn test_set_go_verbose_already_present() -> Result<()> {
        for flags in ["-v", "-mod=vendor -v", "-v -count=1"] {
            let mut env = MapEnv::new().with(GOFLAGS_ENV, flags);
            set_go_verbose(&mut env)?;
            assert_eq!(env.get(GOFLAGS_ENV).as_deref(), Some(flags));
        }
        Ok(())
    }

    #[test]
    fn test_set_go_verbose_empty_value() -> Result<()> {
        let mut env = MapEnv::new().with(GOFLAGS_ENV, "");
        set_go_verbose(&mut env)?;
        assert_eq!(env.get(GOFLAGS_ENV).as_deref(), Some("-v"));
        Ok(())
    }

    #[test]
    fn test_go_mod_on_values() -> Result<()> {
        assert!(go_mod_on(&MapEnv::new())?);
        for value in ["", "auto", "on"] {
            assert!(go_mod_on(&MapEnv::new().with(GO_MOD_ENV, value))?);
        }
        assert!(!go_mod_on(&MapEnv::new().with(GO_MOD_ENV, "off"))?);
        assert!(go_mod_on(&MapEnv::new().with(GO_MOD_ENV, "sometimes")).is_err());
        Ok(())
    }

    #[test]
    fn test_check_go_modules_off() {
        let env = MapEnv::new().with(GO_MOD_ENV, "off");
        let err = check_go_modules(&env).unwrap_err();
        assert!(err.to_string().contains(GO_MOD_ENV));
    }
}
