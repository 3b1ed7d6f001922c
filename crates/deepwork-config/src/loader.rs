use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::Config;

/// Ordered list of config file locations searched from lowest to highest priority.
/// Later files override earlier ones.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. System-wide default
    paths.push(PathBuf::from("/etc/deepwork/config.toml"));

    // 2. XDG / home
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/deepwork/config.toml"));
    }
    if let Some(cfg) = dirs::config_dir() {
        paths.push(cfg.join("deepwork/config.toml"));
    }

    // 3. Workspace-local
    paths.push(PathBuf::from(".deepwork/config.toml"));
    paths.push(PathBuf::from("deepwork.toml"));

    paths
}

/// Load configuration by merging all discovered TOML files.
/// The `extra` argument may provide an explicit path (e.g. `--config` CLI flag).
pub fn load(extra: Option<&Path>) -> anyhow::Result<Config> {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in config_search_paths() {
        if path.is_file() {
            debug!(path = %path.display(), "loading config layer");
            merge_toml(&mut merged, read_layer(&path)?);
        }
    }

    if let Some(p) = extra {
        debug!(path = %p.display(), "loading explicit config");
        merge_toml(&mut merged, read_layer(p)?);
    }

    let config: Config = merged
        .try_into()
        .context("config does not match the expected schema")?;
    Ok(config)
}

fn read_layer(path: &Path) -> anyhow::Result<toml::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Deep-merge `src` into `dst`; src wins on scalar conflicts.
///
/// Arrays are replaced, not concatenated, so a later layer's `[[subagents]]`
/// list supersedes the earlier one.
fn merge_toml(dst: &mut toml::Value, src: toml::Value) {
    match (dst, src) {
        (toml::Value::Table(d), toml::Value::Table(s)) => {
            for (k, v) in s {
                match d.get_mut(&k) {
                    Some(existing) => merge_toml(existing, v),
                    None => {
                        d.insert(k, v);
                    }
                }
            }
        }
        (dst, src) => *dst = src,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn val(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn merge_scalar_src_wins() {
        let mut dst = val(r#"x = 1"#);
        merge_toml(&mut dst, val(r#"x = 2"#));
        assert_eq!(dst["x"].as_integer(), Some(2));
    }

    #[test]
    fn merge_preserves_keys_not_in_src() {
        let mut dst = val("a = 1\nb = 2");
        merge_toml(&mut dst, val("b = 99"));
        assert_eq!(dst["a"].as_integer(), Some(1));
        assert_eq!(dst["b"].as_integer(), Some(99));
    }

    #[test]
    fn merge_nested_tables() {
        let mut dst = val("[agent]\ninstructions = \"base\"\nmax_tool_rounds = 10");
        merge_toml(&mut dst, val("[agent]\nmax_tool_rounds = 3"));
        assert_eq!(dst["agent"]["instructions"].as_str(), Some("base"));
        assert_eq!(dst["agent"]["max_tool_rounds"].as_integer(), Some(3));
    }

    #[test]
    fn merge_replaces_arrays() {
        let mut dst = val("xs = [1, 2]");
        merge_toml(&mut dst, val("xs = [3]"));
        assert_eq!(dst["xs"].as_array().map(|a| a.len()), Some(1));
    }

    #[test]
    fn load_missing_explicit_path_is_error() {
        let result = load(Some(Path::new("/tmp/deepwork_nonexistent_config_xyz.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn load_explicit_file_overrides_defaults() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"[agent]
instructions = "You are a careful researcher."

[[subagents]]
name = "critique-agent"
description = "Critiques the final report"
prompt = "You are a dedicated editor."
"#
        )
        .unwrap();
        let cfg = load(Some(f.path())).unwrap();
        assert_eq!(cfg.agent.instructions, "You are a careful researcher.");
        assert_eq!(cfg.subagents[0].name, "critique-agent");
    }

    #[test]
    fn load_rejects_schema_mismatch() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[agent]\nmax_tool_rounds = \"many\"").unwrap();
        assert!(load(Some(f.path())).is_err());
    }

    #[test]
    fn partial_tables_fall_back_to_defaults() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[model]\nmock_responses_file = \"script.yaml\"\n\n[agent]\nmax_tool_rounds = 7").unwrap();

        let cfg = load(Some(f.path())).unwrap();
        assert_eq!(cfg.model.name, "mock-model");
        assert_eq!(cfg.model.mock_responses_file.as_deref(), Some("script.yaml"));
        assert_eq!(cfg.agent.max_tool_rounds, 7);
        assert!(cfg.agent.instructions.is_empty());
    }
}
