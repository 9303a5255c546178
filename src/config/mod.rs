use std::path::{Path, PathBuf};

use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// Name of the configuration file searched for by [`IrConfig::find`].
pub const CONFIG_FILE: &str = "objir.toml";

/// Knobs for running passes over a program, read from the `[ir]` section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IrConfig {
    /// Run each pass over declared types on the rayon pool.
    pub parallel: bool,
    /// Check IR invariants after every pass.
    pub verify_after_each_pass: bool,
}

impl Default for IrConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            verify_after_each_pass: true,
        }
    }
}

/// Parse a TOML boolean, pointing the error at `value` inside the file.
fn parse_bool(key: &str, value: &str, offset: usize) -> Result<bool, Diagnostic> {
    match value.trim_matches('"') {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Diagnostic::error(
            format!("expected `true` or `false` for '{}', found '{}'", key, other),
            Span::new(0, offset as u32, (offset + value.len()) as u32),
        )
        .with_help(format!("write `{} = true` or `{} = false`", key, key))),
    }
}

impl IrConfig {
    /// Load configuration from a TOML file.
    pub fn load(toml_path: &Path) -> Result<IrConfig, Diagnostic> {
        let content = std::fs::read_to_string(toml_path).map_err(|e| {
            Diagnostic::error(
                format!("cannot read '{}': {}", toml_path.display(), e),
                Span::dummy(),
            )
        })?;
        Self::parse(&content)
    }

    /// Parse configuration text. Keys outside `[ir]` and unknown keys are
    /// ignored; missing keys keep their defaults.
    pub fn parse(content: &str) -> Result<IrConfig, Diagnostic> {
        let mut config = IrConfig::default();
        let mut current_section = String::new();
        let mut offset = 0;

        for line in content.split_inclusive('\n') {
            let line_start = offset;
            offset += line.len();
            let trimmed = line.trim();
            if trimmed.starts_with('#') || trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                current_section = trimmed[1..trimmed.len() - 1].trim().to_string();
                continue;
            }
            if current_section != "ir" {
                continue;
            }
            if let Some((key, rest)) = line.split_once('=') {
                let key = key.trim().trim_matches('"');
                // Strip trailing comments.
                let value = rest.split('#').next().unwrap_or("").trim();
                let eq_end = line.len() - rest.len();
                let value_offset = line_start + eq_end + rest.find(value).unwrap_or(0);
                match key {
                    "parallel" => config.parallel = parse_bool(key, value, value_offset)?,
                    "verify_after_each_pass" => {
                        config.verify_after_each_pass = parse_bool(key, value, value_offset)?
                    }
                    _ => tracing::debug!(key, "ignoring unknown [ir] key"),
                }
            }
        }

        Ok(config)
    }

    /// Try to find a config file in the given directory or its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = IrConfig::parse("").unwrap();
        assert!(!config.parallel);
        assert!(config.verify_after_each_pass);
        assert_eq!(config, IrConfig::default());
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join(CONFIG_FILE);
        fs::write(
            &toml_path,
            r#"[package]
name = "demo"
parallel = false

[ir]
# run passes on the pool
parallel = true
verify_after_each_pass = false # trust the passes
inline_depth = 3
"#,
        )
        .unwrap();

        let config = IrConfig::load(&toml_path).unwrap();
        assert!(config.parallel);
        assert!(!config.verify_after_each_pass);
    }

    #[test]
    fn test_other_sections_ignored() {
        let config = IrConfig::parse("[other]\nparallel = true\n").unwrap();
        assert!(!config.parallel);
    }

    #[test]
    fn test_malformed_bool_points_at_value() {
        let text = "[ir]\nparallel = yes\n";
        let err = IrConfig::parse(text).unwrap_err();
        assert!(err.message.contains("'parallel'"), "{}", err.message);
        let start = err.span.start as usize;
        assert_eq!(&text[start..err.span.end as usize], "yes");
        assert!(err.help.is_some());
    }

    #[test]
    fn test_malformed_bool_spelled_inside_key() {
        let text = "[ir]\nparallel = a\n";
        let err = IrConfig::parse(text).unwrap_err();
        assert_eq!(err.span.start, 16);
        assert_eq!(&text[16..err.span.end as usize], "a");

        let text = "[ir]\n  verify_after_each_pass=  ver # typo\n";
        let err = IrConfig::parse(text).unwrap_err();
        let start = text.find("ver #").unwrap();
        assert_eq!(err.span.start as usize, start);
        assert_eq!(&text[start..err.span.end as usize], "ver");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = IrConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.message.starts_with("cannot read"));
    }

    #[test]
    fn test_find_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[ir]\n").unwrap();

        let found = IrConfig::find(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE));
    }
}
