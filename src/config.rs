//! Pipeline configuration
//!
//! ```yaml
//! owlnets_dir: ./owlnets_output
//! owl_dir: ./owl
//! registry: ./ontologies.json
//! contexts: ./contexts.yaml
//! prefixes: ./prefixes.tsv
//! owl_converter: "./owlnets_script.sh {owl_url} {sab} {owl_dir} {owlnets_dir}"
//! merge_command: ["python3", "merge.py", "{owlnets_dir}", "{sab}"]
//! rules:
//!   - name: orphanet
//!     contains: "http://www.orpha.net/ORDO/Orphanet_"
//!     template: "ORDO {segment}"
//! ```
//!
//! Relative paths are resolved against the configuration file's directory.
//! Commands may use `{sab}`, `{owl_url}`, `{owl_file}`, `{owl_dir}`,
//! `{owlnets_dir}` and `{sab_dir}`.

use crate::canon::{Canonicalizer, PrefixTable, RuleError, RuleSet, RuleSpec};
use crate::ordering::{ContextConfig, SourceRegistry};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("source key '{0}' must be upper case")]
    LowercaseKey(String),

    #[error(transparent)]
    Rule(#[from] RuleError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub(crate) fn read_text(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub(crate) fn parse_yaml<T: DeserializeOwned>(text: &str, origin: &str) -> ConfigResult<T> {
    serde_yaml::from_str(text).map_err(|source| ConfigError::Yaml {
        path: origin.to_string(),
        source,
    })
}

pub(crate) fn parse_json<T: DeserializeOwned>(text: &str, origin: &str) -> ConfigResult<T> {
    serde_json::from_str(text).map_err(|source| ConfigError::Json {
        path: origin.to_string(),
        source,
    })
}

/// An external command, written either as one line or as an argument vector.
///
/// The line form is split on whitespace; no shell is involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Line(String),
    Argv(Vec<String>),
}

impl CommandSpec {
    pub fn argv(&self) -> Vec<String> {
        match self {
            Self::Line(line) => line.split_whitespace().map(str::to_string).collect(),
            Self::Argv(argv) => argv.clone(),
        }
    }

    /// The argument vector with `{name}` placeholders substituted.
    pub fn render(&self, vars: &HashMap<&str, String>) -> Vec<String> {
        self.argv()
            .into_iter()
            .map(|arg| {
                vars.iter()
                    .fold(arg, |acc, (name, value)| acc.replace(&format!("{{{}}}", name), value))
            })
            .collect()
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Root of the per-SAB OWLNETS directories
    pub owlnets_dir: PathBuf,
    /// Working directory for downloaded OWL files
    pub owl_dir: PathBuf,
    /// Source registry (JSON or YAML)
    pub registry: PathBuf,
    #[serde(default)]
    pub contexts: Option<PathBuf>,
    #[serde(default)]
    pub prefixes: Option<PathBuf>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    /// Run for registry entries that only name an OWL file
    #[serde(default)]
    pub owl_converter: Option<CommandSpec>,
    /// Run after each SAB except UMLS
    #[serde(default)]
    pub merge_command: Option<CommandSpec>,
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = read_text(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::from_yaml_str(&text, &path.display().to_string(), base)?;
        debug!(path = %path.display(), "loaded pipeline configuration");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str, origin: &str, base_dir: &Path) -> ConfigResult<Self> {
        let mut config: Self = parse_yaml(text, origin)?;
        config.resolve_paths(base_dir);
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.owlnets_dir);
        resolve(&mut self.owl_dir);
        resolve(&mut self.registry);
        if let Some(p) = self.contexts.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.prefixes.as_mut() {
            resolve(p);
        }
    }

    /// Built-in rules plus configured ones, with the prefix table if any.
    pub fn canonicalizer(&self) -> ConfigResult<Canonicalizer> {
        let mut rules = RuleSet::builtin();
        rules.extend_from_specs(&self.rules)?;
        let prefixes = match &self.prefixes {
            Some(path) => PrefixTable::load(path),
            None => PrefixTable::empty(),
        };
        Ok(Canonicalizer::new(rules, prefixes))
    }

    pub fn source_registry(&self) -> ConfigResult<SourceRegistry> {
        SourceRegistry::load(&self.registry)
    }

    /// Context configuration; none configured means no contexts.
    pub fn context_config(&self) -> ConfigResult<ContextConfig> {
        match &self.contexts {
            Some(path) => ContextConfig::load(path),
            None => Ok(ContextConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_follow_config_file() {
        let yaml = "owlnets_dir: out\nowl_dir: /abs/owl\nregistry: ontologies.json\nprefixes: p.tsv\n";
        let config = PipelineConfig::from_yaml_str(yaml, "test.yaml", Path::new("/etc/owlnets")).unwrap();
        assert_eq!(config.owlnets_dir, PathBuf::from("/etc/owlnets/out"));
        assert_eq!(config.owl_dir, PathBuf::from("/abs/owl"));
        assert_eq!(config.prefixes, Some(PathBuf::from("/etc/owlnets/p.tsv")));
        assert!(config.contexts.is_none());
    }

    #[test]
    fn missing_and_unknown_keys_fail() {
        let missing = PipelineConfig::from_yaml_str("owl_dir: x\nregistry: r\n", "t", Path::new("."));
        assert!(matches!(missing, Err(ConfigError::Yaml { .. })));
        let unknown =
            PipelineConfig::from_yaml_str("owlnets_dir: a\nowl_dir: b\nregistry: c\ncolour: red\n", "t", Path::new("."));
        assert!(unknown.is_err());
    }

    #[test]
    fn configured_rules_are_validated_at_load() {
        let yaml = "owlnets_dir: a\nowl_dir: b\nregistry: c\nrules:\n  - name: bad\n    contains: x\n    template: \"{nope}\"\n";
        let config = PipelineConfig::from_yaml_str(yaml, "t", Path::new(".")).unwrap();
        assert!(matches!(config.canonicalizer(), Err(ConfigError::Rule(_))));
    }

    #[test]
    fn configured_rules_run_before_fixed_point() {
        let yaml = "owlnets_dir: a\nowl_dir: b\nregistry: c\nrules:\n  - name: orphanet\n    contains: \"Orphanet_\"\n    template: \"ORDO {token}\"\n";
        let config = PipelineConfig::from_yaml_str(yaml, "t", Path::new(".")).unwrap();
        let engine = config.canonicalizer().unwrap();
        let c = engine.canonicalize("http://www.orpha.net/ORDO/Orphanet_558", "ORDO");
        assert_eq!(c.value, "ORDO:558");
        assert_eq!(c.rule.as_deref(), Some("orphanet"));
    }

    #[test]
    fn command_placeholders_are_substituted() {
        let cmd = CommandSpec::Line("convert.sh {owl_url} {sab} -o {owl_dir}".into());
        let vars = HashMap::from([
            ("owl_url", "http://x.org/a.owl".to_string()),
            ("sab", "PATO".to_string()),
            ("owl_dir", "/tmp/owl".to_string()),
        ]);
        assert_eq!(
            cmd.render(&vars),
            vec!["convert.sh", "http://x.org/a.owl", "PATO", "-o", "/tmp/owl"]
        );
        let argv: CommandSpec = serde_yaml::from_str("[\"a b\", c]").unwrap();
        assert_eq!(argv.argv(), vec!["a b", "c"]);
    }
}
