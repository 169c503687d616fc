// File: src/mapping.rs
use crate::core::types::MentionFormat;
use crate::error::{MarkovError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Rewrites user references between canonical names and platform mentions.
#[derive(Debug, Clone, Default)]
pub struct UserMapper {
    /// (canonical name, platform mention) in file order.
    pairs: Vec<(String, String)>,
}

impl UserMapper {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// Parses a YAML mapping of `canonical name: mention`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mapping: serde_yaml::Mapping = serde_yaml::from_str(yaml)?;
        Self::from_mapping(mapping)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mapping: serde_yaml::Mapping = serde_yaml::from_reader(reader)?;
        Self::from_mapping(mapping)
    }

    /// [`UserMapper::from_yaml_file`], degrading to the identity mapper.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::from_yaml_file(path) {
            Ok(mapper) => {
                info!(path = %path.display(), users = mapper.len(), "loaded user map");
                mapper
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read user map, mentions left as-is");
                Self::default()
            }
        }
    }

    fn from_mapping(mapping: serde_yaml::Mapping) -> Result<Self> {
        let mut pairs = Vec::with_capacity(mapping.len());
        for (name, mention) in mapping {
            let name = scalar_to_string(name)?;
            let mention = scalar_to_string(mention)?;
            pairs.push((name, mention));
        }
        Ok(Self { pairs })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn apply(&self, text: &str, format: MentionFormat) -> String {
        if self.pairs.is_empty() {
            return text.to_string();
        }
        match format {
            MentionFormat::Platform => self
                .pairs
                .iter()
                .fold(text.to_string(), |acc, (name, mention)| {
                    acc.replace(name.as_str(), mention)
                }),
            // nickname mentions are written "<@!id>"; the table stores "<@id>"
            MentionFormat::Canonical => self
                .pairs
                .iter()
                .fold(text.replace("@!", "@"), |acc, (name, mention)| {
                    acc.replace(mention.as_str(), name)
                }),
        }
    }
}

fn scalar_to_string(value: serde_yaml::Value) -> Result<String> {
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(MarkovError::Config(format!(
            "user map entries must be scalars, found {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> UserMapper {
        UserMapper::from_yaml_str("alice: \"<@111>\"\nbob: \"<@222>\"\n").unwrap()
    }

    #[test]
    fn names_become_mentions() {
        let out = mapper().apply("alice says hi to bob", MentionFormat::Platform);
        assert_eq!(out, "<@111> says hi to <@222>");
    }

    #[test]
    fn mentions_become_names() {
        let out = mapper().apply("<@!111> pinged <@222>", MentionFormat::Canonical);
        assert_eq!(out, "alice pinged bob");
    }

    #[test]
    fn empty_mapper_is_identity() {
        let mapper = UserMapper::default();
        assert_eq!(mapper.apply("alice", MentionFormat::Platform), "alice");
        assert_eq!(mapper.apply("<@!1>", MentionFormat::Canonical), "<@!1>");
    }

    #[test]
    fn numeric_mentions_are_accepted() {
        let mapper = UserMapper::from_yaml_str("carol: 333").unwrap();
        assert_eq!(mapper.apply("carol", MentionFormat::Platform), "333");
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = UserMapper::from_yaml_str("dave: [1, 2]").unwrap_err();
        assert!(matches!(err, MarkovError::Config(_)));
    }

    #[test]
    fn unreadable_file_degrades_to_identity() {
        let dir = tempfile::tempdir().unwrap();
        let mapper = UserMapper::load_or_empty(&dir.path().join("missing.yml"));
        assert!(mapper.is_empty());
    }
}
