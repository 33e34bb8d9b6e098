//! Internationalization (i18n) support for interface labels

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Interface strings shown around the content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub load_more: String,
    pub loading: String,
    pub edited: String,
    pub minutes: String,
    pub not_found: String,
    pub fetch_failed: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self::pt_br()
    }
}

impl Labels {
    fn pt_br() -> Self {
        Self {
            load_more: "Carregar mais posts".to_string(),
            loading: "Carregando...".to_string(),
            edited: "* editado em".to_string(),
            minutes: "min".to_string(),
            not_found: "Post não encontrado".to_string(),
            fetch_failed: "Não foi possível carregar o conteúdo".to_string(),
        }
    }

    fn en() -> Self {
        Self {
            load_more: "Load more posts".to_string(),
            loading: "Loading...".to_string(),
            edited: "* edited on".to_string(),
            minutes: "min".to_string(),
            not_found: "Post not found".to_string(),
            fetch_failed: "Could not load content".to_string(),
        }
    }

    /// Built-in labels for a language, defaulting to English
    pub fn builtin(language: &str) -> Self {
        if crate::helpers::locale_for(language).code == "pt-BR" {
            Self::pt_br()
        } else {
            Self::en()
        }
    }

    /// Built-in labels overridden by `languages/<language>.yml` when present
    ///
    /// Keys missing from the file keep their built-in value.
    pub fn load<P: AsRef<Path>>(base_dir: P, language: &str) -> Result<Self> {
        let builtin = Self::builtin(language);
        let path = base_dir
            .as_ref()
            .join("languages")
            .join(format!("{}.yml", language));

        if !path.exists() {
            return Ok(builtin);
        }

        let content = fs::read_to_string(&path)?;
        let overrides: serde_yaml::Mapping = match serde_yaml::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                return Ok(builtin);
            }
        };

        let mut merged = serde_yaml::to_value(&builtin)?;
        if let serde_yaml::Value::Mapping(map) = &mut merged {
            for (key, value) in overrides {
                if value.is_string() {
                    map.insert(key, value);
                }
            }
        }
        tracing::debug!("Loaded language file: {:?}", path);

        Ok(serde_yaml::from_value(merged)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_labels() {
        assert_eq!(Labels::builtin("pt-BR").load_more, "Carregar mais posts");
        assert_eq!(Labels::builtin("en").load_more, "Load more posts");
        assert_eq!(Labels::builtin("fr").loading, "Loading...");
    }

    #[test]
    fn test_language_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("languages")).unwrap();
        fs::write(
            dir.path().join("languages/pt-BR.yml"),
            "load_more: Mais posts\nunknown: ignored\nminutes: 3\n",
        )
        .unwrap();

        let labels = Labels::load(dir.path(), "pt-BR").unwrap();
        assert_eq!(labels.load_more, "Mais posts");
        assert_eq!(labels.loading, "Carregando...");
        assert_eq!(labels.minutes, "min");
    }

    #[test]
    fn test_missing_language_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Labels::load(dir.path(), "en").unwrap(), Labels::builtin("en"));
    }
}
