//! Internationalization (i18n) support
//!
//! Interface strings ship embedded for `en` and `pt-BR`; a site may add or
//! override languages with YAML files in its languages directory.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const BUILTIN_LANGUAGES: [(&str, &str); 2] = [
    ("en", include_str!("languages/en.yml")),
    ("pt-BR", include_str!("languages/pt-BR.yml")),
];

/// Internationalization handler
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, HashMap<String, serde_yaml::Value>>,
}

impl I18n {
    /// Create a handler with the built-in languages loaded
    pub fn new(language: &str) -> Self {
        let mut i18n = Self {
            language: language.to_string(),
            translations: HashMap::new(),
        };

        for (lang, content) in BUILTIN_LANGUAGES {
            match serde_yaml::from_str(content) {
                Ok(data) => {
                    i18n.translations.insert(lang.to_string(), data);
                }
                Err(e) => tracing::warn!("Invalid built-in language {}: {}", lang, e),
            }
        }

        i18n
    }

    /// Load language files from a directory, merging over built-in strings
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if !path.is_file() || !matches!(ext, Some("yml") | Some("yaml")) {
                continue;
            }

            let Some(lang) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(&content) {
                Ok(data) => {
                    self.translations
                        .entry(lang.to_string())
                        .or_default()
                        .extend(data);
                    tracing::debug!("Loaded language file: {:?}", path);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                }
            }
        }

        Ok(())
    }

    /// Get the current language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Get a translation by key
    /// Key can be nested like "not_found.title"
    pub fn get(&self, key: &str) -> String {
        self.get_for_lang(&self.language, key)
    }

    /// Get a translation for a specific language
    pub fn get_for_lang(&self, lang: &str, key: &str) -> String {
        for candidate in [lang, base_language(lang), "en"] {
            if let Some(value) = self
                .translations
                .get(candidate)
                .and_then(|data| get_nested_value(data, key))
            {
                return yaml_value_to_string(value);
            }
        }

        // Return key as fallback
        key.to_string()
    }

    /// Get a translation with `%d` replaced by `count`
    pub fn get_count(&self, key: &str, count: u32) -> String {
        self.get(key).replace("%d", &count.to_string())
    }

    /// Get all translations for the current language as a flat HashMap
    /// This flattens nested keys using dot notation (e.g., "not_found.title")
    pub fn get_all_translations(&self) -> HashMap<String, String> {
        let mut result = HashMap::new();

        for candidate in [self.language.as_str(), base_language(&self.language), "en"] {
            if let Some(data) = self.translations.get(candidate) {
                let mut flat = HashMap::new();
                flatten_translations(data, "", &mut flat);
                for (k, v) in flat {
                    result.entry(k).or_insert(v);
                }
            }
        }

        result
    }
}

/// `pt-BR` -> `pt`
fn base_language(lang: &str) -> &str {
    lang.split(['-', '_']).next().unwrap_or(lang)
}

/// Get a nested value from a YAML map using dot notation
fn get_nested_value<'a>(
    data: &'a HashMap<String, serde_yaml::Value>,
    key: &str,
) -> Option<&'a serde_yaml::Value> {
    let mut parts = key.split('.');
    let mut current = data.get(parts.next()?);

    for part in parts {
        match current {
            Some(serde_yaml::Value::Mapping(map)) => {
                current = map.get(part);
            }
            _ => return None,
        }
    }

    current
}

/// Convert a YAML value to a string
fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        _ => format!("{:?}", value),
    }
}

/// Flatten translations into a HashMap with dot-notation keys
fn flatten_translations(
    data: &HashMap<String, serde_yaml::Value>,
    prefix: &str,
    result: &mut HashMap<String, String>,
) {
    for (key, value) in data {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            serde_yaml::Value::Mapping(map) => {
                let nested: HashMap<String, serde_yaml::Value> = map
                    .iter()
                    .filter_map(|(k, v)| Some((k.as_str()?.to_string(), v.clone())))
                    .collect();
                flatten_translations(&nested, &full_key, result);
            }
            serde_yaml::Value::Sequence(_) | serde_yaml::Value::Tagged(_) => {}
            scalar => {
                result.insert(full_key, yaml_value_to_string(scalar));
            }
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("en")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_translations() {
        let i18n = I18n::new("pt-BR");
        assert_eq!(i18n.get("load_more"), "Carregar mais posts");
        assert_eq!(i18n.get("not_found.back"), "Voltar para o início");
        assert_eq!(i18n.get_count("reading_time", 4), "4 min");
        assert_eq!(i18n.get("unknown"), "unknown");
    }

    #[test]
    fn test_fallback_to_english() {
        let i18n = I18n::new("de");
        assert_eq!(i18n.get("load_more"), "Load more posts");
        assert_eq!(I18n::default().language(), "en");
    }

    #[test]
    fn test_load_languages_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pt-BR.yml"), "load_more: Mais posts\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut i18n = I18n::new("pt-BR");
        i18n.load_languages(dir.path()).unwrap();
        assert_eq!(i18n.get("load_more"), "Mais posts");
        assert_eq!(i18n.get("loading"), "Carregando...");
    }

    #[test]
    fn test_get_all_translations() {
        let all = I18n::new("pt-BR").get_all_translations();
        assert_eq!(all.get("loading"), Some(&"Carregando...".to_string()));
        assert_eq!(
            all.get("not_found.title"),
            Some(&"Post não encontrado".to_string())
        );
    }
}
