use std::{fs, sync::Arc};

use getset::Getters;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    fields::{FieldKind, builtin_checklist_fields},
    fs::config_dir,
    prefs::ProfileField,
};

pub(crate) type Cfg = Arc<RwLock<CoreConfig>>;

const CONFIG_FILE: &str = "config.toml";

/// User configuration, read from `config.toml` in the XDG config directory.
/// A missing or unreadable file falls back to the defaults.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Symbol shown in front of money amounts.
    #[getset(get = "pub")]
    #[serde(default = "default_currency")]
    currency: String,
    /// Replaces the built-in checklist categories when non-empty. New
    /// preference profiles start from this catalogue.
    #[serde(default)]
    checklist_fields: Vec<CatalogueField>,
}

/// One checklist category as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueField {
    id: String,
    label: String,
    #[serde(default = "default_kind")]
    kind: FieldKind,
}

impl CoreConfig {
    pub fn load() -> Self {
        let path = config_dir().join(CONFIG_FILE);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };

        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                warn!("Ignoring malformed {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// The base checklist catalogue handed to new preference profiles and to
    /// the field-ordering resolver when no profile is selected.
    pub fn base_fields(&self) -> Vec<ProfileField> {
        if self.checklist_fields.is_empty() {
            return builtin_checklist_fields();
        }

        self.checklist_fields
            .iter()
            .map(|field| ProfileField {
                id: field.id.clone(),
                label: field.label.clone(),
                kind: field.kind,
                is_custom: false,
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn mock() -> Self {
        Self::default()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            checklist_fields: Vec::new(),
        }
    }
}

fn default_currency() -> String {
    "₪".to_string()
}

fn default_kind() -> FieldKind {
    FieldKind::Text
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();

        assert_eq!(config.currency(), "₪");
        assert_eq!(config.base_fields().len(), 6);
    }

    #[test]
    fn test_parse_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
currency = "$"

[[checklist_fields]]
id = "commute"
label = "Commute time"
kind = "number"

[[checklist_fields]]
id = "light"
label = "Natural light"
"#
        )
        .unwrap();

        let raw = fs::read_to_string(file.path()).unwrap();
        let config: CoreConfig = toml::from_str(&raw).unwrap();

        assert_eq!(config.currency(), "$");

        let fields = config.base_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.first().unwrap().kind, FieldKind::Number);
        assert_eq!(fields.last().unwrap().kind, FieldKind::Text);
        assert!(fields.iter().all(|field| !field.is_custom));
    }
}
