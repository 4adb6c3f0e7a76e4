//! Field vocabulary shared by the lister and seeker sides.
//!
//! Every field carries an explicit [`FieldKind`] decided when the field is
//! created; nothing downstream ever infers a kind from label text.

use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::prefs::ProfileField;

pub type Result<T> = std::result::Result<T, FieldError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("cannot read {value:?} as a {kind} value")]
    Parse { kind: FieldKind, value: String },
    #[error("field specs look like \"Label:kind=value\", got {0:?}")]
    Spec(String),
}

/// How a field is entered and displayed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    clap::ValueEnum,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    LongText,
    Number,
    Boolean,
}

/// A typed listing-field payload. `LongText` fields share the `Text`
/// representation and differ only in how they are rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl FieldValue {
    /// Parse a raw string according to the field's kind.
    pub fn parse(kind: FieldKind, raw: &str) -> Result<Self> {
        match kind {
            FieldKind::Text | FieldKind::LongText => Ok(Self::Text(raw.to_string())),
            FieldKind::Number => raw
                .trim()
                .parse()
                .map(Self::Number)
                .map_err(|_| FieldError::Parse {
                    kind,
                    value: raw.to_string(),
                }),
            FieldKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Ok(Self::Boolean(true)),
                "false" | "no" | "n" | "0" => Ok(Self::Boolean(false)),
                _ => Err(FieldError::Parse {
                    kind,
                    value: raw.to_string(),
                }),
            },
        }
    }

    /// Whether this value counts as "not filled in". Only text can be empty;
    /// a parsed number or boolean always carries information.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    /// Storage form. [`FieldValue::parse`] accepts everything this produces.
    pub fn encode(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
            Self::Boolean(boolean) => boolean.to_string(),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::Boolean(true) => write!(f, "yes"),
            Self::Boolean(false) => write!(f, "no"),
        }
    }
}

/// One field on a listing, as entered by the landlord.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingField {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: FieldValue,
    pub is_custom: bool,
    pub position: u64,
}

/// Label and kind of a field before it has a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
}

/// The fields every listing starts from. All of these must carry a value
/// when the listing is created.
pub fn builtin_listing_fields() -> Vec<FieldDef> {
    [
        ("address", "Address", FieldKind::Text),
        ("rent", "Monthly rent", FieldKind::Number),
        ("floor", "Floor", FieldKind::Number),
        ("balcony", "Balcony", FieldKind::Boolean),
    ]
    .into_iter()
    .map(|(id, label, kind)| FieldDef {
        id: id.to_string(),
        label: label.to_string(),
        kind,
    })
    .collect()
}

/// The checklist categories every preference profile starts from.
pub fn builtin_checklist_fields() -> Vec<ProfileField> {
    [
        ("location", "Location & Neighborhood"),
        ("condition", "Apartment Condition"),
        ("size", "Size & Layout"),
        ("price", "Price Value"),
        ("landlord", "Landlord/Agent"),
        ("amenities", "Amenities & Features"),
    ]
    .into_iter()
    .map(|(id, label)| ProfileField {
        id: id.to_string(),
        label: label.to_string(),
        kind: FieldKind::Text,
        is_custom: false,
    })
    .collect()
}

/// Derive an id for a custom listing field from its label, bumping a numeric
/// suffix until it is unique among `existing`.
pub fn listing_field_id(label: &str, existing: &[ListingField]) -> String {
    let slug = label.to_snake_case();
    let base = if slug.is_empty() {
        "field".to_string()
    } else {
        slug
    };

    let mut candidate = base.clone();
    let mut bump = 2;
    while existing.iter().any(|field| field.id == candidate) {
        candidate = format!("{base}_{bump}");
        bump += 1;
    }

    candidate
}

/// Parse a `"Label:kind=value"` custom-field spec. The kind defaults to
/// `text` when omitted (`"Label=value"`).
pub fn parse_field_spec(spec: &str) -> Result<(String, FieldKind, FieldValue)> {
    let (head, raw_value) = spec
        .split_once('=')
        .ok_or_else(|| FieldError::Spec(spec.to_string()))?;

    let (label, kind) = match head.rsplit_once(':') {
        Some((label, kind)) => (
            label,
            kind.trim()
                .parse()
                .map_err(|_| FieldError::Spec(spec.to_string()))?,
        ),
        None => (head, FieldKind::Text),
    };

    let label = label.trim();
    if label.is_empty() {
        return Err(FieldError::Spec(spec.to_string()));
    }

    Ok((label.to_string(), kind, FieldValue::parse(kind, raw_value)?))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(
            FieldValue::parse(FieldKind::Number, " 4200 ").unwrap(),
            FieldValue::Number(4200.0)
        );
        assert!(FieldValue::parse(FieldKind::Number, "a lot").is_err());
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(
            FieldValue::parse(FieldKind::Boolean, "yes").unwrap(),
            FieldValue::Boolean(true)
        );
        assert_eq!(
            FieldValue::parse(FieldKind::Boolean, "0").unwrap(),
            FieldValue::Boolean(false)
        );
        assert!(FieldValue::parse(FieldKind::Boolean, "maybe").is_err());
    }

    #[test]
    fn test_encode_round_trips() {
        for value in [
            FieldValue::Text("ground floor, quiet".to_string()),
            FieldValue::Number(3.5),
            FieldValue::Boolean(true),
        ] {
            let kind = match value {
                FieldValue::Text(_) => FieldKind::Text,
                FieldValue::Number(_) => FieldKind::Number,
                FieldValue::Boolean(_) => FieldKind::Boolean,
            };
            assert_eq!(FieldValue::parse(kind, &value.encode()).unwrap(), value);
        }
    }

    #[test]
    fn test_empty_values() {
        assert!(FieldValue::Text("   ".to_string()).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
        assert!(!FieldValue::Boolean(false).is_empty());
    }

    #[test]
    fn test_builtin_catalogues() {
        assert_eq!(builtin_listing_fields().len(), 4);

        let checklist = builtin_checklist_fields();
        assert_eq!(checklist.len(), 6);
        assert!(checklist.iter().all(|field| !field.is_custom));
    }

    #[test]
    fn test_listing_field_id_slug_and_bump() {
        let mut existing = Vec::new();
        let first = listing_field_id("Pet Friendly?", &existing);
        assert_eq!(first, "pet_friendly");

        existing.push(ListingField {
            id: first,
            label: "Pet Friendly?".to_string(),
            kind: FieldKind::Boolean,
            value: FieldValue::Boolean(true),
            is_custom: true,
            position: 5,
        });

        assert_eq!(listing_field_id("Pet Friendly?", &existing), "pet_friendly_2");
    }

    #[test]
    fn test_parse_field_spec() {
        let (label, kind, value) = parse_field_spec("Pets allowed:boolean=yes").unwrap();
        assert_eq!(label, "Pets allowed");
        assert_eq!(kind, FieldKind::Boolean);
        assert_eq!(value, FieldValue::Boolean(true));

        let (label, kind, value) = parse_field_spec("Parking=street only").unwrap();
        assert_eq!(label, "Parking");
        assert_eq!(kind, FieldKind::Text);
        assert_eq!(value, FieldValue::Text("street only".to_string()));

        assert!(parse_field_spec("no equals sign").is_err());
        assert!(parse_field_spec(":number=3").is_err());
    }
}
