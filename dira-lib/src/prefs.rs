//! Preference profiles: checklist field ordering and required-field rules.
//!
//! Everything in this module is pure and synchronous. Operations take a
//! profile snapshot and hand back an updated copy; the input is never
//! touched, so a caller that gets a [`Rejection`] simply keeps the snapshot
//! it already had. Loading and saving snapshots is the repository's job.

use std::cmp::Ordering;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fields::FieldKind;

/// Upper bound on how many fields one profile may mark as required.
pub const REQUIRED_FIELD_CAP: usize = 3;

const CUSTOM_ID_PREFIX: &str = "custom_";

pub type Result<T> = std::result::Result<T, Rejection>;

/// A state transition the engine refused to apply.
///
/// These are advisories meant for the user, not failures: the profile the
/// caller holds is unchanged and remains valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("a profile may mark at most 3 required fields")]
    RequiredCap,
    #[error("field labels must not be empty")]
    BlankLabel,
    #[error("profile names must not be empty")]
    BlankName,
    #[error("built-in fields cannot be deleted")]
    BuiltInField,
    #[error("this profile has no field with id {0:?}")]
    UnknownField(String),
}

/// One checklist field as a profile sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileField {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
    pub is_custom: bool,
}

/// A named preference profile: which checklist fields exist for its owner,
/// how they are ordered, and which ones are required.
///
/// Invariants upheld by the operations below: `field_order` holds no
/// duplicates, every id in `field_order` and `required_fields` references a
/// member of `fields`, and `required_fields` never exceeds
/// [`REQUIRED_FIELD_CAP`] entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    pub id: String,
    pub name: String,
    pub fields: Vec<ProfileField>,
    pub field_order: Vec<String>,
    pub required_fields: Vec<String>,
}

impl PreferenceProfile {
    /// A fresh profile over the given base catalogue, in catalogue order,
    /// with nothing required. The id comes from the caller because storage
    /// assigns ids, not the engine.
    pub fn new(id: impl Into<String>, name: &str, base_fields: &[ProfileField]) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Rejection::BlankName);
        }

        Ok(Self {
            id: id.into(),
            name: name.to_string(),
            fields: base_fields.to_vec(),
            field_order: base_fields.iter().map(|field| field.id.clone()).collect(),
            required_fields: Vec::new(),
        })
    }

    pub fn field(&self, field_id: &str) -> Option<&ProfileField> {
        self.fields.iter().find(|field| field.id == field_id)
    }

    pub fn is_required(&self, field_id: &str) -> bool {
        self.required_fields.iter().any(|id| id == field_id)
    }

    /// Mark or clear a field's required status.
    ///
    /// Clearing an id that is not currently required is a no-op, so repeated
    /// "clear" calls are idempotent. Marking a fourth field is rejected with
    /// [`Rejection::RequiredCap`]; no call sequence can push the required
    /// set past the cap.
    pub fn set_required(&self, field_id: &str, required: bool) -> Result<Self> {
        let mut next = self.clone();

        if !required {
            next.required_fields.retain(|id| id != field_id);
            return Ok(next);
        }

        if next.field(field_id).is_none() {
            return Err(Rejection::UnknownField(field_id.to_string()));
        }
        if next.is_required(field_id) {
            return Ok(next);
        }
        if next.required_fields.len() >= REQUIRED_FIELD_CAP {
            return Err(Rejection::RequiredCap);
        }

        next.required_fields.push(field_id.to_string());
        Ok(next)
    }

    /// Flip a field's required status.
    pub fn toggle_required(&self, field_id: &str) -> Result<Self> {
        self.set_required(field_id, !self.is_required(field_id))
    }

    /// Append a user-defined field. The fresh id is prefixed so it can never
    /// collide with a built-in id, and the field starts unrequired at the
    /// end of the display order.
    pub fn add_custom_field(&self, label: &str, kind: FieldKind) -> Result<Self> {
        let label = label.trim();
        if label.is_empty() {
            return Err(Rejection::BlankLabel);
        }

        let mut next = self.clone();
        let id = next.fresh_custom_id();
        next.fields.push(ProfileField {
            id: id.clone(),
            label: label.to_string(),
            kind,
            is_custom: true,
        });
        next.field_order.push(id);

        Ok(next)
    }

    /// Remove a user-defined field from `fields`, `field_order`, and
    /// `required_fields` in one step. Built-in fields cannot be deleted.
    pub fn delete_custom_field(&self, field_id: &str) -> Result<Self> {
        let Some(field) = self.field(field_id) else {
            return Err(Rejection::UnknownField(field_id.to_string()));
        };
        if !field.is_custom {
            return Err(Rejection::BuiltInField);
        }

        let mut next = self.clone();
        next.fields.retain(|field| field.id != field_id);
        next.field_order.retain(|id| id != field_id);
        next.required_fields.retain(|id| id != field_id);

        Ok(next)
    }

    /// Move the id at `from` to `to` in the display order, shifting the
    /// entries in between. Identity when the indices coincide, fall outside
    /// the order, or `from` no longer holds `field_id` (a stale drag).
    pub fn reorder(&self, field_id: &str, from: usize, to: usize) -> Self {
        if from == to || to >= self.field_order.len() {
            return self.clone();
        }
        if self.field_order.get(from).map(String::as_str) != Some(field_id) {
            return self.clone();
        }

        let mut next = self.clone();
        let moved = next.field_order.remove(from);
        next.field_order.insert(to, moved);

        next
    }

    fn fresh_custom_id(&self) -> String {
        let mut stamp = Utc::now().timestamp_millis();
        loop {
            let candidate = format!("{CUSTOM_ID_PREFIX}{stamp}");
            if self.field(&candidate).is_none() {
                return candidate;
            }
            stamp += 1;
        }
    }
}

/// Resolve the display order of checklist fields.
///
/// With no profile selected (the "default" sentinel) the base catalogue
/// passes through untouched. With a profile selected, its own fields are
/// stably sorted by position in `field_order`: ordered fields first, in
/// order; fields missing from `field_order` after them, keeping their
/// relative input positions. Order entries that reference no field are
/// inert. The inputs are never modified, so the result can be re-derived
/// at any time.
pub fn resolve_field_order(
    base_fields: &[ProfileField],
    selected: Option<&PreferenceProfile>,
) -> Vec<ProfileField> {
    let Some(profile) = selected else {
        return base_fields.to_vec();
    };

    let position = |field: &ProfileField| {
        profile
            .field_order
            .iter()
            .position(|id| *id == field.id)
    };

    let mut ordered = profile.fields.clone();
    ordered.sort_by(|a, b| match (position(a), position(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    ordered
}
