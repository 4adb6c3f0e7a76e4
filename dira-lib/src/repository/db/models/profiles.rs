use agdb::{DbElement, DbId};

use crate::{fields::FieldKind, prefs::ProfileField, repository::entities::Uid};

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub(crate) struct ProfileModel {
    db_id: Option<DbId>,
    uid: u64,
    name: String,
    field_order: Vec<String>,
    required_fields: Vec<String>,
}

impl ProfileModel {
    pub fn new(uid: Uid, name: &str, field_order: Vec<String>) -> Self {
        Self {
            db_id: None,
            uid: uid.0,
            name: name.to_string(),
            field_order,
            required_fields: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub(crate) struct ProfileFieldModel {
    db_id: Option<DbId>,
    uid: u64,
    field_id: String,
    label: String,
    kind: FieldKind,
    is_custom: bool,
    position: u64,
}

impl ProfileFieldModel {
    pub fn new(uid: Uid, field: &ProfileField, position: u64) -> Self {
        Self {
            db_id: None,
            uid: uid.0,
            field_id: field.id.clone(),
            label: field.label.clone(),
            kind: field.kind,
            is_custom: field.is_custom,
            position,
        }
    }
}
