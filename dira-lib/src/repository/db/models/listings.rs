use agdb::{DbElement, DbId};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    fields::{FieldKind, ListingField},
    repository::entities::Uid,
};

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub(crate) struct ListingModel {
    db_id: Option<DbId>,
    uid: u64,
    owner_email: String,
    /// Unguessable token the owner needs to change the listing later.
    edit_token: String,
    created_at: String,
}

impl ListingModel {
    pub fn new(uid: Uid, owner_email: &str) -> Self {
        Self {
            db_id: None,
            uid: uid.0,
            owner_email: owner_email.to_string(),
            edit_token: Uuid::new_v4().simple().to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub(crate) struct ListingFieldModel {
    db_id: Option<DbId>,
    uid: u64,
    field_id: String,
    label: String,
    kind: FieldKind,
    value: String,
    is_custom: bool,
    position: u64,
}

impl ListingFieldModel {
    pub fn new(uid: Uid, field: &ListingField) -> Self {
        Self {
            db_id: None,
            uid: uid.0,
            field_id: field.id.clone(),
            label: field.label.clone(),
            kind: field.kind,
            value: field.value.encode(),
            is_custom: field.is_custom,
            position: field.position,
        }
    }
}
