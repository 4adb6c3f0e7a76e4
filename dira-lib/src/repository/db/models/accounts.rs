use agdb::{DbElement, DbId};
use chrono::Utc;

use crate::repository::entities::Uid;

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub(crate) struct AccountModel {
    db_id: Option<DbId>,
    uid: u64,
    email: String,
    created_at: String,
}

impl AccountModel {
    pub fn new(uid: Uid, email: &str) -> Self {
        Self {
            db_id: None,
            uid: uid.0,
            email: email.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}
