use agdb::{DbElement, DbId};
use chrono::Utc;

use crate::{
    checklist::{Photo, Rating},
    repository::{db::models::TrackSource, entities::Uid},
};

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub(crate) struct TrackedModel {
    db_id: Option<DbId>,
    uid: u64,
    source: TrackSource,
    /// UID of the internal listing this entry points at; 0 for external ones.
    listing_uid: u64,
    address: String,
    /// Monthly rent; 0 means "not given", mirroring the source data where a
    /// missing rent and a zero rent were indistinguishable.
    rent: f64,
    notes: String,
    created_at: String,
    general_notes: String,
    pros: String,
    cons: String,
}

impl TrackedModel {
    pub fn internal(uid: Uid, listing_uid: u64) -> Self {
        Self::new(uid, TrackSource::Internal, listing_uid, "", 0.0, "")
    }

    pub fn external(uid: Uid, address: &str, rent: f64, notes: &str) -> Self {
        Self::new(uid, TrackSource::ExternalManual, 0, address, rent, notes)
    }

    fn new(
        uid: Uid,
        source: TrackSource,
        listing_uid: u64,
        address: &str,
        rent: f64,
        notes: &str,
    ) -> Self {
        Self {
            db_id: None,
            uid: uid.0,
            source,
            listing_uid,
            address: address.to_string(),
            rent,
            notes: notes.to_string(),
            created_at: Utc::now().to_rfc3339(),
            general_notes: String::new(),
            pros: String::new(),
            cons: String::new(),
        }
    }
}

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub(crate) struct RatingModel {
    db_id: Option<DbId>,
    uid: u64,
    field_id: String,
    score: u64,
    notes: String,
}

impl RatingModel {
    pub fn new(uid: Uid, field_id: &str, rating: &Rating) -> Self {
        Self {
            db_id: None,
            uid: uid.0,
            field_id: field_id.to_string(),
            score: u64::from(rating.score()),
            notes: rating.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub(crate) struct PhotoModel {
    db_id: Option<DbId>,
    uid: u64,
    url: String,
    created_at: String,
}

impl PhotoModel {
    pub fn new(uid: Uid, photo: &Photo) -> Self {
        Self {
            db_id: None,
            uid: uid.0,
            url: photo.url.clone(),
            created_at: photo.created_at.clone(),
        }
    }
}
