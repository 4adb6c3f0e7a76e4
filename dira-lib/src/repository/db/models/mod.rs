use agdb::{DbError, DbValue};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::fields::FieldKind;

mod accounts;
mod listings;
mod profiles;
mod tracked;

pub(crate) use accounts::AccountModel;
pub(crate) use listings::{ListingFieldModel, ListingModel};
pub(crate) use profiles::{ProfileFieldModel, ProfileModel};
pub(crate) use tracked::{PhotoModel, RatingModel, TrackedModel};

/// Where a tracked listing came from: one of dira's own listings, or an
/// apartment the seeker found elsewhere and entered by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
    Internal,
    ExternalManual,
}

impl From<TrackSource> for DbValue {
    fn from(source: TrackSource) -> Self {
        source.to_string().into()
    }
}

impl TryFrom<DbValue> for TrackSource {
    type Error = DbError;

    fn try_from(value: DbValue) -> Result<Self, DbError> {
        let raw = String::try_from(value)?;
        raw.parse()
            .map_err(|_| DbError::from(format!("invalid track source: {raw}")))
    }
}

impl From<FieldKind> for DbValue {
    fn from(kind: FieldKind) -> Self {
        kind.to_string().into()
    }
}

impl TryFrom<DbValue> for FieldKind {
    type Error = DbError;

    fn try_from(value: DbValue) -> Result<Self, DbError> {
        let raw = String::try_from(value)?;
        raw.parse()
            .map_err(|_| DbError::from(format!("invalid field kind: {raw}")))
    }
}
