use std::fmt::Debug;

use agdb::{DbId, DbValue, QueryBuilder};
use tracing::debug;

use crate::{
    fields::{FieldValue, ListingField, builtin_listing_fields},
    repository::{
        db::{
            Db,
            models::{ListingFieldModel, ListingModel},
        },
        entities::{EntityId, Error, Result, Uid, get_field, set_field},
    },
};

/// Represents a published apartment listing in the dira system.
///
/// Listings are created by landlords and carry an ordered set of typed
/// fields. Changing a field later requires the edit token that was handed
/// out at creation time. Always reflects the current database state.
#[derive(Debug, Clone)]
pub struct Listing {
    pub(crate) id: EntityId,
    pub(crate) db: Db,
}

impl Listing {
    pub(crate) fn load(db_id: DbId, db: Db) -> Result<Self> {
        let id = EntityId::load(&db, db_id)?;
        Ok(Self { id, db })
    }

    // Fields

    pub fn uid(&self) -> u64 {
        self.id.uid()
    }

    pub fn owner_email(&self) -> Result<String> {
        self.get_field("owner_email")
    }

    pub fn edit_token(&self) -> Result<String> {
        self.get_field("edit_token")
    }

    pub fn created_at(&self) -> Result<String> {
        self.get_field("created_at")
    }

    /// All fields of this listing, in display order.
    pub fn fields(&self) -> Result<Vec<ListingField>> {
        let mut fields = Vec::new();
        for element_id in self.field_node_ids()? {
            let id = EntityId::load(&self.db, element_id)?;
            let kind = get_field(&self.db, id, "kind")?;
            let raw: String = get_field(&self.db, id, "value")?;
            fields.push(ListingField {
                id: get_field(&self.db, id, "field_id")?,
                label: get_field(&self.db, id, "label")?,
                kind,
                value: FieldValue::parse(kind, &raw)?,
                is_custom: get_field(&self.db, id, "is_custom")?,
                position: get_field(&self.db, id, "position")?,
            });
        }

        fields.sort_by_key(|field| field.position);

        Ok(fields)
    }

    /// The listing's address, for display. Every listing has one because the
    /// address is a built-in field.
    pub fn address(&self) -> Result<String> {
        Ok(self
            .fields()?
            .into_iter()
            .find(|field| field.id == "address")
            .map(|field| field.value.to_string())
            .unwrap_or_default())
    }

    // Operations

    /// Change one field's value. `token` must match the edit token handed
    /// out when the listing was created.
    pub fn set_field_value(&self, field_id: &str, raw: &str, token: &str) -> Result<()> {
        if token != self.edit_token()? {
            return Err(Error::EditTokenMismatch);
        }

        for element_id in self.field_node_ids()? {
            let id = EntityId::load(&self.db, element_id)?;
            let current: String = get_field(&self.db, id, "field_id")?;
            if current != field_id {
                continue;
            }

            let kind = get_field(&self.db, id, "kind")?;
            let value = FieldValue::parse(kind, raw)?;
            set_field(&self.db, id, "value", value.encode())?;

            debug!("Updated field {field_id} on listing {}", self.uid());

            return Ok(());
        }

        Err(Error::UnknownListingField(field_id.to_string()))
    }

    /// Take the listing down. Like edits, this requires the edit token.
    pub fn remove(self, token: &str) -> Result<()> {
        if token != self.edit_token()? {
            return Err(Error::EditTokenMismatch);
        }

        let uid = self.uid();
        let field_ids = self.field_node_ids()?;
        let db_id = self.id.db_id(&self.db)?;

        self.db.write().transaction_mut(|t| -> Result<()> {
            if !field_ids.is_empty() {
                t.exec_mut(QueryBuilder::remove().ids(field_ids).query())?;
            }
            t.exec_mut(QueryBuilder::remove().ids(db_id).query())?;

            Ok(())
        })?;

        debug!("Removed listing: {uid}");

        Ok(())
    }

    /// Insert a new [`Listing`]. Every built-in field must be present and
    /// carry a value; custom fields are free-form.
    pub(crate) fn add(db: &Db, owner_email: &str, fields: &[ListingField]) -> Result<Self> {
        let owner_email = owner_email.trim();
        if owner_email.is_empty()
            || !owner_email.contains('@')
            || owner_email.contains(char::is_whitespace)
        {
            return Err(Error::InvalidEmail(owner_email.to_string()));
        }

        for def in builtin_listing_fields() {
            let present = fields
                .iter()
                .any(|field| field.id == def.id && !field.value.is_empty());
            if !present {
                return Err(Error::MissingFieldValue(def.label));
            }
        }

        let model = ListingModel::new(Uid::new(db)?, owner_email);
        let field_models = fields
            .iter()
            .map(|field| Ok(ListingFieldModel::new(Uid::new(db)?, field)))
            .collect::<Result<Vec<_>>>()?;

        let listing_id = db.write().transaction_mut(|t| -> Result<DbId> {
            let listing_id = t
                .exec_mut(QueryBuilder::insert().element(model).query())?
                .elements
                .first()
                .expect("ListingModel insertion should return the ID as the first element")
                .id;

            t.exec_mut(
                QueryBuilder::insert()
                    .edges()
                    .from("listings")
                    .to(listing_id)
                    .query(),
            )?;

            for field_model in field_models {
                let field_id = t
                    .exec_mut(QueryBuilder::insert().element(field_model).query())?
                    .elements
                    .first()
                    .expect("ListingFieldModel insertion should return the ID as the first element")
                    .id;

                t.exec_mut(
                    QueryBuilder::insert()
                        .edges()
                        .from(listing_id)
                        .to(field_id)
                        .query(),
                )?;
            }

            Ok(listing_id)
        })?;

        let listing = Listing::load(listing_id, db.clone())?;

        debug!(
            "Created listing {} for {owner_email}",
            listing.uid()
        );

        Ok(listing)
    }

    pub(crate) fn list(db: &Db) -> Result<Vec<Self>> {
        Ok(db
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<ListingModel>()
                    .search()
                    .from("listings")
                    .where_()
                    .node()
                    .and()
                    .neighbor()
                    .query(),
            )?
            .elements
            .iter()
            .map(|e| Listing::load(e.id, db.clone()).unwrap())
            .collect())
    }

    pub(crate) fn find(db: &Db, uid: u64) -> Result<Option<Self>> {
        Ok(Listing::list(db)?
            .into_iter()
            .find(|listing| listing.uid() == uid))
    }

    fn field_node_ids(&self) -> Result<Vec<DbId>> {
        let db_id = self.id.db_id(&self.db)?;
        Ok(self
            .db
            .read()
            .exec(
                QueryBuilder::select()
                    .search()
                    .from(db_id)
                    .where_()
                    .neighbor()
                    .and()
                    .keys("field_id")
                    .query(),
            )?
            .elements
            .iter()
            .map(|e| e.id)
            .collect())
    }

    fn get_field<T>(&self, field: &str) -> Result<T>
    where
        T: TryFrom<DbValue>,
        T::Error: Debug,
    {
        get_field(&self.db, self.id, field)
    }
}

impl PartialEq for Listing {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod test {
    use crate::{
        Repository,
        fields::{FieldKind, FieldValue, ListingField, builtin_listing_fields},
        repository::entities::Error,
    };

    fn sample_fields() -> Vec<ListingField> {
        let values = [
            FieldValue::Text("12 Herzl St, Tel Aviv".to_string()),
            FieldValue::Number(5200.0),
            FieldValue::Number(3.0),
            FieldValue::Boolean(true),
        ];

        builtin_listing_fields()
            .into_iter()
            .zip(values)
            .enumerate()
            .map(|(position, (def, value))| ListingField {
                id: def.id,
                label: def.label,
                kind: def.kind,
                value,
                is_custom: false,
                position: u64::try_from(position).unwrap(),
            })
            .collect()
    }

    #[test]
    fn test_create() {
        let repo = Repository::mock();

        let listing = repo
            .create_listing("landlord@example.com", &sample_fields())
            .unwrap();

        assert_eq!(listing.owner_email().unwrap(), "landlord@example.com");
        assert_eq!(listing.address().unwrap(), "12 Herzl St, Tel Aviv");
        assert!(!listing.edit_token().unwrap().is_empty());
        assert_eq!(repo.listings().unwrap().len(), 1);
    }

    #[test]
    fn test_create_requires_builtin_values() {
        let repo = Repository::mock();

        let mut fields = sample_fields();
        for field in &mut fields {
            if field.id == "address" {
                field.value = FieldValue::Text("  ".to_string());
            }
        }

        assert!(matches!(
            repo.create_listing("landlord@example.com", &fields),
            Err(crate::Error::Repository(Error::MissingFieldValue(_)))
        ));
    }

    #[test]
    fn test_fields_keep_position_order() {
        let repo = Repository::mock();

        let mut fields = sample_fields();
        fields.push(ListingField {
            id: "pet_friendly".to_string(),
            label: "Pet friendly".to_string(),
            kind: FieldKind::Boolean,
            value: FieldValue::Boolean(false),
            is_custom: true,
            position: 4,
        });
        fields.reverse();

        let listing = repo
            .create_listing("landlord@example.com", &fields)
            .unwrap();

        let stored = listing.fields().unwrap();
        assert_eq!(stored.len(), 5);
        assert_eq!(stored.first().unwrap().id, "address");
        assert_eq!(stored.last().unwrap().id, "pet_friendly");
    }

    #[test]
    fn test_set_field_value_needs_matching_token() {
        let repo = Repository::mock();

        let listing = repo
            .create_listing("landlord@example.com", &sample_fields())
            .unwrap();

        assert!(matches!(
            listing.set_field_value("rent", "5500", "wrong token"),
            Err(Error::EditTokenMismatch)
        ));

        let token = listing.edit_token().unwrap();
        listing.set_field_value("rent", "5500", &token).unwrap();

        let rent = listing
            .fields()
            .unwrap()
            .into_iter()
            .find(|field| field.id == "rent")
            .unwrap();
        assert_eq!(rent.value, FieldValue::Number(5500.0));
    }

    #[test]
    fn test_set_field_value_rejects_bad_number() {
        let repo = Repository::mock();

        let listing = repo
            .create_listing("landlord@example.com", &sample_fields())
            .unwrap();
        let token = listing.edit_token().unwrap();

        assert!(matches!(
            listing.set_field_value("rent", "cheap", &token),
            Err(Error::InvalidValue(_))
        ));
    }

    #[test]
    fn test_remove_needs_matching_token() {
        let repo = Repository::mock();

        let listing = repo
            .create_listing("landlord@example.com", &sample_fields())
            .unwrap();
        let token = listing.edit_token().unwrap();

        assert!(matches!(
            listing.clone().remove("wrong token"),
            Err(Error::EditTokenMismatch)
        ));

        listing.remove(&token).unwrap();

        assert_eq!(repo.listings().unwrap().len(), 0);
    }
}
