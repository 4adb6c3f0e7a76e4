use std::fmt::Debug;

use agdb::{DbId, DbValue, QueryBuilder, QueryId};
use tracing::debug;

use crate::{
    prefs::{PreferenceProfile, ProfileField, Rejection},
    repository::{
        Cfg,
        db::{
            Db,
            models::{AccountModel, ProfileFieldModel, ProfileModel},
        },
        entities::{Account, EntityId, Error, Result, Uid, get_field},
    },
};

/// Represents a stored preference profile in the dira system.
///
/// The profile's data is edited through [`PreferenceProfile`] snapshots:
/// [`Profile::snapshot`] pulls the whole profile into memory, the pure
/// operations in [`crate::prefs`] produce an updated copy, and
/// [`Profile::save`] persists it in one transaction.
#[derive(Debug, Clone)]
pub struct Profile {
    pub(crate) id: EntityId,
    pub(crate) db: Db,
    pub(crate) cfg: Cfg,
}

impl Profile {
    pub(crate) fn load(db_id: DbId, db: Db, cfg: Cfg) -> Result<Self> {
        let id = EntityId::load(&db, db_id)?;
        Ok(Self { id, db, cfg })
    }

    // Fields

    pub fn uid(&self) -> u64 {
        self.id.uid()
    }

    pub fn name(&self) -> Result<String> {
        self.get_field("name")
    }

    /// Returns the [`Account`] that owns this profile
    pub fn owner(&self) -> Result<Account> {
        let owner_id = self
            .db
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<AccountModel>()
                    .search()
                    .from("accounts")
                    .to(self.id.db_id(&self.db)?)
                    .query(),
            )?
            .elements
            .pop()
            .expect("a Profile should have an owning Account")
            .id;

        Account::load(owner_id, self.db.clone(), self.cfg.clone())
    }

    // Snapshots

    /// Pull the whole profile into an in-memory snapshot.
    pub fn snapshot(&self) -> Result<PreferenceProfile> {
        Ok(PreferenceProfile {
            id: self.uid().to_string(),
            name: self.name()?,
            fields: self.fields()?,
            field_order: self.get_field("field_order")?,
            required_fields: self.get_field("required_fields")?,
        })
    }

    /// Persist a mutated snapshot wholesale: name, order, required set, and
    /// the full field list, all in one transaction. The caller is expected
    /// to have produced `snapshot` with the operations in [`crate::prefs`],
    /// which uphold the profile invariants.
    pub fn save(&self, snapshot: &PreferenceProfile) -> Result<()> {
        let name = snapshot.name.trim();
        if name.is_empty() {
            return Err(Rejection::BlankName.into());
        }

        // A rename must not collide with a sibling profile
        if name != self.name()? {
            let owner = self.owner()?;
            for sibling in owner.profiles()? {
                if sibling.uid() != self.uid() && sibling.name()? == name {
                    return Err(Error::DuplicateName);
                }
            }
        }

        let db_id = self.id.db_id(&self.db)?;
        let stale_fields = self.field_node_ids()?;
        let field_models = snapshot
            .fields
            .iter()
            .enumerate()
            .map(|(position, field)| {
                let position = u64::try_from(position).expect("field positions fit in u64");
                Ok(ProfileFieldModel::new(Uid::new(&self.db)?, field, position))
            })
            .collect::<Result<Vec<_>>>()?;

        self.db.write().transaction_mut(|t| -> Result<()> {
            t.exec_mut(
                QueryBuilder::insert()
                    .values([[
                        ("name", name).into(),
                        ("field_order", snapshot.field_order.clone()).into(),
                        ("required_fields", snapshot.required_fields.clone()).into(),
                    ]])
                    .ids(db_id)
                    .query(),
            )?;

            if !stale_fields.is_empty() {
                t.exec_mut(QueryBuilder::remove().ids(stale_fields).query())?;
            }

            for model in field_models {
                let field_id = t
                    .exec_mut(QueryBuilder::insert().element(model).query())?
                    .elements
                    .first()
                    .expect("ProfileFieldModel insertion should return the ID as the first element")
                    .id;

                t.exec_mut(
                    QueryBuilder::insert()
                        .edges()
                        .from(db_id)
                        .to(field_id)
                        .query(),
                )?;
            }

            Ok(())
        })?;

        debug!("Saved profile: {name}");

        Ok(())
    }

    // Operations

    pub fn remove(self) -> Result<()> {
        let name = self.name()?;

        let field_ids = self.field_node_ids()?;
        let db_id = self.id.db_id(&self.db)?;

        self.db.write().transaction_mut(|t| -> Result<()> {
            if !field_ids.is_empty() {
                t.exec_mut(QueryBuilder::remove().ids(field_ids).query())?;
            }
            t.exec_mut(QueryBuilder::remove().ids(db_id).query())?;

            Ok(())
        })?;

        debug!("Removed profile: {name}");

        Ok(())
    }

    /// Insert a new [`Profile`] for `account`, starting from the base field
    /// catalogue. The name must be unique among the account's profiles.
    pub(crate) fn add(
        db: &Db,
        cfg: &Cfg,
        account: &Account,
        name: &str,
        base_fields: &[ProfileField],
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Rejection::BlankName.into());
        }

        if account
            .profiles()?
            .iter()
            .any(|p: &Profile| p.name().unwrap() == name)
        {
            return Err(Error::DuplicateName);
        }

        let field_order = base_fields.iter().map(|field| field.id.clone()).collect();
        let model = ProfileModel::new(Uid::new(db)?, name, field_order);
        let field_models = base_fields
            .iter()
            .enumerate()
            .map(|(position, field)| {
                let position = u64::try_from(position).expect("field positions fit in u64");
                Ok(ProfileFieldModel::new(Uid::new(db)?, field, position))
            })
            .collect::<Result<Vec<_>>>()?;

        let account_id = account.id.db_id(db)?;
        let profile_id = db.write().transaction_mut(|t| -> Result<DbId> {
            let profile_id = t
                .exec_mut(QueryBuilder::insert().element(model).query())?
                .elements
                .first()
                .expect("ProfileModel insertion should return the ID as the first element")
                .id;

            // Link to the owning account and the root node
            t.exec_mut(
                QueryBuilder::insert()
                    .edges()
                    .from([QueryId::from("profiles"), QueryId::from(account_id)])
                    .to(profile_id)
                    .query(),
            )?;

            for field_model in field_models {
                let field_id = t
                    .exec_mut(QueryBuilder::insert().element(field_model).query())?
                    .elements
                    .first()
                    .expect("ProfileFieldModel insertion should return the ID as the first element")
                    .id;

                t.exec_mut(
                    QueryBuilder::insert()
                        .edges()
                        .from(profile_id)
                        .to(field_id)
                        .query(),
                )?;
            }

            Ok(profile_id)
        })?;

        let profile = Profile::load(profile_id, db.clone(), cfg.clone())?;

        debug!("Created profile: {name}");

        Ok(profile)
    }

    pub(crate) fn list(db: &Db, cfg: &Cfg, account: &Account) -> Result<Vec<Self>> {
        let account_id = account.id.db_id(db)?;
        Ok(db
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<ProfileModel>()
                    .search()
                    .from(account_id)
                    .where_()
                    .neighbor()
                    .and()
                    .keys("field_order")
                    .query(),
            )?
            .elements
            .iter()
            .map(|e| Profile::load(e.id, db.clone(), cfg.clone()).unwrap())
            .collect())
    }

    /// The profile's fields in stored position order.
    fn fields(&self) -> Result<Vec<ProfileField>> {
        let mut fields = Vec::new();
        for element_id in self.field_node_ids()? {
            let id = EntityId::load(&self.db, element_id)?;
            let position: u64 = get_field(&self.db, id, "position")?;
            fields.push((
                position,
                ProfileField {
                    id: get_field(&self.db, id, "field_id")?,
                    label: get_field(&self.db, id, "label")?,
                    kind: get_field(&self.db, id, "kind")?,
                    is_custom: get_field(&self.db, id, "is_custom")?,
                },
            ));
        }

        fields.sort_by_key(|(position, _)| *position);

        Ok(fields.into_iter().map(|(_, field)| field).collect())
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

impl PartialEq for Profile {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod test {
    use crate::{
        Repository,
        fields::FieldKind,
        prefs::{REQUIRED_FIELD_CAP, resolve_field_order},
        repository::entities::Error,
    };

    #[test]
    fn test_add_uses_base_catalogue() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();

        let profile = account.add_profile("For me & my partner").unwrap();
        let snapshot = profile.snapshot().unwrap();

        assert_eq!(snapshot.name, "For me & my partner");
        assert_eq!(snapshot.fields.len(), 6);
        assert_eq!(snapshot.field_order.len(), 6);
        assert!(snapshot.required_fields.is_empty());
    }

    #[test]
    fn test_add_duplicate() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();

        account.add_profile("Quiet area").unwrap();

        assert!(matches!(
            account.add_profile("Quiet area"),
            Err(Error::DuplicateName)
        ));
    }

    #[test]
    fn test_add_blank_name() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();

        assert!(matches!(
            account.add_profile("  "),
            Err(Error::Rejected(_))
        ));
    }

    #[test]
    fn test_snapshot_save_round_trip() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        let profile = account.add_profile("Family").unwrap();

        let snapshot = profile.snapshot().unwrap();
        let moved = snapshot.fields.first().unwrap().id.clone();
        let mutated = snapshot
            .reorder(&moved, 0, 3)
            .toggle_required("price")
            .unwrap()
            .add_custom_field("Bomb shelter", FieldKind::Boolean)
            .unwrap();

        profile.save(&mutated).unwrap();

        let stored = profile.snapshot().unwrap();
        assert_eq!(stored.field_order, mutated.field_order);
        assert_eq!(stored.required_fields, mutated.required_fields);
        assert_eq!(stored.fields, mutated.fields);
    }

    #[test]
    fn test_save_persists_rename() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        let profile = account.add_profile("Family").unwrap();

        let mut snapshot = profile.snapshot().unwrap();
        snapshot.name = "Family of four".to_string();
        profile.save(&snapshot).unwrap();

        assert_eq!(profile.name().unwrap(), "Family of four");
    }

    #[test]
    fn test_save_rejects_rename_collision() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        account.add_profile("Family").unwrap();
        let profile = account.add_profile("Just me").unwrap();

        let mut snapshot = profile.snapshot().unwrap();
        snapshot.name = "Family".to_string();

        assert!(matches!(
            profile.save(&snapshot),
            Err(Error::DuplicateName)
        ));
    }

    #[test]
    fn test_required_cap_survives_persistence() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        let profile = account.add_profile("Picky").unwrap();

        let mut snapshot = profile.snapshot().unwrap();
        for id in ["location", "price", "size"] {
            snapshot = snapshot.toggle_required(id).unwrap();
        }
        assert!(snapshot.toggle_required("landlord").is_err());

        profile.save(&snapshot).unwrap();

        let stored = profile.snapshot().unwrap();
        assert_eq!(stored.required_fields.len(), REQUIRED_FIELD_CAP);
        assert!(stored.toggle_required("landlord").is_err());
    }

    #[test]
    fn test_stored_snapshot_resolves_order() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        let profile = account.add_profile("Ordered").unwrap();

        let snapshot = profile.snapshot().unwrap();
        let mutated = snapshot.reorder("amenities", 5, 0);
        profile.save(&mutated).unwrap();

        let stored = profile.snapshot().unwrap();
        let resolved = resolve_field_order(&[], Some(&stored));
        assert_eq!(resolved.first().unwrap().id, "amenities");
    }

    #[test]
    fn test_owner() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        let profile = account.add_profile("Family").unwrap();

        assert_eq!(profile.owner().unwrap(), account);
    }

    #[test]
    fn test_remove() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        let profile = account.add_profile("Family").unwrap();

        assert_eq!(account.profiles().unwrap().len(), 1);

        profile.remove().unwrap();

        assert_eq!(account.profiles().unwrap().len(), 0);
    }
}
