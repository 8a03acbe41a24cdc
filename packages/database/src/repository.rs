//! The CRUD contract every entity repository fulfils.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use moosicbox_json_utils::database::ToValue as _;
use road_assets_database_models::Validate as _;
use switchy_database::{Database, DatabaseValue};

use crate::RepoError;
use crate::entity::{self, Entity};
use crate::translate::{StoreOp, store_error};

/// List, get, create, full-replace update and delete for one entity.
///
/// Every method validates its input before touching the store and reports
/// failures only as [`RepoError`] kinds.
#[async_trait(?Send)]
pub trait Repository: Send + Sync {
    type Entity;
    type Request;

    /// Singular entity name, e.g. `asset`.
    fn entity_name(&self) -> &'static str;

    /// All rows, ordered by id.
    async fn list(&self) -> Result<Vec<Self::Entity>, RepoError>;

    /// The row with `id`, or `None`.
    async fn get_by_id(&self, id: i32) -> Result<Option<Self::Entity>, RepoError>;

    /// Validates and inserts `request`, returning the stored row with its
    /// generated id and timestamps.
    async fn create(&self, request: &Self::Request) -> Result<Self::Entity, RepoError>;

    /// Replaces every writable column of row `id`. Returns `None` if the row
    /// does not exist.
    async fn update(
        &self,
        id: i32,
        request: &Self::Request,
    ) -> Result<Option<Self::Entity>, RepoError>;

    /// Deletes row `id`. Returns whether a row was removed.
    async fn delete(&self, id: i32) -> Result<bool, RepoError>;
}

/// A [`Repository`] for any [`Entity`], issuing the SQL built by
/// [`crate::entity`].
pub struct EntityRepository<E> {
    db: Arc<dyn Database>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityRepository<E> {
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// The shared store handle.
    #[must_use]
    pub fn database(&self) -> &dyn Database {
        &*self.db
    }
}

#[async_trait(?Send)]
impl<E: Entity> Repository for EntityRepository<E> {
    type Entity = E;
    type Request = E::Request;

    fn entity_name(&self) -> &'static str {
        E::NAME
    }

    async fn list(&self) -> Result<Vec<E>, RepoError> {
        let rows = self
            .db
            .query_raw_params(&entity::select_sql::<E>(), &[])
            .await
            .map_err(|e| store_error(StoreOp::Read, &e))?;

        rows.iter().map(E::from_row).collect()
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<E>, RepoError> {
        let rows = self
            .db
            .query_raw_params(&entity::select_by_id_sql::<E>(), &[DatabaseValue::Int32(id)])
            .await
            .map_err(|e| store_error(StoreOp::Read, &e))?;

        rows.first().map(E::from_row).transpose()
    }

    async fn create(&self, request: &E::Request) -> Result<E, RepoError> {
        request.validate()?;

        let rows = self
            .db
            .query_raw_params(&entity::insert_sql::<E>(), &E::bind(request))
            .await
            .map_err(|e| store_error(StoreOp::Insert, &e))?;

        let row = rows
            .first()
            .ok_or_else(|| RepoError::unavailable("insert", "no id returned"))?;
        let id: i32 = row
            .to_value("id")
            .map_err(|e| RepoError::unavailable("insert", format!("failed to parse id: {e}")))?;

        log::debug!("Created {} {id}", E::NAME);

        self.get_by_id(id).await?.ok_or_else(|| {
            RepoError::unavailable("insert", format!("{} {id} vanished after insert", E::NAME))
        })
    }

    async fn update(&self, id: i32, request: &E::Request) -> Result<Option<E>, RepoError> {
        request.validate()?;

        let mut params = E::bind(request);
        params.push(DatabaseValue::Int32(id));

        let affected = self
            .db
            .exec_raw_params(&entity::update_sql::<E>(), &params)
            .await
            .map_err(|e| store_error(StoreOp::Update, &e))?;

        if affected == 0 {
            return Ok(None);
        }

        log::debug!("Updated {} {id}", E::NAME);

        self.get_by_id(id).await
    }

    async fn delete(&self, id: i32) -> Result<bool, RepoError> {
        let affected = self
            .db
            .exec_raw_params(&entity::delete_sql::<E>(), &[DatabaseValue::Int32(id)])
            .await
            .map_err(|e| store_error(StoreOp::Delete, &e))?;

        if affected > 0 {
            log::debug!("Deleted {} {id}", E::NAME);
        }

        Ok(affected > 0)
    }
}
