use std::marker::PhantomData;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait,
};

/// Generic repository over a sea-orm entity
///
/// Wraps a [`DatabaseConnection`] and provides the primary-key primitives
/// every entity-backed store needs. Domain repositories hold one of these
/// per entity and layer their queries on top via [`BaseRepository::db`].
///
/// # Example
/// ```ignore
/// use database::BaseRepository;
///
/// struct PgCatalog {
///     categories: BaseRepository<category::Entity>,
/// }
///
/// impl PgCatalog {
///     fn new(db: DatabaseConnection) -> Self {
///         Self {
///             categories: BaseRepository::new(db),
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BaseRepository<E>
where
    E: EntityTrait,
{
    db: DatabaseConnection,
    _entity: PhantomData<E>,
}

impl<E> BaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// Access the underlying connection for custom queries
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Insert an active model and return the stored model
    pub async fn insert<A>(&self, active_model: A) -> Result<E::Model, DbErr>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        active_model.insert(&self.db).await
    }

    /// Find a single record by primary key
    pub async fn find_by_id(
        &self,
        id: <E::PrimaryKey as PrimaryKeyTrait>::ValueType,
    ) -> Result<Option<E::Model>, DbErr> {
        E::find_by_id(id).one(&self.db).await
    }

    /// Delete a record by primary key, returning the number of rows affected
    pub async fn delete_by_id(
        &self,
        id: <E::PrimaryKey as PrimaryKeyTrait>::ValueType,
    ) -> Result<u64, DbErr> {
        let result = E::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}
