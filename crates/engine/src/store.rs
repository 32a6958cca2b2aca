//! Storage adapter.
//!
//! The engine never talks to a specific database: every read and write goes
//! through [`Store`], which is implemented for any sea-orm connection. Pointing
//! the connection URL at SQLite or Postgres is the only switch needed.

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait, Select,
};

use crate::ResultEngine;

type PrimaryKeyOf<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Generic CRUD capabilities over sea-orm entities.
///
/// Implemented for `DatabaseConnection` and `DatabaseTransaction` alike, so
/// the same calls work inside and outside a transaction.
#[allow(async_fn_in_trait)]
pub trait Store {
    /// Load one row by primary key.
    async fn find_one<E>(&self, id: PrimaryKeyOf<E>) -> ResultEngine<Option<E::Model>>
    where
        E: EntityTrait;

    /// Run a prepared select (filters, ordering, limit) and return every row.
    async fn find_many<E>(&self, query: Select<E>) -> ResultEngine<Vec<E::Model>>
    where
        E: EntityTrait;

    /// Insert a new row and return it as stored.
    async fn create<A>(&self, model: A) -> ResultEngine<<A::Entity as EntityTrait>::Model>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>;

    /// Persist the `Set` fields of an existing row and return it as stored.
    async fn update<A>(&self, model: A) -> ResultEngine<<A::Entity as EntityTrait>::Model>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>;

    /// Delete by primary key; returns `false` when nothing matched.
    async fn delete<E>(&self, id: PrimaryKeyOf<E>) -> ResultEngine<bool>
    where
        E: EntityTrait;
}

impl<C> Store for C
where
    C: ConnectionTrait,
{
    async fn find_one<E>(&self, id: PrimaryKeyOf<E>) -> ResultEngine<Option<E::Model>>
    where
        E: EntityTrait,
    {
        Ok(E::find_by_id(id).one(self).await?)
    }

    async fn find_many<E>(&self, query: Select<E>) -> ResultEngine<Vec<E::Model>>
    where
        E: EntityTrait,
    {
        Ok(query.all(self).await?)
    }

    async fn create<A>(&self, model: A) -> ResultEngine<<A::Entity as EntityTrait>::Model>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        Ok(model.insert(self).await?)
    }

    async fn update<A>(&self, model: A) -> ResultEngine<<A::Entity as EntityTrait>::Model>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        Ok(model.update(self).await?)
    }

    async fn delete<E>(&self, id: PrimaryKeyOf<E>) -> ResultEngine<bool>
    where
        E: EntityTrait,
    {
        let result = E::delete_by_id(id).exec(self).await?;
        Ok(result.rows_affected > 0)
    }
}
