//! Storage adapter traits
//!
//! A [`Repository`] stores one record type. The framework only relies on the
//! operations below, so any backend that can express them can be plugged in.
//! [`OwnedRepository`] adds owner-scoped lookups on top of example matching
//! and is implemented for every repository of an owned record.

use crate::core::error::StorageResult;
use crate::core::example::Example;
use crate::core::query::{Page, PageRequest, Sort};
use crate::core::record::{Identity, Owned, Record};
use async_trait::async_trait;

/// Storage adapter for one record type
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// Insert or update a record
    ///
    /// A record without identity gets a fresh one; a record with an identity
    /// that already exists replaces the stored one.
    async fn save(&self, record: R) -> StorageResult<R>;

    /// Save several records as one unit: either all are stored or none
    async fn save_all(&self, records: Vec<R>) -> StorageResult<Vec<R>>;

    async fn find_by_id(&self, id: &R::Id) -> StorageResult<Option<R>>;

    async fn find_all(&self, request: &PageRequest) -> StorageResult<Page<R>>;

    /// Records for the given identities; missing ones are skipped
    async fn find_all_by_id(&self, ids: &[R::Id]) -> StorageResult<Vec<R>>;

    async fn find_by_example(
        &self,
        example: &Example,
        request: &PageRequest,
    ) -> StorageResult<Page<R>>;

    /// Every match, in `sort` order
    async fn find_all_by_example(&self, example: &Example, sort: &Sort) -> StorageResult<Vec<R>>;

    async fn count_by_example(&self, example: &Example) -> StorageResult<usize>;

    async fn exists_by_id(&self, id: &R::Id) -> StorageResult<bool>;

    /// Remove a record; returns whether it existed
    async fn delete_by_id(&self, id: &R::Id) -> StorageResult<bool>;

    /// Remove several records; returns the identities that existed
    async fn delete_all_by_id(&self, ids: &[R::Id]) -> StorageResult<Vec<R::Id>>;
}

/// Owner-scoped lookups, resolved at the storage-query level
#[async_trait]
pub trait OwnedRepository<R: Owned>: Repository<R> {
    async fn find_by_id_and_owner(&self, id: &R::Id, owner: &R::OwnerId)
    -> StorageResult<Option<R>>;

    async fn exists_by_id_and_owner(&self, id: &R::Id, owner: &R::OwnerId) -> StorageResult<bool>;

    async fn find_all_by_owner(&self, owner: &R::OwnerId, sort: &Sort) -> StorageResult<Vec<R>>;

    async fn find_all_by_id_and_owner(
        &self,
        ids: &[R::Id],
        owner: &R::OwnerId,
    ) -> StorageResult<Vec<R>>;
}

/// Criterion restricting an example to one owner
pub fn owner_example<R: Owned>(owner: &R::OwnerId) -> Example {
    Example::matching_all().and_equals(R::OWNER_FIELD, owner.to_field_value())
}

#[async_trait]
impl<R, T> OwnedRepository<R> for T
where
    R: Owned,
    T: Repository<R> + ?Sized,
{
    async fn find_by_id_and_owner(
        &self,
        id: &R::Id,
        owner: &R::OwnerId,
    ) -> StorageResult<Option<R>> {
        let example = owner_example::<R>(owner).and_equals("id", id.to_field_value());
        Ok(self
            .find_all_by_example(&example, &Sort::unsorted())
            .await?
            .into_iter()
            .next())
    }

    async fn exists_by_id_and_owner(&self, id: &R::Id, owner: &R::OwnerId) -> StorageResult<bool> {
        let example = owner_example::<R>(owner).and_equals("id", id.to_field_value());
        Ok(self.count_by_example(&example).await? > 0)
    }

    async fn find_all_by_owner(&self, owner: &R::OwnerId, sort: &Sort) -> StorageResult<Vec<R>> {
        self.find_all_by_example(&owner_example::<R>(owner), sort)
            .await
    }

    async fn find_all_by_id_and_owner(
        &self,
        ids: &[R::Id],
        owner: &R::OwnerId,
    ) -> StorageResult<Vec<R>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let example = owner_example::<R>(owner).and_in(
            "id",
            ids.iter().map(Identity::to_field_value).collect(),
        );
        self.find_all_by_example(&example, &Sort::unsorted()).await
    }
}
