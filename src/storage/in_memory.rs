//! In-memory implementation of `Repository` for testing and development

use crate::core::error::{StorageError, StorageResult};
use crate::core::example::Example;
use crate::core::field::FieldValue;
use crate::core::query::{Page, PageRequest, Sort};
use crate::core::record::{Identity, Record, same_identity};
use crate::core::repository::Repository;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory repository
///
/// Records are kept in identity order, so unsorted queries return them in
/// that order. Uses RwLock for thread-safe access; every write holds the lock
/// for its whole duration, which makes `save_all` atomic.
pub struct InMemoryRepository<R: Record> {
    records: Arc<RwLock<BTreeMap<R::Id, R>>>,
    sequence: Arc<AtomicU64>,
}

impl<R: Record> Clone for InMemoryRepository<R> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            sequence: self.sequence.clone(),
        }
    }
}

impl<R: Record> InMemoryRepository<R> {
    /// Create a new, empty repository
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(BTreeMap::new())),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, BTreeMap<R::Id, R>>> {
        self.records.read().map_err(|e| StorageError::Unavailable {
            backend: format!("memory (failed to acquire read lock: {})", e),
        })
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, BTreeMap<R::Id, R>>> {
        self.records.write().map_err(|e| StorageError::Unavailable {
            backend: format!("memory (failed to acquire write lock: {})", e),
        })
    }

    fn next_id(&self) -> R::Id {
        R::Id::generate(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Reject `record` if another stored record holds one of its unique keys
    fn check_unique(
        records: &BTreeMap<R::Id, R>,
        record: &R,
        pending: &[R],
    ) -> StorageResult<()> {
        for (field, value) in record.unique_keys() {
            if value.is_null() {
                continue;
            }
            let taken = records
                .values()
                .chain(pending.iter())
                .filter(|other| !same_identity(*other, record))
                .any(|other| other.field_value(field).as_ref() == Some(&value));
            if taken {
                return Err(StorageError::Conflict {
                    message: format!("{} '{}' already exists", field, display_value(&value)),
                });
            }
        }
        Ok(())
    }

    fn assign_id(&self, mut record: R) -> R {
        if record.id().is_none() {
            record.set_id(self.next_id());
        }
        record
    }

    fn matching(records: &BTreeMap<R::Id, R>, example: &Example, sort: &Sort) -> Vec<R> {
        let mut matches: Vec<R> = records
            .values()
            .filter(|record| example.matches(*record))
            .cloned()
            .collect();
        if !sort.is_unsorted() {
            // stable sort keeps identity order between equal keys
            matches.sort_by(|a, b| sort.compare(a, b));
        }
        matches
    }
}

impl<R: Record> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn display_value(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[async_trait]
impl<R: Record> Repository<R> for InMemoryRepository<R> {
    async fn save(&self, record: R) -> StorageResult<R> {
        let mut records = self.write()?;

        Self::check_unique(&records, &record, &[])?;
        let record = self.assign_id(record);
        if let Some(id) = record.id() {
            records.insert(id, record.clone());
        }

        Ok(record)
    }

    async fn save_all(&self, batch: Vec<R>) -> StorageResult<Vec<R>> {
        let mut records = self.write()?;

        let mut pending: Vec<R> = Vec::with_capacity(batch.len());
        for record in batch {
            Self::check_unique(&records, &record, &pending)?;
            pending.push(record);
        }

        let saved: Vec<R> = pending
            .into_iter()
            .map(|record| self.assign_id(record))
            .collect();
        for record in &saved {
            if let Some(id) = record.id() {
                records.insert(id, record.clone());
            }
        }

        Ok(saved)
    }

    async fn find_by_id(&self, id: &R::Id) -> StorageResult<Option<R>> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn find_all(&self, request: &PageRequest) -> StorageResult<Page<R>> {
        let records = self.read()?;
        let all = Self::matching(&records, &Example::matching_all(), &request.sort);
        Ok(Page::from_slice(all, request))
    }

    async fn find_all_by_id(&self, ids: &[R::Id]) -> StorageResult<Vec<R>> {
        let records = self.read()?;
        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }

    async fn find_by_example(
        &self,
        example: &Example,
        request: &PageRequest,
    ) -> StorageResult<Page<R>> {
        let records = self.read()?;
        let matches = Self::matching(&records, example, &request.sort);
        Ok(Page::from_slice(matches, request))
    }

    async fn find_all_by_example(&self, example: &Example, sort: &Sort) -> StorageResult<Vec<R>> {
        let records = self.read()?;
        Ok(Self::matching(&records, example, sort))
    }

    async fn count_by_example(&self, example: &Example) -> StorageResult<usize> {
        let records = self.read()?;
        Ok(records.values().filter(|r| example.matches(*r)).count())
    }

    async fn exists_by_id(&self, id: &R::Id) -> StorageResult<bool> {
        Ok(self.read()?.contains_key(id))
    }

    async fn delete_by_id(&self, id: &R::Id) -> StorageResult<bool> {
        Ok(self.write()?.remove(id).is_some())
    }

    async fn delete_all_by_id(&self, ids: &[R::Id]) -> StorageResult<Vec<R::Id>> {
        let mut records = self.write()?;
        Ok(ids
            .iter()
            .filter(|id| records.remove(*id).is_some())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::AuditFields;
    use crate::core::repository::OwnedRepository;
    use crate::core::record::Owned;
    use crate::impl_record;

    #[derive(Debug, Clone, Default)]
    struct Keeper {
        id: Option<i64>,
        audit: AuditFields,
        username: Option<String>,
        owner: Option<i64>,
        rank: Option<i64>,
    }
    impl_record!(Keeper, i64, [username, owner, rank], unique [username]);

    impl Owned for Keeper {
        type OwnerId = i64;
        const OWNER_FIELD: &'static str = "owner";

        fn owner_id(&self) -> Option<i64> {
            self.owner
        }
    }

    fn keeper(username: &str, owner: i64, rank: i64) -> Keeper {
        Keeper {
            username: Some(username.into()),
            owner: Some(owner),
            rank: Some(rank),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_assigns_ids() {
        let repo = InMemoryRepository::<Keeper>::new();
        let a = repo.save(keeper("a", 1, 1)).await.unwrap();
        let b = repo.save(keeper("b", 1, 1)).await.unwrap();
        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_save_with_existing_id_updates_in_place() {
        let repo = InMemoryRepository::<Keeper>::new();
        let mut a = repo.save(keeper("a", 1, 1)).await.unwrap();
        a.rank = Some(5);
        repo.save(a.clone()).await.unwrap();

        assert_eq!(repo.len(), 1);
        let stored = repo.find_by_id(&1).await.unwrap().unwrap();
        assert_eq!(stored.rank, Some(5));
    }

    #[tokio::test]
    async fn test_unique_conflict() {
        let repo = InMemoryRepository::<Keeper>::new();
        repo.save(keeper("alice", 1, 1)).await.unwrap();
        let err = repo.save(keeper("alice", 2, 1)).await.unwrap_err();
        assert_eq!(
            err,
            StorageError::Conflict {
                message: "username 'alice' already exists".into()
            }
        );
    }

    #[tokio::test]
    async fn test_save_all_is_atomic() {
        let repo = InMemoryRepository::<Keeper>::new();
        let result = repo
            .save_all(vec![keeper("a", 1, 1), keeper("b", 1, 1), keeper("a", 1, 1)])
            .await;
        assert!(result.is_err());
        assert!(repo.is_empty());

        let saved = repo
            .save_all(vec![keeper("a", 1, 1), keeper("b", 1, 1)])
            .await
            .unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().all(|k| k.id.is_some()));
    }

    #[tokio::test]
    async fn test_find_all_paged_and_sorted() {
        let repo = InMemoryRepository::<Keeper>::new();
        for (name, rank) in [("a", 3), ("b", 1), ("c", 2)] {
            repo.save(keeper(name, 1, rank)).await.unwrap();
        }
        let page = repo
            .find_all(&PageRequest::new(0, 2).sorted(Sort::asc("rank")))
            .await
            .unwrap();
        let names: Vec<_> = page.content.iter().map(|k| k.username.clone().unwrap()).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert_eq!(page.meta.total, 3);

        let beyond = repo.find_all(&PageRequest::new(3, 2)).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let repo = InMemoryRepository::<Keeper>::new();
        repo.save(keeper("a", 1, 1)).await.unwrap();
        assert!(repo.delete_by_id(&1).await.unwrap());
        assert!(!repo.delete_by_id(&1).await.unwrap());

        repo.save(keeper("b", 1, 1)).await.unwrap();
        let removed = repo.delete_all_by_id(&[2, 99]).await.unwrap();
        assert_eq!(removed, vec![2]);
    }

    #[tokio::test]
    async fn test_owner_scoped_lookups() {
        let repo = InMemoryRepository::<Keeper>::new();
        repo.save(keeper("a", 7, 1)).await.unwrap();
        repo.save(keeper("b", 8, 1)).await.unwrap();
        repo.save(keeper("c", 7, 1)).await.unwrap();

        assert!(repo.find_by_id_and_owner(&1, &7).await.unwrap().is_some());
        assert!(repo.find_by_id_and_owner(&1, &8).await.unwrap().is_none());
        assert!(!repo.exists_by_id_and_owner(&2, &7).await.unwrap());

        let mine = repo.find_all_by_owner(&7, &Sort::desc("id")).await.unwrap();
        let ids: Vec<_> = mine.iter().map(|k| k.id.unwrap()).collect();
        assert_eq!(ids, vec![3, 1]);

        let some = repo.find_all_by_id_and_owner(&[1, 2, 3], &7).await.unwrap();
        assert_eq!(some.len(), 2);
    }
}
