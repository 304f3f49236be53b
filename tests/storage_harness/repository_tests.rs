//! Macro-generated test suite for `Repository<Specimen>` contract validation.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use keeper::storage::InMemoryRepository;
//!
//! repository_tests!(InMemoryRepository::<Specimen>::new());
//! ```
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_save_assigns_identity` / `test_save_existing_updates_in_place`
//! - `test_find_by_id_missing`, `test_find_all_by_id_skips_missing`
//! - `test_delete_reports_existence`, `test_delete_all_returns_existing_ids`
//!
//! ## Queries
//! - example matching on String, Integer, Float and Boolean fields
//! - paging, sorting, counting
//! - owner-scoped lookups
//!
//! ## Edge Cases
//! - unique key conflicts, atomic `save_all`, concurrent saves

/// Generate a `Repository<Specimen>` conformance test suite.
///
/// `$factory` is re-evaluated for each test. For the concurrency test the
/// repository must also be `Clone + 'static` with shared state.
#[macro_export]
macro_rules! repository_tests {
    ($factory:expr) => {
        mod repository_contract_tests {
            use super::*;
            use keeper::core::repository::{OwnedRepository, Repository};
            use keeper::prelude::{Example, FieldValue, PageRequest, Sort, StorageError};

            // ==================================================================
            // CRUD
            // ==================================================================

            #[tokio::test]
            async fn test_save_assigns_identity() {
                let repository = $factory;
                let saved = repository
                    .save(specimen("Alice", "alice@test.com", 30, 4.5, true))
                    .await
                    .unwrap();

                let id = saved.id.expect("identity assigned on save");
                let found = repository.find_by_id(&id).await.unwrap().unwrap();
                assert_eq!(found.name.as_deref(), Some("Alice"));
                assert_eq!(found.age, Some(30));
                assert_eq!(found.score, Some(4.5));
                assert_eq!(found.active, Some(true));
            }

            #[tokio::test]
            async fn test_save_existing_updates_in_place() {
                let repository = $factory;
                let mut saved = repository
                    .save(specimen("Alice", "alice@test.com", 30, 4.5, true))
                    .await
                    .unwrap();

                saved.name = Some("Alicia".to_string());
                let updated = repository.save(saved.clone()).await.unwrap();

                assert_eq!(updated.id, saved.id);
                let page = repository.find_all(&PageRequest::new(0, 10)).await.unwrap();
                assert_eq!(page.meta.total, 1);
                assert_eq!(page.content[0].name.as_deref(), Some("Alicia"));
            }

            #[tokio::test]
            async fn test_find_by_id_missing() {
                let repository = $factory;
                assert!(repository.find_by_id(&404).await.unwrap().is_none());
                assert!(!repository.exists_by_id(&404).await.unwrap());
            }

            #[tokio::test]
            async fn test_find_all_by_id_skips_missing() {
                let repository = $factory;
                let a = repository
                    .save(specimen("A", "a@test.com", 1, 1.0, true))
                    .await
                    .unwrap();
                let b = repository
                    .save(specimen("B", "b@test.com", 2, 2.0, false))
                    .await
                    .unwrap();

                let ids = [a.id.unwrap(), 999, b.id.unwrap()];
                let found = repository.find_all_by_id(&ids).await.unwrap();
                assert_eq!(found.len(), 2);
                assert!(repository.find_all_by_id(&[]).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_delete_reports_existence() {
                let repository = $factory;
                let saved = repository
                    .save(specimen("A", "a@test.com", 1, 1.0, true))
                    .await
                    .unwrap();
                let id = saved.id.unwrap();

                assert!(repository.delete_by_id(&id).await.unwrap());
                assert!(!repository.delete_by_id(&id).await.unwrap());
                assert!(repository.find_by_id(&id).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_delete_all_returns_existing_ids() {
                let repository = $factory;
                let saved = repository
                    .save_all(vec![
                        specimen("A", "a@test.com", 1, 1.0, true),
                        specimen("B", "b@test.com", 2, 2.0, true),
                    ])
                    .await
                    .unwrap();
                let mut ids: Vec<i64> = saved.iter().filter_map(|s| s.id).collect();
                ids.push(12345);

                let removed = repository.delete_all_by_id(&ids).await.unwrap();
                assert_eq!(removed.len(), 2);
                assert!(!removed.contains(&12345));
            }

            // ==================================================================
            // Queries
            // ==================================================================

            async fn seeded() -> impl Repository<Specimen> {
                let repository = $factory;
                repository
                    .save_all(vec![
                        specimen("Alice", "alice@test.com", 30, 4.5, true),
                        specimen("Bob", "bob@test.com", 25, 3.0, false),
                        specimen("Carol", "carol@test.com", 30, 4.0, true),
                    ])
                    .await
                    .unwrap();
                repository
            }

            #[tokio::test]
            async fn test_example_on_string_field() {
                let repository = seeded().await;
                let example = Example::matching_all().and_equals("email", "bob@test.com");
                let found = repository
                    .find_all_by_example(&example, &Sort::unsorted())
                    .await
                    .unwrap();
                assert_eq!(found.len(), 1);
                assert_eq!(found[0].name.as_deref(), Some("Bob"));
            }

            #[tokio::test]
            async fn test_example_on_integer_field() {
                let repository = seeded().await;
                let example = Example::matching_all().and_equals("age", 30_i64);
                assert_eq!(repository.count_by_example(&example).await.unwrap(), 2);
            }

            #[tokio::test]
            async fn test_example_on_float_field() {
                let repository = seeded().await;
                let example = Example::matching_all().and_equals("score", 3.0_f64);
                assert_eq!(repository.count_by_example(&example).await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_example_on_boolean_field() {
                let repository = seeded().await;
                let example = Example::matching_all().and_equals("active", true);
                assert_eq!(repository.count_by_example(&example).await.unwrap(), 2);
            }

            #[tokio::test]
            async fn test_probe_ignores_unset_fields() {
                let repository = seeded().await;
                let probe = Specimen {
                    age: Some(30),
                    ..Default::default()
                };
                let found = repository
                    .find_all_by_example(&Example::of(&probe), &Sort::asc("name"))
                    .await
                    .unwrap();
                let names: Vec<_> = found.iter().filter_map(|s| s.name.clone()).collect();
                assert_eq!(names, vec!["Alice", "Carol"]);
            }

            #[tokio::test]
            async fn test_example_no_results() {
                let repository = seeded().await;
                let example = Example::matching_all().and_equals("email", "nobody@test.com");
                let page = repository
                    .find_by_example(&example, &PageRequest::new(0, 10))
                    .await
                    .unwrap();
                assert!(page.is_empty());
                assert_eq!(page.meta.total, 0);
            }

            #[tokio::test]
            async fn test_in_and_not_in() {
                let repository = seeded().await;
                let names = vec![FieldValue::from("Alice"), FieldValue::from("Bob")];

                let inside = Example::matching_all().and_in("name", names.clone());
                let outside = Example::matching_all().and_not_in("name", names);
                assert_eq!(repository.count_by_example(&inside).await.unwrap(), 2);
                assert_eq!(repository.count_by_example(&outside).await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_paging_and_sorting() {
                let repository = seeded().await;
                let request = PageRequest::new(1, 2).sorted(Sort::desc("name"));
                let page = repository.find_all(&request).await.unwrap();

                assert_eq!(page.meta.total, 3);
                assert_eq!(page.meta.total_pages, 2);
                assert!(page.meta.has_prev);
                assert!(!page.meta.has_next);
                assert_eq!(page.content.len(), 1);
                assert_eq!(page.content[0].name.as_deref(), Some("Alice"));
            }

            #[tokio::test]
            async fn test_page_past_the_end_is_empty() {
                let repository = seeded().await;
                let page = repository.find_all(&PageRequest::new(5, 10)).await.unwrap();
                assert!(page.is_empty());
                assert_eq!(page.meta.total, 3);
            }

            #[tokio::test]
            async fn test_owner_scoped_lookups() {
                let repository = $factory;
                let mine = repository.save(owned_specimen("Mine", 7)).await.unwrap();
                let theirs = repository.save(owned_specimen("Theirs", 8)).await.unwrap();
                let mine_id = mine.id.unwrap();
                let theirs_id = theirs.id.unwrap();

                assert!(repository.find_by_id_and_owner(&mine_id, &7).await.unwrap().is_some());
                assert!(repository.find_by_id_and_owner(&theirs_id, &7).await.unwrap().is_none());
                assert!(!repository.exists_by_id_and_owner(&theirs_id, &7).await.unwrap());

                let owned = repository.find_all_by_owner(&7, &Sort::unsorted()).await.unwrap();
                assert_eq!(owned.len(), 1);

                let visible = repository
                    .find_all_by_id_and_owner(&[mine_id, theirs_id], &8)
                    .await
                    .unwrap();
                assert_eq!(visible.len(), 1);
                assert_eq!(visible[0].id, Some(theirs_id));
            }

            // ==================================================================
            // Edge cases
            // ==================================================================

            #[tokio::test]
            async fn test_unique_key_conflict() {
                let repository = $factory;
                repository
                    .save(specimen("Alice", "same@test.com", 1, 1.0, true))
                    .await
                    .unwrap();
                let err = repository
                    .save(specimen("Other", "same@test.com", 2, 2.0, true))
                    .await
                    .unwrap_err();
                assert!(matches!(err, StorageError::Conflict { .. }));
            }

            #[tokio::test]
            async fn test_save_all_is_all_or_nothing() {
                let repository = $factory;
                let result = repository
                    .save_all(vec![
                        specimen("A", "dup@test.com", 1, 1.0, true),
                        specimen("B", "dup@test.com", 2, 2.0, true),
                    ])
                    .await;

                assert!(result.is_err());
                let page = repository.find_all(&PageRequest::new(0, 10)).await.unwrap();
                assert_eq!(page.meta.total, 0);
            }

            #[tokio::test]
            async fn test_concurrent_saves() {
                let repository = $factory;
                let mut handles = Vec::new();
                for i in 0..10 {
                    let repository = repository.clone();
                    handles.push(tokio::spawn(async move {
                        repository
                            .save(specimen(
                                &format!("S{}", i),
                                &format!("s{}@test.com", i),
                                i,
                                0.0,
                                true,
                            ))
                            .await
                    }));
                }
                for handle in handles {
                    handle.await.unwrap().unwrap();
                }

                let page = repository.find_all(&PageRequest::new(0, 100)).await.unwrap();
                assert_eq!(page.meta.total, 10);
                let mut ids: Vec<i64> = page.content.iter().filter_map(|s| s.id).collect();
                ids.dedup();
                assert_eq!(ids.len(), 10);
            }
        }
    };
}
