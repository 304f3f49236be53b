//! Macro-generated test suite for the generic and owner-scoped entity services
//!
//! The services are wired over the repository produced by `$factory`, so the
//! same behaviour is checked for every storage backend.
//!
//! # Generated Tests
//!
//! - create stamps audit fields, rejects ids, emits one CREATE per record
//! - reads reject `None` ids, skip empty id sets without events
//! - update loads, applies the per-field policy, keeps `created_*`
//! - delete is idempotent unscoped and `NotFound` scoped
//! - owner isolation and the explicit ownership check

/// Generate the service contract suite over a `Repository<Specimen>` factory.
#[macro_export]
macro_rules! entity_service_tests {
    ($factory:expr) => {
        mod entity_service_contract_tests {
            use super::*;
            use keeper::prelude::{
                AuditOperationType, AuditSubject, AuthContext, Example, PageRequest,
                Repository, ServiceError,
            };
            use std::sync::Arc;
            use std::time::Duration;

            fn unscoped() -> (
                keeper::prelude::EntityService<Specimen, SpecimenDto>,
                Arc<keeper::prelude::MemoryAuditSink>,
                Arc<dyn Repository<Specimen>>,
            ) {
                let repository: Arc<dyn Repository<Specimen>> = Arc::new($factory);
                let (service, sink) = service_over(repository.clone());
                (service, sink, repository)
            }

            fn scoped() -> (
                keeper::prelude::OwnerScoped<Specimen, SpecimenDto>,
                Arc<keeper::prelude::MemoryAuditSink>,
                Arc<dyn Repository<Specimen>>,
            ) {
                let repository: Arc<dyn Repository<Specimen>> = Arc::new($factory);
                let (service, sink) = scoped_over(repository.clone());
                (service, sink, repository)
            }

            async fn stored(repository: &Arc<dyn Repository<Specimen>>) -> usize {
                repository
                    .count_by_example(&Example::matching_all())
                    .await
                    .unwrap()
            }

            // ==================================================================
            // Create
            // ==================================================================

            #[tokio::test]
            async fn test_create_stamps_audit_fields() {
                let (service, sink, _) = unscoped();
                let created = service
                    .create(&alice(), specimen_dto("Tank-1", "t1@test.com"))
                    .await
                    .unwrap();

                assert!(created.id.is_some());
                assert!(created.audit.created_at.is_some());
                assert_eq!(created.audit.created_by.as_deref(), Some("alice"));
                assert_eq!(created.audit.updated_by.as_deref(), Some("alice"));

                let events = sink.events_of(AuditOperationType::Create);
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].actor, "alice");
                assert_eq!(events[0].resource_type, "specimen");
                assert_eq!(events[0].action, "specimen.create");
                assert_eq!(
                    events[0].subject.as_identifier(),
                    created.id.map(|id| id.to_string()).as_deref()
                );
            }

            #[tokio::test]
            async fn test_create_ignores_caller_audit_fields() {
                let (service, _, _) = unscoped();
                let mut dto = specimen_dto("Spoof", "spoof@test.com");
                dto.audit.created_by = Some("mallory".to_string());

                let created = service.create(&alice(), dto).await.unwrap();
                assert_eq!(created.audit.created_by.as_deref(), Some("alice"));
            }

            #[tokio::test]
            async fn test_create_with_id_is_rejected() {
                let (service, sink, repository) = unscoped();
                let mut dto = specimen_dto("Preset", "preset@test.com");
                dto.id = Some(42);

                let err = service.create(&alice(), dto).await.unwrap_err();
                assert!(matches!(err, ServiceError::InvalidArgument { .. }));
                assert_eq!(stored(&repository).await, 0);
                assert_eq!(sink.count(), 0);
            }

            #[tokio::test]
            async fn test_batch_create_emits_one_event_per_record() {
                let (service, sink, _) = unscoped();
                let created = service
                    .create_all(
                        &alice(),
                        vec![
                            specimen_dto("A", "a@test.com"),
                            specimen_dto("B", "b@test.com"),
                            specimen_dto("C", "c@test.com"),
                        ],
                    )
                    .await
                    .unwrap();

                assert_eq!(created.len(), 3);
                let events = sink.events_of(AuditOperationType::Create);
                assert_eq!(events.len(), 3);
                for dto in &created {
                    let id = dto.id.unwrap().to_string();
                    assert!(events.iter().any(|e| e.subject.as_identifier() == Some(id.as_str())));
                }
            }

            #[tokio::test]
            async fn test_batch_with_one_bad_item_writes_nothing() {
                let (service, sink, repository) = unscoped();
                let mut bad = specimen_dto("B", "b@test.com");
                bad.id = Some(9);

                let result = service
                    .create_all(&alice(), vec![specimen_dto("A", "a@test.com"), bad])
                    .await;
                assert!(result.is_err());
                assert_eq!(stored(&repository).await, 0);
                assert_eq!(sink.count(), 0);
            }

            #[tokio::test]
            async fn test_conflict_passes_through() {
                let (service, _, _) = unscoped();
                service
                    .create(&alice(), specimen_dto("A", "taken@test.com"))
                    .await
                    .unwrap();
                let err = service
                    .create(&alice(), specimen_dto("B", "taken@test.com"))
                    .await
                    .unwrap_err();

                match err {
                    ServiceError::Conflict(message) => assert!(message.contains("taken@test.com")),
                    other => panic!("expected Conflict, got {:?}", other),
                }
            }

            // ==================================================================
            // Reads
            // ==================================================================

            #[tokio::test]
            async fn test_find_by_id_records_access() {
                let (service, sink, _) = unscoped();
                let created = service
                    .create(&alice(), specimen_dto("A", "a@test.com"))
                    .await
                    .unwrap();
                sink.clear();

                let found = service.find_by_id(&bob(), created.id).await.unwrap();
                assert_eq!(found.name.as_deref(), Some("A"));

                let events = sink.events_of(AuditOperationType::Access);
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].actor, "bob");
            }

            #[tokio::test]
            async fn test_find_by_null_id_is_invalid() {
                let (service, _, _) = unscoped();
                let err = service.find_by_id(&alice(), None).await.unwrap_err();
                assert!(matches!(err, ServiceError::InvalidArgument { .. }));
            }

            #[tokio::test]
            async fn test_find_unknown_id_is_not_found() {
                let (service, sink, _) = unscoped();
                let err = service.find_by_id(&alice(), 77_i64).await.unwrap_err();
                assert!(matches!(err, ServiceError::NotFound { .. }));
                assert_eq!(sink.count(), 0);
            }

            #[tokio::test]
            async fn test_find_all_by_empty_ids_records_nothing() {
                let (service, sink, _) = unscoped();
                service
                    .create(&alice(), specimen_dto("A", "a@test.com"))
                    .await
                    .unwrap();
                sink.clear();

                let no_ids: Vec<Option<i64>> = Vec::new();
                assert!(service.find_all_by_ids(&alice(), Some(no_ids.as_slice())).await.unwrap().is_empty());
                assert!(service.find_all_by_ids(&alice(), None).await.unwrap().is_empty());
                assert_eq!(sink.count(), 0);
            }

            #[tokio::test]
            async fn test_find_all_by_ids_records_per_record() {
                let (service, sink, _) = unscoped();
                let created = service
                    .create_all(
                        &alice(),
                        vec![specimen_dto("A", "a@test.com"), specimen_dto("B", "b@test.com")],
                    )
                    .await
                    .unwrap();
                sink.clear();

                let ids: Vec<Option<i64>> = created.iter().map(|d| d.id).chain([None, Some(999)]).collect();
                let found = service.find_all_by_ids(&alice(), Some(ids.as_slice())).await.unwrap();
                assert_eq!(found.len(), 2);
                assert_eq!(sink.events_of(AuditOperationType::Access).len(), 2);
            }

            #[tokio::test]
            async fn test_page_records_one_event() {
                let (service, sink, _) = unscoped();
                for i in 0..5 {
                    service
                        .create(&alice(), specimen_dto(&format!("S{}", i), &format!("s{}@test.com", i)))
                        .await
                        .unwrap();
                }
                sink.clear();

                let page = service.find_all(&alice(), PageRequest::new(0, 2)).await.unwrap();
                assert_eq!(page.len(), 2);
                assert_eq!(page.meta.total, 5);

                let events = sink.events();
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].subject, AuditSubject::Page);
            }

            // ==================================================================
            // Update
            // ==================================================================

            #[tokio::test]
            async fn test_update_applies_field_policy() {
                let (service, _, _) = unscoped();
                let mut dto = specimen_dto("Keep", "keep@test.com");
                dto.notes = Some("old".to_string());
                let created = service.create(&alice(), dto).await.unwrap();

                let change = SpecimenDto {
                    id: created.id,
                    ..Default::default()
                };
                let updated = service.update(&alice(), change).await.unwrap();

                assert_eq!(updated.name.as_deref(), Some("Keep"));
                assert_eq!(updated.notes, None);
                assert_eq!(updated.email.as_deref(), Some("keep@test.com"));
            }

            #[tokio::test]
            async fn test_update_unknown_id_writes_nothing() {
                let (service, sink, repository) = unscoped();
                let change = SpecimenDto {
                    id: Some(31),
                    name: Some("Ghost".to_string()),
                    ..Default::default()
                };

                let err = service.update(&alice(), change).await.unwrap_err();
                assert!(matches!(err, ServiceError::NotFound { .. }));
                assert_eq!(stored(&repository).await, 0);
                assert_eq!(sink.count(), 0);
            }

            #[tokio::test]
            async fn test_update_without_id_is_invalid() {
                let (service, _, _) = unscoped();
                let err = service
                    .update(&alice(), specimen_dto("A", "a@test.com"))
                    .await
                    .unwrap_err();
                assert!(matches!(err, ServiceError::InvalidArgument { .. }));
            }

            #[tokio::test]
            async fn test_update_emits_modify_with_object() {
                let (service, sink, _) = unscoped();
                let created = service
                    .create(&alice(), specimen_dto("A", "a@test.com"))
                    .await
                    .unwrap();
                sink.clear();

                let change = SpecimenDto {
                    id: created.id,
                    name: Some("B".to_string()),
                    ..Default::default()
                };
                service.update(&bob(), change).await.unwrap();

                let events = sink.events_of(AuditOperationType::Modify);
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].actor, "bob");
                assert!(matches!(events[0].subject, AuditSubject::Object(_)));
            }

            // ==================================================================
            // Delete
            // ==================================================================

            #[tokio::test]
            async fn test_unscoped_delete_is_idempotent() {
                let (service, sink, _) = unscoped();
                let created = service
                    .create(&alice(), specimen_dto("A", "a@test.com"))
                    .await
                    .unwrap();
                let id = created.id.unwrap();

                service.delete_by_id(&alice(), id).await.unwrap();
                service.delete_by_id(&alice(), id).await.unwrap();

                assert_eq!(sink.events_of(AuditOperationType::Remove).len(), 1);
            }

            #[tokio::test]
            async fn test_delete_dto_without_id_is_invalid() {
                let (service, _, _) = unscoped();
                let err = service
                    .delete(&alice(), &specimen_dto("A", "a@test.com"))
                    .await
                    .unwrap_err();
                assert!(matches!(err, ServiceError::InvalidArgument { .. }));
            }

            // ==================================================================
            // Owner scoping
            // ==================================================================

            #[tokio::test]
            async fn test_owner_lifecycle() {
                let (service, _, _) = scoped();
                let created = service
                    .create(&alice(), specimen_dto("Tank-1", "tank@test.com"))
                    .await
                    .unwrap();
                assert_eq!(created.owner_id, Some(7));
                assert_eq!(created.audit.created_by.as_deref(), Some("alice"));

                let err = service.find_by_id(&bob(), created.id).await.unwrap_err();
                assert!(matches!(err, ServiceError::NotFound { .. }));

                tokio::time::sleep(Duration::from_millis(5)).await;
                let change = SpecimenDto {
                    id: created.id,
                    name: Some("Tank-1-renamed".to_string()),
                    ..Default::default()
                };
                let renamed = service.update(&alice(), change).await.unwrap();

                assert_eq!(renamed.name.as_deref(), Some("Tank-1-renamed"));
                assert_eq!(renamed.audit.created_at, created.audit.created_at);
                assert!(renamed.audit.updated_at > created.audit.updated_at);
                assert_eq!(renamed.owner_id, Some(7));
            }

            #[tokio::test]
            async fn test_create_forces_caller_as_owner() {
                let (service, _, _) = scoped();
                let mut dto = specimen_dto("Sneaky", "sneaky@test.com");
                dto.owner_id = Some(8);

                let created = service.create(&alice(), dto).await.unwrap();
                assert_eq!(created.owner_id, Some(7));
            }

            #[tokio::test]
            async fn test_foreign_records_are_not_found() {
                let (service, sink, repository) = scoped();
                let created = service
                    .create(&alice(), specimen_dto("Mine", "mine@test.com"))
                    .await
                    .unwrap();
                let id = created.id.unwrap();
                sink.clear();

                let change = SpecimenDto {
                    id: Some(id),
                    name: Some("Stolen".to_string()),
                    ..Default::default()
                };
                let update = service.update(&bob(), change).await.unwrap_err();
                let delete = service.delete_by_id(&bob(), id).await.unwrap_err();

                assert!(matches!(update, ServiceError::NotFound { .. }));
                assert!(matches!(delete, ServiceError::NotFound { .. }));
                assert_eq!(stored(&repository).await, 1);
                assert_eq!(sink.count(), 0);

                let still = service.find_by_id(&alice(), id).await.unwrap();
                assert_eq!(still.name.as_deref(), Some("Mine"));
            }

            #[tokio::test]
            async fn test_verify_ownership_denies() {
                let (service, _, _) = scoped();
                let created = service
                    .create(&alice(), specimen_dto("Mine", "mine@test.com"))
                    .await
                    .unwrap();
                let id = created.id.unwrap();

                service.verify_ownership(&alice(), &id).await.unwrap();
                let err = service.verify_ownership(&bob(), &id).await.unwrap_err();
                assert!(matches!(err, ServiceError::AccessDenied { .. }));
            }

            #[tokio::test]
            async fn test_unknown_principal_is_denied() {
                let (service, _, _) = scoped();
                let err = service
                    .create(&AuthContext::user("carol"), specimen_dto("X", "x@test.com"))
                    .await
                    .unwrap_err();
                assert!(matches!(err, ServiceError::AccessDenied { .. }));
            }

            #[tokio::test]
            async fn test_collections_are_scoped() {
                let (service, _, _) = scoped();
                service
                    .create_all(
                        &alice(),
                        vec![specimen_dto("A", "a@test.com"), specimen_dto("B", "b@test.com")],
                    )
                    .await
                    .unwrap();
                let theirs = service
                    .create(&bob(), specimen_dto("C", "c@test.com"))
                    .await
                    .unwrap();

                let page = service.find_all(&alice(), PageRequest::new(0, 10)).await.unwrap();
                assert_eq!(page.meta.total, 2);
                assert_eq!(service.count(&bob()).await.unwrap(), 1);

                let ids = vec![theirs.id];
                assert!(service.find_all_by_ids(&alice(), Some(ids.as_slice())).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_scoped_delete_then_delete_again() {
                let (service, sink, _) = scoped();
                let created = service
                    .create(&alice(), specimen_dto("A", "a@test.com"))
                    .await
                    .unwrap();
                let id = created.id.unwrap();

                service.delete_by_id(&alice(), id).await.unwrap();
                let err = service.delete_by_id(&alice(), id).await.unwrap_err();

                assert!(matches!(err, ServiceError::NotFound { .. }));
                assert_eq!(sink.events_of(AuditOperationType::Remove).len(), 1);
            }
        }
    };
}
