//! Integration tests for InMemoryRepository using the storage test harness.
//!
//! This file invokes `repository_tests!` and `entity_service_tests!` to
//! validate that InMemoryRepository fully conforms to the Repository contract
//! and carries the generic services.

#[macro_use]
mod storage_harness;

use keeper::storage::InMemoryRepository;
use storage_harness::*;

repository_tests!(InMemoryRepository::<Specimen>::new());
entity_service_tests!(InMemoryRepository::<Specimen>::new());
