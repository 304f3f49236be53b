//! Wiring of repositories, resolver, audit and services
//!
//! [`KeeperHost`] is what a transport adapter holds on to: one instance per
//! process, with every domain service ready to use.
//!
//! # Example
//!
//! ```rust,ignore
//! let host = KeeperHost::in_memory(KeeperConfig::default())?;
//! let ctx = AuthContext::user("alice");
//! host.users.create(&AuthContext::System, UserDto::new("alice", "alice@example.com")).await?;
//! let tank = host.enclosures.create(&ctx, EnclosureDto::new("Tank-1", EnclosureType::Terrarium)).await?;
//! ```

use crate::config::{AuditSinkKind, KeeperConfig};
use crate::core::audit::{
    AuditRecorder, AuditSink, BroadcastAuditSink, MemoryAuditSink, NullAuditSink, TracingAuditSink,
};
use crate::core::auth::OwnerResolver;
use crate::core::error::ConfigError;
use crate::core::mapper::Mapper;
use crate::core::ownership::{OwnerScoped, ParentGuard};
use crate::core::query::{PageRequest, Sort};
use crate::core::record::{Record, TransferObject};
use crate::core::repository::Repository;
use crate::core::resolver::ResourceTypeResolver;
use crate::core::service::EntityService;
use crate::domain::{
    CleaningLogService, EnclosureService, FeedingLogService, LogService, PoopLogService,
    ReptileImageService, ReptileRelationships, ReptileService, SheddingLogService, UserService,
    WeightLogService,
};
use crate::entities::*;
use crate::storage::InMemoryRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// All keeper services over one set of repositories
#[derive(Clone)]
pub struct KeeperHost {
    pub config: KeeperConfig,
    pub resolver: ResourceTypeResolver,
    pub audit: AuditRecorder,

    /// Set when `audit.sink` is `memory`
    pub memory_audit: Option<Arc<MemoryAuditSink>>,

    /// Set when `audit.sink` is `broadcast`
    pub broadcast_audit: Option<Arc<BroadcastAuditSink>>,

    pub users: UserService,
    pub enclosures: EnclosureService,
    pub reptiles: ReptileService,
    pub feedings: FeedingLogService,
    pub weights: WeightLogService,
    pub sheddings: SheddingLogService,
    pub poops: PoopLogService,
    pub cleanings: CleaningLogService,
    pub images: ReptileImageService,
}

struct Builder<'a> {
    resolver: &'a ResourceTypeResolver,
    audit: &'a AuditRecorder,
    max_page_size: usize,
}

impl Builder<'_> {
    fn service<R, D>(
        &self,
        repository: Arc<dyn Repository<R>>,
        mapper: impl Mapper<R, D> + 'static,
    ) -> EntityService<R, D>
    where
        R: Record,
        D: TransferObject<Id = R::Id> + Serialize,
    {
        EntityService::new(repository, Arc::new(mapper), self.resolver, self.audit.clone())
            .with_max_page_size(self.max_page_size)
    }

    fn log<R, D>(
        &self,
        mapper: impl Mapper<R, D> + 'static,
        parents: Arc<dyn ParentGuard<i64>>,
        parent_name: &'static str,
    ) -> LogService<R, D>
    where
        R: LogRecord,
        D: LogDto + Serialize,
    {
        let repository: Arc<dyn Repository<R>> = Arc::new(InMemoryRepository::<R>::new());
        LogService::new(self.service(repository, mapper), parents, parent_name)
    }
}

fn build_resolver(config: &KeeperConfig) -> Result<ResourceTypeResolver, ConfigError> {
    let mut builder = ResourceTypeResolver::builder()
        .register::<User>()
        .register::<Enclosure>()
        .register::<Reptile>()
        .register::<FeedingLog>()
        .register::<WeightLog>()
        .register::<SheddingLog>()
        .register::<PoopLog>()
        .register::<EnclosureCleaning>()
        .register::<ReptileImage>();

    for resource in &config.resources {
        builder = builder.override_named(
            &resource.type_name,
            resource.resource_type.clone(),
            resource.base_action.clone(),
        )?;
    }
    Ok(builder.build())
}

impl KeeperHost {
    /// Build a host backed by in-memory repositories
    ///
    /// Fails when a resource override names an unknown record type.
    pub fn in_memory(config: KeeperConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let resolver = build_resolver(&config)?;

        let mut memory_audit = None;
        let mut broadcast_audit = None;
        let sink: Arc<dyn AuditSink> = match config.audit.sink {
            AuditSinkKind::Tracing => Arc::new(TracingAuditSink),
            AuditSinkKind::Memory => {
                let sink = Arc::new(MemoryAuditSink::new());
                memory_audit = Some(sink.clone());
                sink
            }
            AuditSinkKind::Broadcast => {
                let sink = Arc::new(BroadcastAuditSink::new(config.audit.channel_capacity));
                broadcast_audit = Some(sink.clone());
                sink
            }
            AuditSinkKind::None => Arc::new(NullAuditSink),
        };
        let audit = AuditRecorder::new(sink);

        let builder = Builder {
            resolver: &resolver,
            audit: &audit,
            max_page_size: config.pagination.max_size,
        };

        let user_repository: Arc<dyn Repository<User>> = Arc::new(InMemoryRepository::new());
        let enclosure_repository: Arc<dyn Repository<Enclosure>> = Arc::new(InMemoryRepository::new());
        let reptile_repository: Arc<dyn Repository<Reptile>> = Arc::new(InMemoryRepository::new());
        let image_repository: Arc<dyn Repository<ReptileImage>> = Arc::new(InMemoryRepository::new());

        let users = UserService::new(builder.service(user_repository, UserMapper));
        let owners: Arc<dyn OwnerResolver<i64>> = Arc::new(users.clone());

        let enclosures = EnclosureService::new(
            OwnerScoped::new(
                builder
                    .service(enclosure_repository, EnclosureMapper)
                    .with_default_sort(Sort::asc("name")),
                owners.clone(),
            ),
            reptile_repository.clone(),
        );
        let enclosure_guard: Arc<dyn ParentGuard<i64>> = Arc::new(enclosures.clone());

        let reptile_service = builder
            .service(reptile_repository, ReptileMapper)
            .with_default_sort(Sort::asc("name"));
        let relationships = ReptileRelationships::new(
            reptile_service.clone(),
            enclosure_guard.clone(),
            image_repository.clone(),
        );
        let reptiles = ReptileService::new(
            OwnerScoped::new(
                reptile_service.with_relationships(Arc::new(relationships)),
                owners,
            ),
            enclosure_guard.clone(),
            image_repository.clone(),
        );
        let reptile_guard: Arc<dyn ParentGuard<i64>> = Arc::new(reptiles.clone());

        let images = ReptileImageService::new(
            LogService::new(
                builder.service(image_repository, ReptileImageMapper),
                reptile_guard.clone(),
                "reptile",
            ),
            reptiles.clone(),
        );

        let feedings = builder.log(FeedingLogMapper, reptile_guard.clone(), "reptile");
        let weights = builder.log(WeightLogMapper, reptile_guard.clone(), "reptile");
        let sheddings = builder.log(SheddingLogMapper, reptile_guard.clone(), "reptile");
        let poops = builder.log(PoopLogMapper, reptile_guard, "reptile");
        let cleanings = builder.log(EnclosureCleaningMapper, enclosure_guard, "enclosure");

        let host = Self {
            feedings,
            weights,
            sheddings,
            poops,
            cleanings,
            images,
            users,
            enclosures,
            reptiles,
            memory_audit,
            broadcast_audit,
            audit,
            resolver,
            config,
        };

        info!(
            audit_sink = ?host.config.audit.sink,
            max_page_size = host.config.pagination.max_size,
            "keeper host ready"
        );
        Ok(host)
    }

    /// Page `page` with the configured default size
    pub fn page(&self, page: usize) -> PageRequest {
        PageRequest::new(page, self.config.pagination.default_size)
    }
}
