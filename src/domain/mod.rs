//! Keeper services built on the generic entity service
//!
//! Enclosures and reptiles are owner-scoped. Logs and images are scoped
//! through their parent. Statistics are plain functions over records.

pub mod enclosures;
pub mod husbandry;
pub mod images;
pub mod logs;
pub mod reptiles;
pub mod statistics;
pub mod users;

pub use enclosures::EnclosureService;
pub use husbandry::{
    CleaningLogService, FeedingLogService, PoopLogService, SheddingLogService, WeightLogService,
};
pub use images::{ImageUpload, ReptileImageService};
pub use logs::LogService;
pub use reptiles::{ReptileRelationships, ReptileService};
pub use users::UserService;
