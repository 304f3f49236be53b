//! Records, transfer objects and mappers of the reptile keeping domain
//!
//! All identities are `i64` assigned by storage. Enclosures and reptiles
//! belong to a user; logs and images belong to a parent record and are
//! visible to whoever can see the parent.

pub mod cleaning;
pub mod enclosure;
pub mod feeding_log;
pub mod macros;
pub mod poop_log;
pub mod reptile;
pub mod reptile_image;
pub mod shedding_log;
pub mod user;
pub mod weight_log;

pub use cleaning::{CleaningType, EnclosureCleaning, EnclosureCleaningDto, EnclosureCleaningMapper};
pub use enclosure::{Enclosure, EnclosureDto, EnclosureMapper, EnclosureType};
pub use feeding_log::{FeedingLog, FeedingLogDto, FeedingLogMapper};
pub use poop_log::{Consistency, PoopLog, PoopLogDto, PoopLogMapper};
pub use reptile::{Reptile, ReptileDto, ReptileGender, ReptileMapper, ReptileStatus};
pub use reptile_image::{ReptileImage, ReptileImageDto, ReptileImageMapper};
pub use shedding_log::{SheddingLog, SheddingLogDto, SheddingLogMapper};
pub use user::{User, UserDto, UserMapper, UserRole};
pub use weight_log::{WeightLog, WeightLogDto, WeightLogMapper};

use crate::core::record::{Record, TransferObject};

/// A dated record hanging off a parent record
pub trait LogRecord: Record<Id = i64> {
    /// Field holding the parent id
    const PARENT_FIELD: &'static str;

    /// Field the history is ordered by
    const DATE_FIELD: &'static str;

    fn parent_id(&self) -> Option<i64>;
}

/// Transfer object of a [`LogRecord`]
pub trait LogDto: TransferObject<Id = i64> {
    fn parent_id(&self) -> Option<i64>;
}
