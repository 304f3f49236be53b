//! Statistics over a caller's records
//!
//! Every figure is recomputed from the records handed in; nothing is cached.
//! An empty input yields zero totals and zero rates.

use crate::entities::{
    EnclosureCleaning, Enclosure, EnclosureType, FeedingLog, PoopLog, Reptile, ReptileStatus,
    SheddingLog, WeightLog,
};
use serde::Serialize;
use std::collections::HashSet;

/// `part` as a percentage of `total`, 0 when `total` is 0
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn count_where<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> usize {
    items.iter().filter(|item| predicate(item)).count()
}

// =============================================================================
// Enclosures and reptiles
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnclosureStatistics {
    pub total: usize,
    pub terrariums: usize,
    pub vivariums: usize,
    pub occupied: usize,
    pub empty: usize,
    pub occupancy_rate: f64,
}

pub fn enclosure_statistics(enclosures: &[Enclosure], occupied_ids: &HashSet<i64>) -> EnclosureStatistics {
    let total = enclosures.len();
    let occupied = count_where(enclosures, |e| e.id.is_some_and(|id| occupied_ids.contains(&id)));

    EnclosureStatistics {
        total,
        terrariums: count_where(enclosures, |e| e.enclosure_type == Some(EnclosureType::Terrarium)),
        vivariums: count_where(enclosures, |e| e.enclosure_type == Some(EnclosureType::Vivarium)),
        occupied,
        empty: total - occupied,
        occupancy_rate: percentage(occupied, total),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReptileStatistics {
    pub total: usize,
    pub active: usize,
    pub quarantine: usize,
    pub deceased: usize,
}

pub fn reptile_statistics(reptiles: &[Reptile]) -> ReptileStatistics {
    let with_status = |status: ReptileStatus| count_where(reptiles, |r| r.status == Some(status));

    ReptileStatistics {
        total: reptiles.len(),
        active: with_status(ReptileStatus::Active),
        quarantine: with_status(ReptileStatus::Quarantine),
        deceased: with_status(ReptileStatus::Deceased),
    }
}

// =============================================================================
// Logs
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedingStatistics {
    pub total: usize,
    pub missed: usize,
    pub success_rate: f64,
}

pub fn feeding_statistics(logs: &[FeedingLog]) -> FeedingStatistics {
    let total = logs.len();
    let missed = count_where(logs, |log| log.ate == Some(false));

    FeedingStatistics {
        total,
        missed,
        success_rate: percentage(total - missed, total),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SheddingStatistics {
    pub total: usize,
    pub ate_shed: usize,
    pub ate_shed_percentage: f64,
}

pub fn shedding_statistics(logs: &[SheddingLog]) -> SheddingStatistics {
    let total = logs.len();
    let ate_shed = count_where(logs, |log| log.ate_shed == Some(true));

    SheddingStatistics {
        total,
        ate_shed,
        ate_shed_percentage: percentage(ate_shed, total),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningStatistics {
    pub total: usize,
    pub disinfections: usize,
    pub substrate_changes: usize,
    pub disinfection_rate: f64,
    pub substrate_change_rate: f64,
}

pub fn cleaning_statistics(logs: &[EnclosureCleaning]) -> CleaningStatistics {
    let total = logs.len();
    let disinfections = count_where(logs, |log| log.disinfected == Some(true));
    let substrate_changes = count_where(logs, |log| log.substrate_changed == Some(true));

    CleaningStatistics {
        total,
        disinfections,
        substrate_changes,
        disinfection_rate: percentage(disinfections, total),
        substrate_change_rate: percentage(substrate_changes, total),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoopStatistics {
    pub total: usize,
    pub parasite_count: usize,
    pub parasite_rate: f64,
}

pub fn poop_statistics(logs: &[PoopLog]) -> PoopStatistics {
    let total = logs.len();
    let parasite_count = count_where(logs, |log| log.parasites_present == Some(true));

    PoopStatistics {
        total,
        parasite_count,
        parasite_rate: percentage(parasite_count, total),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeightStatistics {
    pub current: f64,
    pub initial: f64,
    pub gain: f64,
    pub measurement_count: usize,
}

/// Weight figures; entries without a weight are skipped
pub fn weight_statistics(logs: &[WeightLog]) -> WeightStatistics {
    let mut measured: Vec<&WeightLog> = logs.iter().filter(|log| log.weight_grams.is_some()).collect();
    measured.sort_by_key(|log| log.measurement_date);

    let weight = |log: Option<&&WeightLog>| log.and_then(|log| log.weight_grams).unwrap_or(0.0);
    let initial = weight(measured.first());
    let current = weight(measured.last());

    WeightStatistics {
        current,
        initial,
        gain: current - initial,
        measurement_count: measured.len(),
    }
}
