//! Care logs: feeding, weight, shedding, droppings and enclosure cleaning

use crate::core::auth::AuthContext;
use crate::core::error::ServiceResult;
use crate::core::example::Example;
use crate::core::query::Sort;
use crate::domain::logs::LogService;
use crate::domain::statistics::{
    CleaningStatistics, FeedingStatistics, PoopStatistics, SheddingStatistics, WeightStatistics,
    cleaning_statistics, feeding_statistics, poop_statistics, shedding_statistics,
    weight_statistics,
};
use crate::entities::{
    EnclosureCleaning, EnclosureCleaningDto, FeedingLog, FeedingLogDto, PoopLog, PoopLogDto,
    SheddingLog, SheddingLogDto, WeightLog, WeightLogDto,
};

pub type FeedingLogService = LogService<FeedingLog, FeedingLogDto>;
pub type WeightLogService = LogService<WeightLog, WeightLogDto>;
pub type SheddingLogService = LogService<SheddingLog, SheddingLogDto>;
pub type PoopLogService = LogService<PoopLog, PoopLogDto>;
pub type CleaningLogService = LogService<EnclosureCleaning, EnclosureCleaningDto>;

impl FeedingLogService {
    /// Feedings the reptile refused, newest first
    pub async fn missed(&self, ctx: &AuthContext, reptile_id: i64) -> ServiceResult<Vec<FeedingLogDto>> {
        let records = self
            .records_matching(
                ctx,
                reptile_id,
                Example::matching_all().and_equals("ate", false),
                &Self::history_sort(),
            )
            .await?;
        Ok(self.listed(ctx, records))
    }

    pub async fn statistics(&self, ctx: &AuthContext, reptile_id: i64) -> ServiceResult<FeedingStatistics> {
        Ok(feeding_statistics(&self.records_for(ctx, reptile_id).await?))
    }
}

impl WeightLogService {
    /// Weights in grams, oldest first
    pub async fn weight_history(&self, ctx: &AuthContext, reptile_id: i64) -> ServiceResult<Vec<f64>> {
        let records = self
            .records_matching(
                ctx,
                reptile_id,
                Example::matching_all(),
                &Sort::asc("measurement_date").then(Sort::asc("id")),
            )
            .await?;
        Ok(records.iter().filter_map(|log| log.weight_grams).collect())
    }

    /// Weight of the latest measurement
    pub async fn current_weight(&self, ctx: &AuthContext, reptile_id: i64) -> ServiceResult<Option<f64>> {
        Ok(self
            .records_for(ctx, reptile_id)
            .await?
            .into_iter()
            .find_map(|log| log.weight_grams))
    }

    pub async fn statistics(&self, ctx: &AuthContext, reptile_id: i64) -> ServiceResult<WeightStatistics> {
        Ok(weight_statistics(&self.records_for(ctx, reptile_id).await?))
    }
}

impl SheddingLogService {
    pub async fn statistics(&self, ctx: &AuthContext, reptile_id: i64) -> ServiceResult<SheddingStatistics> {
        Ok(shedding_statistics(&self.records_for(ctx, reptile_id).await?))
    }
}

impl PoopLogService {
    pub async fn statistics(&self, ctx: &AuthContext, reptile_id: i64) -> ServiceResult<PoopStatistics> {
        Ok(poop_statistics(&self.records_for(ctx, reptile_id).await?))
    }
}

impl CleaningLogService {
    pub async fn statistics(&self, ctx: &AuthContext, enclosure_id: i64) -> ServiceResult<CleaningStatistics> {
        Ok(cleaning_statistics(&self.records_for(ctx, enclosure_id).await?))
    }
}
