//! Sort and filter completed results for the results table.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::models::analysis::Recommendation;
use crate::models::batch::BatchItem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    ScoreDesc,
    ScoreAsc,
    Name,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankQuery {
    #[serde(default)]
    pub sort: SortOrder,
    pub recommendation: Option<Recommendation>,
    pub min_score: Option<u32>,
}

/// Completed items with a result, filtered and sorted. Ties keep input order.
pub fn rank<'a>(items: &'a [BatchItem], query: &RankQuery) -> Vec<&'a BatchItem> {
    let mut ranked: Vec<&BatchItem> = items
        .iter()
        .filter(|item| item.completed_score().is_some())
        .filter(|item| {
            let Some(result) = &item.result else {
                return false;
            };
            query
                .recommendation
                .map_or(true, |rec| result.recommendation == rec)
                && query.min_score.map_or(true, |min| result.score >= min)
        })
        .collect();

    ranked.sort_by(|a, b| compare(a, b, query.sort));
    ranked
}

fn compare(a: &BatchItem, b: &BatchItem, order: SortOrder) -> Ordering {
    let (Some(ra), Some(rb)) = (&a.result, &b.result) else {
        return Ordering::Equal;
    };
    match order {
        SortOrder::ScoreDesc => rb.score.cmp(&ra.score),
        SortOrder::ScoreAsc => ra.score.cmp(&rb.score),
        SortOrder::Name => ra
            .candidate_name
            .to_lowercase()
            .cmp(&rb.candidate_name.to_lowercase()),
    }
}
