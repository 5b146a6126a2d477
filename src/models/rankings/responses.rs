use crate::models::evaluations::entities::EvaluationView;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "ranking.ts")]
pub struct CalculateRankingResponse {
    pub academic_year: String,
    pub semester: i32,
    // 本次参与排名的记录数
    pub ranked_count: u64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "ranking.ts")]
pub struct RankingListResponse {
    pub academic_year: String,
    pub semester: i32,
    pub limit: u64,
    pub items: Vec<EvaluationView>,
}
