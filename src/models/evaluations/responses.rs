use super::entities::{BonusItem, EvaluationDetail, ScoreRecord};
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct EvaluationResponse {
    pub evaluation: ScoreRecord,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct BonusItemResponse {
    pub bonus_item: BonusItem,
    // 追加后重新计算的综测记录
    pub evaluation: ScoreRecord,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct BonusItemListResponse {
    pub evaluation_id: i64,
    pub items: Vec<BonusItem>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct EvaluationDetailResponse {
    pub detail: EvaluationDetail,
}
