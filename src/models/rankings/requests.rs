use super::entities::ExportFormat;
use serde::Deserialize;
use ts_rs::TS;

// 触发排名计算请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "ranking.ts")]
pub struct CalculateRankingRequest {
    pub academic_year: Option<String>,
    pub semester: Option<i32>,
}

// 排名列表查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "ranking.ts")]
pub struct RankingListQuery {
    pub academic_year: Option<String>,
    pub semester: Option<i32>,
    pub limit: Option<u64>,
    pub class_id: Option<i64>,
}

// 排名导出查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "ranking.ts")]
pub struct RankingExportQuery {
    pub academic_year: Option<String>,
    pub semester: Option<i32>,
    pub class_id: Option<i64>,
    pub format: Option<ExportFormat>,
}
