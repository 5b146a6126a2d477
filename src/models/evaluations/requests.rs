use super::entities::RawScores;
use serde::Deserialize;
use ts_rs::TS;

// 提交综测成绩请求
//
// 身份字段声明为可选，缺失时返回校验错误而不是反序列化错误。
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct SubmitEvaluationRequest {
    pub student_id: Option<i64>,
    pub academic_year: Option<String>,
    pub semester: Option<i32>,
    #[serde(flatten)]
    #[ts(flatten)]
    pub scores: RawScores,
}

// 添加加分明细请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct CreateBonusItemRequest {
    pub category: String,
    pub item_name: String,
    pub score: f64,
    pub description: Option<String>,
}

// 学生详情查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct StudentDetailQuery {
    pub academic_year: Option<String>,
    pub semester: Option<i32>,
}
