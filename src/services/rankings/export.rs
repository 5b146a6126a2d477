//! 综测排名导出（xlsx / csv）
//!
//! 指定班级时按班级排名排序，否则按年级排名排序，两种排名都会导出。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use super::{RankingService, cohort_from};
use crate::errors::{GradeSystemError, Result};
use crate::models::evaluations::entities::{Cohort, EvaluationView};
use crate::models::rankings::{entities::ExportFormat, requests::RankingExportQuery};
use crate::services::error_response;

/// 单元格
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn opt_number(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Empty)
    }

    fn opt_rank(value: Option<i32>) -> Self {
        value.map(|v| Cell::Number(f64::from(v))).unwrap_or(Cell::Empty)
    }

    fn opt_text(value: Option<&str>) -> Self {
        value.map(|v| Cell::Text(v.to_string())).unwrap_or(Cell::Empty)
    }

    fn to_csv_field(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Number(number) => number.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

const SCORE_HEADERS: [&str; 14] = [
    "德育",
    "GPA",
    "智育",
    "体育",
    "创新基础分",
    "创新加分",
    "创新总分",
    "学生工作",
    "社会服务",
    "社会奖励",
    "社会总分",
    "文体",
    "综测总分",
    "更新时间",
];

fn headers(class_scoped: bool) -> Vec<&'static str> {
    let ranks = if class_scoped {
        ["班级排名", "年级排名"]
    } else {
        ["年级排名", "班级排名"]
    };
    ranks
        .into_iter()
        .chain(["学号", "姓名", "班级", "专业"])
        .chain(SCORE_HEADERS)
        .collect()
}

fn row(view: &EvaluationView, class_scoped: bool) -> Vec<Cell> {
    let record = &view.record;
    let scores = &record.scores;
    let (first, second) = if class_scoped {
        (record.class_rank, record.grade_rank)
    } else {
        (record.grade_rank, record.class_rank)
    };

    vec![
        Cell::opt_rank(first),
        Cell::opt_rank(second),
        Cell::Text(record.student_id.to_string()),
        Cell::Text(view.student_name.clone()),
        Cell::opt_text(view.class_name.as_deref()),
        Cell::opt_text(view.major.as_deref()),
        Cell::opt_number(scores.moral_score),
        Cell::opt_number(scores.gpa),
        Cell::opt_number(scores.academic_score),
        Cell::opt_number(scores.physical_score),
        Cell::opt_number(scores.innovation_basic_score),
        Cell::opt_number(scores.innovation_bonus_score),
        Cell::Number(record.innovation_total_score),
        Cell::opt_number(scores.student_work_score),
        Cell::opt_number(scores.social_service_score),
        Cell::opt_number(scores.social_reward_score),
        Cell::Number(record.social_total_score),
        Cell::opt_number(scores.cultural_sports_score),
        Cell::Number(record.total_score),
        Cell::Text(record.updated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
    ]
}

pub(crate) fn sheet_name(cohort: &Cohort) -> String {
    format!("{}学年第{}学期综测", cohort.academic_year, cohort.semester)
}

pub(crate) fn file_name(cohort: &Cohort, format: ExportFormat) -> String {
    format!(
        "comprehensive_evaluation_{}_S{}.{}",
        cohort.academic_year,
        cohort.semester,
        format.extension()
    )
}

/// 生成 xlsx 文件内容
pub(crate) fn render_xlsx(
    cohort: &Cohort,
    rows: &[EvaluationView],
    class_scoped: bool,
) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let score_format = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet().set_name(sheet_name(cohort))?;

    for (col, header) in headers(class_scoped).iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    sheet.set_column_width(3, 12)?;
    sheet.set_column_width(4, 14)?;
    sheet.set_column_width(5, 20)?;

    for (index, view) in rows.iter().enumerate() {
        let row_index = index as u32 + 1;
        for (col, cell) in row(view, class_scoped).into_iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => {
                    sheet.write_string(row_index, col, text)?;
                }
                // 前两列是名次，不需要小数格式
                Cell::Number(number) if col < 2 => {
                    sheet.write_number(row_index, col, number)?;
                }
                Cell::Number(number) => {
                    sheet.write_number_with_format(row_index, col, number, &score_format)?;
                }
                Cell::Empty => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// 生成 csv 文件内容（带 UTF-8 BOM，便于 Excel 直接打开）
pub(crate) fn render_csv(rows: &[EvaluationView], class_scoped: bool) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(b"\xEF\xBB\xBF".to_vec());
    writer.write_record(headers(class_scoped))?;
    for view in rows {
        writer.write_record(row(view, class_scoped).iter().map(Cell::to_csv_field))?;
    }
    writer
        .into_inner()
        .map_err(|e| GradeSystemError::export(format!("写入 csv 失败: {e}")))
}

pub async fn export_rankings(
    service: &RankingService,
    query: RankingExportQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let cohort = match cohort_from(query.academic_year.as_deref(), query.semester) {
        Ok(cohort) => cohort,
        Err(e) => return Ok(error_response(&e)),
    };
    let format = query.format.unwrap_or(ExportFormat::Xlsx);
    let class_scoped = query.class_id.is_some();

    let storage = service.get_storage(request)?;
    let rows = match storage.list_export_rows(&cohort, query.class_id).await {
        Ok(rows) => rows,
        Err(e) => return Ok(error_response(&e)),
    };

    let rendered = match format {
        ExportFormat::Xlsx => render_xlsx(&cohort, &rows, class_scoped),
        ExportFormat::Csv => render_csv(&rows, class_scoped),
    };

    match rendered {
        Ok(buffer) => {
            let filename = file_name(&cohort, format);
            info!("导出 {} 排名 {} 行: {}", cohort, rows.len(), filename);
            Ok(HttpResponse::Ok()
                .content_type(format.content_type())
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"{filename}\""),
                ))
                .body(buffer))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluations::entities::{RawScores, ScoreRecord};

    fn cohort() -> Cohort {
        Cohort {
            academic_year: "2023-2024".to_string(),
            semester: 1,
        }
    }

    fn view(student_id: i64, grade_rank: i32, class_rank: Option<i32>) -> EvaluationView {
        let now = chrono::Utc::now();
        EvaluationView {
            record: ScoreRecord {
                id: student_id,
                student_id,
                academic_year: "2023-2024".to_string(),
                semester: 1,
                scores: RawScores {
                    moral_score: Some(18.5),
                    ..Default::default()
                },
                innovation_total_score: 0.0,
                social_total_score: 0.0,
                total_score: 18.5,
                class_rank,
                grade_rank: Some(grade_rank),
                created_at: now,
                updated_at: now,
            },
            student_name: format!("学生{student_id}"),
            class_id: class_rank.map(|_| 1),
            class_name: class_rank.map(|_| "计科2101".to_string()),
            major: Some("计算机科学与技术".to_string()),
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(sheet_name(&cohort()), "2023-2024学年第1学期综测");
        assert_eq!(
            file_name(&cohort(), ExportFormat::Csv),
            "comprehensive_evaluation_2023-2024_S1.csv"
        );
        assert_eq!(
            file_name(&cohort(), ExportFormat::Xlsx),
            "comprehensive_evaluation_2023-2024_S1.xlsx"
        );
    }

    #[test]
    fn test_rank_columns_follow_scope() {
        assert_eq!(&headers(true)[..2], &["班级排名", "年级排名"]);
        assert_eq!(&headers(false)[..2], &["年级排名", "班级排名"]);
        assert_eq!(headers(true).len(), row(&view(1, 1, Some(1)), true).len());
    }

    #[test]
    fn test_csv_output() {
        let rows = vec![view(100, 1, Some(1)), view(200, 2, None)];
        let bytes = render_csv(&rows, false).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let text = text.trim_start_matches('\u{feff}');
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("年级排名,班级排名,学号,姓名"));
        assert!(lines[1].starts_with("1,1,100,学生100,计科2101"));
        // 未分班的学生没有班级排名
        assert!(lines[2].starts_with("2,,200,学生200,,"));
    }

    #[test]
    fn test_xlsx_output_is_zip() {
        let bytes = render_xlsx(&cohort(), &[view(100, 1, Some(1))], true).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
