//! 排名存储操作

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::SeaOrmStorage;
use super::evaluations::{build_views, cohort_models};
use super::students::class_names;
use crate::entity::bonus_details::{Column as BonusColumn, Entity as BonusDetails};
use crate::entity::evaluations::{Column, Entity as Evaluations, Model};
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::errors::{GradeSystemError, Result};
use crate::models::evaluations::entities::{BonusItem, Cohort, EvaluationView};
use crate::scoring::{EvaluationPolicy, RankInput, assign_ranks, compute_scores};
use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};
use tracing::{info, warn};

/// 名次升序，未排名的记录排在最后
fn rank_order(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn by_score_then_student(a: &Model, b: &Model) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| a.student_id.cmp(&b.student_id))
}

fn sort_by_grade_rank(models: &mut [Model]) {
    models.sort_by(|a, b| {
        rank_order(a.grade_rank, b.grade_rank).then_with(|| by_score_then_student(a, b))
    });
}

fn sort_by_class_rank(models: &mut [Model]) {
    models.sort_by(|a, b| {
        rank_order(a.class_rank, b.class_rank)
            .then_with(|| rank_order(a.grade_rank, b.grade_rank))
            .then_with(|| by_score_then_student(a, b))
    });
}

impl SeaOrmStorage {
    /// 在单个事务中重新计算整个学年学期的总分与排名
    pub async fn recalculate_rankings_impl(
        &self,
        cohort: &Cohort,
        policy: &EvaluationPolicy,
    ) -> Result<u64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("开启事务失败: {e}")))?;

        // 先清空本学期旧名次，事务在读取之前即持有写锁
        Evaluations::update_many()
            .col_expr(Column::ClassRank, Expr::value(Option::<i32>::None))
            .col_expr(Column::GradeRank, Expr::value(Option::<i32>::None))
            .filter(Column::AcademicYear.eq(cohort.academic_year.as_str()))
            .filter(Column::Semester.eq(cohort.semester))
            .exec(&txn)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("清空旧排名失败: {e}")))?;

        let models = cohort_models(&txn, cohort, None).await?;
        if models.is_empty() {
            info!("{} 没有综测记录，跳过排名", cohort);
            return Ok(0);
        }

        // 学生所属班级（班级不存在时视为未分班）
        let student_ids: Vec<i64> = models.iter().map(|m| m.student_id).collect();
        let students = Students::find()
            .filter(StudentColumn::StudentId.is_in(student_ids))
            .all(&txn)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询学生失败: {e}")))?;
        let existing_classes: HashSet<i64> =
            class_names(&txn, students.iter().filter_map(|s| s.class_id))
                .await?
                .into_keys()
                .collect();
        let student_class: HashMap<i64, i64> = students
            .into_iter()
            .filter_map(|s| {
                s.class_id
                    .filter(|id| existing_classes.contains(id))
                    .map(|id| (s.student_id, id))
            })
            .collect();

        // 加分明细按记录分组，保持插入顺序
        let evaluation_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let mut bonus_by_evaluation: HashMap<i64, Vec<BonusItem>> = HashMap::new();
        for item in BonusDetails::find()
            .filter(BonusColumn::EvaluationId.is_in(evaluation_ids))
            .order_by_asc(BonusColumn::Id)
            .all(&txn)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询加分明细失败: {e}")))?
        {
            bonus_by_evaluation
                .entry(item.evaluation_id)
                .or_default()
                .push(item.into_bonus_item());
        }

        let mut computed = HashMap::with_capacity(models.len());
        let mut inputs = Vec::with_capacity(models.len());
        for model in &models {
            let scores = model.raw_scores();
            if scores.is_partial() {
                warn!(
                    "学号 {} 的 {} 综测记录存在未录入分项，按 0 计算",
                    model.student_id, cohort
                );
            }
            let bonus_items = bonus_by_evaluation
                .get(&model.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let result = compute_scores(&scores, bonus_items, policy)?;
            inputs.push(RankInput {
                evaluation_id: model.id,
                student_id: model.student_id,
                class_id: student_class.get(&model.student_id).copied(),
                total_score: result.total_score,
            });
            computed.insert(model.id, result);
        }

        let assignments = assign_ranks(&inputs, policy.tie_break)?;

        let now = chrono::Utc::now().timestamp();
        for assignment in &assignments {
            let Some(scores) = computed.get(&assignment.evaluation_id) else {
                continue;
            };
            Evaluations::update_many()
                .col_expr(
                    Column::InnovationTotalScore,
                    Expr::value(scores.innovation_total_score),
                )
                .col_expr(Column::SocialTotalScore, Expr::value(scores.social_total_score))
                .col_expr(Column::TotalScore, Expr::value(scores.total_score))
                .col_expr(Column::ClassRank, Expr::value(assignment.class_rank))
                .col_expr(Column::GradeRank, Expr::value(Some(assignment.grade_rank)))
                .col_expr(Column::UpdatedAt, Expr::value(now))
                .filter(Column::Id.eq(assignment.evaluation_id))
                .exec(&txn)
                .await
                .map_err(|e| GradeSystemError::database_operation(format!("写入排名失败: {e}")))?;
        }

        txn.commit()
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("提交事务失败: {e}")))?;

        info!("{} 排名计算完成，共 {} 条记录", cohort, assignments.len());

        Ok(assignments.len() as u64)
    }

    /// 按年级排名列出（可按班级过滤）
    pub async fn list_rankings_impl(
        &self,
        cohort: &Cohort,
        class_id: Option<i64>,
        limit: u64,
    ) -> Result<Vec<EvaluationView>> {
        let mut models = cohort_models(&self.db, cohort, class_id).await?;
        sort_by_grade_rank(&mut models);
        models.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        build_views(&self.db, models).await
    }

    /// 导出行：有班级过滤时按班级排名排序，否则按年级排名排序
    pub async fn list_export_rows_impl(
        &self,
        cohort: &Cohort,
        class_id: Option<i64>,
    ) -> Result<Vec<EvaluationView>> {
        let mut models = cohort_models(&self.db, cohort, class_id).await?;
        if class_id.is_some() {
            sort_by_class_rank(&mut models);
        } else {
            sort_by_grade_rank(&mut models);
        }

        build_views(&self.db, models).await
    }
}
