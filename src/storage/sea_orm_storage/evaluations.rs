//! 综测记录与加分明细存储操作

use std::collections::HashMap;

use super::students::class_names;
use super::{SeaOrmStorage, map_write_err};
use crate::entity::bonus_details::{
    ActiveModel as BonusActiveModel, Column as BonusColumn, Entity as BonusDetails,
};
use crate::entity::evaluations::{ActiveModel, Column, Entity as Evaluations, Model};
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::errors::{GradeSystemError, Result};
use crate::models::evaluations::{
    entities::{
        BonusItem, Cohort, EvaluationDetail, EvaluationKey, EvaluationView, RawScores, ScoreRecord,
    },
    requests::CreateBonusItemRequest,
};
use crate::scoring::calculator::{validate_bonus_score, validate_raw_scores};
use crate::scoring::{ComputedScores, EvaluationPolicy, compute_scores};
use crate::models::students::entities::StudentStatus;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::OnConflict,
};
use tracing::debug;

fn set_raw_scores(model: &mut ActiveModel, scores: &RawScores) {
    model.physical_score = Set(scores.physical_score);
    model.moral_score = Set(scores.moral_score);
    model.gpa = Set(scores.gpa);
    model.academic_score = Set(scores.academic_score);
    model.innovation_basic_score = Set(scores.innovation_basic_score);
    model.innovation_bonus_score = Set(scores.innovation_bonus_score);
    model.student_work_score = Set(scores.student_work_score);
    model.social_service_score = Set(scores.social_service_score);
    model.social_reward_score = Set(scores.social_reward_score);
    model.cultural_sports_score = Set(scores.cultural_sports_score);
}

fn set_computed(model: &mut ActiveModel, computed: &ComputedScores) {
    model.innovation_total_score = Set(computed.innovation_total_score);
    model.social_total_score = Set(computed.social_total_score);
    model.total_score = Set(computed.total_score);
}

/// 重新提交时整体覆盖的原始分项列
const RAW_COLUMNS: [Column; 10] = [
    Column::PhysicalScore,
    Column::MoralScore,
    Column::Gpa,
    Column::AcademicScore,
    Column::InnovationBasicScore,
    Column::InnovationBonusScore,
    Column::StudentWorkScore,
    Column::SocialServiceScore,
    Column::SocialRewardScore,
    Column::CulturalSportsScore,
];

pub(super) async fn find_by_key<C: ConnectionTrait>(
    conn: &C,
    key: &EvaluationKey,
) -> Result<Option<Model>> {
    Evaluations::find()
        .filter(Column::StudentId.eq(key.student_id))
        .filter(Column::AcademicYear.eq(key.academic_year.as_str()))
        .filter(Column::Semester.eq(key.semester))
        .one(conn)
        .await
        .map_err(|e| GradeSystemError::database_operation(format!("查询综测记录失败: {e}")))
}

/// 按插入顺序加载加分明细
pub(super) async fn load_bonus_items<C: ConnectionTrait>(
    conn: &C,
    evaluation_id: i64,
) -> Result<Vec<BonusItem>> {
    let items = BonusDetails::find()
        .filter(BonusColumn::EvaluationId.eq(evaluation_id))
        .order_by_asc(BonusColumn::Id)
        .all(conn)
        .await
        .map_err(|e| GradeSystemError::database_operation(format!("查询加分明细失败: {e}")))?;

    Ok(items.into_iter().map(|m| m.into_bonus_item()).collect())
}

/// 加载一个学年学期的全部记录，可按班级过滤，按学号排序
pub(super) async fn cohort_models<C: ConnectionTrait>(
    conn: &C,
    cohort: &Cohort,
    class_id: Option<i64>,
) -> Result<Vec<Model>> {
    let mut select = Evaluations::find()
        .filter(Column::AcademicYear.eq(cohort.academic_year.as_str()))
        .filter(Column::Semester.eq(cohort.semester));

    if let Some(class_id) = class_id {
        let student_ids: Vec<i64> = Students::find()
            .select_only()
            .column(StudentColumn::StudentId)
            .filter(StudentColumn::ClassId.eq(class_id))
            .into_tuple()
            .all(conn)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询班级学生失败: {e}")))?;
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }
        select = select.filter(Column::StudentId.is_in(student_ids));
    }

    select
        .order_by_asc(Column::StudentId)
        .all(conn)
        .await
        .map_err(|e| GradeSystemError::database_operation(format!("查询综测记录失败: {e}")))
}

/// 为记录关联学生姓名、班级与专业
pub(super) async fn build_views<C: ConnectionTrait>(
    conn: &C,
    records: Vec<Model>,
) -> Result<Vec<EvaluationView>> {
    let mut student_ids: Vec<i64> = records.iter().map(|r| r.student_id).collect();
    student_ids.sort_unstable();
    student_ids.dedup();

    let students: HashMap<i64, crate::entity::students::Model> = if student_ids.is_empty() {
        HashMap::new()
    } else {
        Students::find()
            .filter(StudentColumn::StudentId.is_in(student_ids))
            .all(conn)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询学生失败: {e}")))?
            .into_iter()
            .map(|s| (s.student_id, s))
            .collect()
    };

    let names = class_names(conn, students.values().filter_map(|s| s.class_id)).await?;

    Ok(records
        .into_iter()
        .map(|record| {
            let student = students.get(&record.student_id);
            let class_id = student.and_then(|s| s.class_id);
            EvaluationView {
                student_name: student.map(|s| s.name.clone()).unwrap_or_default(),
                class_name: class_id.and_then(|id| names.get(&id).cloned()),
                major: student.map(|s| s.major.clone()),
                class_id,
                record: record.into_score_record(),
            }
        })
        .collect())
}

impl SeaOrmStorage {
    /// 插入或整体覆盖综测记录，并在同一事务中重新计算总分
    ///
    /// 事务的第一条语句即为写入（INSERT ... ON CONFLICT DO UPDATE），
    /// 同一学生同一学期的并发提交在数据库写锁上排队，后写入者生效。
    pub async fn upsert_evaluation_impl(
        &self,
        key: EvaluationKey,
        scores: RawScores,
        policy: &EvaluationPolicy,
    ) -> Result<ScoreRecord> {
        validate_raw_scores(&scores)?;

        let Some(student) = Students::find_by_id(key.student_id)
            .one(&self.db)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询学生失败: {e}")))?
        else {
            return Err(GradeSystemError::not_found(format!(
                "学生不存在: {}",
                key.student_id
            )));
        };
        if student.status == StudentStatus::Deleted.to_string() {
            return Err(GradeSystemError::validation(format!(
                "学生已删除，不能提交综测成绩: {}",
                key.student_id
            )));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        let mut model = ActiveModel {
            student_id: Set(key.student_id),
            academic_year: Set(key.academic_year.clone()),
            semester: Set(key.semester),
            innovation_total_score: Set(0.0),
            social_total_score: Set(0.0),
            total_score: Set(0.0),
            class_rank: Set(None),
            grade_rank: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        set_raw_scores(&mut model, &scores);

        Evaluations::insert(model)
            .on_conflict(
                OnConflict::columns([Column::StudentId, Column::AcademicYear, Column::Semester])
                    .update_columns(RAW_COLUMNS)
                    .update_column(Column::UpdatedAt)
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| map_write_err("保存综测记录失败", e))?;

        // 已持有写锁，读取到的即为本次写入后的记录
        let Some(stored) = find_by_key(&txn, &key).await? else {
            return Err(GradeSystemError::database_operation(format!(
                "综测记录写入后未找到: {} {}-{}",
                key.student_id, key.academic_year, key.semester
            )));
        };

        let bonus_items = load_bonus_items(&txn, stored.id).await?;
        let computed = compute_scores(&scores, &bonus_items, policy)?;

        let mut model: ActiveModel = stored.into();
        set_computed(&mut model, &computed);
        let saved = model
            .update(&txn)
            .await
            .map_err(|e| map_write_err("更新综测总分失败", e))?;

        txn.commit()
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("提交事务失败: {e}")))?;

        debug!(
            "综测记录已保存: student_id={}, {}-{}, total={}",
            saved.student_id, saved.academic_year, saved.semester, saved.total_score
        );

        Ok(saved.into_score_record())
    }

    pub async fn get_evaluation_by_key_impl(
        &self,
        key: &EvaluationKey,
    ) -> Result<Option<ScoreRecord>> {
        Ok(find_by_key(&self.db, key)
            .await?
            .map(|m| m.into_score_record()))
    }

    pub async fn get_evaluation_by_id_impl(&self, evaluation_id: i64) -> Result<Option<ScoreRecord>> {
        let result = Evaluations::find_by_id(evaluation_id)
            .one(&self.db)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询综测记录失败: {e}")))?;

        Ok(result.map(|m| m.into_score_record()))
    }

    pub async fn list_cohort_impl(
        &self,
        cohort: &Cohort,
        class_id: Option<i64>,
    ) -> Result<Vec<ScoreRecord>> {
        Ok(cohort_models(&self.db, cohort, class_id)
            .await?
            .into_iter()
            .map(|m| m.into_score_record())
            .collect())
    }

    /// 追加加分明细，并在同一事务中重新计算所属记录的总分
    pub async fn append_bonus_item_impl(
        &self,
        evaluation_id: i64,
        item: CreateBonusItemRequest,
        policy: &EvaluationPolicy,
    ) -> Result<(BonusItem, ScoreRecord)> {
        let category = item.category.trim().to_string();
        let item_name = item.item_name.trim().to_string();
        if category.is_empty() {
            return Err(GradeSystemError::validation("加分类别不能为空"));
        }
        if item_name.is_empty() {
            return Err(GradeSystemError::validation("加分项目名称不能为空"));
        }
        validate_bonus_score(item.score)?;

        let exists = Evaluations::find_by_id(evaluation_id)
            .one(&self.db)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询综测记录失败: {e}")))?
            .is_some();
        if !exists {
            return Err(GradeSystemError::not_found(format!(
                "综测记录不存在: {evaluation_id}"
            )));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("开启事务失败: {e}")))?;

        // 先写入明细以获取写锁，再读取记录重新计算
        let now = chrono::Utc::now().timestamp();
        let inserted = BonusActiveModel {
            evaluation_id: Set(evaluation_id),
            category: Set(category),
            item_name: Set(item_name),
            score: Set(item.score),
            description: Set(item.description),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| map_write_err("添加加分明细失败", e))?;

        let Some(evaluation) = Evaluations::find_by_id(evaluation_id)
            .one(&txn)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询综测记录失败: {e}")))?
        else {
            return Err(GradeSystemError::not_found(format!(
                "综测记录不存在: {evaluation_id}"
            )));
        };

        let bonus_items = load_bonus_items(&txn, evaluation_id).await?;
        let computed = compute_scores(&evaluation.raw_scores(), &bonus_items, policy)?;

        let mut model: ActiveModel = evaluation.into();
        set_computed(&mut model, &computed);
        model.updated_at = Set(now);
        let updated = model
            .update(&txn)
            .await
            .map_err(|e| map_write_err("更新综测总分失败", e))?;

        txn.commit()
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok((inserted.into_bonus_item(), updated.into_score_record()))
    }

    pub async fn list_bonus_items_impl(&self, evaluation_id: i64) -> Result<Vec<BonusItem>> {
        load_bonus_items(&self.db, evaluation_id).await
    }

    /// 学生综测详情：记录、身份信息与加分明细
    pub async fn get_evaluation_detail_impl(
        &self,
        key: &EvaluationKey,
    ) -> Result<Option<EvaluationDetail>> {
        let Some(record) = find_by_key(&self.db, key).await? else {
            return Ok(None);
        };
        let evaluation_id = record.id;

        let view = build_views(&self.db, vec![record])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GradeSystemError::database_operation("构建综测视图失败"))?;
        let bonus_items = load_bonus_items(&self.db, evaluation_id).await?;

        Ok(Some(EvaluationDetail { view, bonus_items }))
    }
}
