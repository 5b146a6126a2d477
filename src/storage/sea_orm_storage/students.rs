//! 学生档案存储操作

use std::collections::HashMap;

use super::users::insert_user;
use super::{SeaOrmStorage, map_write_err};
use crate::entity::classes::{Column as ClassColumn, Entity as Classes};
use crate::entity::students::{ActiveModel, Column, Entity as Students, Model};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{GradeSystemError, Result};
use crate::models::{
    PaginationInfo,
    students::{
        entities::{Student, StudentStatus},
        requests::{
            CreateStudentRequest, StudentListQuery, StudentProfileInput, UpdateStudentRequest,
        },
        responses::StudentListResponse,
    },
    users::{entities::UserStatus, requests::NewUser},
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

/// 批量查询班级名称
pub(super) async fn class_names<C: ConnectionTrait>(
    conn: &C,
    class_ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, String>> {
    let mut ids: Vec<i64> = class_ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let classes = Classes::find()
        .filter(ClassColumn::Id.is_in(ids))
        .all(conn)
        .await
        .map_err(|e| GradeSystemError::database_operation(format!("查询班级失败: {e}")))?;

    Ok(classes.into_iter().map(|c| (c.id, c.class_name)).collect())
}

/// 校验档案中的班级是否存在
async fn ensure_class_exists<C: ConnectionTrait>(conn: &C, class_id: Option<i64>) -> Result<()> {
    let Some(class_id) = class_id else {
        return Ok(());
    };
    let found = Classes::find_by_id(class_id)
        .one(conn)
        .await
        .map_err(|e| GradeSystemError::database_operation(format!("查询班级失败: {e}")))?;
    if found.is_none() {
        return Err(GradeSystemError::validation(format!("班级不存在: {class_id}")));
    }
    Ok(())
}

fn apply_profile(model: &mut ActiveModel, profile: StudentProfileInput) {
    model.name = Set(profile.name);
    model.class_id = Set(profile.class_id);
    model.major = Set(profile.major);
    model.gender = Set(profile.gender);
    model.birthdate = Set(profile.birthdate);
    model.hometown = Set(profile.hometown);
    model.id_card = Set(profile.id_card);
    model.phone = Set(profile.phone);
    model.email = Set(profile.email);
    model.address = Set(profile.address);
    model.enrollment_date = Set(profile.enrollment_date);
}

impl SeaOrmStorage {
    async fn to_student(&self, model: Model) -> Result<Student> {
        let class_name = match model.class_id {
            Some(class_id) => class_names(&self.db, [class_id]).await?.remove(&class_id),
            None => None,
        };
        Ok(model.into_student(class_name))
    }

    /// 创建学生并在同一事务中创建学生账号
    pub async fn create_student_impl(
        &self,
        req: CreateStudentRequest,
        account: NewUser,
    ) -> Result<Student> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let existing = Students::find_by_id(req.student_id)
            .one(&txn)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询学生失败: {e}")))?;
        if existing.is_some() {
            return Err(GradeSystemError::conflict(format!(
                "学号已存在: {}",
                req.student_id
            )));
        }

        let username_taken = Users::find()
            .filter(UserColumn::Username.eq(account.username.as_str()))
            .count(&txn)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询用户失败: {e}")))?;
        if username_taken > 0 {
            return Err(GradeSystemError::conflict(format!(
                "用户名已存在: {}",
                account.username
            )));
        }

        ensure_class_exists(&txn, req.profile.class_id).await?;

        let status = req.profile.status.clone().unwrap_or(StudentStatus::Enrolled);
        let mut model = ActiveModel {
            student_id: Set(req.student_id),
            status: Set(status.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        apply_profile(&mut model, req.profile);

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| map_write_err("创建学生失败", e))?;

        insert_user(&txn, account).await?;

        txn.commit()
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("提交事务失败: {e}")))?;

        self.to_student(inserted).await
    }

    /// 通过学号获取学生
    pub async fn get_student_by_id_impl(&self, student_id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(student_id)
            .one(&self.db)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询学生失败: {e}")))?;

        match result {
            Some(model) => Ok(Some(self.to_student(model).await?)),
            None => Ok(None),
        }
    }

    /// 分页列出学生（已删除的学生不出现在列表中）
    pub async fn list_students_with_pagination_impl(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select =
            Students::find().filter(Column::Status.ne(StudentStatus::Deleted.to_string()));

        // 搜索姓名、学号、班级名称
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            let matched_class_ids: Vec<i64> = Classes::find()
                .select_only()
                .column(ClassColumn::Id)
                .filter(ClassColumn::ClassName.like(contains_pattern(search)))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| {
                    GradeSystemError::database_operation(format!("查询班级失败: {e}"))
                })?;

            let mut condition = Condition::any().add(Column::Name.like(contains_pattern(search)));
            if let Ok(student_id) = search.parse::<i64>() {
                condition = condition.add(Column::StudentId.eq(student_id));
            }
            if !matched_class_ids.is_empty() {
                condition = condition.add(Column::ClassId.is_in(matched_class_ids));
            }
            select = select.filter(condition);
        }

        select = select.order_by_asc(Column::StudentId);

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            GradeSystemError::database_operation(format!("查询学生总数失败: {e}"))
        })?;

        let students = paginator.fetch_page(page - 1).await.map_err(|e| {
            GradeSystemError::database_operation(format!("查询学生列表失败: {e}"))
        })?;

        let names = class_names(&self.db, students.iter().filter_map(|s| s.class_id)).await?;

        Ok(StudentListResponse {
            items: students
                .into_iter()
                .map(|s| {
                    let class_name = s.class_id.and_then(|id| names.get(&id).cloned());
                    s.into_student(class_name)
                })
                .collect(),
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    /// 整体覆盖学生档案
    pub async fn update_student_impl(
        &self,
        student_id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        let Some(existing) = Students::find_by_id(student_id)
            .one(&self.db)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询学生失败: {e}")))?
        else {
            return Ok(None);
        };

        ensure_class_exists(&self.db, update.class_id).await?;

        let status = update
            .status
            .clone()
            .map(|s| s.to_string())
            .unwrap_or(existing.status);

        let mut model = ActiveModel {
            student_id: Set(student_id),
            status: Set(status),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        apply_profile(&mut model, update);

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("更新学生失败", e))?;

        Ok(Some(self.to_student(updated).await?))
    }

    /// 逻辑删除学生，同时停用关联的学生账号
    pub async fn delete_student_impl(&self, student_id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let result = Students::update_many()
            .col_expr(Column::Status, Expr::value(StudentStatus::Deleted.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::StudentId.eq(student_id))
            .exec(&txn)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("删除学生失败: {e}")))?;

        if result.rows_affected == 0 {
            return Ok(false);
        }

        Users::update_many()
            .col_expr(UserColumn::Status, Expr::value(UserStatus::Suspended.to_string()))
            .col_expr(UserColumn::UpdatedAt, Expr::value(now))
            .filter(UserColumn::RelatedStudentId.eq(student_id))
            .exec(&txn)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("停用学生账号失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(true)
    }
}
