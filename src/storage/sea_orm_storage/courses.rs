use super::{SeaOrmStorage, map_write_err};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::errors::{GradeSystemError, Result};
use crate::models::{
    PaginationInfo,
    courses::{
        entities::{Course, CourseStatus, CourseType},
        requests::{CourseInput, CourseListQuery},
        responses::CourseListResponse,
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, sea_query::Expr,
};

impl SeaOrmStorage {
    async fn course_code_taken(&self, course_code: &str, except_id: Option<i64>) -> Result<bool> {
        let mut select = Courses::find().filter(Column::CourseCode.eq(course_code));
        if let Some(id) = except_id {
            select = select.filter(Column::Id.ne(id));
        }
        let count = select
            .count(&self.db)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询课程失败: {e}")))?;
        Ok(count > 0)
    }

    /// 创建课程
    pub async fn create_course_impl(&self, input: CourseInput) -> Result<Course> {
        if self.course_code_taken(&input.course_code, None).await? {
            return Err(GradeSystemError::conflict(format!(
                "课程编号已存在: {}",
                input.course_code
            )));
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            course_code: Set(input.course_code),
            course_name: Set(input.course_name),
            credits: Set(input.credits),
            hours: Set(input.hours),
            course_type: Set(input.course_type.unwrap_or(CourseType::Required).to_string()),
            department: Set(input.department),
            prerequisites: Set(input.prerequisites),
            description: Set(input.description),
            status: Set(input.status.unwrap_or(CourseStatus::Open).to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("创建课程失败", e))?;

        Ok(result.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, course_id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 分页列出课程
    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Courses::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            select = select.filter(
                Condition::any()
                    .add(Column::CourseCode.like(contains_pattern(search)))
                    .add(Column::CourseName.like(contains_pattern(search)))
                    .add(Column::Department.like(contains_pattern(search))),
            );
        }

        select = select.order_by_asc(Column::CourseCode);

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            GradeSystemError::database_operation(format!("查询课程总数失败: {e}"))
        })?;

        let courses = paginator.fetch_page(page - 1).await.map_err(|e| {
            GradeSystemError::database_operation(format!("查询课程列表失败: {e}"))
        })?;

        Ok(CourseListResponse {
            items: courses.into_iter().map(|m| m.into_course()).collect(),
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    /// 整体覆盖课程信息
    pub async fn update_course_impl(
        &self,
        course_id: i64,
        input: CourseInput,
    ) -> Result<Option<Course>> {
        let Some(existing) = self.get_course_by_id_impl(course_id).await? else {
            return Ok(None);
        };

        if self
            .course_code_taken(&input.course_code, Some(course_id))
            .await?
        {
            return Err(GradeSystemError::conflict(format!(
                "课程编号已存在: {}",
                input.course_code
            )));
        }

        let model = ActiveModel {
            id: Set(course_id),
            course_code: Set(input.course_code),
            course_name: Set(input.course_name),
            credits: Set(input.credits),
            hours: Set(input.hours),
            course_type: Set(input
                .course_type
                .unwrap_or(existing.course_type)
                .to_string()),
            department: Set(input.department),
            prerequisites: Set(input.prerequisites),
            description: Set(input.description),
            status: Set(input.status.unwrap_or(existing.status).to_string()),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("更新课程失败", e))?;

        Ok(Some(updated.into_course()))
    }

    /// 停开课程（逻辑删除）
    pub async fn delete_course_impl(&self, course_id: i64) -> Result<bool> {
        let result = Courses::update_many()
            .col_expr(Column::Status, Expr::value(CourseStatus::Closed.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(course_id))
            .exec(&self.db)
            .await
            .map_err(|e| GradeSystemError::database_operation(format!("删除课程失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
