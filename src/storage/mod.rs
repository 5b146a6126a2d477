use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::models::{
    classes::{
        entities::Class,
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    courses::{
        entities::Course,
        requests::{CourseInput, CourseListQuery},
        responses::CourseListResponse,
    },
    evaluations::{
        entities::{
            BonusItem, Cohort, EvaluationDetail, EvaluationKey, EvaluationView, RawScores,
            ScoreRecord,
        },
        requests::CreateBonusItemRequest,
    },
    students::{
        entities::Student,
        requests::{CreateStudentRequest, StudentListQuery, UpdateStudentRequest},
        responses::StudentListResponse,
    },
    users::{
        entities::User,
        requests::{NewUser, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::scoring::EvaluationPolicy;

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: NewUser) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 班级管理方法
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class>;
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse>;
    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>>;
    async fn delete_class(&self, class_id: i64) -> Result<bool>;

    /// 学生档案方法
    // 创建学生并同时创建学生账号
    async fn create_student(&self, student: CreateStudentRequest, account: NewUser)
    -> Result<Student>;
    async fn get_student_by_id(&self, student_id: i64) -> Result<Option<Student>>;
    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse>;
    // 整体覆盖学生档案
    async fn update_student(
        &self,
        student_id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>>;
    // 逻辑删除学生并停用其账号
    async fn delete_student(&self, student_id: i64) -> Result<bool>;

    /// 课程管理方法
    async fn create_course(&self, course: CourseInput) -> Result<Course>;
    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse>;
    async fn update_course(&self, course_id: i64, update: CourseInput) -> Result<Option<Course>>;
    // 逻辑删除（停开）课程
    async fn delete_course(&self, course_id: i64) -> Result<bool>;

    /// 综测记录方法
    // 按唯一键插入或整体覆盖原始分项，并重新计算总分
    async fn upsert_evaluation(
        &self,
        key: EvaluationKey,
        scores: RawScores,
        policy: &EvaluationPolicy,
    ) -> Result<ScoreRecord>;
    async fn get_evaluation_by_key(&self, key: &EvaluationKey) -> Result<Option<ScoreRecord>>;
    async fn get_evaluation_by_id(&self, evaluation_id: i64) -> Result<Option<ScoreRecord>>;
    // 列出一个学年学期的全部记录（可按班级过滤），按学号排序
    async fn list_cohort(&self, cohort: &Cohort, class_id: Option<i64>)
    -> Result<Vec<ScoreRecord>>;

    /// 加分明细方法
    // 追加加分明细并重新计算所属记录的总分
    async fn append_bonus_item(
        &self,
        evaluation_id: i64,
        item: CreateBonusItemRequest,
        policy: &EvaluationPolicy,
    ) -> Result<(BonusItem, ScoreRecord)>;
    // 按插入顺序列出加分明细
    async fn list_bonus_items(&self, evaluation_id: i64) -> Result<Vec<BonusItem>>;

    /// 排名方法
    // 在单个事务中重新计算并写入整个学年学期的总分与排名，返回参与排名的记录数
    async fn recalculate_rankings(&self, cohort: &Cohort, policy: &EvaluationPolicy)
    -> Result<u64>;
    // 按年级排名顺序列出（可按班级过滤）
    async fn list_rankings(
        &self,
        cohort: &Cohort,
        class_id: Option<i64>,
        limit: u64,
    ) -> Result<Vec<EvaluationView>>;
    // 导出用：有班级过滤时按班级排名排序，否则按年级排名排序
    async fn list_export_rows(
        &self,
        cohort: &Cohort,
        class_id: Option<i64>,
    ) -> Result<Vec<EvaluationView>>;
    // 学生综测详情
    async fn get_evaluation_detail(&self, key: &EvaluationKey) -> Result<Option<EvaluationDetail>>;
}

pub async fn create_storage(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async(config).await?;
    Ok(Arc::new(storage))
}
