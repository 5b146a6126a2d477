pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::courses::requests::{CourseInput, CourseQueryParams};
use crate::storage::Storage;

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn create_course(
        &self,
        course_data: CourseInput,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_course(self, course_data, request).await
    }

    pub async fn list_courses(
        &self,
        query: CourseQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_courses(self, query, request).await
    }

    pub async fn get_course(&self, course_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_course(self, course_id, request).await
    }

    pub async fn update_course(
        &self,
        course_id: i64,
        course_data: CourseInput,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_course(self, course_id, course_data, request).await
    }

    // 停开课程（逻辑删除）
    pub async fn delete_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_course(self, course_id, request).await
    }
}

/// 校验课程字段，课程编号统一为大写
pub(crate) fn validate_course(input: &mut CourseInput) -> Result<(), &'static str> {
    input.course_code = input.course_code.trim().to_uppercase();
    input.course_name = input.course_name.trim().to_string();

    if input.course_code.is_empty() || input.course_code.len() > 32 {
        return Err("课程编号不能为空且不超过 32 个字符");
    }
    if input.course_name.is_empty() {
        return Err("课程名称不能为空");
    }
    if !input.credits.is_finite() || input.credits < 0.0 {
        return Err("学分必须为非负数");
    }
    if input.hours < 0 {
        return Err("学时必须为非负整数");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CourseInput {
        CourseInput {
            course_code: " cs101 ".to_string(),
            course_name: "程序设计基础".to_string(),
            credits: 4.0,
            hours: 64,
            course_type: None,
            department: None,
            prerequisites: None,
            description: None,
            status: None,
        }
    }

    #[test]
    fn test_course_code_normalized() {
        let mut c = input();
        validate_course(&mut c).unwrap();
        assert_eq!(c.course_code, "CS101");
    }

    #[test]
    fn test_invalid_course_fields() {
        let mut c = input();
        c.credits = f64::NAN;
        assert_eq!(validate_course(&mut c), Err("学分必须为非负数"));

        let mut c = input();
        c.hours = -1;
        assert!(validate_course(&mut c).is_err());
    }
}
