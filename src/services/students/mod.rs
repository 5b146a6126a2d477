pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::students::entities::StudentStatus;
use crate::models::students::requests::{
    CreateStudentRequest, StudentProfileInput, StudentQueryParams, UpdateStudentRequest,
};
use crate::storage::Storage;
use crate::utils::validate::{validate_date, validate_email, validate_id_card, validate_phone};

pub struct StudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl StudentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 创建学生档案并开通学生账号
    pub async fn create_student(
        &self,
        student_data: CreateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_student(self, student_data, request).await
    }

    pub async fn list_students(
        &self,
        query: StudentQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_students(self, query, request).await
    }

    pub async fn get_student(
        &self,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_student(self, student_id, request).await
    }

    pub async fn update_student(
        &self,
        student_id: i64,
        update_data: UpdateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_student(self, student_id, update_data, request).await
    }

    pub async fn delete_student(
        &self,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_student(self, student_id, request).await
    }
}

fn trim_optional(value: &mut Option<String>) {
    *value = value
        .take()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
}

/// 校验并规范化学生档案字段
pub(crate) fn validate_profile(profile: &mut StudentProfileInput) -> Result<(), String> {
    profile.name = profile.name.trim().to_string();
    profile.major = profile.major.trim().to_string();
    if profile.name.is_empty() {
        return Err("姓名不能为空".to_string());
    }
    if profile.major.is_empty() {
        return Err("专业不能为空".to_string());
    }
    if profile.status == Some(StudentStatus::Deleted) {
        return Err("不能直接设置为已删除状态，请使用删除接口".to_string());
    }

    for field in [
        &mut profile.gender,
        &mut profile.birthdate,
        &mut profile.hometown,
        &mut profile.id_card,
        &mut profile.phone,
        &mut profile.email,
        &mut profile.address,
        &mut profile.enrollment_date,
    ] {
        trim_optional(field);
    }

    if let Some(email) = &profile.email {
        validate_email(email)?;
    }
    if let Some(phone) = &profile.phone {
        validate_phone(phone)?;
    }
    if let Some(id_card) = &profile.id_card {
        validate_id_card(id_card)?;
    }
    if let Some(birthdate) = &profile.birthdate {
        validate_date(birthdate).map_err(|e| format!("出生{e}"))?;
    }
    if let Some(enrollment_date) = &profile.enrollment_date {
        validate_date(enrollment_date).map_err(|e| format!("入学{e}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> StudentProfileInput {
        StudentProfileInput {
            name: " 张三 ".to_string(),
            class_id: Some(1),
            major: "软件工程".to_string(),
            gender: Some("".to_string()),
            birthdate: Some("2004-05-01".to_string()),
            hometown: None,
            id_card: None,
            phone: Some("13800138000".to_string()),
            email: None,
            address: None,
            enrollment_date: None,
            status: None,
        }
    }

    #[test]
    fn test_profile_is_normalized() {
        let mut p = profile();
        validate_profile(&mut p).unwrap();
        assert_eq!(p.name, "张三");
        assert_eq!(p.gender, None);
    }

    #[test]
    fn test_profile_rejects_bad_fields() {
        let mut p = profile();
        p.birthdate = Some("2004-13-01".to_string());
        assert!(validate_profile(&mut p).unwrap_err().starts_with("出生日期格式错误"));

        let mut p = profile();
        p.status = Some(StudentStatus::Deleted);
        assert!(validate_profile(&mut p).is_err());

        let mut p = profile();
        p.name = "  ".to_string();
        assert_eq!(validate_profile(&mut p).unwrap_err(), "姓名不能为空");
    }
}
