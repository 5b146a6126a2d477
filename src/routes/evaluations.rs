use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::evaluations::requests::{
    CreateBonusItemRequest, StudentDetailQuery, SubmitEvaluationRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::EvaluationService;
use crate::utils::{SafeEvaluationIdI64, SafeStudentIdI64};

// 懒加载的全局 EvaluationService 实例
static EVALUATION_SERVICE: Lazy<EvaluationService> = Lazy::new(EvaluationService::new_lazy);

pub async fn submit_evaluation(
    req: HttpRequest,
    submission: web::Json<SubmitEvaluationRequest>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .submit_evaluation(submission.into_inner(), &req)
        .await
}

pub async fn add_bonus_item(
    req: HttpRequest,
    evaluation_id: SafeEvaluationIdI64,
    item: web::Json<CreateBonusItemRequest>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .add_bonus_item(evaluation_id.0, item.into_inner(), &req)
        .await
}

pub async fn list_bonus_items(
    req: HttpRequest,
    evaluation_id: SafeEvaluationIdI64,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .list_bonus_items(evaluation_id.0, &req)
        .await
}

pub async fn get_student_detail(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
    query: web::Query<StudentDetailQuery>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .get_student_detail(student_id.0, query.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_evaluations_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/evaluations")
            .wrap(middlewares::RequireJWT)
            // 学生可查看本人详情，权限在服务层判断
            .route("/students/{student_id}", web::get().to(get_student_detail))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route("", web::post().to(submit_evaluation))
                    .route(
                        "/{evaluation_id}/bonus-items",
                        web::post().to(add_bonus_item),
                    )
                    .route(
                        "/{evaluation_id}/bonus-items",
                        web::get().to(list_bonus_items),
                    ),
            ),
    );
}
