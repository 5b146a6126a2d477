use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::rankings::requests::{
    CalculateRankingRequest, RankingExportQuery, RankingListQuery,
};
use crate::models::users::entities::UserRole;
use crate::services::RankingService;

// 懒加载的全局 RankingService 实例
static RANKING_SERVICE: Lazy<RankingService> = Lazy::new(RankingService::new_lazy);

pub async fn calculate_rankings(
    req: HttpRequest,
    body: web::Json<CalculateRankingRequest>,
) -> ActixResult<HttpResponse> {
    RANKING_SERVICE.calculate(body.into_inner(), &req).await
}

pub async fn list_rankings(
    req: HttpRequest,
    query: web::Query<RankingListQuery>,
) -> ActixResult<HttpResponse> {
    RANKING_SERVICE.list(query.into_inner(), &req).await
}

pub async fn export_rankings(
    req: HttpRequest,
    query: web::Query<RankingExportQuery>,
) -> ActixResult<HttpResponse> {
    RANKING_SERVICE.export(query.into_inner(), &req).await
}

// 配置路由
pub fn configure_rankings_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/rankings")
            .wrap(middlewares::RequireJWT)
            // 所有登录用户可查看，学生角色在服务层截断条数
            .route("", web::get().to(list_rankings))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .service(
                        web::resource("/calculate")
                            .wrap(middlewares::RateLimit::ranking_calculation())
                            .route(web::post().to(calculate_rankings)),
                    )
                    .route("/export", web::get().to(export_rankings)),
            ),
    );
}
