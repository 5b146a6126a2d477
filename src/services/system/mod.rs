use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::config::AppConfig;
use crate::models::{ApiResponse, AppStartTime, ServiceInfo};

pub struct SystemService;

impl SystemService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    // 服务名称、版本与启动时间
    pub async fn service_info(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let started_at = request
            .app_data::<web::Data<AppStartTime>>()
            .map(|data| data.start_datetime)
            .unwrap_or_else(chrono::Utc::now);

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            ServiceInfo {
                name: self.get_config().app.system_name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                started_at,
            },
            "ok",
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{ApiResponse, ServiceInfo};

    #[test]
    fn test_service_info_envelope() {
        let info = ServiceInfo {
            name: "Comprehensive Evaluation System".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(ApiResponse::success(info, "ok")).unwrap();
        assert_eq!(json["data"]["name"], "Comprehensive Evaluation System");
        assert_eq!(json["data"]["version"], env!("CARGO_PKG_VERSION"));
        assert!(json["data"]["started_at"].is_string());
    }
}
