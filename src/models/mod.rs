//! 数据模型定义
//!
//! 按业务域划分为 entities（业务实体）、requests（请求参数）、responses（响应结构）。

pub mod auth;
pub mod classes;
pub mod common;
pub mod courses;
pub mod evaluations;
pub mod rankings;
pub mod students;
pub mod users;

pub use common::error_code::ErrorCode;
pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery, ServiceInfo};

// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
