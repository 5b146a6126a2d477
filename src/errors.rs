//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_grade_system_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum GradeSystemError {
            $($variant(String),)*
        }

        impl GradeSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(GradeSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(GradeSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(GradeSystemError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl GradeSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        GradeSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_grade_system_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    FileOperation("E006", "File Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    Conflict("E010", "Resource Conflict"),
    DateParse("E011", "Date Parse Error"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
    ComputationPrecondition("E014", "Computation Precondition Failed"),
    Export("E015", "Export Error"),
}

impl GradeSystemError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GradeSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GradeSystemError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for GradeSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        GradeSystemError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for GradeSystemError {
    fn from(err: std::io::Error) -> Self {
        GradeSystemError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for GradeSystemError {
    fn from(err: serde_json::Error) -> Self {
        GradeSystemError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for GradeSystemError {
    fn from(err: chrono::ParseError) -> Self {
        GradeSystemError::DateParse(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for GradeSystemError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        GradeSystemError::Export(err.to_string())
    }
}

impl From<csv::Error> for GradeSystemError {
    fn from(err: csv::Error) -> Self {
        GradeSystemError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GradeSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GradeSystemError::cache_connection("test").code(), "E001");
        assert_eq!(GradeSystemError::database_config("test").code(), "E003");
        assert_eq!(GradeSystemError::validation("test").code(), "E007");
        assert_eq!(GradeSystemError::conflict("test").code(), "E010");
        assert_eq!(GradeSystemError::authentication("test").code(), "E012");
        assert_eq!(
            GradeSystemError::computation_precondition("test").code(),
            "E014"
        );
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            GradeSystemError::cache_connection("test").error_type(),
            "Cache Connection Error"
        );
        assert_eq!(
            GradeSystemError::not_found("test").error_type(),
            "Resource Not Found"
        );
    }

    #[test]
    fn test_error_message() {
        let err = GradeSystemError::validation("学期必须为 1 或 2");
        assert_eq!(err.message(), "学期必须为 1 或 2");
    }

    #[test]
    fn test_db_err_maps_to_database_operation() {
        let err: GradeSystemError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert_eq!(err.code(), "E005");
        assert!(err.message().contains("boom"));
    }

    #[test]
    fn test_format_simple() {
        let err = GradeSystemError::validation("Invalid academic year");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("Invalid academic year"));
    }
}
