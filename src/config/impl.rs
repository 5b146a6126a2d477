use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::{AppConfig, EvaluationConfig};

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("GRADESYS")
                    .separator("__")
                    .try_parsing(true),
            );

        // 支持从环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("cache.redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option(
                "cache.redis.key_prefix",
                std::env::var("REDIS_KEY_PREFIX").ok(),
            )?
            .set_override_option("cache.default_ttl", std::env::var("REDIS_TTL").ok())?
            .set_override_option(
                "evaluation.tie_break",
                std::env::var("RANKING_TIE_BREAK").ok(),
            )?
            .set_override_option(
                "students.default_password",
                std::env::var("STUDENT_DEFAULT_PASSWORD").ok(),
            )?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 处理工作线程数
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        app_config.evaluation.validate()?;

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

impl EvaluationConfig {
    /// 校验综测配置：权重必须为非负有限数，排名上限不能为 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        let weights = [
            ("moral", w.moral),
            ("academic", w.academic),
            ("physical", w.physical),
            ("innovation", w.innovation),
            ("social", w.social),
            ("cultural_sports", w.cultural_sports),
            ("student_work", w.student_work),
            ("other_bonus", w.other_bonus),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Message(format!(
                    "evaluation.weights.{name} must be a non-negative finite number, got {value}"
                )));
            }
        }

        if !self.gpa_to_academic_factor.is_finite() || self.gpa_to_academic_factor < 0.0 {
            return Err(ConfigError::Message(
                "evaluation.gpa_to_academic_factor must be a non-negative finite number"
                    .to_string(),
            ));
        }

        if !matches!(self.tie_break.as_str(), "student_id" | "shared") {
            return Err(ConfigError::Message(format!(
                "evaluation.tie_break must be 'student_id' or 'shared', got '{}'",
                self.tie_break
            )));
        }

        if self.max_ranking_limit == 0
            || self.default_ranking_limit == 0
            || self.student_ranking_limit == 0
        {
            return Err(ConfigError::Message(
                "evaluation ranking limits must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_evaluation_config_is_valid() {
        assert!(EvaluationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut cfg = EvaluationConfig::default();
        cfg.weights.physical = -0.5;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("physical"));
    }

    #[test]
    fn test_nan_weight_rejected() {
        let mut cfg = EvaluationConfig::default();
        cfg.weights.other_bonus = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_unknown_tie_break_rejected() {
        let cfg = EvaluationConfig {
            tie_break: "random".to_string(),
            ..EvaluationConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
