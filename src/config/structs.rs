use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub argon2: Argon2Config,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub cors: CorsConfig,
    pub evaluation: EvaluationConfig,
    pub students: StudentsConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
    pub refresh_token_remember_me_expiry: i64,
}

/// Argon2 哈希参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argon2Config {
    pub memory_cost: u32, // KiB
    pub time_cost: u32,
    pub parallelism: u32,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    pub cache_type: String,
    pub default_ttl: u64,
    pub redis: RedisConfig,
    pub memory: MemoryConfig,
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub key_prefix: String,
    pub pool_size: u64,
}

/// 内存缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    pub max_capacity: u64,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub max_age: usize,
}

/// 综合测评配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default)]
    pub weights: EvaluationWeights,
    /// GPA 折算为学业成绩的系数（未录入 academic_score 时使用）
    #[serde(default = "default_gpa_factor")]
    pub gpa_to_academic_factor: f64,
    /// 计入创新总分的加分类别关键字
    #[serde(default = "default_innovation_categories")]
    pub innovation_categories: Vec<String>,
    /// 计入社会服务总分的加分类别关键字
    #[serde(default = "default_social_categories")]
    pub social_categories: Vec<String>,
    /// 同分排名规则: "student_id" 或 "shared"
    #[serde(default = "default_tie_break")]
    pub tie_break: String,
    #[serde(default = "default_ranking_limit")]
    pub default_ranking_limit: u64,
    #[serde(default = "default_max_ranking_limit")]
    pub max_ranking_limit: u64,
    /// 学生角色查看排名时的条数上限
    #[serde(default = "default_student_ranking_limit")]
    pub student_ranking_limit: u64,
}

/// 各分项权重
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationWeights {
    pub moral: f64,
    pub academic: f64,
    pub physical: f64,
    pub innovation: f64,
    pub social: f64,
    pub cultural_sports: f64,
    pub student_work: f64,
    pub other_bonus: f64,
}

impl Default for EvaluationWeights {
    fn default() -> Self {
        Self {
            moral: 1.0,
            academic: 1.0,
            physical: 1.0,
            innovation: 1.0,
            social: 1.0,
            cultural_sports: 1.0,
            student_work: 1.0,
            other_bonus: 1.0,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            weights: EvaluationWeights::default(),
            gpa_to_academic_factor: default_gpa_factor(),
            innovation_categories: default_innovation_categories(),
            social_categories: default_social_categories(),
            tie_break: default_tie_break(),
            default_ranking_limit: default_ranking_limit(),
            max_ranking_limit: default_max_ranking_limit(),
            student_ranking_limit: default_student_ranking_limit(),
        }
    }
}

fn default_gpa_factor() -> f64 {
    20.0
}

fn default_innovation_categories() -> Vec<String> {
    ["创新", "竞赛", "科研", "innovation"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_social_categories() -> Vec<String> {
    ["社会", "志愿", "social"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_tie_break() -> String {
    "student_id".to_string()
}

fn default_ranking_limit() -> u64 {
    50
}

fn default_max_ranking_limit() -> u64 {
    500
}

fn default_student_ranking_limit() -> u64 {
    10
}

/// 学生账号配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentsConfig {
    /// 新建学生时自动创建账号使用的初始密码
    #[serde(skip_serializing, default = "default_student_password")]
    pub default_password: String,
}

impl Default for StudentsConfig {
    fn default() -> Self {
        Self {
            default_password: default_student_password(),
        }
    }
}

fn default_student_password() -> String {
    "Student@123".to_string()
}
