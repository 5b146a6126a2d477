use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::{AppConfig, CacheConfig};
use crate::errors::{GradeSystemError, Result};
use crate::models::users::entities::{UserRole, UserStatus};
use crate::models::users::requests::NewUser;
use crate::scoring::EvaluationPolicy;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

const MEMORY_CACHE: &str = "moka";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub policy: EvaluationPolicy,
}

async fn build_cache(name: &str, config: &CacheConfig) -> Result<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name).ok_or_else(|| {
        GradeSystemError::cache_plugin_not_found(format!("缓存后端 '{name}' 未注册"))
    })?;
    let cache = constructor(config.clone()).await?;
    Ok(Arc::from(cache))
}

/// 创建缓存实例，配置的后端不可用时回退到内存缓存
async fn create_cache(config: &CacheConfig) -> Result<Arc<dyn ObjectCache>> {
    let cache_type = config.cache_type.as_str();
    warn!("正在创建 {} 缓存后端", cache_type);

    match build_cache(cache_type, config).await {
        Ok(cache) => {
            warn!("{} 缓存后端创建成功", cache_type);
            Ok(cache)
        }
        Err(e) if cache_type != MEMORY_CACHE => {
            warn!("创建 {} 缓存失败: {}，回退到内存缓存", cache_type, e);
            build_cache(MEMORY_CACHE, config).await
        }
        Err(e) => Err(e),
    }
}

/// 生成随机密码
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// 数据库中没有任何用户时创建默认管理员账号
async fn seed_admin(storage: &Arc<dyn Storage>) -> Result<()> {
    let count = storage.count_users().await?;
    if count > 0 {
        debug!("数据库中已有 {} 个用户，跳过创建管理员", count);
        return Ok(());
    }

    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  未设置 ADMIN_PASSWORD，已生成管理员初始密码: {}", pwd);
        warn!("  请妥善保存，或通过 ADMIN_PASSWORD 环境变量指定");
        warn!("==========================================================");
        pwd
    });

    let admin = NewUser {
        username: "admin".to_string(),
        password_hash: hash_password(&password)?,
        role: UserRole::Admin,
        status: UserStatus::Active,
        display_name: Some("管理员".to_string()),
        related_student_id: None,
    };

    let user = storage.create_user(admin).await?;
    info!("已创建默认管理员账号 (ID: {}, 用户名: {})", user.id, user.username);
    Ok(())
}

/// 准备服务器启动所需的存储、缓存与综测计算策略
pub async fn prepare_server_startup() -> Result<StartupContext> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls 加密提供者已安装");
    }

    let config = AppConfig::get();

    if cfg!(debug_assertions) {
        debug!(
            "已注册的缓存后端: {:?}",
            crate::cache::register::registered_object_cache_plugins()
        );
    }

    let policy = EvaluationPolicy::from_config(&config.evaluation)?;
    debug!("综测同分规则: {:?}", policy.tie_break);

    let storage = crate::storage::create_storage(&config.database).await?;
    warn!("存储后端初始化完成，数据库迁移已执行");

    if let Err(e) = seed_admin(&storage).await {
        warn!("创建默认管理员失败: {}", e);
    }

    let cache = create_cache(&config.cache).await?;
    warn!("缓存后端初始化完成");

    Ok(StartupContext {
        storage,
        cache,
        policy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_password_uses_charset() {
        let pwd = generate_random_password(16);
        assert_eq!(pwd.len(), 16);
        assert!(pwd.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_unknown_cache_falls_back_to_memory() {
        let config = CacheConfig {
            cache_type: "memcached".to_string(),
            default_ttl: 60,
            redis: crate::config::RedisConfig {
                url: "redis://127.0.0.1:6379".to_string(),
                key_prefix: "test:".to_string(),
                pool_size: 1,
            },
            memory: crate::config::MemoryConfig { max_capacity: 100 },
        };
        let cache = create_cache(&config).await.unwrap();
        cache.insert_raw("k".to_string(), "v".to_string(), 0).await;
        assert_eq!(cache.get_raw("k").await.into_option().as_deref(), Some("v"));
    }
}
