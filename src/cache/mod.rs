//! 对象缓存
//!
//! 缓存后端以插件形式在启动前通过 `ctor` 注册，运行时按 `cache.type` 选择。

pub mod object_cache;
pub mod register;
pub mod traits;

pub use traits::{CacheResult, ObjectCache};

/// 声明并注册一个对象缓存插件
///
/// 插件类型需要提供 `fn new(config: &CacheConfig) -> Result<Self, String>`。
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:literal, $ty:ty) => {
        #[ctor::ctor]
        unsafe fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|config: $crate::config::CacheConfig| {
                    Box::pin(async move {
                        let cache = <$ty>::new(&config).map_err(|e| {
                            $crate::errors::GradeSystemError::cache_connection(format!(
                                "{} 缓存初始化失败: {e}",
                                $name
                            ))
                        })?;
                        Ok(Box::new(cache) as Box<dyn $crate::cache::ObjectCache>)
                    })
                }),
            );
        }
    };
}
