//! 抖动全局配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。

use once_cell::sync::Lazy;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::sync::RwLock;

/// 抖动配置（扁平化，不嵌套）
#[derive(Debug, Clone, PartialEq)]
pub struct JitterConfig {
    // ========== 随机数 ==========
    /// 随机种子，None 时从系统熵源初始化
    /// 设置后每个新建的控制器按创建顺序得到确定的种子
    pub rng_seed: Option<u64>,

    // ========== 淡入淡出 ==========
    /// 淡入淡出最短时间（秒），默认 0.01
    pub min_fade_seconds: f32,

    // ========== 骨骼 ==========
    /// 骨骼权重 -> 角度（度）的默认倍率，默认 10.0
    pub default_angle_magnification: f32,

    // ========== 调试 ==========
    /// 是否输出播放状态切换日志，默认 false
    pub debug_log: bool,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            // 防止除零
            min_fade_seconds: 0.01,
            // 权重 ±1 对应 ±10 度
            default_angle_magnification: 10.0,
            debug_log: false,
        }
    }
}

/// 全局配置实例
static JITTER_CONFIG: Lazy<RwLock<JitterConfig>> = Lazy::new(|| {
    RwLock::new(JitterConfig::default())
});

/// 种子序号，保证同一种子下每个控制器的随机序列不同
static SEED_COUNTER: Lazy<RwLock<u64>> = Lazy::new(|| RwLock::new(0));

/// 获取当前配置（只读）
pub fn get_config() -> JitterConfig {
    JITTER_CONFIG
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: JitterConfig) {
    *JITTER_CONFIG
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
    reset_seed_counter();
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(JitterConfig::default());
}

fn reset_seed_counter() {
    *SEED_COUNTER
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = 0;
}

/// 按配置创建随机数发生器
pub(crate) fn create_rng() -> Pcg32 {
    match get_config().rng_seed {
        Some(seed) => {
            let mut counter = SEED_COUNTER
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let stream = *counter;
            *counter += 1;
            Pcg32::new(seed, stream.wrapping_mul(2).wrapping_add(1))
        }
        None => Pcg32::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = JitterConfig::default();
        assert_eq!(config.rng_seed, None);
        assert_eq!(config.min_fade_seconds, 0.01);
        assert_eq!(config.default_angle_magnification, 10.0);
        assert!(!config.debug_log);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        use rand::Rng;

        set_config(JitterConfig {
            rng_seed: Some(42),
            ..JitterConfig::default()
        });
        let mut first = create_rng();
        let mut second = create_rng();
        let a: u64 = first.gen();
        assert_ne!(a, second.gen::<u64>());

        // 重新设置配置后序号归零
        set_config(JitterConfig {
            rng_seed: Some(42),
            ..JitterConfig::default()
        });
        assert_eq!(a, create_rng().gen::<u64>());
        reset_config();
    }
}
