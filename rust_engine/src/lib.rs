//! MMD Jitter - 程序化待机动作引擎
//!
//! 在 MMD 模型的骨骼和 Morph 上叠加随机化的周期波形：
//! - 骨骼 X/Y/Z 旋转抖动（呼吸、摇摆）
//! - Morph 权重抖动（眨眼、表情微动）
//! - 眼球扫视
//! - 循环 / 单次播放与淡入淡出

pub mod jitter;
pub mod morph;
pub mod skeleton;

pub use jitter::{
    BoneJitter, BoneJitterConfig, EyeJitter, EyeJitterConfig, JitterConfig, JitterParameter,
    MorphJitter, MorphJitterConfig, Waveform,
};
pub use morph::{Morph, MorphManager};
pub use skeleton::{Bone, BoneManager};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum JitterError {
    #[error("Bone not found: {0}")]
    BoneNotFound(String),

    #[error("Morph not found: {0}")]
    MorphNotFound(String),

    #[error("Nested child controllers are not supported")]
    NestedChild,

    #[error("Controller is already attached as a child")]
    AlreadyChild,
}

pub type Result<T> = std::result::Result<T, JitterError>;
