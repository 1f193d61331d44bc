//! 骨骼系统
//!
//! 抖动控制器通过 `BoneSink` 写入 `animation_rotate`，
//! 宿主再用 `update_transforms` 得到全局变换。

mod bone;
mod manager;

pub use bone::Bone;
pub use manager::BoneManager;
