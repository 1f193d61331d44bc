//! 输出目标接口
//!
//! 控制器只通过这两个 trait 访问骨骼和 Morph，不直接依赖具体模型。

use std::cell::RefCell;
use std::rc::Rc;

use glam::Quat;

/// 骨骼旋转写入目标
pub trait BoneSink {
    /// 通过名称查找骨骼
    fn find_bone_by_name(&self, name: &str) -> Option<usize>;

    /// 是否有外部动画正在驱动该骨骼
    fn is_bone_animated(&self, index: usize) -> bool;

    /// 替换骨骼旋转
    fn set_bone_rotation(&mut self, index: usize, rotation: Quat);

    /// 叠加到现有旋转上（右乘）
    ///
    /// 用于外部动画驱动的骨骼。控制器每帧都会调用一次，宿主需要在每帧
    /// 抖动更新之前重新写入基础姿势，否则抖动旋转会逐帧累积。
    fn add_bone_rotation(&mut self, index: usize, rotation: Quat);

    /// 恢复静止状态
    fn reset_bone_rotation(&mut self, index: usize) {
        if !self.is_bone_animated(index) {
            self.set_bone_rotation(index, Quat::IDENTITY);
        }
    }
}

/// Morph 权重写入目标
pub trait MorphSink {
    /// 通过名称查找 Morph
    fn find_morph_by_name(&self, name: &str) -> Option<usize>;

    /// 设置权重，`override_weight` 为 true 时覆盖其他来源
    fn set_morph_weight(&mut self, index: usize, weight: f32, override_weight: bool);

    /// 当前权重大于 0 的 Morph（名称, 权重）
    fn weighted_morphs(&self) -> Vec<(String, f32)>;
}

/// 共享的骨骼目标（单线程，逐帧访问）
pub type BoneSinkHandle = Rc<RefCell<dyn BoneSink>>;

/// 共享的 Morph 目标
pub type MorphSinkHandle = Rc<RefCell<dyn MorphSink>>;
