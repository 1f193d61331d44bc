//! 眼球微动（扫视）
//!
//! 每隔一段随机时间重新抽取一个小角度，左右眼写入同一旋转。

use glam::{Quat, Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::config::create_rng;
use super::{euler_to_quat, BoneSinkHandle, FloatRange};
use crate::{JitterError, Result};

/// 眼球微动配置
#[derive(Clone, Debug, PartialEq)]
pub struct EyeJitterConfig {
    pub left_eye: String,
    pub right_eye: String,
    pub magnification: f32,
    /// 扫视间隔（秒）
    pub interval: FloatRange,
    /// 每次扫视的最大角度（度） x: 上下 y: 左右
    pub range: Vec2,
}

impl Default for EyeJitterConfig {
    fn default() -> Self {
        Self {
            left_eye: "左目".to_string(),
            right_eye: "右目".to_string(),
            magnification: 1.0,
            interval: FloatRange::non_negative(0.2, 0.5),
            range: Vec2::new(1.0, 4.0),
        }
    }
}

/// 眼球微动控制器
pub struct EyeJitter {
    config: EyeJitterConfig,
    sink: Option<BoneSinkHandle>,
    targets: [Option<usize>; 2],
    timer: f32,
    rotation: Quat,
    rng: Pcg32,
}

impl EyeJitter {
    pub fn new(config: EyeJitterConfig) -> Self {
        Self::with_rng(config, create_rng())
    }

    pub fn with_seed(config: EyeJitterConfig, seed: u64) -> Self {
        Self::with_rng(config, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(mut config: EyeJitterConfig, rng: Pcg32) -> Self {
        config.interval.normalize();
        Self {
            config,
            sink: None,
            targets: [None; 2],
            timer: 0.0,
            rotation: Quat::IDENTITY,
            rng,
        }
    }

    /// 绑定骨骼目标，找不到的眼球骨骼不写入
    pub fn bind(&mut self, sink: BoneSinkHandle) -> Result<()> {
        let names = [self.config.left_eye.clone(), self.config.right_eye.clone()];
        {
            let sink = sink.borrow();
            for (target, name) in self.targets.iter_mut().zip(&names) {
                *target = sink.find_bone_by_name(name);
                if target.is_none() {
                    log::warn!("EyeJitter: 找不到骨骼 {}", name);
                }
            }
        }
        self.sink = Some(sink);

        match self.targets.iter().position(Option::is_none) {
            Some(i) => Err(JitterError::BoneNotFound(names[i].clone())),
            None => Ok(()),
        }
    }

    pub fn config(&self) -> &EyeJitterConfig {
        &self.config
    }

    /// 当前扫视旋转
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// 距离下一次扫视的时间（秒）
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// 逐帧更新
    pub fn tick(&mut self, dt: f32) {
        self.timer -= dt;
        if self.timer < 0.0 {
            self.timer = self.config.interval.sample(&mut self.rng);
            self.rotation = self.draw_saccade();
        }
        self.write_rotation();
    }

    fn draw_saccade(&mut self) -> Quat {
        let range = self.config.range.abs();
        let mut degrees = Vec3::ZERO;
        if range.x > 0.0 {
            degrees.x = self.rng.gen_range(-range.x..=range.x);
        }
        if range.y > 0.0 {
            degrees.y = self.rng.gen_range(-range.y..=range.y);
        }
        euler_to_quat(degrees * self.config.magnification)
    }

    fn write_rotation(&self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        let mut sink = sink.borrow_mut();
        for index in self.targets.iter().flatten().copied() {
            if sink.is_bone_animated(index) {
                sink.add_bone_rotation(index, self.rotation);
            } else {
                sink.set_bone_rotation(index, self.rotation);
            }
        }
    }
}
