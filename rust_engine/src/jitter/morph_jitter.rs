//! Morph 抖动控制器
//!
//! 用任意波形让 Morph 权重振动（眨眼、呼吸等）。`play_once` 可在任意时刻
//! 把单次波形叠加到循环波形上。`sync` 模式下第一个通道的结果广播到所有通道。

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::config::{create_rng, get_config};
use super::{
    Fade, FadeDirection, JitterChannel, JitterParameter, MorphChannel, MorphSinkHandle,
    TaskStatus, Waveform, WeightRange,
};
use crate::{JitterError, Result};

/// Morph 抖动配置
#[derive(Clone, Debug, PartialEq)]
pub struct MorphJitterConfig {
    /// 所有 Morph 共用第一个通道的状态
    pub sync: bool,
    /// 单次播放中再次触发时是否重新开始
    pub override_once: bool,
    pub loop_parameter: JitterParameter,
    pub once_parameter: JitterParameter,
    pub loop_group_enabled: bool,
    pub once_group_enabled: bool,
}

impl Default for MorphJitterConfig {
    fn default() -> Self {
        Self {
            sync: false,
            override_once: false,
            // 眨眼节奏：短周期 + 长间隔
            loop_parameter: JitterParameter::new(Waveform::UpDown5, true, true)
                .with_period(0.15, 0.25)
                .with_interval(2.0, 5.0)
                .with_amplitude(1.0, 1.0),
            once_parameter: JitterParameter::new(Waveform::UpDown1, false, true)
                .with_period(0.2, 0.3)
                .with_amplitude(1.0, 1.0),
            loop_group_enabled: true,
            once_group_enabled: true,
        }
    }
}

impl MorphJitterConfig {
    pub fn validate(&mut self) {
        self.loop_parameter.normalize();
        self.once_parameter.normalize();
    }
}

/// Morph 抖动控制器
pub struct MorphJitter {
    config: MorphJitterConfig,
    channels: Vec<MorphChannel>,
    /// 振幅倍率 x: 循环 y: 单次
    magnification: Vec2,
    fade: Option<Fade>,
    sink: Option<MorphSinkHandle>,
    rng: Pcg32,
    min_fade_seconds: f32,
    debug_log: bool,
}

impl MorphJitter {
    pub fn new(config: MorphJitterConfig) -> Self {
        Self::with_rng(config, create_rng())
    }

    /// 固定种子（测试、回放用）
    pub fn with_seed(config: MorphJitterConfig, seed: u64) -> Self {
        Self::with_rng(config, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(mut config: MorphJitterConfig, rng: Pcg32) -> Self {
        config.validate();
        let global = get_config();
        Self {
            config,
            channels: Vec::new(),
            magnification: Vec2::ONE,
            fade: None,
            sink: None,
            rng,
            min_fade_seconds: global.min_fade_seconds,
            debug_log: global.debug_log,
        }
    }

    /// 绑定 Morph 目标并解析所有通道
    ///
    /// 找不到的 Morph 只记录警告，对应通道不写入。
    pub fn bind(&mut self, sink: MorphSinkHandle) -> Result<()> {
        self.sink = Some(sink);
        let mut missing = None;
        for i in 0..self.channels.len() {
            if !self.resolve(i) && missing.is_none() {
                missing = Some(self.channels[i].morph_name.clone());
            }
        }
        match missing {
            Some(name) => Err(JitterError::MorphNotFound(name)),
            None => Ok(()),
        }
    }

    fn resolve(&mut self, index: usize) -> bool {
        let Some(sink) = self.sink.as_ref() else {
            return false;
        };
        let channel = &mut self.channels[index];
        channel.target = sink.borrow().find_morph_by_name(&channel.morph_name);
        if channel.target.is_none() {
            log::warn!("MorphJitter: 找不到 Morph {}", channel.morph_name);
        }
        channel.target.is_some()
    }

    /// 添加一个 Morph 通道
    pub fn add_morph(&mut self, name: impl Into<String>, weight_magnification: f32) -> &mut MorphChannel {
        let channel = JitterChannel::new(
            &self.config.loop_parameter,
            &self.config.once_parameter,
            &mut self.rng,
        );
        self.channels.push(MorphChannel::new(name, weight_magnification, channel));
        let index = self.channels.len() - 1;
        self.resolve(index);
        &mut self.channels[index]
    }

    /// 清空所有通道，已写入的权重归零
    pub fn clear_morphs(&mut self) {
        for channel in &mut self.channels {
            channel.reset_state();
        }
        self.write_weights();
        self.channels.clear();
    }

    /// 以当前权重大于 0 的 Morph 重建通道，权重作为倍率
    ///
    /// 只读取目标的权重，不写入；目标权重在下一次播放写入前保持不变，
    /// 因此可以重复捕获。
    pub fn capture_weighted_morphs(&mut self) -> usize {
        let Some(sink) = self.sink.clone() else {
            return 0;
        };
        self.channels.clear();

        let morphs = sink.borrow().weighted_morphs();
        for (name, weight) in morphs {
            self.add_morph(name, weight);
        }
        if self.channels.is_empty() {
            log::info!("MorphJitter: 没有权重大于 0 的 Morph");
        }
        self.channels.len()
    }

    pub fn channels(&self) -> &[MorphChannel] {
        &self.channels
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut MorphChannel> {
        self.channels.get_mut(index)
    }

    pub fn config(&self) -> &MorphJitterConfig {
        &self.config
    }

    /// 替换配置（通道保留）
    pub fn reconfigure(&mut self, mut config: MorphJitterConfig) {
        config.validate();
        self.config = config;
    }

    pub fn set_loop_parameter(&mut self, parameter: JitterParameter) {
        self.config.loop_parameter = parameter;
        self.config.validate();
    }

    pub fn set_once_parameter(&mut self, parameter: JitterParameter) {
        self.config.once_parameter = parameter;
        self.config.validate();
    }

    /// 循环组开关
    pub fn set_loop_group_enabled(&mut self, enabled: bool) {
        self.config.loop_group_enabled = enabled;
        if enabled {
            self.play_loop(1.0);
        } else {
            self.stop_loop();
        }
    }

    /// 单次组开关
    pub fn set_once_group_enabled(&mut self, enabled: bool) {
        self.config.once_group_enabled = enabled;
        if !enabled {
            self.stop_once();
        }
    }

    pub fn is_processing(&self) -> bool {
        self.channels.iter().any(|c| c.channel.is_processing())
    }

    pub fn is_once_processing(&self) -> bool {
        self.channels.iter().any(|c| c.channel.is_once_processing())
    }

    pub fn loop_magnification(&self) -> f32 {
        self.magnification.x
    }

    pub fn once_magnification(&self) -> f32 {
        self.magnification.y
    }

    /// 开始循环播放
    pub fn play_loop(&mut self, magnification: f32) {
        if self.channels.is_empty() {
            return;
        }
        self.stop_loop();
        self.magnification.x = magnification;
        if !self.config.loop_group_enabled {
            return;
        }

        let enabled = self.config.loop_group_enabled;
        // sync 时只推进第一个通道的状态
        let count = if self.config.sync { 1 } else { self.channels.len() };
        for channel in self.channels.iter_mut().take(count) {
            channel
                .channel
                .start_loop(&self.config.loop_parameter, enabled, true, &mut self.rng);
        }
        if self.debug_log {
            log::debug!("MorphJitter: play loop x{} ({} morphs)", magnification, self.channels.len());
        }
    }

    /// 停止循环播放
    pub fn stop_loop(&mut self) {
        for channel in &mut self.channels {
            channel.channel.reset_loop();
        }
        self.write_weights();
    }

    /// 单次播放
    pub fn play_once(&mut self, magnification: f32) {
        if !self.config.once_group_enabled || self.channels.is_empty() {
            return;
        }
        if self.is_once_processing() && !self.config.override_once {
            return;
        }

        self.stop_once();
        self.magnification.y = magnification;
        for channel in &mut self.channels {
            channel
                .channel
                .start_once(&self.config.once_parameter, &mut self.rng);
        }
        if self.debug_log {
            log::debug!("MorphJitter: play once x{}", magnification);
        }
    }

    /// 停止单次播放
    pub fn stop_once(&mut self) {
        for channel in &mut self.channels {
            channel.channel.reset_once();
        }
        self.write_weights();
    }

    /// 淡入：循环振幅 0 -> 1，循环未运行时从 0 开始播放
    pub fn fade_in(&mut self, seconds: f32) {
        let looping = self.channels.iter().any(|c| c.channel.has_loop_task());
        if !looping || !self.config.loop_group_enabled {
            self.config.loop_group_enabled = true;
            self.play_loop(0.0);
        }
        self.fade = Some(Fade::new(FadeDirection::In, seconds, self.min_fade_seconds));
    }

    /// 淡出：循环振幅 -> 0，结束后关闭循环组并停止循环
    pub fn fade_out(&mut self, seconds: f32) {
        self.fade = Some(Fade::new(FadeDirection::Out, seconds, self.min_fade_seconds));
    }

    /// 全部停止并把权重归零
    pub fn initialize(&mut self) {
        self.fade = None;
        for channel in &mut self.channels {
            channel.channel.reset_loop();
            channel.channel.reset_once();
        }
        self.write_weights();
    }

    /// 逐帧更新
    pub fn tick(&mut self, dt: f32) {
        self.tick_fade(dt);

        let enabled = self.config.loop_group_enabled;
        let mut once_finished = false;
        for channel in &mut self.channels {
            channel
                .channel
                .tick_loop(&self.config.loop_parameter, enabled, dt, &mut self.rng);
            once_finished |= channel.channel.tick_once(&self.config.once_parameter, dt);
        }

        // 单次播放结束且循环也不在运行时归零
        if once_finished && !self.is_processing() {
            self.stop_once();
            return;
        }
        if !self.is_processing() {
            return;
        }
        self.write_weights();
    }

    fn tick_fade(&mut self, dt: f32) {
        let Some(fade) = self.fade else {
            return;
        };
        if fade.tick(&mut self.magnification.x, dt) == TaskStatus::Finished {
            self.fade = None;
            if fade.direction() == FadeDirection::Out {
                self.config.loop_group_enabled = false;
                self.stop_loop();
            }
        }
    }

    fn channel_weight(&self, channel: &MorphChannel) -> f32 {
        let weights = channel.channel.weights(
            &self.config.loop_parameter,
            &self.config.once_parameter,
            self.config.loop_parameter.waveform,
            self.config.once_parameter.waveform,
            (self.config.loop_group_enabled, self.config.once_group_enabled),
            WeightRange::Unipolar,
        );
        JitterChannel::combine(weights, self.magnification, Vec2::ONE, WeightRange::Unipolar)
    }

    /// 计算所有通道权重并写入目标
    fn write_weights(&mut self) {
        if self.config.sync {
            let shared = self
                .channels
                .first()
                .map(|c| self.channel_weight(c))
                .unwrap_or(0.0);
            for channel in &mut self.channels {
                channel.morph_weight = shared;
            }
        } else {
            let weights: Vec<f32> = self.channels.iter().map(|c| self.channel_weight(c)).collect();
            for (channel, weight) in self.channels.iter_mut().zip(weights) {
                channel.morph_weight = weight;
            }
        }

        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        let mut sink = sink.borrow_mut();
        for channel in &self.channels {
            if let Some(index) = channel.target {
                sink.set_morph_weight(index, channel.output_weight(), channel.override_weight);
            }
        }
    }
}
