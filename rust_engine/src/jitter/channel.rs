//! 抖动通道
//!
//! 一个通道对应一个物理量（一个旋转轴或一个 Morph 权重），
//! 持有一个循环状态和一个单次状态，两者叠加得到最终输出。

use glam::Vec2;
use rand::Rng;

use super::{
    JitterParameter, LoopTask, OnceTask, OscillatorState, TaskStatus, Waveform, WeightRange,
};

/// 循环 + 单次 两个状态机
#[derive(Clone, Debug)]
pub struct JitterChannel {
    pub loop_state: OscillatorState,
    pub once_state: OscillatorState,
    loop_task: Option<LoopTask>,
    once_task: Option<OnceTask>,
}

impl JitterChannel {
    pub fn new<R: Rng + ?Sized>(
        loop_param: &JitterParameter,
        once_param: &JitterParameter,
        rng: &mut R,
    ) -> Self {
        Self {
            loop_state: OscillatorState::new(loop_param, rng),
            once_state: OscillatorState::new(once_param, rng),
            loop_task: None,
            once_task: None,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.loop_state.is_processing() || self.once_state.is_processing()
    }

    pub fn is_once_processing(&self) -> bool {
        self.once_state.is_processing()
    }

    pub fn has_loop_task(&self) -> bool {
        self.loop_task.is_some()
    }

    pub fn has_once_task(&self) -> bool {
        self.once_task.is_some()
    }

    /// 启动循环任务，旧任务直接作废
    pub fn start_loop<R: Rng + ?Sized>(
        &mut self,
        param: &JitterParameter,
        enabled: bool,
        hold_interval: bool,
        rng: &mut R,
    ) {
        self.loop_task = Some(LoopTask::start(
            &mut self.loop_state,
            param,
            enabled,
            hold_interval,
            rng,
        ));
    }

    /// 启动单次任务，旧任务直接作废
    pub fn start_once<R: Rng + ?Sized>(&mut self, param: &JitterParameter, rng: &mut R) {
        self.once_task = Some(OnceTask::start(&mut self.once_state, param, rng));
    }

    pub fn tick_loop<R: Rng + ?Sized>(
        &mut self,
        param: &JitterParameter,
        enabled: bool,
        dt: f32,
        rng: &mut R,
    ) {
        if let Some(task) = self.loop_task.as_mut() {
            task.tick(&mut self.loop_state, param, enabled, dt, rng);
        }
    }

    /// 推进单次任务，本帧结束时返回 true
    pub fn tick_once(&mut self, param: &JitterParameter, dt: f32) -> bool {
        let finished = match self.once_task.as_mut() {
            Some(task) => task.tick(&mut self.once_state, param, dt) == TaskStatus::Finished,
            None => false,
        };
        if finished {
            self.once_task = None;
        }
        finished
    }

    pub fn reset_loop(&mut self) {
        self.loop_task = None;
        self.loop_state.reset();
    }

    pub fn reset_once(&mut self) {
        self.once_task = None;
        self.once_state.reset();
    }

    /// 分别计算循环和单次的权重（x: 循环，y: 单次）
    ///
    /// 未启用的组和未运行的状态贡献为 0。
    pub fn weights(
        &self,
        loop_param: &JitterParameter,
        once_param: &JitterParameter,
        loop_wave: Waveform,
        once_wave: Waveform,
        group_enabled: (bool, bool),
        range: WeightRange,
    ) -> Vec2 {
        let mut weight = Vec2::ZERO;
        if group_enabled.0 && self.loop_state.is_processing() {
            weight.x = self.loop_state.current_weight(loop_param, loop_wave, range);
        }
        if group_enabled.1 && self.once_state.is_processing() {
            weight.y = self.once_state.current_weight(once_param, once_wave, range);
        }
        weight
    }

    /// 按包络和开关叠加并截断
    pub fn combine(weights: Vec2, envelope: Vec2, enabled: Vec2, range: WeightRange) -> f32 {
        range.clamp((weights * envelope).dot(enabled))
    }
}

/// Morph 通道：Morph 名称 + 抖动通道
#[derive(Clone, Debug)]
pub struct MorphChannel {
    pub morph_name: String,
    /// 写入前乘的倍率
    pub weight_magnification: f32,
    /// 最近一次计算的权重（未乘倍率）
    pub morph_weight: f32,
    /// 写入时是否覆盖其他来源的权重
    pub override_weight: bool,
    pub channel: JitterChannel,
    pub(crate) target: Option<usize>,
}

impl MorphChannel {
    pub fn new(
        morph_name: impl Into<String>,
        weight_magnification: f32,
        channel: JitterChannel,
    ) -> Self {
        Self {
            morph_name: morph_name.into(),
            weight_magnification,
            morph_weight: 0.0,
            override_weight: false,
            channel,
            target: None,
        }
    }

    /// 实际写入的权重
    pub fn output_weight(&self) -> f32 {
        self.morph_weight * self.weight_magnification
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    pub fn reset_state(&mut self) {
        self.channel.reset_loop();
        self.channel.reset_once();
        self.morph_weight = 0.0;
    }
}
