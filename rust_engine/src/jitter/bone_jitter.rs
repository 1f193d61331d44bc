//! 骨骼抖动控制器
//!
//! 用任意波形让骨骼的 X/Y/Z 旋转振动。循环波形持续播放，
//! `play_once` 可在任意时刻把单次波形叠加到循环波形上。
//!
//! 同一骨骼需要多个独立事件（抬头、低头等）时，把其他控制器
//! 通过 `attach_child` 挂到一个父控制器下，只有父控制器写入骨骼。

use glam::{EulerRot, Quat, Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::config::{create_rng, get_config};
use super::{
    BoneSinkHandle, Fade, FadeDirection, JitterChannel, JitterParameter, TaskStatus, Waveform,
    WeightRange,
};
use crate::{JitterError, Result};

/// 骨骼抖动配置
#[derive(Clone, Debug, PartialEq)]
pub struct BoneJitterConfig {
    /// 三轴共用 X 轴的状态
    pub sync_axis: bool,
    /// 单次播放中再次触发时是否重新开始
    pub override_once: bool,
    /// 权重 -> 角度（度）
    pub angle_magnification: f32,
    /// 每帧旋转变化上限（度），None 不限制
    pub max_degrees_delta: Option<f32>,
    pub loop_parameters: [JitterParameter; 3],
    pub once_parameters: [JitterParameter; 3],
    pub loop_group_enabled: bool,
    pub once_group_enabled: bool,
    pub loop_enabled: [bool; 3],
    pub once_enabled: [bool; 3],
}

impl Default for BoneJitterConfig {
    fn default() -> Self {
        Self {
            sync_axis: false,
            override_once: false,
            angle_magnification: get_config().default_angle_magnification,
            max_degrees_delta: None,
            loop_parameters: [
                JitterParameter::new(Waveform::Cos, true, true),
                JitterParameter::new(Waveform::Sin, true, false),
                JitterParameter::new(Waveform::Sin, true, false),
            ],
            once_parameters: [
                JitterParameter::new(Waveform::UpDown25, false, true),
                JitterParameter::new(Waveform::UpDown25, false, false),
                JitterParameter::new(Waveform::UpDown25, false, false),
            ],
            loop_group_enabled: true,
            once_group_enabled: true,
            loop_enabled: [true; 3],
            once_enabled: [true; 3],
        }
    }
}

impl BoneJitterConfig {
    /// 同步开关到参数并修正区间
    pub fn validate(&mut self) {
        for axis in 0..3 {
            self.loop_parameters[axis].is_enabled = self.loop_enabled[axis];
            self.once_parameters[axis].is_enabled = self.once_enabled[axis];
            self.loop_parameters[axis].axis_synced = self.sync_axis;
            self.once_parameters[axis].axis_synced = self.sync_axis;
            self.loop_parameters[axis].normalize();
            self.once_parameters[axis].normalize();
        }
    }

    fn channel_count(&self) -> usize {
        if self.sync_axis { 1 } else { 3 }
    }
}

/// 骨骼抖动控制器
pub struct BoneJitter {
    config: BoneJitterConfig,
    /// sync_axis ? 1 : 3 个通道
    channels: Vec<JitterChannel>,
    /// 振幅倍率 x: 循环 y: 单次
    magnification: Vec2,
    fade: Option<Fade>,
    children: Vec<BoneJitter>,
    is_child: bool,
    sink: Option<BoneSinkHandle>,
    bone_name: String,
    bone_index: Option<usize>,
    rng: Pcg32,
    /// 最近一次写入的旋转
    last_rotation: Quat,
    /// 最近一次写入的欧拉角（度）
    output: Vec3,
    /// 上一帧是否有状态机在运行（包括子控制器）
    was_processing: bool,
    min_fade_seconds: f32,
    debug_log: bool,
}

impl BoneJitter {
    pub fn new(config: BoneJitterConfig) -> Self {
        Self::with_rng(config, create_rng())
    }

    /// 固定种子（测试、回放用）
    pub fn with_seed(config: BoneJitterConfig, seed: u64) -> Self {
        Self::with_rng(config, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(mut config: BoneJitterConfig, mut rng: Pcg32) -> Self {
        config.validate();
        let channels = Self::build_channels(&config, &mut rng);
        let global = get_config();

        Self {
            config,
            channels,
            magnification: Vec2::ONE,
            fade: None,
            children: Vec::new(),
            is_child: false,
            sink: None,
            bone_name: String::new(),
            bone_index: None,
            rng,
            last_rotation: Quat::IDENTITY,
            output: Vec3::ZERO,
            was_processing: false,
            min_fade_seconds: global.min_fade_seconds,
            debug_log: global.debug_log,
        }
    }

    fn build_channels(config: &BoneJitterConfig, rng: &mut Pcg32) -> Vec<JitterChannel> {
        (0..config.channel_count())
            .map(|i| JitterChannel::new(&config.loop_parameters[i], &config.once_parameters[i], rng))
            .collect()
    }

    /// 绑定目标骨骼，找不到时控制器保持惰性
    pub fn bind(&mut self, sink: BoneSinkHandle, bone_name: &str) -> Result<()> {
        let index = sink.borrow().find_bone_by_name(bone_name);
        self.sink = Some(sink);
        self.bone_name = bone_name.to_string();
        self.bone_index = index;

        match index {
            Some(_) => Ok(()),
            None => {
                log::warn!("BoneJitter: 找不到骨骼 {}", bone_name);
                Err(JitterError::BoneNotFound(bone_name.to_string()))
            }
        }
    }

    /// 挂接子控制器，子控制器的输出在本控制器中累加后统一写入
    ///
    /// 只支持一层：子控制器不能再有子控制器，子控制器也不能再挂接。
    /// 子控制器的循环组和各轴循环被关闭，只通过 `play_once` 叠加。
    pub fn attach_child(&mut self, mut child: BoneJitter) -> Result<()> {
        if self.is_child {
            log::warn!("BoneJitter: 子控制器不能再挂接子控制器 ({})", self.bone_name);
            return Err(JitterError::AlreadyChild);
        }
        if !child.children.is_empty() {
            log::warn!("BoneJitter: 不支持多层父子结构 ({})", self.bone_name);
            return Err(JitterError::NestedChild);
        }
        child.is_child = true;
        child.sink = None;
        child.bone_index = None;
        child.fade = None;
        child.config.loop_group_enabled = false;
        child.config.loop_enabled = [false; 3];
        child.config.validate();
        child.stop_loop();
        self.children.push(child);
        Ok(())
    }

    pub fn children(&self) -> &[BoneJitter] {
        &self.children
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut BoneJitter> {
        self.children.get_mut(index)
    }

    pub fn is_child(&self) -> bool {
        self.is_child
    }

    pub fn bone_index(&self) -> Option<usize> {
        self.bone_index
    }

    pub fn config(&self) -> &BoneJitterConfig {
        &self.config
    }

    pub fn channels(&self) -> &[JitterChannel] {
        &self.channels
    }

    /// 替换配置，通道数变化时重建通道并初始化
    pub fn reconfigure(&mut self, mut config: BoneJitterConfig) {
        config.validate();
        let rebuild = config.channel_count() != self.channels.len();
        self.config = config;
        if rebuild {
            self.initialize();
            self.channels = Self::build_channels(&self.config, &mut self.rng);
        }
    }

    /// 修改某轴的循环参数
    pub fn set_loop_parameter(&mut self, axis: usize, parameter: JitterParameter) {
        if let Some(slot) = self.config.loop_parameters.get_mut(axis) {
            *slot = parameter;
            self.config.validate();
        }
    }

    /// 修改某轴的单次参数
    pub fn set_once_parameter(&mut self, axis: usize, parameter: JitterParameter) {
        if let Some(slot) = self.config.once_parameters.get_mut(axis) {
            *slot = parameter;
            self.config.validate();
        }
    }

    /// 单轴循环开关，关闭的轴在下一周期开始时挂起
    pub fn set_loop_axis_enabled(&mut self, axis: usize, enabled: bool) {
        if axis < 3 {
            self.config.loop_enabled[axis] = enabled;
            self.config.validate();
        }
    }

    pub fn set_once_axis_enabled(&mut self, axis: usize, enabled: bool) {
        if axis < 3 {
            self.config.once_enabled[axis] = enabled;
            self.config.validate();
        }
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

    /// 是否有状态机在运行（包括子控制器）
    pub fn is_processing(&self) -> bool {
        self.channels.iter().any(JitterChannel::is_processing)
            || self.children.iter().any(BoneJitter::is_processing)
    }

    /// 是否有单次播放在运行（包括子控制器）
    pub fn is_once_processing(&self) -> bool {
        self.channels.iter().any(JitterChannel::is_once_processing)
            || self.children.iter().any(BoneJitter::is_once_processing)
    }

    pub fn loop_magnification(&self) -> f32 {
        self.magnification.x
    }

    pub fn once_magnification(&self) -> f32 {
        self.magnification.y
    }

    /// 最近一次写入骨骼的欧拉角（度）
    pub fn output(&self) -> Vec3 {
        self.output
    }

    /// 开始循环播放
    pub fn play_loop(&mut self, magnification: f32) {
        self.stop_loop();
        self.magnification.x = magnification;
        if !self.config.loop_group_enabled || self.channels.is_empty() {
            return;
        }

        for (i, channel) in self.channels.iter_mut().enumerate() {
            let enabled = Self::loop_axis_active(&self.config, i);
            channel.start_loop(&self.config.loop_parameters[i], enabled, false, &mut self.rng);
        }
        if self.debug_log {
            log::debug!("BoneJitter[{}]: play loop x{}", self.bone_name, magnification);
        }
    }

    /// 停止循环播放
    pub fn stop_loop(&mut self) {
        for channel in &mut self.channels {
            channel.reset_loop();
        }
        if !self.is_processing() {
            self.reset_target();
        }
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
        for (i, channel) in self.channels.iter_mut().enumerate() {
            channel.start_once(&self.config.once_parameters[i], &mut self.rng);
        }
        if self.debug_log {
            log::debug!("BoneJitter[{}]: play once x{}", self.bone_name, magnification);
        }
    }

    /// 停止单次播放
    pub fn stop_once(&mut self) {
        for channel in &mut self.channels {
            channel.reset_once();
        }
        if self.is_processing() {
            if !self.is_child {
                self.apply_rotation();
            }
        } else {
            self.reset_target();
        }
    }

    /// 淡入：循环振幅 0 -> 1，循环未运行时从 0 开始播放
    pub fn fade_in(&mut self, seconds: f32) {
        let looping = self.channels.iter().any(JitterChannel::has_loop_task);
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

    /// 全部停止并恢复骨骼
    pub fn initialize(&mut self) {
        self.fade = None;
        for channel in &mut self.channels {
            channel.reset_loop();
            channel.reset_once();
        }
        for child in &mut self.children {
            child.initialize();
        }
        self.reset_target();
    }

    /// 逐帧更新
    pub fn tick(&mut self, dt: f32) {
        self.tick_fade(dt);

        let loop_enabled: Vec<bool> = (0..self.channels.len())
            .map(|i| Self::loop_axis_active(&self.config, i))
            .collect();

        let mut once_finished = false;
        for (i, channel) in self.channels.iter_mut().enumerate() {
            channel.tick_loop(&self.config.loop_parameters[i], loop_enabled[i], dt, &mut self.rng);
            once_finished |= channel.tick_once(&self.config.once_parameters[i], dt);
        }

        for child in &mut self.children {
            child.tick(dt);
        }

        if self.is_child {
            return;
        }
        // 子控制器停止时不会自己恢复骨骼，由父控制器在全部停止的那一帧写入
        if !self.is_processing() {
            if once_finished || self.was_processing {
                self.reset_target();
            }
            self.was_processing = false;
            return;
        }

        self.was_processing = true;
        self.apply_rotation();
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

    /// 循环任务是否应推进（轴同步时任一轴启用即可）
    fn loop_axis_active(config: &BoneJitterConfig, channel: usize) -> bool {
        if config.sync_axis {
            config.loop_enabled.iter().any(|&e| e)
        } else {
            config.loop_enabled[channel]
        }
    }

    /// 本控制器三轴权重（未乘角度倍率）
    pub fn euler_weights(&self) -> Vec3 {
        let mut vec = Vec3::ZERO;
        if self.channels.is_empty() {
            return vec;
        }

        let groups = (self.config.loop_group_enabled, self.config.once_group_enabled);
        for axis in 0..3 {
            // 轴同步时用 X 轴的状态，波形仍取各轴自己的
            let source = if self.config.sync_axis { 0 } else { axis };
            let channel = &self.channels[source];
            let weights = channel.weights(
                &self.config.loop_parameters[source],
                &self.config.once_parameters[source],
                self.config.loop_parameters[axis].waveform,
                self.config.once_parameters[axis].waveform,
                groups,
                WeightRange::Bipolar,
            );
            let enabled = Vec2::new(
                if self.config.loop_enabled[axis] { 1.0 } else { 0.0 },
                if self.config.once_enabled[axis] { 1.0 } else { 0.0 },
            );
            vec[axis] = JitterChannel::combine(weights, self.magnification, enabled, WeightRange::Bipolar);
        }
        vec
    }

    /// 本控制器和子控制器合计的欧拉角（度）
    pub fn euler_degrees(&self) -> Vec3 {
        let own = self.euler_weights() * self.config.angle_magnification;
        self.children
            .iter()
            .fold(own, |acc, child| acc + child.euler_weights() * child.config.angle_magnification)
    }

    fn apply_rotation(&mut self) {
        let (Some(sink), Some(index)) = (self.sink.as_ref(), self.bone_index) else {
            return;
        };

        let degrees = self.euler_degrees();
        let target = euler_to_quat(degrees);
        let rotation = match self.config.max_degrees_delta {
            Some(max) => rotate_towards(self.last_rotation, target, max.max(0.0).to_radians()),
            None => target,
        };

        let mut sink = sink.borrow_mut();
        if sink.is_bone_animated(index) {
            sink.add_bone_rotation(index, rotation);
        } else {
            sink.set_bone_rotation(index, rotation);
        }
        self.last_rotation = rotation;
        self.output = degrees;
    }

    fn reset_target(&mut self) {
        self.last_rotation = Quat::IDENTITY;
        self.output = Vec3::ZERO;
        self.was_processing = false;
        if self.is_child {
            return;
        }
        if let (Some(sink), Some(index)) = (self.sink.as_ref(), self.bone_index) {
            sink.borrow_mut().reset_bone_rotation(index);
        }
    }
}

/// 欧拉角（度）转四元数，旋转顺序 Z -> X -> Y
pub fn euler_to_quat(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}

/// 从 from 向 to 旋转，最多 max_angle 弧度
fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_angle || angle <= f32::EPSILON {
        to
    } else {
        from.slerp(to, max_angle / angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::BlendMode;
    use crate::skeleton::{Bone, BoneManager};
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    fn bones() -> Rc<RefCell<BoneManager>> {
        let mut manager = BoneManager::new();
        manager.add_bone(Bone::new("センター".to_string()));
        manager.add_bone(Bone::new("頭".to_string()));
        Rc::new(RefCell::new(manager))
    }

    /// 只开 X 轴循环，权重恒为 offset
    fn constant_x(offset: f32) -> BoneJitterConfig {
        let mut config = BoneJitterConfig {
            angle_magnification: 10.0,
            loop_enabled: [true, false, false],
            once_group_enabled: false,
            ..BoneJitterConfig::default()
        };
        config.loop_parameters[0] = JitterParameter::new(Waveform::Sin, true, true)
            .with_period(0.0, 0.0)
            .with_offset(offset, offset);
        config
    }

    /// 只开 X 轴单次，周期 0，权重恒为 offset（持续 2 帧）
    fn constant_once_x(offset: f32) -> BoneJitterConfig {
        let mut config = BoneJitterConfig {
            angle_magnification: 10.0,
            loop_group_enabled: false,
            once_enabled: [true, false, false],
            ..BoneJitterConfig::default()
        };
        config.once_parameters[0] = JitterParameter::new(Waveform::UpDown25, false, true)
            .with_period(0.0, 0.0)
            .with_interval(0.0, 0.0)
            .with_offset(offset, offset);
        config
    }

    fn sine_x() -> BoneJitterConfig {
        let mut config = constant_x(0.0);
        config.loop_parameters[0] = JitterParameter::new(Waveform::Sin, true, true)
            .with_period(1.0, 1.0)
            .with_amplitude(1.0, 1.0)
            .with_offset(0.0, 0.0)
            .with_blend(BlendMode::None, BlendMode::None);
        config
    }

    fn quat_close(a: Quat, b: Quat) -> bool {
        a.dot(b).abs() > 1.0 - 1e-6
    }

    fn head_rotation(bones: &Rc<RefCell<BoneManager>>) -> Quat {
        let manager = bones.borrow();
        let index = manager.find_bone_by_name("頭").unwrap();
        manager.get_bone(index).unwrap().animation_rotate
    }

    #[test]
    fn test_quarter_period_sine_on_bone() {
        let bones = bones();
        let mut jitter = BoneJitter::with_seed(sine_x(), 1);
        jitter.bind(bones.clone(), "頭").unwrap();
        jitter.play_loop(1.0);

        for _ in 0..15 {
            jitter.tick(DT);
        }

        let expected = (0.25 * std::f32::consts::TAU).sin();
        assert!((jitter.euler_weights().x - expected).abs() < 1e-3);
        assert!((jitter.output().x - expected * 10.0).abs() < 1e-2);
        assert!(quat_close(head_rotation(&bones), euler_to_quat(jitter.output())));
    }

    #[test]
    fn test_fade_out_stops_loop() {
        let bones = bones();
        let mut jitter = BoneJitter::with_seed(sine_x(), 2);
        jitter.bind(bones.clone(), "頭").unwrap();
        jitter.play_loop(1.0);
        jitter.tick(DT);

        jitter.fade_out(1.0);
        for _ in 0..60 {
            jitter.tick(DT);
        }

        assert_eq!(jitter.loop_magnification(), 0.0);
        assert!(!jitter.config().loop_group_enabled);
        assert!(!jitter.is_processing());
        assert_eq!(head_rotation(&bones), Quat::IDENTITY);
    }

    #[test]
    fn test_fade_in_after_fade_out() {
        let mut jitter = BoneJitter::with_seed(sine_x(), 3);
        jitter.play_loop(1.0);
        jitter.fade_out(0.5);
        for _ in 0..30 {
            jitter.tick(DT);
        }
        assert!(!jitter.config().loop_group_enabled);

        jitter.fade_in(0.5);
        assert!(jitter.config().loop_group_enabled);
        assert!(jitter.is_processing());
        assert_eq!(jitter.loop_magnification(), 0.0);
        for _ in 0..30 {
            jitter.tick(DT);
        }
        assert_eq!(jitter.loop_magnification(), 1.0);
    }

    #[test]
    fn test_fade_out_cancels_fade_in() {
        let mut jitter = BoneJitter::with_seed(sine_x(), 4);
        jitter.play_loop(0.5);
        jitter.fade_in(1.0);
        jitter.tick(DT);
        let partial = jitter.loop_magnification();
        assert!(partial > 0.5 && partial < 1.0);

        jitter.fade_out(1.0);
        jitter.tick(DT);
        assert!(jitter.loop_magnification() < partial);
    }

    #[test]
    fn test_parent_child_composition() {
        let bones = bones();
        let mut parent = BoneJitter::with_seed(constant_x(0.5), 5);
        parent.bind(bones.clone(), "頭").unwrap();
        parent.attach_child(BoneJitter::with_seed(constant_once_x(0.5), 6)).unwrap();

        parent.play_loop(1.0);
        parent.child_mut(0).unwrap().play_once(1.0);
        parent.tick(DT);

        assert!((parent.output().x - 10.0).abs() < 1e-4);
        let expected = euler_to_quat(Vec3::new(10.0, 0.0, 0.0));
        assert!(quat_close(head_rotation(&bones), expected));
    }

    #[test]
    fn test_child_does_not_write() {
        let bones = bones();
        let mut parent = BoneJitter::with_seed(constant_x(0.0), 7);
        parent.bind(bones.clone(), "頭").unwrap();
        let mut child = BoneJitter::with_seed(constant_once_x(0.5), 8);
        child.bind(bones.clone(), "頭").unwrap();
        parent.attach_child(child).unwrap();
        assert!(parent.children()[0].is_child());
        assert_eq!(parent.children()[0].bone_index(), None);

        parent.child_mut(0).unwrap().play_once(1.0);
        parent.tick(DT);
        // 父控制器自己的循环未播放，但子控制器在运行，仍由父控制器写入 5 度
        assert!((parent.output().x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_attach_child_disables_child_loop() {
        let mut parent = BoneJitter::with_seed(constant_x(0.0), 30);
        let mut child = BoneJitter::with_seed(constant_x(0.5), 31);
        child.play_loop(1.0);
        assert!(child.is_processing());
        parent.attach_child(child).unwrap();

        let child = &parent.children()[0];
        assert!(!child.config().loop_group_enabled);
        assert_eq!(child.config().loop_enabled, [false; 3]);
        assert!(child.config().loop_parameters.iter().all(|p| !p.is_enabled));
        assert!(!child.is_processing());

        // 子控制器再调用 play_loop 也不会启动循环
        parent.child_mut(0).unwrap().play_loop(1.0);
        assert!(!parent.is_processing());
    }

    #[test]
    fn test_bone_rests_when_child_once_ends() {
        let bones = bones();
        let mut parent = BoneJitter::with_seed(constant_x(0.0), 32);
        parent.bind(bones.clone(), "頭").unwrap();
        parent.attach_child(BoneJitter::with_seed(constant_once_x(0.5), 33)).unwrap();

        parent.child_mut(0).unwrap().play_once(1.0);
        parent.tick(DT);
        assert!(quat_close(head_rotation(&bones), euler_to_quat(Vec3::new(5.0, 0.0, 0.0))));

        // 单次结束时偏移仍为 0.5，父控制器负责恢复
        for _ in 0..5 {
            parent.tick(DT);
        }
        assert!(!parent.is_processing());
        assert_eq!(head_rotation(&bones), Quat::IDENTITY);
        assert_eq!(parent.output(), Vec3::ZERO);
    }

    #[test]
    fn test_bone_rests_when_child_stopped() {
        let bones = bones();
        let mut parent = BoneJitter::with_seed(constant_x(0.0), 34);
        parent.bind(bones.clone(), "頭").unwrap();
        let mut config = constant_once_x(0.5);
        config.once_parameters[0] = config.once_parameters[0].clone().with_interval(10.0, 10.0);
        parent.attach_child(BoneJitter::with_seed(config, 35)).unwrap();

        parent.child_mut(0).unwrap().play_once(1.0);
        parent.tick(DT);
        assert_ne!(head_rotation(&bones), Quat::IDENTITY);

        parent.child_mut(0).unwrap().stop_once();
        for _ in 0..5 {
            parent.tick(DT);
        }
        assert!(!parent.is_processing());
        assert_eq!(head_rotation(&bones), Quat::IDENTITY);
    }

    #[test]
    fn test_nested_children_rejected() {
        let mut grandchild_owner = BoneJitter::with_seed(constant_x(0.1), 9);
        grandchild_owner
            .attach_child(BoneJitter::with_seed(constant_x(0.1), 10))
            .unwrap();

        let mut parent = BoneJitter::with_seed(constant_x(0.1), 11);
        assert!(matches!(
            parent.attach_child(grandchild_owner),
            Err(JitterError::NestedChild)
        ));

        parent
            .attach_child(BoneJitter::with_seed(constant_x(0.1), 12))
            .unwrap();
        let child = parent.child_mut(0).unwrap();
        assert!(matches!(
            child.attach_child(BoneJitter::with_seed(constant_x(0.1), 13)),
            Err(JitterError::AlreadyChild)
        ));
    }

    #[test]
    fn test_max_degrees_delta() {
        let bones = bones();
        let mut config = constant_x(1.0);
        config.max_degrees_delta = Some(2.0);
        let mut jitter = BoneJitter::with_seed(config, 12);
        jitter.bind(bones.clone(), "頭").unwrap();
        jitter.play_loop(1.0);

        jitter.tick(DT);
        let first = head_rotation(&bones);
        assert!(quat_close(first, Quat::from_rotation_x(2.0_f32.to_radians())));
        assert!(!quat_close(first, euler_to_quat(Vec3::new(10.0, 0.0, 0.0))));

        for _ in 0..10 {
            jitter.tick(DT);
        }
        let settled = head_rotation(&bones);
        assert!(quat_close(settled, euler_to_quat(Vec3::new(10.0, 0.0, 0.0))));
    }

    #[test]
    fn test_stop_loop_idempotent() {
        let bones = bones();
        let mut jitter = BoneJitter::with_seed(sine_x(), 13);
        jitter.bind(bones.clone(), "頭").unwrap();
        jitter.play_loop(1.0);
        for _ in 0..10 {
            jitter.tick(DT);
        }
        assert_ne!(head_rotation(&bones), Quat::IDENTITY);

        jitter.stop_loop();
        let once = head_rotation(&bones);
        jitter.stop_loop();
        assert_eq!(head_rotation(&bones), once);
        assert_eq!(once, Quat::IDENTITY);
        assert!(!jitter.is_processing());
    }

    #[test]
    fn test_play_once_first_writer_wins() {
        let mut config = BoneJitterConfig {
            loop_group_enabled: false,
            ..BoneJitterConfig::default()
        };
        for param in &mut config.once_parameters {
            *param = param.clone().with_period(0.5, 0.5).with_interval(0.0, 0.0);
        }
        let mut jitter = BoneJitter::with_seed(config, 14);

        jitter.play_once(1.0);
        jitter.play_once(1.0);
        assert!(jitter.is_once_processing());
        for _ in 0..120 {
            jitter.tick(DT);
        }
        assert!(!jitter.is_once_processing());
        for channel in jitter.channels() {
            assert_eq!(channel.once_state.cycle_count(), 1);
        }
    }

    #[test]
    fn test_play_once_override_restarts() {
        let config = BoneJitterConfig {
            override_once: true,
            loop_group_enabled: false,
            ..BoneJitterConfig::default()
        };
        let mut jitter = BoneJitter::with_seed(config, 15);
        jitter.play_once(1.0);
        jitter.tick(DT);
        jitter.play_once(0.5);
        assert_eq!(jitter.once_magnification(), 0.5);
        for channel in jitter.channels() {
            assert_eq!(channel.once_state.cycle_count(), 2);
        }
    }

    #[test]
    fn test_once_finish_resets_bone() {
        let bones = bones();
        let mut config = BoneJitterConfig {
            loop_group_enabled: false,
            ..BoneJitterConfig::default()
        };
        for param in &mut config.once_parameters {
            *param = param.clone().with_period(0.25, 0.25).with_amplitude(1.0, 1.0);
        }
        let mut jitter = BoneJitter::with_seed(config, 16);
        jitter.bind(bones.clone(), "頭").unwrap();
        jitter.play_once(1.0);
        for _ in 0..8 {
            jitter.tick(DT);
        }
        assert_ne!(head_rotation(&bones), Quat::IDENTITY);

        for _ in 0..60 {
            jitter.tick(DT);
        }
        assert!(!jitter.is_processing());
        assert_eq!(head_rotation(&bones), Quat::IDENTITY);
    }

    #[test]
    fn test_once_group_disabled_is_noop() {
        let config = BoneJitterConfig {
            once_group_enabled: false,
            ..BoneJitterConfig::default()
        };
        let mut jitter = BoneJitter::with_seed(config, 17);
        jitter.play_once(1.0);
        assert!(!jitter.is_once_processing());
    }

    #[test]
    fn test_sync_axis_single_channel() {
        let config = BoneJitterConfig {
            sync_axis: true,
            ..BoneJitterConfig::default()
        };
        let mut jitter = BoneJitter::with_seed(config, 18);
        assert_eq!(jitter.channels().len(), 1);

        jitter.play_loop(1.0);
        jitter.tick(DT);
        assert!(jitter.is_processing());

        let mut config = jitter.config().clone();
        config.sync_axis = false;
        jitter.reconfigure(config);
        assert_eq!(jitter.channels().len(), 3);
        assert!(!jitter.is_processing());
    }

    #[test]
    fn test_axis_suspend_and_resume() {
        let mut config = BoneJitterConfig::default();
        for param in &mut config.loop_parameters {
            *param = param.clone().with_period(0.25, 0.25);
        }
        let mut jitter = BoneJitter::with_seed(config, 19);
        jitter.play_loop(1.0);

        jitter.set_loop_axis_enabled(1, false);
        // 下一周期开始时 Y 轴挂起
        for _ in 0..20 {
            jitter.tick(DT);
        }
        assert!(!jitter.channels()[1].loop_state.is_processing());
        assert!(jitter.channels()[0].loop_state.is_processing());
        assert_eq!(jitter.euler_weights().y, 0.0);

        jitter.set_loop_axis_enabled(1, true);
        jitter.tick(DT);
        assert!(jitter.channels()[1].loop_state.is_processing());
    }

    #[test]
    fn test_unresolved_bone_is_inert() {
        let bones = bones();
        let mut jitter = BoneJitter::with_seed(sine_x(), 20);
        assert!(matches!(
            jitter.bind(bones.clone(), "存在しない"),
            Err(JitterError::BoneNotFound(_))
        ));
        jitter.play_loop(1.0);
        for _ in 0..10 {
            jitter.tick(DT);
        }
        for i in 0..bones.borrow().bone_count() {
            assert_eq!(bones.borrow().get_bone(i).unwrap().animation_rotate, Quat::IDENTITY);
        }
    }

    #[test]
    fn test_animated_bone_composes() {
        let bones = bones();
        let base = Quat::from_rotation_y(0.3);
        {
            let mut manager = bones.borrow_mut();
            let index = manager.find_bone_by_name("頭").unwrap();
            manager.set_bone_animated(index, true);
            manager.set_bone_rotation(index, base);
        }

        let mut jitter = BoneJitter::with_seed(constant_x(0.5), 21);
        jitter.bind(bones.clone(), "頭").unwrap();
        jitter.play_loop(1.0);
        jitter.tick(DT);

        let expected = base * euler_to_quat(Vec3::new(5.0, 0.0, 0.0));
        assert!(quat_close(head_rotation(&bones), expected));

        // 外部动画驱动时，停止不覆盖骨骼
        jitter.initialize();
        assert!(quat_close(head_rotation(&bones), expected));
    }
}
