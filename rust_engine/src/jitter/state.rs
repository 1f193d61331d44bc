//! 振荡器状态机
//!
//! 每个状态机在周期边界随机抽取新的周期、间隔、振幅和偏移，
//! 周期内按 `BlendMode` 从当前值过渡到下一周期的值。

use rand::Rng;

use super::{JitterParameter, Waveform};

/// 输出值的合法区间
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightRange {
    /// [-1, 1]，骨骼轴权重
    Bipolar,
    /// [0, 1]，Morph 权重
    Unipolar,
}

impl WeightRange {
    pub fn clamp(self, value: f32) -> f32 {
        match self {
            WeightRange::Bipolar => value.clamp(-1.0, 1.0),
            WeightRange::Unipolar => value.clamp(0.0, 1.0),
        }
    }
}

/// 播放中变化的参数
#[derive(Clone, Debug, Default)]
pub struct OscillatorState {
    pub(crate) is_processing: bool,
    /// 周期进度，每周期归零
    pub(crate) timer: f32,
    cur_period: f32,
    next_period: f32,
    /// 本周期结束后的等待时间
    cur_interval: f32,
    cur_amplitude: f32,
    next_amplitude: f32,
    cur_offset: f32,
    next_offset: f32,
    cycle_count: u64,
}

impl OscillatorState {
    /// 创建并预先抽取第一组目标值
    pub fn new<R: Rng + ?Sized>(param: &JitterParameter, rng: &mut R) -> Self {
        let mut state = Self {
            next_period: param.period.sample(rng),
            next_amplitude: param.amplitude.sample(rng),
            next_offset: param.offset.sample(rng),
            ..Self::default()
        };
        state.shift_parameters(param, rng);
        state
    }

    /// 进入新周期：next -> current，再抽取新的 next
    pub fn advance_cycle<R: Rng + ?Sized>(&mut self, param: &JitterParameter, rng: &mut R) {
        self.shift_parameters(param, rng);
        self.cycle_count += 1;
    }

    fn shift_parameters<R: Rng + ?Sized>(&mut self, param: &JitterParameter, rng: &mut R) {
        self.cur_period = self.next_period;
        self.next_period = param.period.sample(rng);

        self.cur_interval = param.interval.sample(rng);

        self.cur_amplitude = self.next_amplitude;
        self.next_amplitude = param.amplitude.sample(rng);

        self.cur_offset = self.next_offset;
        self.next_offset = param.offset.sample(rng);
    }

    /// 单次播放：四个值全部重新抽取，没有过渡目标
    pub fn set_once_parameter<R: Rng + ?Sized>(&mut self, param: &JitterParameter, rng: &mut R) {
        self.cur_period = param.period.sample(rng);
        self.cur_interval = param.interval.sample(rng);
        self.cur_amplitude = param.amplitude.sample(rng);
        self.cur_offset = param.offset.sample(rng);

        self.next_period = self.cur_period;
        self.next_amplitude = self.cur_amplitude;
        self.next_offset = self.cur_offset;
        self.cycle_count += 1;
    }

    /// 推进计时器，返回本周期是否结束
    ///
    /// 周期取推进前的插值结果，同一次推进内不会自我反馈。
    pub fn tick(&mut self, param: &JitterParameter, dt: f32) -> bool {
        let period = self.current_period(param);
        if period > 0.0 && period.is_finite() {
            self.timer += dt.max(0.0) / period;
        } else {
            // 没有时间基准，立即结束
            self.timer = self.timer.max(1.0);
        }
        self.timer >= 1.0
    }

    /// 当前周期（秒）
    pub fn current_period(&self, param: &JitterParameter) -> f32 {
        param
            .blend_next_period
            .blend(self.cur_period, self.next_period, self.timer01())
    }

    /// 当前权重
    pub fn current_weight(&self, param: &JitterParameter, waveform: Waveform, range: WeightRange) -> f32 {
        if self.cur_period <= 0.0 {
            return self.cur_offset;
        }

        let t = self.timer01();
        let amp = param.blend_next_amplitude.blend(self.cur_amplitude, self.next_amplitude, t);
        let ofs = param.blend_next_amplitude.blend(self.cur_offset, self.next_offset, t);
        range.clamp(waveform.evaluate(t) * amp + ofs)
    }

    /// 停止推进，不重新抽取
    pub fn reset(&mut self) {
        self.is_processing = false;
        self.timer = 0.0;
    }

    #[inline]
    fn timer01(&self) -> f32 {
        self.timer.clamp(0.0, 1.0)
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn current_interval(&self) -> f32 {
        self.cur_interval
    }

    pub fn current_amplitude(&self) -> f32 {
        self.cur_amplitude
    }

    pub fn current_offset(&self) -> f32 {
        self.cur_offset
    }

    /// 已开始的周期数
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }
}
