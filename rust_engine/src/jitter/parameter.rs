//! 抖动参数

use super::{FloatRange, Waveform};

/// 相邻两个随机周期之间的过渡方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// 不插值，周期开始时直接切换
    #[default]
    None,
    /// 线性插值
    Linear,
    /// 三次 smoothstep，两端导数为 0
    SmoothCurve,
}

impl BlendMode {
    /// current -> next 插值，t 取 [0, 1]
    pub fn blend(self, current: f32, next: f32, t: f32) -> f32 {
        match self {
            BlendMode::None => current,
            BlendMode::Linear => current + (next - current) * t,
            BlendMode::SmoothCurve => {
                if t <= 0.0 {
                    current
                } else if t >= 1.0 {
                    next
                } else {
                    (next - current) * (-2.0 * t + 3.0) * t * t + current
                }
            }
        }
    }
}

/// 单个振荡器的配置
///
/// 播放过程中只读，仅由配置修改接口变更。
#[derive(Clone, Debug, PartialEq)]
pub struct JitterParameter {
    pub waveform: Waveform,
    /// 周期（秒）
    pub period: FloatRange,
    /// 周期结束后的等待时间（秒）
    pub interval: FloatRange,
    /// 振幅
    pub amplitude: FloatRange,
    /// 偏移（波形基线）
    pub offset: FloatRange,
    /// 振幅/偏移的过渡方式
    pub blend_next_amplitude: BlendMode,
    /// 周期的过渡方式
    pub blend_next_period: BlendMode,
    pub is_enabled: bool,
    /// X 轴参数（轴同步时作为唯一的状态来源）
    pub is_primary_axis: bool,
    pub axis_synced: bool,
}

impl JitterParameter {
    pub fn new(waveform: Waveform, is_loop: bool, is_primary_axis: bool) -> Self {
        let (period, amplitude) = if is_loop {
            (FloatRange::non_negative(2.0, 4.0), FloatRange::new(0.1, 0.3))
        } else {
            (FloatRange::non_negative(0.5, 1.0), FloatRange::new(0.5, 1.0))
        };

        Self {
            waveform,
            period,
            interval: FloatRange::non_negative(0.0, 0.0),
            amplitude,
            offset: FloatRange::constant(0.0),
            blend_next_amplitude: if is_loop { BlendMode::SmoothCurve } else { BlendMode::None },
            blend_next_period: if is_loop { BlendMode::Linear } else { BlendMode::None },
            is_enabled: true,
            is_primary_axis,
            axis_synced: false,
        }
    }

    /// 设置周期区间
    pub fn with_period(mut self, min: f32, max: f32) -> Self {
        self.period = FloatRange::non_negative(min, max);
        self
    }

    /// 设置间隔区间
    pub fn with_interval(mut self, min: f32, max: f32) -> Self {
        self.interval = FloatRange::non_negative(min, max);
        self
    }

    /// 设置振幅区间
    pub fn with_amplitude(mut self, min: f32, max: f32) -> Self {
        self.amplitude = FloatRange::new(min, max);
        self
    }

    /// 设置偏移区间
    pub fn with_offset(mut self, min: f32, max: f32) -> Self {
        self.offset = FloatRange::new(min, max);
        self
    }

    /// 同时设置振幅和周期的过渡方式
    pub fn with_blend(mut self, amplitude: BlendMode, period: BlendMode) -> Self {
        self.blend_next_amplitude = amplitude;
        self.blend_next_period = period;
        self
    }

    /// 修正所有区间
    pub fn normalize(&mut self) {
        self.period.non_negative = true;
        self.interval.non_negative = true;
        self.period.normalize();
        self.interval.normalize();
        self.amplitude.normalize();
        self.offset.normalize();
    }
}

impl Default for JitterParameter {
    fn default() -> Self {
        Self::new(Waveform::Sin, true, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_blend_endpoints_exact() {
        let (a, b) = (0.137_f32, 0.911_f32);
        assert_eq!(BlendMode::SmoothCurve.blend(a, b, 0.0), a);
        assert_eq!(BlendMode::SmoothCurve.blend(a, b, 1.0), b);
    }

    #[test]
    fn test_curve_blend_monotonic() {
        let (a, b) = (-0.4_f32, 0.8_f32);
        let mut prev = a;
        for i in 1..=200 {
            let v = BlendMode::SmoothCurve.blend(a, b, i as f32 / 200.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_none_and_linear() {
        assert_eq!(BlendMode::None.blend(1.0, 5.0, 0.7), 1.0);
        assert!((BlendMode::Linear.blend(1.0, 5.0, 0.5) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_parameter() {
        let mut param = JitterParameter::default()
            .with_period(3.0, -1.0)
            .with_amplitude(0.9, 0.1);
        param.normalize();
        assert_eq!((param.period.min, param.period.max), (0.0, 3.0));
        assert_eq!((param.amplitude.min, param.amplitude.max), (0.1, 0.9));
    }
}
