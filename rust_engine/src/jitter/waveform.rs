//! 波形目录
//!
//! 每个波形都是纯函数：相位 [0, 1] -> 振幅。
//! `Cos`/`Sin` 输出 [-1, 1]，`UpDown*` 脉冲输出 [0, 1]，
//! 起点和终点都是 0，峰值位置由名称中的百分比决定。

use std::f32::consts::TAU;

/// 波形
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// 完整余弦周期
    Cos,
    /// 完整正弦周期
    #[default]
    Sin,
    /// 1% 处到达峰值（眨眼）
    UpDown1,
    /// 5% 处到达峰值
    UpDown5,
    /// 10% 处到达峰值
    UpDown10,
    /// 25% 处到达峰值
    UpDown25,
    /// 对称脉冲
    UpDown50,
}

impl Waveform {
    pub const ALL: [Waveform; 7] = [
        Waveform::Cos,
        Waveform::Sin,
        Waveform::UpDown1,
        Waveform::UpDown5,
        Waveform::UpDown10,
        Waveform::UpDown25,
        Waveform::UpDown50,
    ];

    /// 求值，调用方保证 phase 已截断到 [0, 1]
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            Waveform::Cos => (phase * TAU).cos(),
            Waveform::Sin => (phase * TAU).sin(),
            Waveform::UpDown1 => up_down(phase, 0.01),
            Waveform::UpDown5 => up_down(phase, 0.05),
            Waveform::UpDown10 => up_down(phase, 0.10),
            Waveform::UpDown25 => up_down(phase, 0.25),
            Waveform::UpDown50 => up_down(phase, 0.50),
        }
    }

    /// 峰值所在相位，周期波形返回 None
    pub fn peak_phase(self) -> Option<f32> {
        match self {
            Waveform::Cos | Waveform::Sin => None,
            Waveform::UpDown1 => Some(0.01),
            Waveform::UpDown5 => Some(0.05),
            Waveform::UpDown10 => Some(0.10),
            Waveform::UpDown25 => Some(0.25),
            Waveform::UpDown50 => Some(0.50),
        }
    }

    /// 是否为单极性（输出不小于 0）
    pub fn is_unipolar(self) -> bool {
        self.peak_phase().is_some()
    }
}

/// 0 -> 1 (peak) -> 0，上升段和下降段都用 smoothstep
fn up_down(phase: f32, peak: f32) -> f32 {
    if phase <= 0.0 || phase >= 1.0 {
        return 0.0;
    }
    if phase < peak {
        smoothstep(phase / peak)
    } else {
        smoothstep((1.0 - phase) / (1.0 - peak))
    }
}

#[inline]
fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_shapes() {
        assert!((Waveform::Sin.evaluate(0.25) - 1.0).abs() < 1e-6);
        assert!((Waveform::Cos.evaluate(0.0) - 1.0).abs() < 1e-6);
        assert!((Waveform::Cos.evaluate(0.5) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_up_down_peak_and_ends() {
        for wave in Waveform::ALL.iter().filter(|w| w.is_unipolar()) {
            let peak = wave.peak_phase().unwrap();
            assert_eq!(wave.evaluate(0.0), 0.0);
            assert_eq!(wave.evaluate(1.0), 0.0);
            assert!((wave.evaluate(peak) - 1.0).abs() < 1e-5, "{:?}", wave);
        }
    }

    #[test]
    fn test_outputs_bounded() {
        for wave in Waveform::ALL {
            for i in 0..=100 {
                let v = wave.evaluate(i as f32 / 100.0);
                assert!((-1.0..=1.0).contains(&v));
                if wave.is_unipolar() {
                    assert!(v >= 0.0);
                }
            }
        }
    }
}
