//! 随机数值区间

use rand::Rng;

/// 闭区间 [min, max]，每次采样返回区间内均匀分布的随机值
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
    /// 为 true 时采样结果不小于 0（周期、间隔用）
    pub non_negative: bool,
}

impl FloatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max, non_negative: false }
    }

    /// 非负区间（周期、间隔）
    pub const fn non_negative(min: f32, max: f32) -> Self {
        Self { min, max, non_negative: true }
    }

    /// 固定值
    pub const fn constant(value: f32) -> Self {
        Self::new(value, value)
    }

    /// 采样
    ///
    /// `min >= max` 时视为退化区间，直接返回 `min`。
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let value = if self.min < self.max {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        };

        if self.non_negative {
            value.max(0.0)
        } else {
            value
        }
    }

    /// 修正区间：min > max 时交换，非负区间截断到 0
    pub fn normalize(&mut self) {
        if self.min > self.max {
            std::mem::swap(&mut self.min, &mut self.max);
        }
        if self.non_negative {
            self.min = self.min.max(0.0);
            self.max = self.max.max(0.0);
        }
    }

    /// 区间内是否包含 value
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for FloatRange {
    fn default() -> Self {
        Self::constant(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_sample_within_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        let range = FloatRange::new(-0.3, 1.7);
        for _ in 0..10_000 {
            let v = range.sample(&mut rng);
            assert!(range.contains(v), "{} out of range", v);
        }
    }

    #[test]
    fn test_degenerate_range_is_constant() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(FloatRange::constant(0.5).sample(&mut rng), 0.5);
        // min > max 视为 min
        assert_eq!(FloatRange::new(2.0, 1.0).sample(&mut rng), 2.0);
    }

    #[test]
    fn test_non_negative_clamp() {
        let mut rng = Pcg32::seed_from_u64(3);
        let range = FloatRange::non_negative(-2.0, -1.0);
        assert_eq!(range.sample(&mut rng), 0.0);
    }

    #[test]
    fn test_normalize() {
        let mut range = FloatRange::new(3.0, 1.0);
        range.normalize();
        assert_eq!((range.min, range.max), (1.0, 3.0));

        let mut period = FloatRange::non_negative(-1.0, 2.0);
        period.normalize();
        assert_eq!((period.min, period.max), (0.0, 2.0));
    }
}
