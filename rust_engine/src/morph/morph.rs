//! Morph 定义

/// Morph 变形
#[derive(Clone, Debug)]
pub struct Morph {
    pub name: String,
    pub weight: f32,
    /// 为 true 时该权重覆盖外部动画写入的权重
    pub override_weight: bool,
}

impl Morph {
    pub fn new(name: String) -> Self {
        Self {
            name,
            weight: 0.0,
            override_weight: false,
        }
    }

    /// 获取名称
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// 获取权重
    pub fn get_weight(&self) -> f32 {
        self.weight
    }

    /// 设置权重
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight.clamp(0.0, 1.0);
    }

    /// 重置权重
    pub fn reset(&mut self) {
        self.weight = 0.0;
        self.override_weight = false;
    }
}

impl Default for Morph {
    fn default() -> Self {
        Self::new(String::new())
    }
}
