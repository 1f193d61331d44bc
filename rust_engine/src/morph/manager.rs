//! Morph 管理器

use std::collections::HashMap;

use super::Morph;
use crate::jitter::MorphSink;

/// Morph 管理器
pub struct MorphManager {
    morphs: Vec<Morph>,
    name_to_index: HashMap<String, usize>,
}

impl MorphManager {
    pub fn new() -> Self {
        Self {
            morphs: Vec::new(),
            name_to_index: HashMap::new(),
        }
    }

    /// 添加 Morph
    pub fn add_morph(&mut self, morph: Morph) {
        let index = self.morphs.len();
        self.name_to_index.insert(morph.name.clone(), index);
        self.morphs.push(morph);
    }

    /// 通过名称查找 Morph
    pub fn find_morph_by_name(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// 获取 Morph 数量
    pub fn morph_count(&self) -> usize {
        self.morphs.len()
    }

    /// 获取 Morph
    pub fn get_morph(&self, index: usize) -> Option<&Morph> {
        self.morphs.get(index)
    }

    /// 获取可变 Morph 引用
    pub fn get_morph_mut(&mut self, index: usize) -> Option<&mut Morph> {
        self.morphs.get_mut(index)
    }

    /// 设置 Morph 权重
    pub fn set_morph_weight(&mut self, index: usize, weight: f32) {
        if let Some(morph) = self.morphs.get_mut(index) {
            morph.set_weight(weight);
        }
    }

    /// 重置所有 Morph 权重
    pub fn reset_all_weights(&mut self) {
        for morph in &mut self.morphs {
            morph.reset();
        }
    }

    /// 权重大于 0 的 Morph
    pub fn active_morphs(&self) -> impl Iterator<Item = &Morph> {
        self.morphs.iter().filter(|m| m.weight > 0.0)
    }
}

impl Default for MorphManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MorphSink for MorphManager {
    fn find_morph_by_name(&self, name: &str) -> Option<usize> {
        MorphManager::find_morph_by_name(self, name)
    }

    fn set_morph_weight(&mut self, index: usize, weight: f32, override_weight: bool) {
        if let Some(morph) = self.morphs.get_mut(index) {
            morph.set_weight(weight);
            morph.override_weight = override_weight;
        }
    }

    fn weighted_morphs(&self) -> Vec<(String, f32)> {
        self.active_morphs()
            .map(|m| (m.name.clone(), m.weight))
            .collect()
    }
}
