//! 骨骼管理器

use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;

use super::Bone;
use crate::jitter::BoneSink;

/// 骨骼管理器
pub struct BoneManager {
    bones: Vec<Bone>,
    name_to_index: HashMap<String, usize>,
    sorted_indices: Vec<usize>,
}

impl BoneManager {
    pub fn new() -> Self {
        Self {
            bones: Vec::new(),
            name_to_index: HashMap::new(),
            sorted_indices: Vec::new(),
        }
    }

    /// 添加骨骼
    pub fn add_bone(&mut self, bone: Bone) {
        let index = self.bones.len();
        self.name_to_index.insert(bone.name.clone(), index);
        self.bones.push(bone);
        self.sorted_indices.push(index);
    }

    /// 构建骨骼层级：按变换层级排序，计算父骨骼偏移
    pub fn build_hierarchy(&mut self) {
        let bone_count = self.bones.len();
        self.sorted_indices = (0..bone_count).collect();
        self.sorted_indices
            .sort_by_key(|&i| self.bones[i].transform_level);

        for i in 0..bone_count {
            let pos = self.bones[i].initial_position;
            let offset = match self.parent_of(i) {
                Some(parent) => pos - self.bones[parent].initial_position,
                None => pos,
            };
            self.bones[i].bone_offset = offset;
            self.bones[i].local_transform = Mat4::from_translation(offset);
            self.bones[i].global_transform = Mat4::from_translation(pos);
        }
    }

    fn parent_of(&self, index: usize) -> Option<usize> {
        let parent = self.bones[index].parent_index;
        (parent >= 0 && (parent as usize) < self.bones.len()).then_some(parent as usize)
    }

    /// 通过名称查找骨骼
    pub fn find_bone_by_name(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// 获取骨骼数量
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// 获取骨骼
    pub fn get_bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// 获取可变骨骼引用
    pub fn get_bone_mut(&mut self, index: usize) -> Option<&mut Bone> {
        self.bones.get_mut(index)
    }

    /// 重置所有骨骼的动画状态（外部动画标志保留）
    pub fn reset_all_transforms(&mut self) {
        for bone in &mut self.bones {
            bone.reset_animation();
        }
    }

    /// 标记骨骼是否由外部动画驱动
    pub fn set_bone_animated(&mut self, index: usize, animated: bool) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.animated = animated;
        }
    }

    pub fn is_bone_animated(&self, index: usize) -> bool {
        self.bones.get(index).map(|b| b.animated).unwrap_or(false)
    }

    /// 设置骨骼动画平移
    pub fn set_bone_translation(&mut self, index: usize, translation: Vec3) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.animation_translate = translation;
        }
    }

    /// 设置骨骼动画旋转
    pub fn set_bone_rotation(&mut self, index: usize, rotation: Quat) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.animation_rotate = rotation;
        }
    }

    /// 添加骨骼旋转
    pub fn add_bone_rotation(&mut self, index: usize, rotation: Quat) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.animation_rotate = bone.animation_rotate * rotation;
        }
    }

    /// 按层级顺序更新本地和全局变换
    pub fn update_transforms(&mut self) {
        let sorted_indices = self.sorted_indices.clone();
        for &idx in &sorted_indices {
            self.bones[idx].update_local_transform();
        }
        for &idx in &sorted_indices {
            if self.parent_of(idx).is_none() {
                self.update_global_transform_recursive(idx);
            }
        }
    }

    /// 递归更新骨骼全局变换
    fn update_global_transform_recursive(&mut self, index: usize) {
        self.bones[index].global_transform = match self.parent_of(index) {
            Some(parent) => self.bones[parent].global_transform * self.bones[index].local_transform,
            None => self.bones[index].local_transform,
        };

        let children: Vec<usize> = (0..self.bones.len())
            .filter(|&i| self.bones[i].parent_index == index as i32)
            .collect();
        for child_idx in children {
            self.update_global_transform_recursive(child_idx);
        }
    }

    /// 获取全局变换
    pub fn get_global_transform(&self, index: usize) -> Mat4 {
        self.bones.get(index).map(|b| b.global_transform).unwrap_or(Mat4::IDENTITY)
    }
}

impl Default for BoneManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BoneSink for BoneManager {
    fn find_bone_by_name(&self, name: &str) -> Option<usize> {
        BoneManager::find_bone_by_name(self, name)
    }

    fn is_bone_animated(&self, index: usize) -> bool {
        BoneManager::is_bone_animated(self, index)
    }

    fn set_bone_rotation(&mut self, index: usize, rotation: Quat) {
        BoneManager::set_bone_rotation(self, index, rotation);
    }

    fn add_bone_rotation(&mut self, index: usize, rotation: Quat) {
        BoneManager::add_bone_rotation(self, index, rotation);
    }
}
