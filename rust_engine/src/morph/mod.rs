//! Morph 系统
//!
//! 只保存权重，抖动控制器通过 `MorphSink` 写入。

mod morph;
mod manager;

pub use morph::Morph;
pub use manager::MorphManager;
