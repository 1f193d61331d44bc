//! 程序化抖动
//!
//! 用随机化的周期波形驱动骨骼旋转和 Morph 权重，模拟呼吸、摇摆、眨眼等
//! 待机动作，不需要预先制作的动画。
//!
//! ## 结构
//! | 类型 | 作用 |
//! |------|------|
//! | `FloatRange` | 随机区间 |
//! | `Waveform` | 波形目录 |
//! | `JitterParameter` | 周期/间隔/振幅/偏移 + 过渡方式 |
//! | `OscillatorState` | 单个振荡器的当前/下一周期参数 |
//! | `LoopTask` / `OnceTask` | 循环和单次播放的逐帧状态机 |
//! | `JitterChannel` | 循环 + 单次，对应一个物理量 |
//! | `BoneJitter` / `MorphJitter` / `EyeJitter` | 控制器 |

mod range;
mod waveform;
mod parameter;
mod state;
mod task;
mod fade;
mod channel;
mod sink;
mod bone_jitter;
mod morph_jitter;
mod eye_jitter;
pub mod config;

pub use range::FloatRange;
pub use waveform::Waveform;
pub use parameter::{BlendMode, JitterParameter};
pub use state::{OscillatorState, WeightRange};
pub use task::{LoopTask, OnceTask, TaskStatus};
pub use fade::{Fade, FadeDirection};
pub use channel::{JitterChannel, MorphChannel};
pub use sink::{BoneSink, BoneSinkHandle, MorphSink, MorphSinkHandle};
pub use bone_jitter::{euler_to_quat, BoneJitter, BoneJitterConfig};
pub use morph_jitter::{MorphJitter, MorphJitterConfig};
pub use eye_jitter::{EyeJitter, EyeJitterConfig};
pub use config::{JitterConfig, get_config, set_config, reset_config};
