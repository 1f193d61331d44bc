//! 循环振幅的淡入淡出

use super::TaskStatus;

/// 到达端点的容差，避免浮点累加误差多拖一帧
const FADE_EPSILON: f32 = 1e-4;

/// 淡入/淡出方向
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeDirection {
    /// 0 -> 1
    In,
    /// 1 -> 0
    Out,
}

/// 包络渐变任务
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fade {
    direction: FadeDirection,
    seconds: f32,
}

impl Fade {
    pub fn new(direction: FadeDirection, seconds: f32, min_seconds: f32) -> Self {
        Self {
            direction,
            seconds: seconds.max(min_seconds).max(f32::EPSILON),
        }
    }

    pub fn direction(&self) -> FadeDirection {
        self.direction
    }

    pub fn seconds(&self) -> f32 {
        self.seconds
    }

    /// 推进包络，到达端点时返回 Finished
    pub fn tick(&self, envelope: &mut f32, dt: f32) -> TaskStatus {
        let step = dt.max(0.0) / self.seconds;
        match self.direction {
            FadeDirection::In => {
                *envelope += step;
                if *envelope >= 1.0 - FADE_EPSILON {
                    *envelope = 1.0;
                    return TaskStatus::Finished;
                }
            }
            FadeDirection::Out => {
                *envelope -= step;
                if *envelope <= FADE_EPSILON {
                    *envelope = 0.0;
                    return TaskStatus::Finished;
                }
            }
        }
        TaskStatus::Running
    }
}
