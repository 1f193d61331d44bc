//! 逐帧推进的播放任务
//!
//! 每个任务相当于一个每帧让出一次的协程，`tick` 恢复执行直到下一次让出。
//! 任务被替换或丢弃即视为取消，旧任务不会再被恢复。

use rand::Rng;

use super::{JitterParameter, OscillatorState};

/// 任务状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum LoopPhase {
    /// 下次恢复时开始新周期
    Restart,
    /// 等待重新启用
    Suspended,
    Period,
    Interval { elapsed: f32 },
}

/// 循环播放：无限重复 开始周期 -> 推进到结束 -> (间隔)
#[derive(Clone, Debug)]
pub struct LoopTask {
    phase: LoopPhase,
    hold_interval: bool,
}

impl LoopTask {
    /// 启动并立即进入第一个周期
    pub fn start<R: Rng + ?Sized>(
        state: &mut OscillatorState,
        param: &JitterParameter,
        enabled: bool,
        hold_interval: bool,
        rng: &mut R,
    ) -> Self {
        let mut task = Self {
            phase: LoopPhase::Restart,
            hold_interval,
        };
        task.restart(state, param, enabled, rng);
        task
    }

    fn restart<R: Rng + ?Sized>(
        &mut self,
        state: &mut OscillatorState,
        param: &JitterParameter,
        enabled: bool,
        rng: &mut R,
    ) {
        state.is_processing = true;
        state.advance_cycle(param, rng);
        state.timer = 0.0;

        if enabled {
            self.phase = LoopPhase::Period;
        } else {
            state.is_processing = false;
            self.phase = LoopPhase::Suspended;
        }
    }

    /// 推进一帧。`enabled` 为 false 时任务在下一个周期开始处挂起。
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        state: &mut OscillatorState,
        param: &JitterParameter,
        enabled: bool,
        dt: f32,
        rng: &mut R,
    ) {
        loop {
            match self.phase {
                LoopPhase::Restart => self.restart(state, param, enabled, rng),
                LoopPhase::Suspended => {
                    if !enabled {
                        return;
                    }
                    state.is_processing = true;
                    self.phase = LoopPhase::Period;
                }
                LoopPhase::Period => {
                    if state.timer >= 1.0 {
                        self.phase = if self.hold_interval {
                            LoopPhase::Interval { elapsed: 0.0 }
                        } else {
                            LoopPhase::Restart
                        };
                        continue;
                    }
                    state.tick(param, dt);
                    return;
                }
                LoopPhase::Interval { elapsed } => {
                    if elapsed < state.current_interval() {
                        self.phase = LoopPhase::Interval { elapsed: elapsed + dt };
                        return;
                    }
                    self.phase = LoopPhase::Restart;
                }
            }
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.phase == LoopPhase::Suspended
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum OncePhase {
    Period,
    Interval { elapsed: f32 },
    /// 计时器已归零，下一帧结束
    Finishing,
}

/// 单次播放：一个周期 -> 间隔 -> 结束
#[derive(Clone, Debug)]
pub struct OnceTask {
    phase: OncePhase,
}

impl OnceTask {
    pub fn start<R: Rng + ?Sized>(
        state: &mut OscillatorState,
        param: &JitterParameter,
        rng: &mut R,
    ) -> Self {
        state.is_processing = true;
        state.set_once_parameter(param, rng);
        state.timer = 0.0;
        Self {
            phase: OncePhase::Period,
        }
    }

    pub fn tick(&mut self, state: &mut OscillatorState, param: &JitterParameter, dt: f32) -> TaskStatus {
        loop {
            match self.phase {
                OncePhase::Period => {
                    if state.timer >= 1.0 {
                        self.phase = OncePhase::Interval { elapsed: 0.0 };
                        continue;
                    }
                    state.tick(param, dt);
                    return TaskStatus::Running;
                }
                OncePhase::Interval { elapsed } => {
                    if elapsed < state.current_interval() {
                        self.phase = OncePhase::Interval { elapsed: elapsed + dt };
                    } else {
                        state.timer = 0.0;
                        self.phase = OncePhase::Finishing;
                    }
                    return TaskStatus::Running;
                }
                OncePhase::Finishing => {
                    state.is_processing = false;
                    return TaskStatus::Finished;
                }
            }
        }
    }
}
