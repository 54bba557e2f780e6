//! Run-state flag shared across the simulation and worker threads.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
    Paused,
}

impl RunState {
    fn to_u8(self) -> u8 {
        match self {
            RunState::Stopped => 0,
            RunState::Running => 1,
            RunState::Paused => 2,
        }
    }

    fn from_u8(v: u8) -> RunState {
        match v {
            1 => RunState::Running,
            2 => RunState::Paused,
            _ => RunState::Stopped,
        }
    }
}

pub struct RunFlag(AtomicU8);

impl RunFlag {
    pub fn new(initial: RunState) -> Self {
        Self(AtomicU8::new(initial.to_u8()))
    }

    pub fn get(&self) -> RunState {
        RunState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub fn set(&self, state: RunState) {
        self.0.store(state.to_u8(), Ordering::SeqCst);
    }
}
