//! Input events and the queue that carries them into the tick loop.
//!
//! Input arrives asynchronously relative to the tick loop. Producers push
//! events; the state machine is the single consumer and pops them in order
//! once per tick, so all state mutation happens on the tick.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Requests from the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Cycle to the next light preset.
    ToggleLighting,
    /// Teleport the ball to a random passable cell.
    RepositionBall,
    /// Viewport size changed.
    Resize { width: u32, height: u32 },
    /// Throw away the current session and start a new one.
    NewSession {
        dimension: usize,
        seed: Option<u64>,
    },
}

/// FIFO queue with a single consumer.
#[derive(Debug, Default)]
pub struct InputQueue {
    pending: VecDeque<InputEvent>,
}

impl InputQueue {
    /// Pushes an event to the back of the queue.
    pub fn push(&mut self, e: InputEvent) {
        self.pending.push_back(e);
    }

    /// Removes and returns the oldest event.
    pub fn pop(&mut self) -> Option<InputEvent> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
