use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::color::Color;

/// Recently used colours, most recent first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    colors: VecDeque<Color>,
    capacity: usize,
}

impl Palette {
    pub fn new(capacity: usize) -> Self {
        Self {
            colors: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Moves `color` to the front, dropping the oldest entry when full
    pub fn record(&mut self, color: Color) {
        if self.capacity == 0 {
            return;
        }
        if let Some(pos) = self.colors.iter().position(|&c| c == color) {
            self.colors.remove(pos);
        }
        self.colors.push_front(color);
        self.colors.truncate(self.capacity);
    }

    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.colors.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
