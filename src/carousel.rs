//! Paging state for the song carousel.
//!
//! The controller is a plain state object driven by four transitions:
//! [`begin_drag`](CarouselController::begin_drag),
//! [`update_drag`](CarouselController::update_drag),
//! [`end_drag`](CarouselController::end_drag) and
//! [`tick`](CarouselController::tick). Any event loop can call them; the
//! controller only needs pointer x positions in pixels and the current time.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::color::Color;
use crate::sampler::ColorCache;

/// Drag deltas past either end of the list are scaled by this factor.
pub const ELASTIC_RESISTANCE: f32 = 0.3;
/// Fraction of the item width a drag must exceed to change page.
pub const COMMIT_FRACTION: f32 = 0.3;

pub const NUDGE_INITIAL_DELAY: Duration = Duration::from_millis(3000);
pub const NUDGE_PERIOD: Duration = Duration::from_millis(6000);
/// How long a nudge stays out before springing back.
pub const NUDGE_HOLD: Duration = Duration::from_millis(800);
pub const NUDGE_DISTANCE: f32 = 12.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CarouselError {
    #[error("carousel needs at least one item")]
    Empty,
    #[error("item width must be positive, got {0}")]
    InvalidWidth(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
}

#[derive(Debug, Clone)]
pub struct CarouselController {
    item_count: usize,
    item_width: f32,
    current_index: usize,
    phase: DragPhase,
    start_x: f32,
    drag_offset: f32,
    has_interacted: bool,
    nudge_offset: f32,
    next_nudge_at: Option<Instant>,
    nudge_reset_at: Option<Instant>,
    torn_down: bool,
}

impl CarouselController {
    /// Create a controller at index 0. The first ambient nudge is scheduled
    /// `NUDGE_INITIAL_DELAY` after `now` when there is more than one item.
    pub fn new(item_count: usize, item_width: f32, now: Instant) -> Result<Self, CarouselError> {
        if item_count == 0 {
            return Err(CarouselError::Empty);
        }
        if !(item_width > 0.0 && item_width.is_finite()) {
            return Err(CarouselError::InvalidWidth(item_width));
        }

        Ok(Self {
            item_count,
            item_width,
            current_index: 0,
            phase: DragPhase::Idle,
            start_x: 0.0,
            drag_offset: 0.0,
            has_interacted: false,
            nudge_offset: 0.0,
            next_nudge_at: (item_count > 1).then(|| now + NUDGE_INITIAL_DELAY),
            nudge_reset_at: None,
            torn_down: false,
        })
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn item_width(&self) -> f32 {
        self.item_width
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    pub fn drag_offset(&self) -> f32 {
        self.drag_offset
    }

    pub fn nudge_offset(&self) -> f32 {
        self.nudge_offset
    }

    pub fn has_interacted(&self) -> bool {
        self.has_interacted
    }

    /// Minimum drag distance, exclusive, that commits a page change.
    pub fn commit_threshold(&self) -> f32 {
        self.item_width * COMMIT_FRACTION
    }

    fn last_index(&self) -> usize {
        self.item_count - 1
    }

    /// Pointer went down at `x`. Latches the interaction flag, which cancels
    /// the ambient nudge for good.
    pub fn begin_drag(&mut self, x: f32) {
        if !self.has_interacted {
            debug!("first interaction, ambient nudge disabled");
            self.has_interacted = true;
        }
        self.cancel_nudge();
        self.phase = DragPhase::Dragging;
        self.start_x = x;
        self.drag_offset = 0.0;
    }

    /// Pointer moved to `x`. Ignored unless a drag is in progress.
    pub fn update_drag(&mut self, x: f32) {
        if !self.is_dragging() {
            return;
        }

        let delta = x - self.start_x;
        let past_start = self.current_index == 0 && delta > 0.0;
        let past_end = self.current_index == self.last_index() && delta < 0.0;
        self.drag_offset = if past_start || past_end {
            delta * ELASTIC_RESISTANCE
        } else {
            delta
        };
    }

    /// Pointer released. Steps one page against the drag direction when the
    /// offset exceeds the commit threshold and the index has room to move.
    /// Returns the new index if the page changed.
    pub fn end_drag(&mut self) -> Option<usize> {
        if !self.is_dragging() {
            return None;
        }
        self.phase = DragPhase::Idle;

        let offset = std::mem::take(&mut self.drag_offset);
        if offset.abs() <= self.commit_threshold() {
            return None;
        }

        let step = if offset > 0.0 {
            self.current_index.checked_sub(1)
        } else if self.current_index < self.last_index() {
            Some(self.current_index + 1)
        } else {
            None
        };
        let Some(target) = step else {
            debug!(index = self.current_index, "drag past boundary, snapping back");
            return None;
        };

        info!(from = self.current_index, to = target, "page changed");
        self.current_index = target;
        Some(target)
    }

    /// Advance the ambient nudge timers to `now`. Returns whether the nudge
    /// offset changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.torn_down || self.has_interacted {
            return false;
        }

        let mut changed = false;
        if self.nudge_reset_at.is_some_and(|at| now >= at) {
            self.nudge_reset_at = None;
            changed |= self.nudge_offset != 0.0;
            self.nudge_offset = 0.0;
        }

        if let Some(mut due) = self.next_nudge_at {
            if now >= due {
                while due <= now {
                    due += NUDGE_PERIOD;
                }
                self.next_nudge_at = Some(due);
                changed |= self.nudge(now);
            }
        }
        changed
    }

    /// Push the strip a few pixels towards the side with more content.
    fn nudge(&mut self, now: Instant) -> bool {
        if self.is_dragging() {
            return false;
        }

        let can_reveal_next = self.current_index < self.last_index();
        let can_reveal_previous = self.current_index > 0;
        let offset = if can_reveal_next {
            -NUDGE_DISTANCE
        } else if can_reveal_previous {
            NUDGE_DISTANCE
        } else {
            return false;
        };

        self.nudge_offset = offset;
        self.nudge_reset_at = Some(now + NUDGE_HOLD);
        true
    }

    fn cancel_nudge(&mut self) {
        self.next_nudge_at = None;
        self.nudge_reset_at = None;
        self.nudge_offset = 0.0;
    }

    /// Earliest time `tick` has work to do, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.torn_down || self.has_interacted {
            return None;
        }
        match (self.next_nudge_at, self.nudge_reset_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Stop all timers. The controller ignores `tick` afterwards.
    pub fn teardown(&mut self) {
        self.cancel_nudge();
        self.torn_down = true;
    }

    /// Horizontal translation of the item strip in pixels.
    pub fn translate_x(&self) -> f32 {
        -(self.current_index as f32) * self.item_width + self.drag_offset + self.nudge_offset
    }

    /// Background tint for the item under the current index.
    pub fn active_color(&self, catalog: &Catalog, cache: &ColorCache) -> Color {
        catalog
            .get(self.current_index)
            .map(|item| cache.resolve(catalog, item.id))
            .unwrap_or(Color::WHITE)
    }
}
