use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::Animate;
use crate::sprite::Sprite;
use crate::widget::Image;

/// Cycles an [`Image`] through a list of frames.
///
/// With a start delay, the first frame is held for that long before every loop.
pub struct SpriteAnimator {
    target: Weak<RefCell<Image>>,
    /// Frames in display order.
    pub frames: Vec<Sprite>,
    /// How long each frame is shown.
    pub frame_duration: Duration,
    /// Hold on the first frame before each loop.
    pub start_delay: Duration,
    /// Ignore ticks while set.
    pub paused: bool,
    elapsed: Duration,
    delay_elapsed: Duration,
}

impl SpriteAnimator {
    /// Creates an animator for `image`.
    #[must_use]
    pub fn new(image: &Rc<RefCell<Image>>, frames: Vec<Sprite>, frame_duration: Duration) -> Self {
        Self {
            target: Rc::downgrade(image),
            frames,
            frame_duration,
            start_delay: Duration::ZERO,
            paused: false,
            elapsed: Duration::ZERO,
            delay_elapsed: Duration::ZERO,
        }
    }

    /// Sets the start delay.
    #[must_use]
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    /// Index of the frame currently shown.
    #[must_use]
    pub fn frame_index(&self) -> usize {
        if self.frame_duration.is_zero() || self.frames.is_empty() {
            return 0;
        }
        let index = self.elapsed.as_nanos() / self.frame_duration.as_nanos();
        let last = self.frames.len() - 1;
        usize::try_from(index).map_or(last, |index| index.min(last))
    }

    /// Goes back to the first frame and restarts the delay.
    pub fn reset(&mut self) {
        let (Some(image), Some(first)) = (self.target.upgrade(), self.frames.first()) else {
            return;
        };
        image.borrow_mut().set_sprite(Some(*first));
        self.elapsed = Duration::ZERO;
        self.delay_elapsed = Duration::ZERO;
    }
}

impl Animate for SpriteAnimator {
    fn is_valid(&self) -> bool {
        self.target.strong_count() > 0
    }

    fn tick(&mut self, elapsed: Duration) {
        if self.paused || self.frame_duration.is_zero() || self.frames.is_empty() {
            return;
        }
        let Some(image) = self.target.upgrade() else {
            return;
        };

        if self.elapsed.is_zero() && self.delay_elapsed < self.start_delay {
            self.delay_elapsed += elapsed;
            image.borrow_mut().set_sprite(Some(self.frames[0]));
            if self.delay_elapsed < self.start_delay {
                return;
            }
        }
        self.delay_elapsed = Duration::ZERO;

        let frame_count = u32::try_from(self.frames.len()).unwrap_or(u32::MAX);
        let total = self.frame_duration * frame_count;
        self.elapsed += elapsed;
        if self.elapsed > total {
            self.elapsed = if self.start_delay.is_zero() {
                let remainder = self.elapsed.as_nanos() % total.as_nanos();
                Duration::from_nanos(u64::try_from(remainder).unwrap_or(0))
            } else {
                Duration::ZERO
            };
        }
        let frame = self.frames[self.frame_index()];
        image.borrow_mut().set_sprite(Some(frame));
    }
}
