//! Frame-driven animation.
//!
//! An [`AnimationRunner`] holds every active animator and ticks them once per
//! frame. Animators hold their targets weakly: when the target view is dropped,
//! the animator becomes invalid and the runner discards it on the next tick.
//!
//! ```text
//! elapsed:   0 ──────────────▶ duration          forward
//!            0 ◀────────────── duration          reversing
//!
//! at either end:   auto_reverse → flip direction
//!                  loop         → wrap to the opposite end
//!                  otherwise    → clamp and stop
//! ```

mod hover;
mod sprite;

pub use hover::{HoverScale, DEFAULT_HOVER_DURATION};
pub use sprite::SpriteAnimator;

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use trellis_core::{Edges, Vec2};

use crate::style::Color;

/// Shape of an animation's progress curve.
///
/// Named in config as `linear`, `quad_in`, `quad_out` and `quad_in_out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed.
    #[default]
    Linear,
    /// Starts slow.
    QuadIn,
    /// Ends slow.
    QuadOut,
    /// Slow at both ends.
    QuadInOut,
}

impl Easing {
    /// Maps linear progress `t` to eased progress. Both ends are fixed at 0 and 1.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadIn => t * t,
            Self::QuadOut => t * (2.0 - t),
            Self::QuadInOut if t < 0.5 => 2.0 * t * t,
            Self::QuadInOut => 1.0 - 2.0 * (1.0 - t) * (1.0 - t),
        }
    }
}

/// Values that can be interpolated.
pub trait Lerp: Sized {
    /// Value at `t` between `self` (0) and `other` (1).
    #[must_use]
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::new(Lerp::lerp(&self.x, &other.x, t), Lerp::lerp(&self.y, &other.y, t))
    }
}

impl Lerp for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp(*self, *other, t)
    }
}

impl Lerp for Edges {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let side = |a: i32, b: i32| Lerp::lerp(&(a as f32), &(b as f32), t).round() as i32;
        Self::new(
            side(self.left, other.left),
            side(self.top, other.top),
            side(self.right, other.right),
            side(self.bottom, other.bottom),
        )
    }
}

/// A tween between two values.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation<V> {
    /// Value at the start of the timeline.
    pub start_value: V,
    /// Value at the end of the timeline.
    pub end_value: V,
    /// Length of the timeline.
    pub duration: Duration,
    /// Progress curve.
    pub easing: Easing,
}

impl<V> Animation<V> {
    /// Default length of an animation.
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(1);

    /// Creates a linear animation.
    #[must_use]
    pub const fn new(start_value: V, end_value: V, duration: Duration) -> Self {
        Self {
            start_value,
            end_value,
            duration,
            easing: Easing::Linear,
        }
    }

    /// Sets the easing curve.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// Anything the runner can tick.
pub trait Animate {
    /// `false` once the target is gone; the runner then drops the animator.
    fn is_valid(&self) -> bool;

    /// Advances by one frame.
    fn tick(&mut self, elapsed: Duration);
}

type Getter<T, V> = Box<dyn Fn(&T) -> V>;
type Setter<T, V> = Box<dyn Fn(&mut T, V)>;
type LerpFn<V> = Box<dyn Fn(&V, &V, f32) -> V>;

/// Animates one property of a weakly-held target.
pub struct Animator<T, V> {
    target: Weak<RefCell<T>>,
    get_value: Getter<T, V>,
    set_value: Setter<T, V>,
    lerp: LerpFn<V>,
    current: Option<Animation<V>>,
    elapsed: Duration,
    paused: bool,
    reversing: bool,
    /// Flip direction at either end instead of stopping.
    pub auto_reverse: bool,
    /// Wrap to the opposite end instead of stopping.
    pub looping: bool,
}

impl<T: 'static, V: Clone + 'static> Animator<T, V> {
    /// Binds an animator to a property using a custom interpolation.
    pub fn with_lerp(
        target: &Rc<RefCell<T>>,
        get_value: impl Fn(&T) -> V + 'static,
        set_value: impl Fn(&mut T, V) + 'static,
        lerp: impl Fn(&V, &V, f32) -> V + 'static,
    ) -> Self {
        Self {
            target: Rc::downgrade(target),
            get_value: Box::new(get_value),
            set_value: Box::new(set_value),
            lerp: Box::new(lerp),
            current: None,
            elapsed: Duration::ZERO,
            paused: false,
            reversing: false,
            auto_reverse: false,
            looping: false,
        }
    }

    /// The running animation, if any.
    #[must_use]
    pub fn current_animation(&self) -> Option<&Animation<V>> {
        self.current.as_ref()
    }

    /// Time along the current timeline.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// `true` while moving from the end value toward the start value.
    #[must_use]
    pub fn is_reversing(&self) -> bool {
        self.reversing
    }

    /// `true` while ticks are ignored.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Sets the loop flag.
    #[must_use]
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Sets the auto-reverse flag.
    #[must_use]
    pub fn with_auto_reverse(mut self, auto_reverse: bool) -> Self {
        self.auto_reverse = auto_reverse;
        self
    }

    /// Jumps the target to the animation's start value and begins counting.
    ///
    /// When reversing, counting starts from the full duration. Does nothing if the
    /// target is gone.
    pub fn start(&mut self, animation: Animation<V>) {
        let Some(target) = self.target.upgrade() else {
            return;
        };
        (self.set_value)(&mut target.borrow_mut(), animation.start_value.clone());
        self.elapsed = if self.reversing {
            animation.duration
        } else {
            Duration::ZERO
        };
        self.current = Some(animation);
    }

    /// Starts an animation between two explicit values.
    pub fn start_between(&mut self, start_value: V, end_value: V, duration: Duration) {
        self.start(Animation::new(start_value, end_value, duration));
    }

    /// Starts an animation from the target's current value.
    pub fn start_to(&mut self, end_value: V, duration: Duration) {
        let Some(target) = self.target.upgrade() else {
            return;
        };
        let current = (self.get_value)(&target.borrow());
        self.start(Animation::new(current, end_value, duration));
    }

    /// Plays the current timeline toward its end value.
    pub fn forward(&mut self) {
        self.reversing = false;
    }

    /// Plays the current timeline back toward its start value.
    pub fn reverse(&mut self) {
        self.reversing = true;
    }

    /// Stops advancing without forgetting progress.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Continues after [`pause`](Self::pause).
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Puts the target back at the current direction's starting value.
    pub fn reset(&mut self) {
        let (Some(animation), Some(target)) = (&self.current, self.target.upgrade()) else {
            return;
        };
        let value = if self.reversing {
            animation.end_value.clone()
        } else {
            animation.start_value.clone()
        };
        (self.set_value)(&mut target.borrow_mut(), value);
        self.elapsed = if self.reversing {
            animation.duration
        } else {
            Duration::ZERO
        };
    }

    /// Drops the current animation. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.current = None;
        self.elapsed = Duration::ZERO;
        self.reversing = false;
        self.paused = false;
    }

    fn advance(&mut self, elapsed: Duration, duration: Duration) {
        if self.reversing {
            match self.elapsed.checked_sub(elapsed) {
                Some(remaining) if !remaining.is_zero() => self.elapsed = remaining,
                underflow => {
                    if self.auto_reverse {
                        self.reversing = false;
                        self.elapsed = Duration::ZERO;
                    } else if self.looping && underflow.is_none() {
                        self.elapsed = duration;
                    } else {
                        self.elapsed = Duration::ZERO;
                    }
                }
            }
        } else {
            self.elapsed += elapsed;
            if self.elapsed >= duration {
                if self.auto_reverse {
                    self.reversing = true;
                    self.elapsed = duration;
                } else if self.looping {
                    self.elapsed = Duration::ZERO;
                } else {
                    self.elapsed = duration;
                }
            }
        }
    }
}

impl<T: 'static, V: Lerp + Clone + 'static> Animator<T, V> {
    /// Binds an animator to a property interpolated with [`Lerp`].
    pub fn new(
        target: &Rc<RefCell<T>>,
        get_value: impl Fn(&T) -> V + 'static,
        set_value: impl Fn(&mut T, V) + 'static,
    ) -> Self {
        Self::with_lerp(target, get_value, set_value, V::lerp)
    }
}

impl<T: 'static, V: Clone + 'static> Animate for Animator<T, V> {
    fn is_valid(&self) -> bool {
        self.target.strong_count() > 0
    }

    fn tick(&mut self, elapsed: Duration) {
        if self.paused {
            return;
        }
        let Some(target) = self.target.upgrade() else {
            return;
        };
        let Some(duration) = self.current.as_ref().map(|animation| animation.duration) else {
            return;
        };
        if !self.looping {
            let at_start = self.reversing && !self.auto_reverse && self.elapsed.is_zero();
            let at_end = !self.reversing && !self.auto_reverse && self.elapsed >= duration;
            if at_start || at_end {
                return;
            }
        }

        self.advance(elapsed, duration);

        let Some(animation) = &self.current else {
            return;
        };
        let progress = if duration.is_zero() {
            0.0
        } else {
            (self.elapsed.as_secs_f64() / duration.as_secs_f64()) as f32
        };
        let value = (self.lerp)(
            &animation.start_value,
            &animation.end_value,
            animation.easing.apply(progress),
        );
        (self.set_value)(&mut target.borrow_mut(), value);
    }
}

/// Registry of active animators, ticked once per frame.
///
/// Shared behind an `Rc` so widgets can register animators from event handlers.
#[derive(Default)]
pub struct AnimationRunner {
    animators: RefCell<Vec<Rc<RefCell<dyn Animate>>>>,
}

impl AnimationRunner {
    /// Creates an empty runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of an animator and returns a handle for controlling it.
    pub fn register<A: Animate + 'static>(&self, animator: A) -> Rc<RefCell<A>> {
        let handle = Rc::new(RefCell::new(animator));
        let erased: Rc<RefCell<dyn Animate>> = handle.clone();
        self.animators.borrow_mut().push(erased);
        handle
    }

    /// Number of registered animators, including ones not yet found invalid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.animators.borrow().len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.animators.borrow().is_empty()
    }

    /// Ticks every valid animator and drops the invalid ones.
    ///
    /// Iterates over a snapshot, so animators may be registered or invalidated
    /// while the pass runs.
    pub fn tick(&self, elapsed: Duration) {
        let snapshot = self.animators.borrow().clone();
        for animator in &snapshot {
            let valid = animator.borrow().is_valid();
            if valid {
                animator.borrow_mut().tick(elapsed);
            }
        }

        let mut animators = self.animators.borrow_mut();
        let before = animators.len();
        animators.retain(|animator| animator.borrow().is_valid());
        let expired = before - animators.len();
        if expired > 0 {
            tracing::trace!("Dropped {} expired animators", expired);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Target {
        value: f32,
    }

    const D: Duration = Duration::from_millis(100);

    fn animator(target: &Rc<RefCell<Target>>) -> Animator<Target, f32> {
        Animator::new(target, |t| t.value, |t, v| t.value = v)
    }

    fn value(target: &Rc<RefCell<Target>>) -> f32 {
        target.borrow().value
    }

    #[test]
    fn test_start_jumps_to_start_value() {
        let target = Rc::new(RefCell::new(Target { value: 42.0 }));
        let mut animator = animator(&target);
        animator.start_between(0.0, 100.0, D);
        assert_eq!(value(&target), 0.0);

        animator.tick(Duration::ZERO);
        assert_eq!(value(&target), 0.0);
    }

    #[test]
    fn test_full_duration_reaches_end_value() {
        let target = Rc::new(RefCell::new(Target::default()));
        let mut animator = animator(&target);
        animator.start_between(0.0, 100.0, D);

        for _ in 0..4 {
            animator.tick(Duration::from_millis(25));
        }
        assert!((value(&target) - 100.0).abs() < 1e-3);

        // Clamped: further ticks change nothing.
        target.borrow_mut().value = -1.0;
        animator.tick(Duration::from_millis(25));
        assert_eq!(value(&target), -1.0);
    }

    #[test]
    fn test_midpoint_is_linear() {
        let target = Rc::new(RefCell::new(Target::default()));
        let mut animator = animator(&target);
        animator.start_between(10.0, 20.0, D);
        animator.tick(Duration::from_millis(50));
        assert!((value(&target) - 15.0).abs() < 1e-3);
    }

    #[test]
    fn test_auto_reverse_returns_to_start() {
        let target = Rc::new(RefCell::new(Target::default()));
        let mut animator = animator(&target).with_auto_reverse(true);
        animator.start_between(0.0, 100.0, D);

        animator.tick(D);
        assert!((value(&target) - 100.0).abs() < 1e-3);
        assert!(animator.is_reversing());

        animator.tick(D);
        assert!(value(&target).abs() < 1e-3);
        assert!(!animator.is_reversing());
    }

    #[test]
    fn test_auto_reverse_keeps_bouncing_without_loop() {
        let target = Rc::new(RefCell::new(Target::default()));
        let mut animator = animator(&target).with_auto_reverse(true);
        animator.start_between(0.0, 100.0, D);

        animator.tick(D);
        animator.tick(D);
        animator.tick(Duration::from_millis(50));
        assert!((value(&target) - 50.0).abs() < 1e-3);
        assert!(!animator.is_reversing());

        animator.tick(Duration::from_millis(50));
        assert!(animator.is_reversing());
        animator.tick(Duration::from_millis(25));
        assert!((value(&target) - 75.0).abs() < 1e-3);
    }

    #[test]
    fn test_auto_reverse_loop_keeps_bouncing() {
        let target = Rc::new(RefCell::new(Target::default()));
        let mut animator = animator(&target).with_auto_reverse(true).with_loop(true);
        animator.start_between(0.0, 100.0, D);

        animator.tick(D);
        animator.tick(D);
        assert!(!animator.is_reversing());
        animator.tick(Duration::from_millis(50));
        assert!((value(&target) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_loop_wraps_to_start() {
        let target = Rc::new(RefCell::new(Target::default()));
        let mut animator = animator(&target).with_loop(true);
        animator.start_between(0.0, 100.0, D);

        animator.tick(Duration::from_millis(60));
        animator.tick(Duration::from_millis(60));
        assert_eq!(animator.elapsed(), Duration::ZERO);
        animator.tick(Duration::from_millis(30));
        assert!((value(&target) - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_reverse_plays_back() {
        let target = Rc::new(RefCell::new(Target::default()));
        let mut animator = animator(&target);
        animator.start_between(0.0, 100.0, D);
        animator.tick(Duration::from_millis(80));

        animator.reverse();
        animator.tick(Duration::from_millis(30));
        assert!((value(&target) - 50.0).abs() < 1e-3);

        animator.tick(Duration::from_millis(200));
        assert!(value(&target).abs() < 1e-3);
    }

    #[test]
    fn test_zero_duration_does_not_divide_by_zero() {
        let target = Rc::new(RefCell::new(Target::default()));
        let mut animator = animator(&target);
        animator.start_between(5.0, 10.0, Duration::ZERO);
        animator.tick(Duration::from_millis(16));
        assert!(value(&target).is_finite());
    }

    #[test]
    fn test_pause_and_stop() {
        let target = Rc::new(RefCell::new(Target::default()));
        let mut animator = animator(&target);
        animator.start_between(0.0, 100.0, D);
        animator.pause();
        animator.tick(Duration::from_millis(50));
        assert_eq!(value(&target), 0.0);

        animator.resume();
        animator.stop();
        animator.stop();
        assert!(animator.current_animation().is_none());
        animator.tick(Duration::from_millis(50));
        assert_eq!(value(&target), 0.0);
    }

    #[test]
    fn test_start_to_uses_current_value() {
        let target = Rc::new(RefCell::new(Target { value: 4.0 }));
        let mut animator = animator(&target);
        animator.start_to(8.0, D);
        assert_eq!(animator.current_animation().map(|a| a.start_value), Some(4.0));
    }

    #[test]
    fn test_runner_drops_expired_targets() {
        let runner = AnimationRunner::new();
        let kept = Rc::new(RefCell::new(Target::default()));
        let dropped = Rc::new(RefCell::new(Target::default()));

        let handle = runner.register(animator(&kept));
        handle.borrow_mut().start_between(0.0, 10.0, D);
        runner.register(animator(&dropped));
        assert_eq!(runner.len(), 2);

        drop(dropped);
        runner.tick(D);
        assert_eq!(runner.len(), 1);
        assert!((value(&kept) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_lerp_impls() {
        assert_eq!(Vec2::ZERO.lerp(&Vec2::new(10.0, 20.0), 0.5), Vec2::new(5.0, 10.0));
        assert_eq!(Edges::NONE.lerp(&Edges::all(10), 0.25), Edges::all(3));
        assert_eq!(Lerp::lerp(&Color::BLACK, &Color::WHITE, 1.0), Color::WHITE);
    }

    #[test]
    fn test_easing_curves_keep_their_endpoints() {
        for easing in [Easing::Linear, Easing::QuadIn, Easing::QuadOut, Easing::QuadInOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
        assert!((Easing::QuadIn.apply(0.5) - 0.25).abs() < 1e-6);
        assert!((Easing::QuadOut.apply(0.5) - 0.75).abs() < 1e-6);
        assert!((Easing::QuadInOut.apply(0.25) - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_animator_applies_easing() {
        let target = Rc::new(RefCell::new(Target::default()));
        let mut animator = animator(&target);
        animator.start(Animation::new(0.0, 100.0, D).with_easing(Easing::QuadIn));
        animator.tick(Duration::from_millis(50));
        assert!((value(&target) - 25.0).abs() < 1e-3);
    }
}
