use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::{Animation, AnimationRunner, Animator, Easing};
use crate::view::{HandlerId, View};
use crate::widget::Image;

/// Default time to reach the full hover scale.
pub const DEFAULT_HOVER_DURATION: Duration = Duration::from_millis(80);

type ScaleAnimator = Animator<Image, f32>;

/// Grows an [`Image`] while the pointer is over it.
///
/// Entering starts (or resumes) a tween from 1 to the maximum scale; leaving plays
/// the same tween backwards from wherever it got to.
pub struct HoverScale {
    image: Weak<RefCell<Image>>,
    animator: Rc<RefCell<ScaleAnimator>>,
    enter: HandlerId,
    leave: HandlerId,
}

impl HoverScale {
    /// Subscribes hover scaling to `image`'s pointer events.
    pub fn attach(
        runner: &AnimationRunner,
        image: &Rc<RefCell<Image>>,
        max_scale: f32,
        duration: Duration,
        easing: Easing,
    ) -> Self {
        let animator = runner.register(Animator::new(image, Image::scale, Image::set_scale));

        let on_enter = Rc::clone(&animator);
        let on_leave = Rc::clone(&animator);
        let mut node = image.borrow_mut();
        let handlers = node.state_mut().handlers_mut();
        let enter = handlers.pointer_enter.add(move |_| {
            let mut animator = on_enter.borrow_mut();
            if animator.current_animation().is_none() {
                animator.start(Animation::new(1.0, max_scale, duration).with_easing(easing));
            } else {
                animator.forward();
            }
        });
        let leave = handlers.pointer_leave.add(move |_| on_leave.borrow_mut().reverse());
        drop(node);

        Self {
            image: Rc::downgrade(image),
            animator,
            enter,
            leave,
        }
    }

    /// The underlying scale animator.
    #[must_use]
    pub fn animator(&self) -> &Rc<RefCell<ScaleAnimator>> {
        &self.animator
    }

    /// Unsubscribes from the image and stops any running tween.
    pub fn detach(self) {
        self.animator.borrow_mut().stop();
        let Some(image) = self.image.upgrade() else {
            return;
        };
        let mut image = image.borrow_mut();
        let handlers = image.state_mut().handlers_mut();
        handlers.pointer_enter.remove(self.enter);
        handlers.pointer_leave.remove(self.leave);
    }
}
