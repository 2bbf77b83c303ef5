/// Holds the one pending timer handle of a surface.
///
/// Handles cancel themselves on drop (as `gloo_timers::callback::Timeout`
/// does), so arming a new handle or clearing the slot cancels the previous
/// one. A handle whose callback is running must not be dropped from inside
/// that callback; [`TimerSlot::take_fired`] hands it back to the caller
/// instead.
#[derive(Debug)]
pub struct TimerSlot<H> {
    pending: Option<H>,
}

impl<H> Default for TimerSlot<H> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<H> TimerSlot<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels any pending handle and installs `handle` in its place.
    pub fn arm(&mut self, handle: H) {
        self.clear();
        self.pending = Some(handle);
    }

    /// Cancels the pending handle, if any.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Removes the handle that is currently firing without cancelling it.
    pub fn take_fired(&mut self) -> Option<H> {
        self.pending.take()
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Records its id when dropped, standing in for `clearTimeout`.
    struct Handle {
        id: u32,
        cancelled: Rc<RefCell<Vec<u32>>>,
    }

    impl Drop for Handle {
        fn drop(&mut self) {
            self.cancelled.borrow_mut().push(self.id);
        }
    }

    fn handle(id: u32, cancelled: &Rc<RefCell<Vec<u32>>>) -> Handle {
        Handle {
            id,
            cancelled: Rc::clone(cancelled),
        }
    }

    #[test]
    fn rearming_cancels_the_previous_timer() {
        let cancelled = Rc::new(RefCell::new(Vec::new()));
        let mut slot = TimerSlot::new();
        for id in 0..4 {
            slot.arm(handle(id, &cancelled));
        }
        assert_eq!(*cancelled.borrow(), vec![0, 1, 2]);
        assert!(slot.is_armed());
    }

    #[test]
    fn teardown_cancels_a_timer_replaced_earlier() {
        let cancelled = Rc::new(RefCell::new(Vec::new()));
        let mut slot = TimerSlot::new();
        // Loading deadline armed at mount, then loading finishes and nothing is pending.
        slot.arm(handle(1, &cancelled));
        slot.clear();
        assert_eq!(*cancelled.borrow(), vec![1]);
        assert!(!slot.is_armed());

        slot.arm(handle(2, &cancelled));
        slot.clear();
        assert_eq!(*cancelled.borrow(), vec![1, 2]);
    }

    #[test]
    fn fired_timer_is_handed_back_uncancelled() {
        let cancelled = Rc::new(RefCell::new(Vec::new()));
        let mut slot = TimerSlot::new();
        slot.arm(handle(7, &cancelled));

        let fired = slot.take_fired();
        assert!(cancelled.borrow().is_empty());
        assert!(!slot.is_armed());

        slot.arm(handle(8, &cancelled));
        assert!(cancelled.borrow().is_empty());
        std::mem::forget(fired);
    }
}
