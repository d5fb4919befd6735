use crate::host::{Scheduler, TimerHandle};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

/// Delivers the last argument once `wait_ms` have passed without another call.
pub struct Debounce<A> {
    inner: Rc<DebounceInner<A>>,
}

struct DebounceInner<A> {
    scheduler: Rc<dyn Scheduler>,
    wait_ms: u32,
    pending: Cell<Option<TimerHandle>>,
    callback: Box<dyn Fn(A)>,
}

impl<A: 'static> Debounce<A> {
    pub fn new(scheduler: Rc<dyn Scheduler>, wait_ms: u32, callback: impl Fn(A) + 'static) -> Self {
        Self {
            inner: Rc::new(DebounceInner {
                scheduler,
                wait_ms,
                pending: Cell::new(None),
                callback: Box::new(callback),
            }),
        }
    }

    pub fn call(&self, arg: A) {
        if let Some(handle) = self.inner.pending.take() {
            self.inner.scheduler.cancel(handle);
        }

        let inner = Rc::clone(&self.inner);
        let handle = self.inner.scheduler.set_timeout(
            self.inner.wait_ms,
            Box::new(move || {
                inner.pending.set(None);
                (inner.callback)(arg);
            }),
        );
        self.inner.pending.set(Some(handle));
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }
}

impl<A> Clone for Debounce<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Runs the first call immediately and drops every call inside the following
/// `limit_ms` window. Trailing calls are not replayed.
pub struct Throttle<A> {
    inner: Rc<ThrottleInner<A>>,
}

struct ThrottleInner<A> {
    scheduler: Rc<dyn Scheduler>,
    limit_ms: u32,
    blocked: Cell<bool>,
    callback: Box<dyn Fn(A)>,
}

impl<A: 'static> Throttle<A> {
    pub fn new(scheduler: Rc<dyn Scheduler>, limit_ms: u32, callback: impl Fn(A) + 'static) -> Self {
        Self {
            inner: Rc::new(ThrottleInner {
                scheduler,
                limit_ms,
                blocked: Cell::new(false),
                callback: Box::new(callback),
            }),
        }
    }

    pub fn call(&self, arg: A) {
        if self.inner.blocked.replace(true) {
            return;
        }

        (self.inner.callback)(arg);

        let inner = Rc::clone(&self.inner);
        self.inner.scheduler.set_timeout(
            self.inner.limit_ms,
            Box::new(move || inner.blocked.set(false)),
        );
    }

    pub fn is_blocked(&self) -> bool {
        self.inner.blocked.get()
    }
}

impl<A> Clone for Throttle<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Collapses any number of requests into one unit of work per rendered frame.
///
/// The work always sees the most recent argument. The pending flag is cleared
/// only after the work returns, so requests made from inside the work are
/// dropped along with their argument.
pub struct FrameCoalescer<A> {
    inner: Rc<FrameInner<A>>,
}

struct FrameInner<A> {
    scheduler: Rc<dyn Scheduler>,
    pending: Cell<bool>,
    latest: RefCell<Option<A>>,
    work: Box<dyn Fn(A)>,
}

impl<A: 'static> FrameCoalescer<A> {
    pub fn new(scheduler: Rc<dyn Scheduler>, work: impl Fn(A) + 'static) -> Self {
        Self {
            inner: Rc::new(FrameInner {
                scheduler,
                pending: Cell::new(false),
                latest: RefCell::new(None),
                work: Box::new(work),
            }),
        }
    }

    pub fn schedule(&self, arg: A) {
        *self.inner.latest.borrow_mut() = Some(arg);
        if self.inner.pending.get() {
            return;
        }
        self.inner.pending.set(true);

        let inner = Rc::clone(&self.inner);
        self.inner.scheduler.request_frame(Box::new(move || {
            let latest = inner.latest.borrow_mut().take();
            if let Some(arg) = latest {
                (inner.work)(arg);
            }
            *inner.latest.borrow_mut() = None;
            inner.pending.set(false);
        }));
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.get()
    }
}

impl<A> Clone for FrameCoalescer<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}
