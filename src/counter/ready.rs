use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{Context, Poll};

use embassy_sync::waitqueue::AtomicWaker;

/// The one handshake between interrupt and foreground context: raised when a
/// fresh reading lands, lowered when the consumer takes it.
pub struct ReadyFlag {
    key: AtomicBool,
    waker: AtomicWaker,
}

impl ReadyFlag {
    pub const fn new() -> Self {
        ReadyFlag {
            key: AtomicBool::new(false),
            waker: AtomicWaker::new(),
        }
    }

    pub fn raise(&self) {
        self.key.store(true, Ordering::Release);
        self.waker.wake();
    }

    pub fn lower(&self) {
        self.key.store(false, Ordering::Release);
    }

    /// Lowers the flag, returning whether it was raised.
    pub fn take(&self) -> bool {
        self.key.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.key.load(Ordering::Acquire)
    }

    /// Wakes the waiter without touching the flag, so it re-checks its exit condition.
    pub fn notify(&self) {
        self.waker.wake();
    }

    /// Resolves once the flag is raised or `give_up` returns true.
    pub fn raised<F: Fn() -> bool>(&self, give_up: F) -> Raised<'_, F> {
        Raised {
            flag: self,
            give_up,
        }
    }
}

impl Default for ReadyFlag {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Raised<'a, F> {
    flag: &'a ReadyFlag,
    give_up: F,
}

impl<'a, F: Fn() -> bool> Future for Raised<'a, F> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.flag.waker.register(cx.waker());

        if self.flag.is_raised() || (self.give_up)() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}
