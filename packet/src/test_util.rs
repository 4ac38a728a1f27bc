use core::{
    future::Future,
    pin::Pin,
    task::{Context, Poll, Waker},
};

/// Drives a future that never actually waits (every byte is already in memory).
#[inline]
pub(crate) fn trivial_future<F: Future>(future: Pin<&mut F>) -> F::Output {
    match future.poll(&mut Context::from_waker(Waker::noop())) {
        Poll::Ready(ready) => ready,
        Poll::Pending => panic!("Future pending"),
    }
}
