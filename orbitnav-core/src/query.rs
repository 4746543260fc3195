//! In-flight scene queries, polled cooperatively from the input thread.

use std::task::{Context, Poll};

use futures::FutureExt;

use crate::capability::{RayFuture, RayResult};

struct InFlight<T> {
    ticket: T,
    future: RayFuture,
}

/// Set of outstanding queries tagged with the ticket captured when they were
/// issued. Nothing here blocks: [`QuerySet::poll_ready`] polls each future
/// once with a no-op waker and hands back whatever has resolved.
pub struct QuerySet<T> {
    in_flight: Vec<InFlight<T>>,
}

impl<T> QuerySet<T> {
    pub fn new() -> Self {
        Self {
            in_flight: Vec::new(),
        }
    }

    pub fn issue(&mut self, ticket: T, future: RayFuture) {
        self.in_flight.push(InFlight { ticket, future });
    }

    /// Resolved queries in issue order.
    pub fn poll_ready(&mut self) -> Vec<(T, RayResult)> {
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        let mut ready = Vec::new();
        let mut index = 0;
        while index < self.in_flight.len() {
            match self.in_flight[index].future.poll_unpin(&mut cx) {
                Poll::Ready(result) => {
                    let done = self.in_flight.remove(index);
                    ready.push((done.ticket, result));
                }
                Poll::Pending => index += 1,
            }
        }
        ready
    }

    /// Drop every outstanding query; their results are never observed.
    pub fn clear(&mut self) {
        self.in_flight.clear();
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

impl<T> Default for QuerySet<T> {
    fn default() -> Self {
        Self::new()
    }
}
