//! High-water-mark queues
//!
//! `tokio::sync::mpsc` channels sized by a high-water mark, where a mark of
//! zero selects the unbounded channel.

use tokio::sync::mpsc::{self, error::TrySendError};

pub(crate) enum QueueSender<T> {
    Bounded(mpsc::Sender<T>),
    Unbounded(mpsc::UnboundedSender<T>),
}

pub(crate) enum QueueReceiver<T> {
    Bounded(mpsc::Receiver<T>),
    Unbounded(mpsc::UnboundedReceiver<T>),
}

/// Outcome of a non-blocking enqueue
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Offer {
    Queued,
    Full,
    Closed,
}

pub(crate) fn queue<T>(high_water_mark: u32) -> (QueueSender<T>, QueueReceiver<T>) {
    if high_water_mark == 0 {
        let (tx, rx) = mpsc::unbounded_channel();
        (QueueSender::Unbounded(tx), QueueReceiver::Unbounded(rx))
    } else {
        let (tx, rx) = mpsc::channel(high_water_mark as usize);
        (QueueSender::Bounded(tx), QueueReceiver::Bounded(rx))
    }
}

impl<T> QueueSender<T> {
    /// Wait for room, then enqueue; `false` once the receiver is gone
    pub(crate) async fn send(&self, item: T) -> bool {
        match self {
            QueueSender::Bounded(tx) => tx.send(item).await.is_ok(),
            QueueSender::Unbounded(tx) => tx.send(item).is_ok(),
        }
    }

    /// Enqueue without waiting
    pub(crate) fn offer(&self, item: T) -> Offer {
        match self {
            QueueSender::Bounded(tx) => match tx.try_send(item) {
                Ok(()) => Offer::Queued,
                Err(TrySendError::Full(_)) => Offer::Full,
                Err(TrySendError::Closed(_)) => Offer::Closed,
            },
            QueueSender::Unbounded(tx) => match tx.send(item) {
                Ok(()) => Offer::Queued,
                Err(_) => Offer::Closed,
            },
        }
    }
}

impl<T> QueueReceiver<T> {
    pub(crate) async fn recv(&mut self) -> Option<T> {
        match self {
            QueueReceiver::Bounded(rx) => rx.recv().await,
            QueueReceiver::Unbounded(rx) => rx.recv().await,
        }
    }

    /// Block the calling thread; must not be called from async context
    pub(crate) fn blocking_recv(&mut self) -> Option<T> {
        match self {
            QueueReceiver::Bounded(rx) => rx.blocking_recv(),
            QueueReceiver::Unbounded(rx) => rx.blocking_recv(),
        }
    }
}
