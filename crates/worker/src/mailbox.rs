use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

/// Mailbox send error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxSendError {
	/// Mailbox is closed.
	Closed,
	/// Queue is full and non-blocking send was used.
	Full,
}

impl std::fmt::Display for MailboxSendError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Closed => write!(f, "mailbox closed"),
			Self::Full => write!(f, "mailbox full"),
		}
	}
}

impl std::error::Error for MailboxSendError {}

struct MailboxState<T> {
	queue: VecDeque<T>,
	closed: bool,
}

struct MailboxInner<T> {
	capacity: usize,
	state: Mutex<MailboxState<T>>,
	notify_recv: Notify,
	notify_send: Notify,
}

/// Bounded FIFO mailbox. Senders wait for capacity; nothing is dropped or reordered.
pub struct Mailbox<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Multi-producer mailbox sender.
pub struct MailboxSender<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Mailbox receiver. Clones share one queue, so each message is received once.
pub struct MailboxReceiver<T> {
	inner: Arc<MailboxInner<T>>,
}

impl<T> Clone for MailboxSender<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> Clone for MailboxReceiver<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> Mailbox<T> {
	/// Creates a mailbox holding at most `capacity` queued messages.
	///
	/// # Panics
	///
	/// Panics if `capacity` is zero.
	pub fn new(capacity: usize) -> Self {
		assert!(capacity > 0, "mailbox capacity must be > 0");
		Self {
			inner: Arc::new(MailboxInner {
				capacity,
				state: Mutex::new(MailboxState {
					queue: VecDeque::with_capacity(capacity),
					closed: false,
				}),
				notify_recv: Notify::new(),
				notify_send: Notify::new(),
			}),
		}
	}

	pub fn sender(&self) -> MailboxSender<T> {
		MailboxSender {
			inner: Arc::clone(&self.inner),
		}
	}

	pub fn receiver(&self) -> MailboxReceiver<T> {
		MailboxReceiver {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> MailboxSender<T> {
	/// Closes the mailbox. Receivers drain queued messages then return `None`.
	pub async fn close(&self) {
		let mut state = self.inner.state.lock().await;
		state.closed = true;
		drop(state);
		self.wake_all();
	}

	/// Closes the mailbox without waiting, when the lock is free.
	pub fn close_now(&self) {
		if let Ok(mut state) = self.inner.state.try_lock() {
			state.closed = true;
			drop(state);
			self.wake_all();
		}
	}

	fn wake_all(&self) {
		self.inner.notify_recv.notify_waiters();
		self.inner.notify_send.notify_waiters();
	}

	/// Enqueues without waiting.
	pub async fn try_send(&self, msg: T) -> Result<(), MailboxSendError> {
		let mut state = self.inner.state.lock().await;
		if state.closed {
			return Err(MailboxSendError::Closed);
		}
		if state.queue.len() >= self.inner.capacity {
			return Err(MailboxSendError::Full);
		}
		state.queue.push_back(msg);
		self.inner.notify_recv.notify_one();
		Ok(())
	}

	/// Enqueues, waiting for capacity when the queue is full.
	pub async fn send(&self, msg: T) -> Result<(), MailboxSendError> {
		loop {
			// Register before checking capacity so a pop between unlock and await still wakes us.
			let notified = self.inner.notify_send.notified();

			let mut state = self.inner.state.lock().await;
			if state.closed {
				return Err(MailboxSendError::Closed);
			}
			if state.queue.len() < self.inner.capacity {
				state.queue.push_back(msg);
				self.inner.notify_recv.notify_one();
				return Ok(());
			}
			drop(state);
			notified.await;
		}
	}
}

impl<T> MailboxReceiver<T> {
	/// Receives one message. Returns `None` once the mailbox is closed and drained.
	pub async fn recv(&self) -> Option<T> {
		loop {
			let notified = self.inner.notify_recv.notified();

			let mut state = self.inner.state.lock().await;
			if let Some(msg) = state.queue.pop_front() {
				drop(state);
				self.inner.notify_send.notify_one();
				return Some(msg);
			}
			if state.closed {
				return None;
			}
			drop(state);
			notified.await;
		}
	}
}
