use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;

enum JoinState {
	/// Supervisor task not yet awaited.
	Pending(JoinHandle<()>),
	/// One caller is awaiting the handle; others park on `done`.
	Joining,
	Done,
}

/// Lets any number of shutdown callers await the single supervisor task.
pub(super) struct JoinCtrl {
	state: Mutex<JoinState>,
	done: Notify,
}

impl JoinCtrl {
	pub(super) fn new(handle: JoinHandle<()>) -> Self {
		Self {
			state: Mutex::new(JoinState::Pending(handle)),
			done: Notify::new(),
		}
	}

	/// Waits for the supervisor task. Returns `false` if `timeout` elapsed first.
	pub(super) async fn join(&self, timeout: Option<Duration>) -> bool {
		let deadline = timeout.map(|timeout| tokio::time::Instant::now() + timeout);
		let expired = async move {
			match deadline {
				Some(deadline) => tokio::time::sleep_until(deadline).await,
				None => std::future::pending::<()>().await,
			}
		};
		tokio::pin!(expired);

		loop {
			let mut state = self.state.lock().await;
			match std::mem::replace(&mut *state, JoinState::Joining) {
				JoinState::Done => {
					*state = JoinState::Done;
					return true;
				}
				JoinState::Joining => {
					// Register while still holding the lock so the leader's notify cannot be missed.
					let notified = self.done.notified();
					drop(state);
					tokio::select! {
						_ = notified => continue,
						_ = &mut expired => return false,
					}
				}
				JoinState::Pending(mut handle) => {
					drop(state);
					tokio::select! {
						_ = &mut handle => {
							*self.state.lock().await = JoinState::Done;
							self.done.notify_waiters();
							return true;
						}
						_ = &mut expired => {
							*self.state.lock().await = JoinState::Pending(handle);
							self.done.notify_waiters();
							return false;
						}
					}
				}
			}
		}
	}
}
