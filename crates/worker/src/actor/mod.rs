//! Supervised single-threaded actors.
//!
//! An actor owns its state and handles one command at a time in mailbox
//! order. The supervisor restarts it from its factory after failures,
//! according to [`RestartPolicy`], and every instance gets a fresh
//! [`GenerationToken`] cancelled when the instance is replaced or the handle
//! is cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::CancellationToken;

use crate::TaskClass;
use crate::mailbox::{Mailbox, MailboxReceiver, MailboxSendError, MailboxSender};
use crate::token::{GenerationClock, GenerationToken};

mod join;

use join::JoinCtrl;

/// Continuation directive returned by [`Actor::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorFlow {
	Continue,
	Stop,
}

/// Why an actor instance exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorExit {
	Stopped,
	MailboxClosed,
	Cancelled,
	StartupFailed(String),
	HandlerFailed(String),
	Panicked,
	JoinFailed(String),
}

impl ActorExit {
	pub fn is_failure(&self) -> bool {
		matches!(self, Self::StartupFailed(_) | Self::HandlerFailed(_) | Self::Panicked | Self::JoinFailed(_))
	}
}

#[derive(Debug, Clone)]
pub enum RestartPolicy {
	Never,
	OnFailure { max_restarts: usize, backoff: Duration },
}

impl RestartPolicy {
	fn restart_delay(&self, exit: &ActorExit, restart_count: usize) -> Option<Duration> {
		match self {
			Self::Never => None,
			Self::OnFailure { max_restarts, backoff } => (exit.is_failure() && restart_count < *max_restarts).then_some(*backoff),
		}
	}
}

impl Default for RestartPolicy {
	fn default() -> Self {
		Self::OnFailure {
			max_restarts: 3,
			backoff: Duration::from_millis(50),
		}
	}
}

#[derive(Debug, Clone, Copy)]
pub enum ShutdownMode {
	/// Cancel the running instance and wait for it.
	Immediate,
	/// Close the mailbox, let queued commands drain, cancel after `timeout`.
	Graceful { timeout: Duration },
}

#[derive(Debug, Clone)]
pub struct ShutdownReport {
	pub completed: bool,
	pub timed_out: bool,
	pub last_exit: Option<ActorExit>,
}

/// Actor executed by the supervisor.
#[async_trait]
pub trait Actor: Send + 'static {
	type Cmd: Send + 'static;
	type Evt: Clone + Send + 'static;

	async fn on_start(&mut self, _ctx: &mut ActorContext<Self::Evt>) -> Result<(), String> {
		Ok(())
	}

	async fn on_stop(&mut self, _ctx: &mut ActorContext<Self::Evt>) {}

	async fn handle(&mut self, cmd: Self::Cmd, ctx: &mut ActorContext<Self::Evt>) -> Result<ActorFlow, String>;
}

/// Per-instance context: generation token and event emitter.
pub struct ActorContext<Evt> {
	events: broadcast::Sender<Evt>,
	token: GenerationToken,
}

impl<Evt> ActorContext<Evt>
where
	Evt: Clone + Send + 'static,
{
	/// Broadcasts one event to subscribers. Dropped when nobody listens.
	pub fn emit(&self, evt: Evt) {
		let _ = self.events.send(evt);
	}

	pub fn generation(&self) -> u64 {
		self.token.generation()
	}

	/// Token cancelled when this instance is shut down or replaced.
	pub fn token(&self) -> &GenerationToken {
		&self.token
	}
}

/// Builder for one supervised actor.
pub struct ActorSpec<A: Actor> {
	name: String,
	class: TaskClass,
	mailbox_capacity: usize,
	event_buffer: usize,
	restart: RestartPolicy,
	factory: Arc<dyn Fn() -> A + Send + Sync>,
}

impl<A: Actor> ActorSpec<A> {
	pub fn new(name: impl Into<String>, class: TaskClass, factory: impl Fn() -> A + Send + Sync + 'static) -> Self {
		Self {
			name: name.into(),
			class,
			mailbox_capacity: 128,
			event_buffer: 64,
			restart: RestartPolicy::default(),
			factory: Arc::new(factory),
		}
	}

	/// # Panics
	///
	/// Panics if `capacity` is zero.
	#[must_use]
	pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
		assert!(capacity > 0, "mailbox capacity must be > 0");
		self.mailbox_capacity = capacity;
		self
	}

	#[must_use]
	pub fn restart(mut self, restart: RestartPolicy) -> Self {
		self.restart = restart;
		self
	}
}

struct ActorState {
	generation: AtomicU64,
	restarts: AtomicUsize,
	last_exit: Mutex<Option<ActorExit>>,
}

/// Error returned when sending to a stopped actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorSendError;

impl From<MailboxSendError> for ActorSendError {
	fn from(_: MailboxSendError) -> Self {
		Self
	}
}

impl std::fmt::Display for ActorSendError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "actor mailbox closed")
	}
}

impl std::error::Error for ActorSendError {}

/// Handle to a supervised actor. Dropping it cancels the actor.
pub struct ActorHandle<Cmd, Evt>
where
	Cmd: Send + 'static,
	Evt: Clone + Send + 'static,
{
	name: String,
	tx: MailboxSender<Cmd>,
	events: broadcast::Sender<Evt>,
	cancel: CancellationToken,
	state: Arc<ActorState>,
	join: Arc<JoinCtrl>,
}

impl<Cmd, Evt> Drop for ActorHandle<Cmd, Evt>
where
	Cmd: Send + 'static,
	Evt: Clone + Send + 'static,
{
	fn drop(&mut self) {
		self.cancel.cancel();
		self.tx.close_now();
	}
}

impl<Cmd, Evt> ActorHandle<Cmd, Evt>
where
	Cmd: Send + 'static,
	Evt: Clone + Send + 'static,
{
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn generation(&self) -> u64 {
		self.state.generation.load(Ordering::Acquire)
	}

	pub fn restart_count(&self) -> usize {
		self.state.restarts.load(Ordering::Acquire)
	}

	pub fn subscribe(&self) -> broadcast::Receiver<Evt> {
		self.events.subscribe()
	}

	/// Enqueues one command, waiting for mailbox capacity.
	pub async fn send(&self, cmd: Cmd) -> Result<(), ActorSendError> {
		self.tx.send(cmd).await?;
		Ok(())
	}

	pub async fn last_exit(&self) -> Option<ActorExit> {
		self.state.last_exit.lock().await.clone()
	}

	pub async fn shutdown(&self, mode: ShutdownMode) -> ShutdownReport {
		match mode {
			ShutdownMode::Immediate => {
				self.cancel.cancel();
				self.tx.close().await;
				self.join.join(None).await;
				ShutdownReport {
					completed: true,
					timed_out: false,
					last_exit: self.last_exit().await,
				}
			}
			ShutdownMode::Graceful { timeout } => {
				self.tx.close().await;
				let completed = self.join.join(Some(timeout)).await;
				if !completed {
					tracing::warn!(actor = %self.name, "worker.actor.shutdown_timeout");
					self.cancel.cancel();
				}
				ShutdownReport {
					completed,
					timed_out: !completed,
					last_exit: self.last_exit().await,
				}
			}
		}
	}
}

/// Spawns a supervised actor and returns its handle.
pub fn spawn_actor<A: Actor>(spec: ActorSpec<A>) -> ActorHandle<A::Cmd, A::Evt> {
	let mailbox = Mailbox::new(spec.mailbox_capacity);
	let tx = mailbox.sender();
	let rx = mailbox.receiver();

	let (events, _) = broadcast::channel(spec.event_buffer);
	let cancel = CancellationToken::new();
	let state = Arc::new(ActorState {
		generation: AtomicU64::new(0),
		restarts: AtomicUsize::new(0),
		last_exit: Mutex::new(None),
	});

	let task_state = Arc::clone(&state);
	let task_cancel = cancel.clone();
	let task_events = events.clone();
	let task_name = spec.name.clone();
	let class = spec.class;
	let factory = Arc::clone(&spec.factory);
	let restart = spec.restart;
	let clock = GenerationClock::new();

	let supervisor = crate::spawn(class, async move {
		let mut restart_count = 0usize;
		loop {
			if task_cancel.is_cancelled() {
				*task_state.last_exit.lock().await = Some(ActorExit::Cancelled);
				break;
			}

			let generation = clock.next();
			task_state.generation.store(generation, Ordering::Release);
			let token = GenerationToken::new(generation, task_cancel.child_token());
			let instance = crate::spawn(class, run_instance((factory)(), rx.clone(), task_events.clone(), token.clone()));

			let exit = match instance.await {
				Ok(exit) => exit,
				Err(err) if err.is_panic() => ActorExit::Panicked,
				Err(err) if err.is_cancelled() => ActorExit::Cancelled,
				Err(err) => ActorExit::JoinFailed(err.to_string()),
			};
			// Child tasks of this instance must not outlive it.
			token.cancel();
			*task_state.last_exit.lock().await = Some(exit.clone());

			tracing::debug!(actor = %task_name, generation, restarts = restart_count, exit = ?exit, "worker.actor.exit");

			if task_cancel.is_cancelled() {
				break;
			}
			let Some(backoff) = restart.restart_delay(&exit, restart_count) else {
				break;
			};

			restart_count += 1;
			task_state.restarts.store(restart_count, Ordering::Release);
			tokio::select! {
				_ = task_cancel.cancelled() => break,
				_ = tokio::time::sleep(backoff) => {}
			}
		}
	});

	ActorHandle {
		name: spec.name,
		tx,
		events,
		cancel,
		state,
		join: Arc::new(JoinCtrl::new(supervisor)),
	}
}

async fn run_instance<A: Actor>(mut actor: A, rx: MailboxReceiver<A::Cmd>, events: broadcast::Sender<A::Evt>, token: GenerationToken) -> ActorExit {
	let mut ctx = ActorContext { events, token: token.clone() };

	let started = tokio::select! {
		biased;
		_ = token.cancelled() => None,
		res = actor.on_start(&mut ctx) => Some(res),
	};
	match started {
		None => return ActorExit::Cancelled,
		Some(Err(err)) => return ActorExit::StartupFailed(err),
		Some(Ok(())) => {}
	}

	let exit = loop {
		let cmd = tokio::select! {
			biased;
			_ = token.cancelled() => break ActorExit::Cancelled,
			msg = rx.recv() => match msg {
				Some(cmd) => cmd,
				None => break ActorExit::MailboxClosed,
			},
		};

		let flow = tokio::select! {
			biased;
			_ = token.cancelled() => break ActorExit::Cancelled,
			res = actor.handle(cmd, &mut ctx) => res,
		};

		match flow {
			Ok(ActorFlow::Continue) => {}
			Ok(ActorFlow::Stop) => break ActorExit::Stopped,
			Err(err) => break ActorExit::HandlerFailed(err),
		}
	};

	actor.on_stop(&mut ctx).await;
	exit
}
