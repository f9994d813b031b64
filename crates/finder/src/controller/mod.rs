//! Session controller.
//!
//! One supervised actor owns the session: it applies events in arrival
//! order, starts the source producer on `run`, and replaces the filter pass
//! on every pattern change. Passes and producers hang off the actor instance
//! token, so a restarted instance never inherits work from its predecessor.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ferret_worker::{
	Actor, ActorContext, ActorFlow, ActorHandle, ActorSpec, GenerationClock, GenerationToken, ShutdownMode, ShutdownReport, TaskClass, spawn_actor,
};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::config::FinderConfig;
use crate::error::{FinderError, Result};
use crate::event::{FinderEvent, Notification, NotificationSink};
use crate::options::{FinderOptions, ResultType};
use crate::pass::Pass;
use crate::pool::CandidatePool;
use crate::prompt::Prompt;
use crate::publish::Publisher;
use crate::source::{self, RemoteLister, Source};
use crate::state::{FilterState, SharedState};
use crate::view::ResultView;

/// Whether a session is on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Phase {
	#[default]
	Idle,
	Running,
}

/// Lifecycle events broadcast to [`Finder::subscribe`] listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
	Started { generation: u64 },
	Cancelled,
	Confirmed { candidate: String },
	Resumed,
}

struct Session {
	options: FinderOptions,
	prompt: Prompt,
	pool: Arc<CandidatePool>,
	source: GenerationToken,
	pass: Option<GenerationToken>,
}

impl Session {
	fn halt(&mut self) {
		self.source.cancel();
		if let Some(pass) = self.pass.take() {
			pass.cancel();
		}
	}
}

struct Controller {
	config: Arc<FinderConfig>,
	sink: NotificationSink,
	remote: Option<Arc<dyn RemoteLister>>,
	state: SharedState,
	clock: GenerationClock,
	instance: GenerationToken,
	phase: Phase,
	session: Option<Session>,
}

impl Controller {
	fn new(config: Arc<FinderConfig>, sink: NotificationSink, remote: Option<Arc<dyn RemoteLister>>) -> Self {
		let view = ResultView::new(ResultType::default(), config.default_max);
		let publisher = Publisher::new(sink.clone(), config.max_display_chars);
		Self {
			state: FilterState::shared(view, publisher),
			config,
			sink,
			remote,
			clock: GenerationClock::new(),
			instance: GenerationToken::root(0),
			phase: Phase::Idle,
			session: None,
		}
	}

	fn running(&self) -> bool {
		self.phase == Phase::Running
	}

	fn run(&mut self, options: FinderOptions, ctx: &ActorContext<SessionEvent>) {
		// Detach the previous session before anything of the new one is shown.
		self.stop();

		let generation = self.clock.next();
		let source_token = self.instance.fork(generation);
		let pool = CandidatePool::new();
		let source = Source::from_options(&options, self.remote.as_ref());
		tracing::info!(generation, source = source.kind(), result_type = options.result_type.as_str(), "finder.run.start");
		source::start(
			source,
			Arc::clone(&pool),
			source_token.clone(),
			self.config.source_channel_capacity,
			self.config.batch_size,
		);

		self.session = Some(Session {
			options,
			prompt: Prompt::default(),
			pool,
			source: source_token,
			pass: None,
		});
		self.phase = Phase::Running;
		self.state.lock().publisher.forget();
		self.sink.send(Notification::Show);
		self.sink.send(Notification::Pattern {
			text: String::new(),
			cursor: 0,
		});
		self.restart_pass();
		ctx.emit(SessionEvent::Started { generation });
	}

	/// Replaces the running pass with one for the current pattern.
	fn restart_pass(&mut self) {
		let Some(session) = self.session.as_mut() else {
			return;
		};
		if let Some(previous) = session.pass.take() {
			previous.cancel();
		}
		let generation = self.clock.next();
		let token = self.instance.fork(generation);
		let result_type = session.options.result_type;
		self.state.lock().begin_pass(generation, result_type);
		session.pass = Some(token.clone());

		Pass {
			token,
			pattern: session.prompt.text().to_string(),
			result_type,
			pool: Arc::clone(&session.pool),
			state: Arc::clone(&self.state),
			config: Arc::clone(&self.config),
		}
		.spawn();
	}

	fn edit(&mut self, apply: impl FnOnce(&mut Prompt) -> bool) {
		if !self.running() {
			return;
		}
		let Some(session) = self.session.as_mut() else {
			return;
		};
		if !apply(&mut session.prompt) {
			return;
		}
		self.sink.send(Notification::Pattern {
			text: session.prompt.text().to_string(),
			cursor: session.prompt.cursor(),
		});
		self.restart_pass();
	}

	fn move_cursor(&mut self, apply: impl FnOnce(&mut Prompt) -> bool) {
		if !self.running() {
			return;
		}
		let Some(session) = self.session.as_mut() else {
			return;
		};
		if apply(&mut session.prompt) {
			self.sink.send(Notification::PatternPos {
				cursor: session.prompt.cursor(),
			});
		}
	}

	fn navigate(&mut self, step: impl FnOnce(&mut ResultView) -> bool) {
		if !self.running() {
			return;
		}
		let mut state = self.state.lock();
		if step(&mut state.view) {
			state.flush(true);
		}
		state.select();
	}

	/// Stops producer and pass and detaches the view. The view itself is kept for `resume`.
	fn stop(&mut self) {
		if let Some(session) = self.session.as_mut() {
			session.halt();
		}
		self.state.lock().retire(self.clock.next());
		self.phase = Phase::Idle;
	}

	fn cancel(&mut self, ctx: &ActorContext<SessionEvent>) {
		let was_running = self.running();
		self.stop();
		self.sink.send(Notification::Hide);
		if was_running {
			tracing::debug!("finder.cancel");
			ctx.emit(SessionEvent::Cancelled);
		}
	}

	fn confirm(&mut self, ctx: &ActorContext<SessionEvent>) {
		if !self.running() {
			return;
		}
		let candidate = {
			let mut state = self.state.lock();
			state.view.clamp();
			state.view.selected_entry().map(|entry| entry.candidate.to_string())
		};
		let Some(candidate) = candidate else {
			self.cancel(ctx);
			return;
		};

		self.stop();
		self.sink.send(Notification::Hide);
		match self.session.as_ref().and_then(|session| session.options.confirm_action(&candidate)) {
			Some(action) => {
				tracing::debug!(method = action.method(), "finder.confirm");
				self.sink.send(action);
			}
			None => tracing::debug!("finder.confirm.no_action"),
		}
		ctx.emit(SessionEvent::Confirmed { candidate });
	}

	fn resume(&mut self, ctx: &ActorContext<SessionEvent>) {
		if self.running() {
			return;
		}
		let Some(session) = self.session.as_ref() else {
			return;
		};
		self.phase = Phase::Running;
		self.sink.send(Notification::Show);
		self.sink.send(Notification::Pattern {
			text: session.prompt.text().to_string(),
			cursor: session.prompt.cursor(),
		});
		{
			let mut state = self.state.lock();
			state.flush(true);
			state.select();
		}
		tracing::debug!("finder.resume");
		ctx.emit(SessionEvent::Resumed);
	}

	fn update_max(&mut self, max: usize) {
		let mut state = self.state.lock();
		state.view.set_max(max);
		if self.phase == Phase::Running {
			state.flush(true);
		}
	}
}

#[async_trait]
impl Actor for Controller {
	type Cmd = FinderEvent;
	type Evt = SessionEvent;

	async fn on_start(&mut self, ctx: &mut ActorContext<SessionEvent>) -> std::result::Result<(), String> {
		self.instance = ctx.token().clone();
		tracing::debug!(generation = ctx.generation(), "finder.controller.start");
		Ok(())
	}

	async fn on_stop(&mut self, _ctx: &mut ActorContext<SessionEvent>) {
		if let Some(session) = self.session.as_mut() {
			session.halt();
		}
	}

	async fn handle(&mut self, event: FinderEvent, ctx: &mut ActorContext<SessionEvent>) -> std::result::Result<ActorFlow, String> {
		tracing::trace!(event = event.name(), phase = ?self.phase, "finder.event");
		match event {
			FinderEvent::Run(options) => self.run(options, ctx),
			FinderEvent::Char(ch) => self.edit(|prompt| prompt.insert(ch)),
			FinderEvent::Backspace => self.edit(Prompt::backspace),
			FinderEvent::Clear => self.edit(Prompt::clear),
			FinderEvent::Left => self.move_cursor(Prompt::left),
			FinderEvent::Right => self.move_cursor(Prompt::right),
			FinderEvent::Up => self.navigate(ResultView::move_up),
			FinderEvent::Down => self.navigate(ResultView::move_down),
			FinderEvent::Cancel => self.cancel(ctx),
			FinderEvent::Confirm => self.confirm(ctx),
			FinderEvent::Resume => self.resume(ctx),
			FinderEvent::UpdateMax(max) => self.update_max(max),
		}
		Ok(ActorFlow::Continue)
	}
}

/// Handle to a running finder engine. Dropping it stops the engine.
pub struct Finder {
	handle: ActorHandle<FinderEvent, SessionEvent>,
}

impl Finder {
	/// Spawns an engine publishing to `sink`, walking the local filesystem by default.
	pub fn spawn(config: FinderConfig, sink: NotificationSink) -> Self {
		Self::spawn_with(config, sink, None)
	}

	/// Spawns an engine that enumerates through `remote` when `run` names no source.
	pub fn spawn_with(config: FinderConfig, sink: NotificationSink, remote: Option<Arc<dyn RemoteLister>>) -> Self {
		let config = Arc::new(config);
		let mailbox_capacity = config.mailbox_capacity.max(1);
		let spec = ActorSpec::new("finder", TaskClass::Interactive, move || {
			Controller::new(Arc::clone(&config), sink.clone(), remote.clone())
		})
		.mailbox_capacity(mailbox_capacity);
		Self { handle: spawn_actor(spec) }
	}

	/// Queues one event, waiting when the mailbox is full.
	pub async fn send(&self, event: FinderEvent) -> Result<()> {
		self.handle.send(event).await.map_err(|_| FinderError::Stopped)
	}

	/// Parses and queues a wire event. Unparsable events are logged and returned as errors.
	pub async fn dispatch(&self, name: &str, args: &[Value]) -> Result<()> {
		match FinderEvent::parse(name, args) {
			Ok(event) => self.send(event).await,
			Err(error) => {
				tracing::warn!(event = name, %error, "finder.event.rejected");
				Err(error)
			}
		}
	}

	pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
		self.handle.subscribe()
	}

	/// Lets queued events drain, then stops the engine.
	pub async fn shutdown(&self, timeout: Duration) -> ShutdownReport {
		self.handle.shutdown(ShutdownMode::Graceful { timeout }).await
	}
}
