//! Worker runtime primitives shared by the finder.
//!
//! * [`spawn`]: runtime-aware spawning labelled by [`TaskClass`].
//! * [`GenerationClock`] / [`GenerationToken`]: generation-tagged cancellation.
//! * [`Mailbox`]: bounded FIFO mailbox with backpressure.
//! * [`actor`]: supervised single-threaded actors.

pub mod actor;
mod class;
mod mailbox;
mod spawn;
mod token;

pub use actor::{Actor, ActorContext, ActorExit, ActorFlow, ActorHandle, ActorSendError, ActorSpec, RestartPolicy, ShutdownMode, ShutdownReport, spawn_actor};
pub use class::TaskClass;
pub use mailbox::{Mailbox, MailboxReceiver, MailboxSendError, MailboxSender};
pub use spawn::spawn;
pub use token::{GenerationClock, GenerationToken};
