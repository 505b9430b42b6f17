//! In-order command queues.
//!
//! Each [`CommandQueue`] owns a worker thread that executes commands in
//! submission order. A command first waits for every event in its wait list;
//! if any of them failed, the command is skipped and its own event fails with
//! [`Status::InvalidEventWaitList`], so a broken chain never touches memory.
//! Enqueueing returns immediately with the command's [`Event`].

use crate::context::Context;
use crate::device::Device;
use crate::error::{Error, Result, Status};
use crate::event::{Event, EventStatus};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

type Work = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

struct Command {
    wait: SmallVec<[Event; 4]>,
    event: Event,
    work: Work,
}

struct QueueInner {
    id: u64,
    context: Context,
    device: Device,
    sender: Mutex<Option<Sender<Command>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    released: AtomicBool,
}

impl QueueInner {
    fn shutdown(&self) {
        self.released.store(true, Ordering::Release);
        // Dropping the sender ends the worker loop once pending commands drain.
        self.sender.lock().take();
        if let Some(handle) = self.worker.lock().take() {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for QueueInner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// An in-order command queue bound to one device of a context. Cheap to clone.
#[derive(Clone)]
pub struct CommandQueue {
    inner: Arc<QueueInner>,
}

impl std::fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandQueue")
            .field("id", &self.inner.id)
            .field("context", &self.inner.context.id())
            .field("device", &self.inner.device.name())
            .field("released", &self.is_released())
            .finish()
    }
}

impl CommandQueue {
    /// Create a queue on `device`, which must belong to `context`.
    pub fn new(context: &Context, device: &Device) -> Result<Self> {
        if !context.contains(device) {
            return Err(Error::invalid_device(
                device.name(),
                format!("device is not part of context {}", context.id()),
            ));
        }
        let id = NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel::<Command>();
        let handle = thread::Builder::new()
            .name(format!("qblas-queue-{id}"))
            .spawn(move || worker_loop(id, rx))
            .map_err(|e| Error::OutOfResources(format!("cannot spawn queue worker: {e}")))?;
        tracing::debug!(queue = id, device = device.name(), "created command queue");
        Ok(Self {
            inner: Arc::new(QueueInner {
                id,
                context: context.clone(),
                device: device.clone(),
                sender: Mutex::new(Some(tx)),
                worker: Mutex::new(Some(handle)),
                released: AtomicBool::new(false),
            }),
        })
    }

    /// A queue on the first device of `context`.
    pub fn default_for(context: &Context) -> Result<Self> {
        let device = context
            .devices()
            .first()
            .ok_or_else(|| Error::InvalidContext("context has no devices".into()))?;
        Self::new(context, device)
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn context(&self) -> &Context {
        &self.inner.context
    }

    pub fn device(&self) -> &Device {
        &self.inner.device
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::Acquire)
    }

    pub fn same_queue(&self, other: &CommandQueue) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Submit `work` to run after every event in `wait` completes.
    pub fn enqueue<F>(&self, name: &'static str, wait: &[Event], work: F) -> Result<Event>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let event = Event::command(self.inner.context.id(), name);
        event.transition(EventStatus::Submitted);
        let command = Command {
            wait: wait.iter().cloned().collect(),
            event: event.clone(),
            work: Box::new(work),
        };
        let guard = self.inner.sender.lock();
        let sender = guard.as_ref().ok_or_else(|| {
            Error::InvalidCommandQueue(format!("queue {} has been released", self.inner.id))
        })?;
        sender.send(command).map_err(|_| {
            Error::InvalidCommandQueue(format!("queue {} worker has stopped", self.inner.id))
        })?;
        Ok(event)
    }

    /// A command that completes once `wait` has completed and all earlier commands ran.
    pub fn enqueue_marker(&self, wait: &[Event]) -> Result<Event> {
        self.enqueue("marker", wait, || Ok(()))
    }

    /// Commands are handed to the worker on submission, so this only checks the queue is live.
    pub fn flush(&self) -> Result<()> {
        if self.is_released() {
            return Err(Error::InvalidCommandQueue(format!(
                "queue {} has been released",
                self.inner.id
            )));
        }
        Ok(())
    }

    /// Block until every command submitted so far has finished.
    ///
    /// Failures of individual commands are reported through their events, not here.
    pub fn finish(&self) -> Result<()> {
        let marker = self.enqueue("finish", &[], || Ok(()))?;
        marker.wait()
    }

    /// Stop accepting commands and join the worker after pending commands drain.
    pub fn release(&self) {
        tracing::debug!(queue = self.inner.id, "releasing command queue");
        self.inner.shutdown();
    }
}

fn worker_loop(queue_id: u64, rx: mpsc::Receiver<Command>) {
    while let Ok(command) = rx.recv() {
        let Command { wait, event, work } = command;

        let mut blocked_by = None;
        for dep in &wait {
            if let Err(err) = dep.wait() {
                blocked_by = Some((dep.id(), err.status()));
            }
        }
        if let Some((dep, status)) = blocked_by {
            tracing::warn!(
                queue = queue_id,
                command = event.command_name(),
                dependency = dep,
                %status,
                "skipping command: wait-list event failed"
            );
            event.transition(EventStatus::Failed(Status::InvalidEventWaitList));
            continue;
        }

        event.transition(EventStatus::Running);
        match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(Ok(())) => event.transition(EventStatus::Complete),
            Ok(Err(err)) => {
                tracing::warn!(
                    queue = queue_id,
                    command = event.command_name(),
                    error = %err,
                    "command failed"
                );
                event.transition(EventStatus::Failed(err.status()));
            }
            Err(_) => {
                tracing::error!(
                    queue = queue_id,
                    command = event.command_name(),
                    "command panicked"
                );
                event.transition(EventStatus::Failed(Status::OutOfResources));
            }
        }
    }
    tracing::trace!(queue = queue_id, "queue worker exiting");
}
