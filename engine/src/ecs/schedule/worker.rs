use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use log::{error, info};

use crate::ecs::{
    error::{Error, Result},
    system::{State, registry::Entry},
    world::World,
};

/// Commands a worker accepts between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Finish the current cycle and exit.
    Stop,
}

/// A thread repeatedly cycling one system.
///
/// Stop requests are honored at the boundary between cycles; a cycle in flight always completes.
/// The worker exits on its own when its system fails, keeping the error for [`join`](Self::join).
/// Dropping a worker stops it and waits for the thread.
pub struct Worker {
    name: String,
    entry: Arc<Entry>,
    commands: Sender<Command>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl Worker {
    pub(crate) fn spawn(entry: Arc<Entry>, world: Arc<World>, interval: Duration) -> Self {
        let (commands, receiver) = channel::unbounded();
        let name = entry.name().to_owned();
        let thread = {
            let entry = Arc::clone(&entry);
            thread::spawn(move || {
                info!("worker for system `{}` started", entry.name());
                let result = loop {
                    if entry.state() == State::Stopped {
                        break Ok(());
                    }
                    if let Err(err) = entry.cycle(&world) {
                        break Err(err);
                    }
                    match receiver.recv_timeout(interval) {
                        Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => break Ok(()),
                        Err(RecvTimeoutError::Timeout) => {}
                    }
                };
                entry.stop();
                info!("worker for system `{}` stopped", entry.name());
                result
            })
        };

        Self {
            name,
            entry,
            commands,
            thread: Some(thread),
        }
    }

    /// The name of the system this worker drives.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the worker to stop after its current cycle.
    pub fn stop(&self) {
        self.entry.stop();
        // The thread may already have exited; then there is nobody left to tell.
        let _ = self.commands.send(Command::Stop);
    }

    /// Returns true once the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the worker to exit without stopping it, returning the error of the cycle that
    /// ended it, if any.
    pub fn wait(mut self) -> Result<()> {
        self.finish()
    }

    /// Stop the worker and wait for it, returning the error of the cycle that ended it, if any.
    pub fn join(mut self) -> Result<()> {
        self.stop();
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        thread.join().unwrap_or_else(|_| {
            error!("worker for system `{}` panicked", self.name);
            Err(Error::WorkerPanicked {
                system: self.name.clone(),
            })
        })
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.stop();
            let _ = self.finish();
        }
    }
}
