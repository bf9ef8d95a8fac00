//! Single-slot background job runner.
//!
//! A job runs on a dedicated thread and reports its result over a channel;
//! the foreground thread picks it up with [`Worker::wait`] or
//! [`Worker::poll`]. Only one job may be in flight at a time.

use crate::error::LuxmapError;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Completion message sent by a finished job.
#[derive(Debug)]
pub struct Completion<T> {
    pub name: String,
    pub result: T,
}

struct Running<T> {
    name: String,
    receiver: Receiver<Completion<T>>,
    handle: JoinHandle<()>,
}

pub struct Worker<T> {
    running: Option<Running<T>>,
}

impl<T> Default for Worker<T> {
    fn default() -> Self {
        Self { running: None }
    }
}

impl<T: Send + 'static> Worker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    /// Name of the job in flight, if any.
    pub fn current(&self) -> Option<&str> {
        self.running.as_ref().map(|r| r.name.as_str())
    }

    /// Starts `job` on a background thread. Rejected with `WorkerBusy` while
    /// a previous job has not been collected.
    pub fn submit<F>(&mut self, name: &str, job: F) -> Result<(), LuxmapError>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        if self.running.is_some() {
            return Err(LuxmapError::WorkerBusy);
        }

        let (sender, receiver) = bounded::<Completion<T>>(1);
        let job_name = name.to_string();
        let handle = thread::Builder::new()
            .name(format!("luxmap-{}", name))
            .spawn(move || {
                let result = job();
                // The receiver may already be gone if the foreground gave up.
                let _ = sender.send(Completion {
                    name: job_name,
                    result,
                });
            })
            .map_err(|e| LuxmapError::io(name, e))?;

        log::debug!("Started background job '{}'", name);
        self.running = Some(Running {
            name: name.to_string(),
            receiver,
            handle,
        });
        Ok(())
    }

    /// Blocks until the running job reports back.
    pub fn wait(&mut self) -> Result<Completion<T>, LuxmapError> {
        let running = self.running.take().ok_or(LuxmapError::WorkerDisconnected)?;
        let completion = running
            .receiver
            .recv()
            .map_err(|_| LuxmapError::WorkerDisconnected);
        finish(running.handle);
        completion
    }

    /// Waits up to `timeout`; `Ok(None)` if the job is still running.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Result<Option<Completion<T>>, LuxmapError> {
        let Some(running) = self.running.as_ref() else {
            return Err(LuxmapError::WorkerDisconnected);
        };
        match running.receiver.recv_timeout(timeout) {
            Ok(completion) => {
                self.collect();
                Ok(Some(completion))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                self.collect();
                Err(LuxmapError::WorkerDisconnected)
            }
        }
    }

    /// Non-blocking check for a finished job.
    pub fn poll(&mut self) -> Result<Option<Completion<T>>, LuxmapError> {
        let Some(running) = self.running.as_ref() else {
            return Ok(None);
        };
        match running.receiver.try_recv() {
            Ok(completion) => {
                self.collect();
                Ok(Some(completion))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.collect();
                Err(LuxmapError::WorkerDisconnected)
            }
        }
    }

    fn collect(&mut self) {
        if let Some(running) = self.running.take() {
            finish(running.handle);
        }
    }
}

fn finish(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        log::error!("Background job panicked");
    }
}
