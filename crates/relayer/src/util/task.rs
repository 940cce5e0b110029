use core::{fmt::Display, mem, time::Duration};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, error, warn};

/// A handle to a background task spawned by [`spawn_background_task`].
///
/// Dropping the handle shuts the task down and waits for its thread to exit.
pub struct TaskHandle {
    shutdown_sender: Sender<()>,
    stopped: Arc<AtomicBool>,
    join_handle: DropJoinHandle,
}

struct DropJoinHandle(Option<thread::JoinHandle<()>>);

/// The error type returned by a step of a background task.
pub enum TaskError<E> {
    /// Log the error and run the next step.
    Ignore(E),

    /// Log the error and stop the task.
    Fatal(E),
}

/// What the task should do after a successful step.
pub enum Next {
    Continue,
    Abort,
}

/// Spawn a long-running background task that runs `step_runner` in a loop
/// on its own thread, until the step aborts, fails fatally or the handle is
/// shut down.
///
/// The step is given the task's shutdown receiver so that it can block on it
/// while it waits. A step that observes the shutdown signal must return
/// [`Next::Abort`], since the signal is consumed by the step.
///
/// When `interval_pause` is set, the task waits that long between two steps.
/// A shutdown request interrupts the pause.
pub fn spawn_background_task<E: Display>(
    span: tracing::Span,
    interval_pause: Option<Duration>,
    mut step_runner: impl FnMut(&Receiver<()>) -> Result<Next, TaskError<E>> + Send + 'static,
) -> TaskHandle {
    debug!(parent: &span, "spawning task");

    let stopped = Arc::new(AtomicBool::new(false));
    let write_stopped = stopped.clone();

    let (shutdown_sender, receiver) = bounded(1);

    let join_handle = thread::spawn(move || {
        let _entered = span.enter();

        loop {
            match receiver.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => match step_runner(&receiver) {
                    Ok(Next::Continue) => {}
                    Ok(Next::Abort) => {
                        debug!("aborting task");
                        break;
                    }
                    Err(TaskError::Ignore(e)) => {
                        warn!("task encountered ignorable error: {}", e);
                    }
                    Err(TaskError::Fatal(e)) => {
                        error!("task aborting after encountering fatal error: {}", e);
                        break;
                    }
                },
            }

            if let Some(interval) = interval_pause {
                match receiver.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        }

        write_stopped.store(true, Ordering::SeqCst);

        debug!("task terminated");
    });

    TaskHandle {
        shutdown_sender,
        stopped,
        join_handle: DropJoinHandle(Some(join_handle)),
    }
}

impl TaskHandle {
    /// Wait for the task to terminate.
    pub fn join(mut self) {
        if let Some(handle) = mem::take(&mut self.join_handle.0) {
            let _ = handle.join();
        }
    }

    /// Send the shutdown signal to the task, without waiting for it to terminate.
    pub fn shutdown(&self) {
        let _ = self.shutdown_sender.try_send(());
    }

    /// Send the shutdown signal to the task and wait for it to terminate.
    pub fn shutdown_and_wait(self) {
        self.shutdown();
        self.join();
    }

    /// Returns `true` once the task's loop has exited.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl Drop for DropJoinHandle {
    fn drop(&mut self) {
        if let Some(handle) = mem::take(&mut self.0) {
            let _ = handle.join();
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_sender.try_send(());
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use test_log::test;
    use tracing::info_span;

    #[test]
    fn task_runs_until_abort() {
        let steps = Arc::new(AtomicUsize::new(0));
        let counter = steps.clone();

        let handle = spawn_background_task(info_span!("test"), None, move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 4 {
                Ok(Next::Abort)
            } else {
                Ok::<_, TaskError<Infallible>>(Next::Continue)
            }
        });

        handle.join();
        assert_eq!(steps.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn ignorable_errors_do_not_stop_the_task() {
        let steps = Arc::new(AtomicUsize::new(0));
        let counter = steps.clone();

        let handle = spawn_background_task(info_span!("test"), None, move |_| {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0..=2 => Err(TaskError::Ignore("transient")),
                3 => Err(TaskError::Fatal("broken")),
                _ => Ok(Next::Continue),
            }
        });

        handle.join();
        assert_eq!(steps.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn shutdown_interrupts_a_blocked_step() {
        let handle = spawn_background_task(info_span!("test"), None, |shutdown| {
            match shutdown.recv_timeout(Duration::from_secs(60)) {
                Ok(()) => Ok(Next::Abort),
                Err(_) => Ok::<_, TaskError<Infallible>>(Next::Continue),
            }
        });

        assert!(!handle.is_stopped());

        handle.shutdown();
        let stopped = Arc::clone(&handle.stopped);
        handle.join();

        assert!(stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn shutdown_interrupts_the_interval_pause() {
        let handle = spawn_background_task(
            info_span!("test"),
            Some(Duration::from_secs(60)),
            |_| Ok::<_, TaskError<Infallible>>(Next::Continue),
        );

        let start = std::time::Instant::now();
        handle.shutdown_and_wait();

        assert!(start.elapsed() < Duration::from_secs(30));
    }
}
