//! Status receivers
//!
//! A transaction reports progress through [`StatusReceiver::on_status_notify`]
//! and its outcome through exactly one [`StatusReceiver::on_finished`] call.

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::error::{BmsError, ERR_OK, Result};

/// Caller-supplied callback for transaction progress and outcome
pub trait StatusReceiver: Send + Sync {
    /// Progress in percent, 0..=100
    fn on_status_notify(&self, progress: i32);

    /// Final result code (`ERR_OK` on success) and message
    fn on_finished(&self, code: i32, message: &str);
}

/// Outcome delivered to a [`ChannelReceiver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    pub code: i32,
    pub message: String,
}

impl Finished {
    pub fn is_ok(&self) -> bool {
        self.code == ERR_OK
    }

    /// Turn a failed outcome back into an error
    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            return Ok(());
        }
        Err(BmsError::TransactionFailed {
            code: self.code,
            message: self.message,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Progress(i32),
    Finished(Finished),
}

/// Receiver that forwards events over a channel so callers can block on the
/// outcome
#[derive(Debug, Clone)]
pub struct ChannelReceiver {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for ChannelReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelReceiver {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Block until the transaction finishes, feeding progress to `on_progress`
    pub fn wait_with(&self, mut on_progress: impl FnMut(i32)) -> Finished {
        loop {
            match self.rx.recv() {
                Ok(Event::Progress(progress)) => on_progress(progress),
                Ok(Event::Finished(finished)) => return finished,
                Err(_) => {
                    return Finished {
                        code: BmsError::Internal {
                            message: String::new(),
                        }
                        .result_code(),
                        message: "status channel closed before the transaction finished"
                            .to_string(),
                    };
                }
            }
        }
    }

    /// Block until the transaction finishes
    pub fn wait(&self) -> Finished {
        self.wait_with(|_| {})
    }

    /// Number of `on_finished` calls received but not yet consumed
    pub fn pending_finished(&self) -> usize {
        self.rx
            .try_iter()
            .filter(|event| matches!(event, Event::Finished(_)))
            .count()
    }
}

impl StatusReceiver for ChannelReceiver {
    fn on_status_notify(&self, progress: i32) {
        let _ = self.tx.send(Event::Progress(progress));
    }

    fn on_finished(&self, code: i32, message: &str) {
        let _ = self.tx.send(Event::Finished(Finished {
            code,
            message: message.to_string(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_returns_outcome_after_progress() {
        let receiver = ChannelReceiver::new();
        receiver.on_status_notify(10);
        receiver.on_status_notify(90);
        receiver.on_finished(ERR_OK, "");

        let mut progress = Vec::new();
        let finished = receiver.wait_with(|p| progress.push(p));
        assert!(finished.is_ok());
        assert_eq!(progress, vec![10, 90]);
        assert_eq!(receiver.pending_finished(), 0);
    }

    #[test]
    fn test_wait_across_threads() {
        let receiver = ChannelReceiver::new();
        let sender = receiver.clone();
        std::thread::spawn(move || sender.on_finished(81, "not installed"));

        let finished = receiver.wait();
        assert_eq!(finished.code, 81);
        assert_eq!(finished.message, "not installed");

        let err = finished.into_result().unwrap_err();
        assert_eq!(err.result_code(), 81);
    }
}
