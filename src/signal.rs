//! Ctrl+C handling.
//!
//! A [`Cancellation`] is a cheap, clonable flag. The walker and the hasher
//! poll it between entries; once it is set they stop with
//! [`SweepError::Cancelled`](crate::SweepError::Cancelled).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;

/// Exit code after an interrupted run (128 + SIGINT).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    /// A flag that is never set unless [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a flag and wires it to Ctrl+C.
    pub fn install() -> anyhow::Result<Self> {
        let cancellation = Self::new();
        let flag = Arc::clone(&cancellation.flag);
        ctrlc::set_handler(move || {
            if flag.swap(true, Ordering::SeqCst) {
                // Second Ctrl+C: the user really wants out.
                std::process::exit(EXIT_CODE_INTERRUPTED);
            }
            warn!("Interrupted, finishing current entry...");
        })?;
        Ok(cancellation)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the flag is set.
    pub fn check(&self) -> crate::error::Result<()> {
        if self.is_cancelled() {
            Err(crate::SweepError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let a = Cancellation::new();
        let b = a.clone();
        assert!(a.check().is_ok());
        b.cancel();
        assert!(a.is_cancelled());
        assert!(matches!(a.check(), Err(crate::SweepError::Cancelled)));
    }
}
