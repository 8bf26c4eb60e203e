//! Keeping the launcher alive across terminal interrupts.
//!
//! While an external CLI owns the terminal, Ctrl-C reaches every process in
//! the foreground group. The external CLI handles it; the launcher must not
//! die from it, or the teardown that follows never runs.

use log::debug;
use signal_hook::consts::SIGINT;
use signal_hook::SigId;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Replaces the default SIGINT action with a flag for as long as it lives.
///
/// Child processes spawned while the guard is held still get the default
/// action after `exec`. Dropping the guard unregisters the flag; signal-hook
/// keeps its handler installed, so later interrupts are swallowed for the
/// rest of the process, which covers teardown.
#[derive(Debug)]
pub struct InterruptGuard {
    id: SigId,
    interrupted: Arc<AtomicBool>,
}

impl InterruptGuard {
    pub fn install() -> io::Result<Self> {
        let interrupted = Arc::new(AtomicBool::new(false));
        let id = signal_hook::flag::register(SIGINT, Arc::clone(&interrupted))?;
        debug!("SIGINT intercepted");
        Ok(Self { id, interrupted })
    }

    /// Returns true if SIGINT arrived since the guard was installed
    pub fn interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        signal_hook::low_level::unregister(self.id);
        debug!("SIGINT interception released");
    }
}
