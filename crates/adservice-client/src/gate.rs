use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// Tracks in-flight calls and refuses new ones once closed.
#[derive(Default)]
pub(crate) struct CallGate {
    state: Mutex<GateState>,
    idle: Condvar,
}

#[derive(Default)]
struct GateState {
    in_flight: usize,
    closed: bool,
}

/// Held for the duration of one call
pub(crate) struct CallPermit<'a> {
    gate: &'a CallGate,
}

impl CallGate {
    pub fn enter(&self) -> Option<CallPermit<'_>> {
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        state.in_flight += 1;
        Some(CallPermit { gate: self })
    }

    /// Returns `true` only for the call that actually closed the gate.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock();
        !std::mem::replace(&mut state.closed, true)
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    /// Wait until no call is in flight. Returns `false` on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let mut state = self.state.lock();
        let result = self
            .idle
            .wait_while_for(&mut state, |s| s.in_flight > 0, timeout);
        !result.timed_out() || state.in_flight == 0
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        let mut state = self.gate.state.lock();
        state.in_flight -= 1;
        if state.in_flight == 0 {
            self.gate.idle.notify_all();
        }
    }
}
