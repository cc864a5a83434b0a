//! One-shot, step-tagged halo channels.
//!
//! A [`HaloChannel`] is a directed, typed, point-to-point edge: single
//! writer, single reader by construction. `send` is non-blocking and hands
//! ownership of the block to the channel; `recv` returns a waitable handle
//! that resolves once the send carrying the **same step tag** has occurred.
//! Tag pairing means step `n+1` data can never satisfy a step `n` wait, even
//! when consecutive steps overlap.

use crate::data::block::GridBlock;
use crate::grid_error::GridHaloError;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::Arc;

struct SlotState<T> {
    /// In-flight payloads keyed by step tag; at most a handful at a time.
    pending: HashMap<u64, GridBlock<T>>,
    /// A failed channel wakes every waiter with this reason.
    failed: Option<String>,
}

struct ChannelSlot<T> {
    state: Mutex<SlotState<T>>,
    arrived: Condvar,
}

/// A directed halo edge between two subdomains.
///
/// Cloning yields another handle to the same edge; the sender and receiver
/// each hold one clone, usually obtained through the
/// [`ChannelRegistry`](crate::comm::registry::ChannelRegistry).
pub struct HaloChannel<T> {
    name: String,
    slot: Arc<ChannelSlot<T>>,
}

impl<T> Clone for HaloChannel<T> {
    fn clone(&self) -> Self {
        HaloChannel {
            name: self.name.clone(),
            slot: self.slot.clone(),
        }
    }
}

impl<T> std::fmt::Debug for HaloChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HaloChannel").field("name", &self.name).finish()
    }
}

impl<T: Send + 'static> HaloChannel<T> {
    pub(crate) fn new(name: String) -> Self {
        HaloChannel {
            name,
            slot: Arc::new(ChannelSlot {
                state: Mutex::new(SlotState {
                    pending: HashMap::new(),
                    failed: None,
                }),
                arrived: Condvar::new(),
            }),
        }
    }

    /// Symbolic name this channel was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hand `block` to the channel, tagged with `step`. Never blocks.
    ///
    /// # Errors
    /// Returns `ChannelFailure` if the channel has failed or if a payload for
    /// `step` is already in flight (the protocol is at-most-once per step).
    pub fn send(&self, block: GridBlock<T>, step: u64) -> Result<(), GridHaloError> {
        let mut state = self.slot.state.lock();
        if let Some(reason) = &state.failed {
            return Err(GridHaloError::ChannelFailure {
                channel: self.name.clone(),
                reason: reason.clone(),
            });
        }
        if state.pending.contains_key(&step) {
            return Err(GridHaloError::ChannelFailure {
                channel: self.name.clone(),
                reason: format!("duplicate send for step {step}"),
            });
        }
        state.pending.insert(step, block);
        drop(state);
        self.slot.arrived.notify_all();
        Ok(())
    }

    /// A handle resolving to the payload sent with the same `step` tag.
    pub fn recv(&self, step: u64) -> RecvHandle<T> {
        RecvHandle {
            name: self.name.clone(),
            slot: self.slot.clone(),
            step,
        }
    }

    /// Drop the in-flight payload tagged `step`, if any.
    ///
    /// Called when a step is aborted so its sends cannot corrupt a later
    /// step's pairing.
    pub fn discard(&self, step: u64) {
        let mut state = self.slot.state.lock();
        state.pending.remove(&step);
    }

    /// Put the channel into a failed state; current and future waiters
    /// resolve to `ChannelFailure`.
    pub fn fail(&self, reason: impl Into<String>) {
        let mut state = self.slot.state.lock();
        state.failed = Some(reason.into());
        drop(state);
        self.slot.arrived.notify_all();
    }

    /// Number of payloads currently in flight.
    pub fn in_flight(&self) -> usize {
        self.slot.state.lock().pending.len()
    }
}

/// Waitable receive handle, the future of a one-shot receive.
///
/// `wait` blocks the calling task until the matching send has occurred; the
/// sender side never blocks.
pub struct RecvHandle<T> {
    name: String,
    slot: Arc<ChannelSlot<T>>,
    step: u64,
}

impl<T: Send + 'static> RecvHandle<T> {
    /// Step tag this handle is waiting for.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Block until the matching send arrives and take its payload.
    ///
    /// # Errors
    /// Returns `ChannelFailure` if the channel fails before (or while) the
    /// payload arrives.
    pub fn wait(self) -> Result<GridBlock<T>, GridHaloError> {
        let mut state = self.slot.state.lock();
        loop {
            if let Some(block) = state.pending.remove(&self.step) {
                return Ok(block);
            }
            if let Some(reason) = &state.failed {
                return Err(GridHaloError::ChannelFailure {
                    channel: self.name.clone(),
                    reason: reason.clone(),
                });
            }
            self.slot.arrived.wait(&mut state);
        }
    }

    /// Non-blocking probe; `None` while the payload is still in flight.
    pub fn try_wait(&self) -> Result<Option<GridBlock<T>>, GridHaloError> {
        let mut state = self.slot.state.lock();
        if let Some(block) = state.pending.remove(&self.step) {
            return Ok(Some(block));
        }
        if let Some(reason) = &state.failed {
            return Err(GridHaloError::ChannelFailure {
                channel: self.name.clone(),
                reason: reason.clone(),
            });
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::shape::Extent;

    fn block(vals: Vec<i32>) -> GridBlock<i32> {
        GridBlock::from_vec(Extent::new(vec![vals.len()]), vals).unwrap()
    }

    #[test]
    fn send_then_wait() {
        let ch: HaloChannel<i32> = HaloChannel::new("t/0/0".into());
        ch.send(block(vec![1, 2, 3]), 0).unwrap();
        let got = ch.recv(0).wait().unwrap();
        assert_eq!(got.as_slice(), &[1, 2, 3]);
        assert_eq!(ch.in_flight(), 0);
    }

    #[test]
    fn wait_blocks_until_send() {
        let ch: HaloChannel<i32> = HaloChannel::new("t/0/1".into());
        let handle = ch.recv(4);
        let sender = ch.clone();
        let join = std::thread::spawn(move || {
            sender.send(block(vec![9]), 4).unwrap();
        });
        let got = handle.wait().unwrap();
        join.join().unwrap();
        assert_eq!(got.as_slice(), &[9]);
    }

    #[test]
    fn steps_pair_exactly() {
        let ch: HaloChannel<i32> = HaloChannel::new("t/0/2".into());
        ch.send(block(vec![1]), 1).unwrap();
        ch.send(block(vec![2]), 2).unwrap();
        // Step 2's wait must not consume step 1's payload.
        assert_eq!(ch.recv(2).wait().unwrap().as_slice(), &[2]);
        assert_eq!(ch.recv(1).wait().unwrap().as_slice(), &[1]);
    }

    #[test]
    fn duplicate_send_rejected() {
        let ch: HaloChannel<i32> = HaloChannel::new("t/0/3".into());
        ch.send(block(vec![1]), 7).unwrap();
        assert!(matches!(
            ch.send(block(vec![1]), 7),
            Err(GridHaloError::ChannelFailure { .. })
        ));
    }

    #[test]
    fn discard_clears_step() {
        let ch: HaloChannel<i32> = HaloChannel::new("t/0/4".into());
        ch.send(block(vec![1]), 3).unwrap();
        ch.discard(3);
        assert_eq!(ch.in_flight(), 0);
        // A fresh send for the same step is clean again.
        ch.send(block(vec![5]), 3).unwrap();
        assert_eq!(ch.recv(3).wait().unwrap().as_slice(), &[5]);
    }

    #[test]
    fn failure_wakes_waiter() {
        let ch: HaloChannel<i32> = HaloChannel::new("t/0/5".into());
        let handle = ch.recv(0);
        let failer = ch.clone();
        let join = std::thread::spawn(move || failer.fail("link down"));
        let err = handle.wait().unwrap_err();
        join.join().unwrap();
        assert!(matches!(err, GridHaloError::ChannelFailure { .. }));
    }

    #[test]
    fn try_wait_probes_without_blocking() {
        let ch: HaloChannel<i32> = HaloChannel::new("t/0/6".into());
        let handle = ch.recv(0);
        assert!(matches!(handle.try_wait(), Ok(None)));
        ch.send(block(vec![4]), 0).unwrap();
        let got = handle.try_wait().unwrap().expect("payload in flight");
        assert_eq!(got.as_slice(), &[4]);
    }
}
