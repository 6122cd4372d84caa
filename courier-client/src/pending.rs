//! In-flight request table.
//!
//! Entries are keyed by the message id they were last sent under. A request
//! keeps a stable `request_id` across re-keying (salt or clock corrections,
//! retransmission on a fresh key) so the caller's [`PendingGuard`] can still
//! find it when the call is cancelled.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::errors::InvocationError;

pub(crate) type Reply = Result<Vec<u8>, InvocationError>;

pub(crate) struct Pending {
    pub request_id: u64,
    pub seq_no:     i32,
    pub body:       Vec<u8>,
    /// Session id the entry was packed for; a different one means the old
    /// ids are meaningless and the body must be packed afresh.
    pub session_id: i64,
    /// Connection generation the entry was written on.
    pub generation: u64,
    tx:             oneshot::Sender<Reply>,
}

impl Pending {
    pub fn new(
        request_id: u64,
        seq_no:     i32,
        body:       Vec<u8>,
        session_id: i64,
        generation: u64,
        tx:         oneshot::Sender<Reply>,
    ) -> Self {
        Self { request_id, seq_no, body, session_id, generation, tx }
    }

    /// Deliver the reply. A caller that already gave up simply never sees it.
    pub fn complete(self, reply: Reply) {
        let _ = self.tx.send(reply);
    }
}

#[derive(Default)]
pub(crate) struct PendingTable {
    by_msg:     HashMap<i64, Pending>,
    by_request: HashMap<u64, i64>,
}

impl PendingTable {
    pub fn insert(&mut self, msg_id: i64, entry: Pending) {
        self.by_request.insert(entry.request_id, msg_id);
        self.by_msg.insert(msg_id, entry);
    }

    /// Remove the entry sent under `msg_id`, if any.
    pub fn take(&mut self, msg_id: i64) -> Option<Pending> {
        let entry = self.by_msg.remove(&msg_id)?;
        self.by_request.remove(&entry.request_id);
        Some(entry)
    }

    /// Complete and remove the entry sent under `msg_id`. Returns `false`
    /// when nothing was waiting for it (late or duplicate answer).
    pub fn resolve(&mut self, msg_id: i64, reply: Reply) -> bool {
        match self.take(msg_id) {
            Some(entry) => {
                entry.complete(reply);
                true
            }
            None => false,
        }
    }

    pub fn remove_request(&mut self, request_id: u64) -> bool {
        match self.by_request.remove(&request_id) {
            Some(msg_id) => self.by_msg.remove(&msg_id).is_some(),
            None => false,
        }
    }

    /// Message ids of entries not yet written on connection `generation`,
    /// oldest first.
    pub fn stale(&self, generation: u64) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .by_msg
            .iter()
            .filter(|(_, p)| p.generation != generation)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Fail every entry; `error` is called once per entry.
    pub fn fail_all(&mut self, error: impl Fn() -> InvocationError) {
        self.by_request.clear();
        for (_, entry) in self.by_msg.drain() {
            entry.complete(Err(error()));
        }
    }

    pub fn len(&self) -> usize {
        self.by_msg.len()
    }
}

/// Removes the caller's entry when the awaiting future is dropped.
///
/// Already-written bytes stay on the wire; the late answer finds no entry
/// and is discarded.
pub(crate) struct PendingGuard<'a> {
    pub table:      &'a Mutex<PendingTable>,
    pub request_id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).remove_request(self.request_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(request_id: u64, generation: u64) -> (Pending, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        (Pending::new(request_id, 1, vec![1, 2, 3, 4], 99, generation, tx), rx)
    }

    #[test]
    fn resolves_at_most_once() {
        let mut table = PendingTable::default();
        let (e, mut rx) = entry(1, 1);
        table.insert(10, e);

        assert!(table.resolve(10, Ok(vec![7])));
        assert!(!table.resolve(10, Ok(vec![8])));
        assert!(!table.resolve(10, Err(InvocationError::Timeout)));
        assert_eq!(rx.try_recv().unwrap().unwrap(), vec![7]);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn guard_removes_rekeyed_entry() {
        let table = Mutex::new(PendingTable::default());
        let (e, _rx) = entry(5, 1);
        table.lock().unwrap().insert(100, e);

        // Re-sent under a new id after a salt correction.
        let e = table.lock().unwrap().take(100).unwrap();
        table.lock().unwrap().insert(104, e);

        drop(PendingGuard { table: &table, request_id: 5 });
        assert_eq!(table.lock().unwrap().len(), 0);
        assert!(!table.lock().unwrap().resolve(104, Ok(vec![])));
    }

    #[test]
    fn stale_entries_are_listed_in_id_order() {
        let mut table = PendingTable::default();
        let mut rxs = Vec::new();
        for (msg_id, generation) in [(40, 1), (12, 1), (28, 2), (8, 1)] {
            let (e, rx) = entry(msg_id as u64, generation);
            table.insert(msg_id, e);
            rxs.push(rx);
        }
        assert_eq!(table.stale(2), vec![8, 12, 40]);
    }

    #[test]
    fn fail_all_reaches_every_caller() {
        let mut table = PendingTable::default();
        let (a, mut ra) = entry(1, 1);
        let (b, mut rb) = entry(2, 1);
        table.insert(4, a);
        table.insert(8, b);
        table.fail_all(|| InvocationError::ConnectionLost);
        assert!(matches!(ra.try_recv().unwrap(), Err(InvocationError::ConnectionLost)));
        assert!(matches!(rb.try_recv().unwrap(), Err(InvocationError::ConnectionLost)));
        assert_eq!(table.len(), 0);
    }
}
