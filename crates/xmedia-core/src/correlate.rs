//! Correlator: realm-local mirror of captured records plus pending-waiter
//! bookkeeping, behind one consumer-facing lookup with bounded wait.
//!
//! The mirror is eventually consistent with the interceptor's store and is
//! reconciled only through bridge messages. The loop is the sole mutator, so
//! no locking is needed.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::bridge::{CaptureEvent, CaptureQuery, CorrelatorEnd};
use crate::error::CaptureError;
use crate::model::{CaptureRecord, ContentId};

/// Default bound on how long one lookup may stay pending.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);

enum Command {
    Lookup {
        id: ContentId,
        reply: oneshot::Sender<Option<CaptureRecord>>,
    },
    LookupAll {
        reply: oneshot::Sender<HashMap<ContentId, CaptureRecord>>,
    },
    /// Fired by a wait timer; only honored while the entry it was armed for
    /// is still pending (generation match), so a stale timer from an earlier,
    /// already-resolved registration cannot expire a newer one.
    Expire { id: ContentId, generation: u64 },
}

/// Waiters for one id. All handles are released together, by data or by
/// expiry, and the entry is removed the instant that happens.
struct WaiterEntry {
    generation: u64,
    handles: Vec<oneshot::Sender<Option<CaptureRecord>>>,
}

/// Consumer-facing handle; cheap to clone, usable from any task.
#[derive(Clone)]
pub struct CorrelatorHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl CorrelatorHandle {
    /// Resolves to the record for `id`, or `None` ("not found") after at most
    /// the lookup timeout plus scheduling slack. Never a hard failure.
    pub async fn lookup(&self, id: &str) -> Option<CaptureRecord> {
        let (reply, response) = oneshot::channel();
        let command = Command::Lookup { id: id.to_string(), reply };
        if self.commands.send(command).is_err() {
            return None;
        }
        response.await.unwrap_or(None)
    }

    /// Everything currently mirrored, resolved immediately; triggers no
    /// network activity anywhere.
    pub async fn lookup_all(&self) -> HashMap<ContentId, CaptureRecord> {
        let (reply, response) = oneshot::channel();
        if self.commands.send(Command::LookupAll { reply }).is_err() {
            return HashMap::new();
        }
        response.await.unwrap_or_default()
    }
}

/// Event loop of the consumer realm. Spawn `run()` once per bridge.
pub struct Correlator {
    mirror: HashMap<ContentId, CaptureRecord>,
    waiters: HashMap<ContentId, WaiterEntry>,
    bridge: CorrelatorEnd,
    commands: mpsc::UnboundedReceiver<Command>,
    /// Weak so pending timers never keep the loop alive on their own.
    timer_tx: mpsc::WeakUnboundedSender<Command>,
    lookup_timeout: Duration,
    next_generation: u64,
}

impl Correlator {
    pub fn new(bridge: CorrelatorEnd, lookup_timeout: Duration) -> (Self, CorrelatorHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let correlator = Self {
            mirror: HashMap::new(),
            waiters: HashMap::new(),
            bridge,
            commands: command_rx,
            timer_tx: command_tx.downgrade(),
            lookup_timeout,
            next_generation: 0,
        };
        (correlator, CorrelatorHandle { commands: command_tx })
    }

    /// Runs until every handle is dropped and the bridge is closed.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(command) = self.commands.recv() => self.handle_command(command),
                Some(event) = self.bridge.recv_event() => self.handle_event(event),
                else => break,
            }
        }
        tracing::debug!("correlator loop stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Lookup { id, reply } => self.lookup(id, reply),
            Command::LookupAll { reply } => {
                // Warm the mirror for future calls; full dumps are free of
                // network side effects on the interceptor side.
                self.bridge.send_query(CaptureQuery::All);
                let _ = reply.send(self.mirror.clone());
            }
            Command::Expire { id, generation } => self.expire(id, generation),
        }
    }

    fn lookup(&mut self, id: ContentId, reply: oneshot::Sender<Option<CaptureRecord>>) {
        if let Some(record) = self.mirror.get(&id) {
            let _ = reply.send(Some(record.clone()));
            return;
        }

        let generation = match self.waiters.entry(id.clone()) {
            Entry::Occupied(mut slot) => {
                slot.get_mut().handles.push(reply);
                slot.get().generation
            }
            Entry::Vacant(slot) => {
                self.next_generation += 1;
                let generation = self.next_generation;
                slot.insert(WaiterEntry { generation, handles: vec![reply] });
                generation
            }
        };

        // Each call emits its own fresh query even when one for the same id
        // is already outstanding, and arms its own wait timer.
        self.bridge.send_query(CaptureQuery::ById { id: id.clone() });
        let timer_tx = self.timer_tx.clone();
        let timeout = self.lookup_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(tx) = timer_tx.upgrade() {
                let _ = tx.send(Command::Expire { id, generation });
            }
        });
    }

    fn expire(&mut self, id: ContentId, generation: u64) {
        let live = matches!(
            self.waiters.get(&id),
            Some(entry) if entry.generation == generation
        );
        if !live {
            return;
        }
        if let Some(entry) = self.waiters.remove(&id) {
            tracing::debug!(
                id = %id,
                waiters = entry.handles.len(),
                "{}",
                CaptureError::Timeout
            );
            for handle in entry.handles {
                let _ = handle.send(None);
            }
        }
    }

    fn handle_event(&mut self, event: CaptureEvent) {
        match event {
            // Merge-only: populates future lookups at zero latency, never
            // resurrects or resolves waiters.
            CaptureEvent::Captured { records } => {
                for record in records {
                    self.mirror.insert(record.id.clone(), record);
                }
            }
            CaptureEvent::Response { id, data } => {
                if let Some(record) = &data {
                    self.mirror.insert(id.clone(), record.clone());
                }
                if let Some(entry) = self.waiters.remove(&id) {
                    for handle in entry.handles {
                        let _ = handle.send(data.clone());
                    }
                }
            }
            CaptureEvent::AllRecords { records } => {
                self.mirror.extend(records);
            }
        }
    }
}
