//! Single-shot hand-off of a selected bot to the workspace
//!
//! The catalog publishes `(name, xml)` into a one-slot mailbox; the workspace
//! side calls [`HandoffChannel::try_consume`] whenever it might be able to
//! load (typically on every re-render) and the channel makes sure the external
//! load runs at most once per publish.
//!
//! ```text
//!  publish            try_consume            load ok / err
//! ───────▶ Pending ───────────────▶ Consuming ─────────────▶ Empty
//!    ▲        │                                                │
//!    └────────┴──────────── publish (last one wins) ◀──────────┘
//! ```


use crate::error::{FreebotsError, FreebotsResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// What the workspace loader receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub xml_text: String,
    pub display_name: String,
}

/// The external visual workspace
#[async_trait]
pub trait WorkspaceLoader: Send + Sync {
    /// Whether the workspace instance exists and can accept a load
    fn is_ready(&self) -> bool {
        true
    }

    /// Load a bot definition; must not be called twice for the same publish
    async fn load(&self, request: LoadRequest) -> FreebotsResult<()>;
}

/// Observable state of the slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffState {
    Empty,
    Pending { name: String, xml: String },
    Consuming { name: String },
}

/// Result of one [`HandoffChannel::try_consume`] call
#[derive(Debug, Clone)]
pub enum ConsumeOutcome {
    /// The workspace is not available yet; nothing changed
    NotReady,
    /// Nothing was published
    Idle,
    /// Another call is already loading the published bot
    InFlight,
    /// The bot was loaded; the slot is empty again
    Loaded(String),
    /// The load failed; the slot is empty and the bot must be selected again
    Failed { name: String, error: FreebotsError },
}

impl ConsumeOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

#[derive(Debug)]
struct Slot {
    state: HandoffState,
    generation: u64,
    last_consumed: Option<String>,
}

/// One-slot mailbox between the catalog and the workspace
#[derive(Debug)]
pub struct HandoffChannel {
    slot: Mutex<Slot>,
}

impl Default for HandoffChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl HandoffChannel {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                state: HandoffState::Empty,
                generation: 0,
                last_consumed: None,
            }),
        }
    }

    /// Offer a bot for loading, replacing anything not yet consumed
    pub fn publish(&self, name: impl Into<String>, xml: impl Into<String>) {
        let name = name.into();
        let mut slot = self.slot.lock();
        slot.generation += 1;
        debug!(bot = %name, generation = slot.generation, "bot published for hand-off");
        slot.state = HandoffState::Pending {
            name,
            xml: xml.into(),
        };
    }

    /// Empty the slot from outside (e.g. navigation) and forget the last consumed bot
    pub fn clear(&self) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        slot.state = HandoffState::Empty;
        slot.last_consumed = None;
    }

    /// Snapshot of the slot
    pub fn state(&self) -> HandoffState {
        self.slot.lock().state.clone()
    }

    /// Name of the last bot loaded successfully, until a failure or `clear`
    pub fn last_consumed(&self) -> Option<String> {
        self.slot.lock().last_consumed.clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.slot.lock().state, HandoffState::Pending { .. })
    }

    /// Load the pending bot into the workspace if that has not happened yet
    ///
    /// Safe to call as often as the caller likes: the slot moves to
    /// `Consuming` under the lock before the load starts, so concurrent or
    /// repeated calls observe `InFlight` or `Idle` instead of loading twice.
    /// Each publish is loaded at most once; publishing the same bot again
    /// after it was consumed loads it again.
    ///
    /// If this future is dropped mid-load the slot returns to `Empty`.
    pub async fn try_consume(&self, loader: &dyn WorkspaceLoader) -> ConsumeOutcome {
        if !loader.is_ready() {
            return ConsumeOutcome::NotReady;
        }

        let (name, xml, generation) = {
            let mut slot = self.slot.lock();
            match std::mem::replace(&mut slot.state, HandoffState::Empty) {
                HandoffState::Empty => return ConsumeOutcome::Idle,
                consuming @ HandoffState::Consuming { .. } => {
                    slot.state = consuming;
                    return ConsumeOutcome::InFlight;
                }
                HandoffState::Pending { name, xml } => {
                    slot.state = HandoffState::Consuming { name: name.clone() };
                    (name, xml, slot.generation)
                }
            }
        };

        let mut abandon = AbandonGuard {
            channel: self,
            generation,
            armed: true,
        };
        let result = loader
            .load(LoadRequest {
                xml_text: xml,
                display_name: name.clone(),
            })
            .await;
        abandon.armed = false;

        let mut slot = self.slot.lock();
        let still_current = slot.generation == generation;
        match result {
            Ok(()) => {
                if still_current {
                    slot.state = HandoffState::Empty;
                    slot.last_consumed = Some(name.clone());
                }
                info!(bot = %name, "bot loaded into workspace");
                ConsumeOutcome::Loaded(name)
            }
            Err(error) => {
                if still_current {
                    slot.state = HandoffState::Empty;
                }
                slot.last_consumed = None;
                warn!(bot = %name, error = %error, "failed to load bot into workspace");
                ConsumeOutcome::Failed { name, error }
            }
        }
    }
}

/// Empties a slot left in `Consuming` by a `try_consume` future dropped mid-load
struct AbandonGuard<'a> {
    channel: &'a HandoffChannel,
    generation: u64,
    armed: bool,
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut slot = self.channel.slot.lock();
        if slot.generation == self.generation {
            slot.state = HandoffState::Empty;
            slot.last_consumed = None;
            warn!(generation = self.generation, "workspace load abandoned");
        }
    }
}
