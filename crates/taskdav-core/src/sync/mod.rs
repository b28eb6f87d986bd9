//! Remote calendar synchronization.
//!
//! One-way push of tasks into a CalDAV-style calendar collection. Tasks are
//! classified by [`policy`], encoded by [`event_codec`], written through
//! [`calendar_client`], and orchestrated by [`sync_engine`].

pub mod calendar_client;
pub mod event_codec;
pub mod policy;
pub mod sync_engine;
pub mod types;

#[cfg(test)]
mod event_codec_tests;
#[cfg(test)]
mod test_support;

pub use calendar_client::{CalDavClient, RemoteStore};
pub use event_codec::{encode, escape_text, EncodeError, EventTiming, RemoteEvent};
pub use policy::classify;
pub use sync_engine::Reconciler;
pub use types::{
    ItemOutcome, RemoteError, ResourceId, SweepSummary, SyncDecision, SyncError, RESOURCE_PREFIX,
};
