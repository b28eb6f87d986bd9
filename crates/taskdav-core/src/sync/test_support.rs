//! In-memory collaborators for reconciler tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use tokio::time::Instant;

use crate::error::InventoryError;
use crate::notify::{Notifier, Severity};
use crate::sync::calendar_client::RemoteStore;
use crate::sync::types::{RemoteError, ResourceId};
use crate::task::{Task, TaskInventory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upsert(String),
    Delete(String),
}

/// Remote calendar kept in a map; selected resources can be made to fail.
#[derive(Default)]
pub struct FakeRemote {
    pub resources: RefCell<BTreeMap<String, String>>,
    pub calls: RefCell<Vec<(Call, Instant)>>,
    pub rejecting: RefCell<HashSet<String>>,
}

impl FakeRemote {
    pub fn reject(&self, resource: &str) {
        self.rejecting.borrow_mut().insert(resource.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().iter().map(|(call, _)| call.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.borrow().iter().map(|(_, at)| *at).collect()
    }

    pub fn resource_names(&self) -> Vec<String> {
        self.resources.borrow().keys().cloned().collect()
    }

    fn check(&self, resource: &ResourceId) -> Result<(), RemoteError> {
        if self.rejecting.borrow().contains(resource.as_str()) {
            return Err(RemoteError::Rejected {
                status: 500,
                body: "boom".into(),
            });
        }
        Ok(())
    }
}

impl RemoteStore for FakeRemote {
    async fn upsert(&self, resource: &ResourceId, document: &str) -> Result<(), RemoteError> {
        self.calls
            .borrow_mut()
            .push((Call::Upsert(resource.to_string()), Instant::now()));
        self.check(resource)?;
        self.resources
            .borrow_mut()
            .insert(resource.to_string(), document.to_string());
        Ok(())
    }

    async fn delete(&self, resource: &ResourceId) -> Result<(), RemoteError> {
        self.calls
            .borrow_mut()
            .push((Call::Delete(resource.to_string()), Instant::now()));
        self.check(resource)?;
        self.resources.borrow_mut().remove(resource.as_str());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .borrow_mut()
            .push((message.to_string(), severity));
    }
}

/// Inventory that is always unavailable.
pub struct BrokenInventory;

impl TaskInventory for BrokenInventory {
    fn list(&self) -> Result<Vec<Task>, InventoryError> {
        Err(InventoryError::Custom("host went away".into()))
    }
}
