//! Minor-number table for registered boards.
//!
//! Slots are handed out lowest-first inside
//! `minor_base .. minor_base + capacity`; a freed minor is reused by the
//! next attach.

use std::sync::Arc;

use crate::app::commands::BusKey;
use crate::device::DeviceSession;
use crate::error::{Error, Result};
use crate::protocol::BulkTransport;

pub(crate) struct Entry<T: BulkTransport> {
    pub key: BusKey,
    pub session: Arc<DeviceSession<T>>,
}

pub(crate) struct Registry<T: BulkTransport> {
    base: u8,
    slots: Vec<Option<Entry<T>>>,
}

impl<T: BulkTransport> Registry<T> {
    pub fn new(base: u8, capacity: u8) -> Self {
        Self {
            base,
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    /// Register `session` under the lowest free minor.
    pub fn register(&mut self, key: BusKey, session: Arc<DeviceSession<T>>) -> Result<u8> {
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(Error::ResourceExhausted)?;
        self.slots[index] = Some(Entry { key, session });
        Ok(self.base + index as u8)
    }

    pub fn contains_key(&self, key: &BusKey) -> bool {
        self.entries().any(|(_, e)| &e.key == key)
    }

    pub fn lookup(&self, minor: u8) -> Option<&Arc<DeviceSession<T>>> {
        let index = usize::from(minor.checked_sub(self.base)?);
        self.slots.get(index)?.as_ref().map(|e| &e.session)
    }

    /// Remove the entry for `key`, returning its minor and the registry's
    /// reference to the session.
    pub fn remove(&mut self, key: &BusKey) -> Option<(u8, Arc<DeviceSession<T>>)> {
        let index = self
            .slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|e| &e.key == key))?;
        let entry = self.slots[index].take()?;
        Some((self.base + index as u8, entry.session))
    }

    /// Empty the table, handing back every registered session.
    pub fn drain(&mut self) -> Vec<(u8, Arc<DeviceSession<T>>)> {
        let base = self.base;
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.take().map(|e| (base + i as u8, e.session)))
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = (u8, &Entry<T>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|e| (self.base + i as u8, e)))
    }
}
