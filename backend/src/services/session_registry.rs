//! In-process registry binding physical devices to challenge orders.
//!
//! Every operation runs inside a single critical section, so a reader never
//! observes a forward record without its reverse mapping (or the other way
//! round), and a completed `attach_asset` is visible to every later lookup.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::{
    models::device_session::{AssetRef, DeviceSession, SessionStatus},
    types::{DeviceId, OrderId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No forward or reverse mapping exists, whether the session never
    /// existed or was already removed.
    #[error("session not active")]
    NotFound,
}

#[derive(Debug, Default)]
struct RegistryState {
    sessions: HashMap<OrderId, DeviceSession>,
    devices: HashMap<DeviceId, OrderId>,
}

impl RegistryState {
    /// Drops the session and every reverse mapping still pointing at it.
    ///
    /// An order rebound to another device leaves the earlier device mapped to
    /// the same order, so more than one entry can match.
    fn remove(&mut self, order_id: OrderId) -> Option<DeviceSession> {
        let session = self.sessions.remove(&order_id)?;
        self.devices.retain(|_, mapped| *mapped != order_id);
        Some(session)
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    state: Mutex<RegistryState>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // Critical sections never leave the maps half-updated.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Binds `device_id` to `order_id`, last writer wins.
    ///
    /// A previous session for the same order is replaced. A previous session
    /// of the same device under another order stays resolvable by its order
    /// id but is no longer reachable through the device.
    pub fn create_session(&self, device_id: DeviceId, order_id: OrderId) -> DeviceSession {
        self.create_session_at(device_id, order_id, Utc::now())
    }

    pub fn create_session_at(
        &self,
        device_id: DeviceId,
        order_id: OrderId,
        now: DateTime<Utc>,
    ) -> DeviceSession {
        let session = DeviceSession::new(device_id, order_id, now);
        let mut state = self.lock();
        state.sessions.insert(order_id, session.clone());
        let superseded = state.devices.insert(device_id, order_id);
        drop(state);

        match superseded {
            Some(old) if old != order_id => tracing::info!(
                %device_id,
                %order_id,
                orphaned_order_id = %old,
                "Rebound device to new order"
            ),
            _ => tracing::info!(%device_id, %order_id, "Mapped device to order"),
        }
        session
    }

    pub fn resolve_device(&self, device_id: DeviceId) -> Result<OrderId, SessionError> {
        self.lock()
            .devices
            .get(&device_id)
            .copied()
            .ok_or(SessionError::NotFound)
    }

    /// Direct order lookup, independent of the device mapping.
    pub fn get_session(&self, order_id: OrderId) -> Result<DeviceSession, SessionError> {
        self.lock()
            .sessions
            .get(&order_id)
            .cloned()
            .ok_or(SessionError::NotFound)
    }

    /// Attaches a written asset to an existing session.
    ///
    /// The stored record is replaced by an updated copy; nothing is inserted
    /// when the session is absent.
    pub fn attach_asset(
        &self,
        order_id: OrderId,
        asset_ref: AssetRef,
    ) -> Result<DeviceSession, SessionError> {
        let mut state = self.lock();
        let updated = state
            .sessions
            .get(&order_id)
            .ok_or(SessionError::NotFound)?
            .with_asset(asset_ref);
        state.sessions.insert(order_id, updated.clone());
        Ok(updated)
    }

    /// Returns the attached asset, or the shared default script.
    pub fn lookup_asset(&self, order_id: OrderId) -> AssetRef {
        self.lock()
            .sessions
            .get(&order_id)
            .and_then(|s| s.asset_ref.clone())
            .unwrap_or_default()
    }

    /// Removes a session. Deleting an absent order is a no-op returning `None`.
    pub fn delete_session(&self, order_id: OrderId) -> Option<AssetRef> {
        let removed = self.lock().remove(order_id)?;
        let completed = removed.with_status(SessionStatus::Completed);
        tracing::info!(
            device_id = %completed.device_id,
            order_id = %completed.order_id,
            status = completed.status.as_str(),
            "Removed device session"
        );
        completed.asset_ref
    }

    /// Removes every session created at least `max_age` before `now`.
    ///
    /// Separate from the core contract; only the optional sweeper calls it.
    pub fn expire_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> Vec<DeviceSession> {
        let mut state = self.lock();
        let stale: Vec<OrderId> = state
            .sessions
            .values()
            .filter(|s| s.is_expired_at(now, max_age))
            .map(|s| s.order_id)
            .collect();
        stale
            .into_iter()
            .filter_map(|order_id| state.remove(order_id))
            .map(|s| s.with_status(SessionStatus::Expired))
            .collect()
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }
}
