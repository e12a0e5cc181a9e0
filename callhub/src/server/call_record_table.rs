/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::trace;

use crate::message::{Address, Payload};
use crate::server::{CallId, CallRecord, CallStatus, TableError};

/// The correlation core of an API server: every call it accepted, keyed by [`CallId`].
///
/// Records are created only by the owning server and are never removed. All operations are
/// synchronous and hold a shard lock only for the duration of the call, so they are safe to
/// use from any number of concurrent packet tasks.
///
/// Reply handling goes through [`claim_reply`](Self::claim_reply), then either
/// [`settle`](Self::settle) or [`release`](Self::release). The claim marks the record as
/// settling, so a second reply for the same call is rejected even while the first is
/// still waiting on its backend.
#[derive(Debug)]
pub struct CallRecordTable<P: Payload> {
    records: DashMap<CallId, CallRecord<P>>,
    next_id: AtomicU64,
}

impl<P: Payload> Default for CallRecordTable<P> {
    fn default() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<P: Payload> CallRecordTable<P> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh id and inserts an `Unhandled` record for it.
    ///
    /// Returns a copy of the inserted record.
    pub fn create_entry(
        &self,
        description: P,
        sender: Address,
        parent_id: Option<CallId>,
    ) -> CallRecord<P> {
        let id = CallId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let record = CallRecord::new(id, parent_id, description, sender);
        self.records.insert(id, record.clone());
        trace!(%id, parent = ?parent_id, "Created call record");
        record
    }

    /// Returns a copy of the record, or `None` if this table never created `id`.
    #[must_use]
    pub fn find_by_id(&self, id: CallId) -> Option<CallRecord<P>> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    /// Moves a record to `to`, rejecting anything outside the legal state machine.
    ///
    /// # Errors
    ///
    /// * [`TableError::NotFound`] if the id is unknown.
    /// * [`TableError::AlreadySettling`] if a reply has claimed the record.
    /// * [`TableError::IllegalTransition`] if the move is not allowed.
    pub fn transition(&self, id: CallId, to: CallStatus) -> Result<CallRecord<P>, TableError> {
        let mut entry = self.records.get_mut(&id).ok_or(TableError::NotFound(id))?;
        let record = entry.value_mut();
        if record.settling {
            return Err(TableError::AlreadySettling(id));
        }
        let from = record.status();
        if !from.can_transition_to(to) {
            return Err(TableError::IllegalTransition { id, from, to });
        }
        record.set_status(to);
        trace!(%id, %from, %to, "Call record transitioned");
        Ok(record.clone())
    }

    /// Claims a running record for the reply that just arrived.
    ///
    /// # Errors
    ///
    /// * [`TableError::NotFound`] if the id is unknown.
    /// * [`TableError::AlreadySettling`] if another reply holds the claim.
    /// * [`TableError::NotRunning`] if the record is not waiting for a reply.
    pub fn claim_reply(&self, id: CallId) -> Result<CallRecord<P>, TableError> {
        let mut entry = self.records.get_mut(&id).ok_or(TableError::NotFound(id))?;
        let record = entry.value_mut();
        if record.settling {
            return Err(TableError::AlreadySettling(id));
        }
        if record.status() != CallStatus::Running {
            return Err(TableError::NotRunning {
                id,
                status: record.status(),
            });
        }
        record.settling = true;
        Ok(record.clone())
    }

    /// Finishes a claimed record with a terminal status and drops the claim.
    ///
    /// # Errors
    ///
    /// * [`TableError::NotFound`] if the id is unknown.
    /// * [`TableError::NotClaimed`] if no reply claimed the record.
    /// * [`TableError::IllegalTransition`] if `to` is not terminal.
    pub fn settle(&self, id: CallId, to: CallStatus) -> Result<CallRecord<P>, TableError> {
        let mut entry = self.records.get_mut(&id).ok_or(TableError::NotFound(id))?;
        let record = entry.value_mut();
        if !record.settling {
            return Err(TableError::NotClaimed(id));
        }
        let from = record.status();
        if !from.can_transition_to(to) {
            return Err(TableError::IllegalTransition { id, from, to });
        }
        record.set_status(to);
        record.settling = false;
        trace!(%id, %from, %to, "Call record settled");
        Ok(record.clone())
    }

    /// Drops a claim without changing the status.
    ///
    /// # Errors
    ///
    /// * [`TableError::NotFound`] if the id is unknown.
    /// * [`TableError::NotClaimed`] if no reply claimed the record.
    pub fn release(&self, id: CallId) -> Result<(), TableError> {
        let mut entry = self.records.get_mut(&id).ok_or(TableError::NotFound(id))?;
        let record = entry.value_mut();
        if !record.settling {
            return Err(TableError::NotClaimed(id));
        }
        record.settling = false;
        Ok(())
    }

    /// Copies every record, ordered by id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CallRecord<P>> {
        let mut records: Vec<_> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(CallRecord::id);
        records
    }

    /// Number of records, terminal ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no call has been accepted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
