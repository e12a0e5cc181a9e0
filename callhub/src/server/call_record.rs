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

use std::fmt;

use crate::message::{Address, Payload};

/// Identifies a [`CallRecord`] within the table that created it.
///
/// Ids are only meaningful to the server that allocated them. A hub forwarding a request
/// puts its own id into the outbound [`RouteMetadata`](crate::message::RouteMetadata) so
/// the child can address the eventual reply back to that record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(u64);

impl CallId {
    /// Wraps a raw id value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw id value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call#{}", self.0)
    }
}

/// Where a call is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallStatus {
    /// Accepted, no dispatch decision yet.
    #[default]
    Unhandled,
    /// Handed to a child and waiting for its report.
    Running,
    /// Completed successfully.
    Success,
    /// Completed with a failure, or never dispatched.
    Failure,
}

impl CallStatus {
    /// Returns `true` if moving from `self` to `to` is one of the four legal transitions:
    /// `Unhandled -> Running`, `Unhandled -> Failure`, `Running -> Success` and
    /// `Running -> Failure`.
    #[must_use]
    pub const fn can_transition_to(self, to: CallStatus) -> bool {
        matches!(
            (self, to),
            (CallStatus::Unhandled, CallStatus::Running)
                | (CallStatus::Unhandled, CallStatus::Failure)
                | (CallStatus::Running, CallStatus::Success)
                | (CallStatus::Running, CallStatus::Failure)
        )
    }

    /// Returns `true` for `Success` and `Failure`. Nothing leaves a terminal status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, CallStatus::Success | CallStatus::Failure)
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallStatus::Unhandled => write!(f, "UNHANDLED"),
            CallStatus::Running => write!(f, "RUNNING"),
            CallStatus::Success => write!(f, "SUCCESS"),
            CallStatus::Failure => write!(f, "FAILURE"),
        }
    }
}

/// One accepted call, as tracked by the server that accepted it.
///
/// `id`, `parent_id`, `description` and `sender` are fixed at creation. Only `status`
/// changes afterwards, and only through the owning
/// [`CallRecordTable`](crate::server::CallRecordTable).
#[derive(Debug, Clone)]
pub struct CallRecord<P: Payload> {
    id: CallId,
    parent_id: Option<CallId>,
    description: P,
    sender: Address,
    status: CallStatus,
    pub(crate) settling: bool,
}

impl<P: Payload> CallRecord<P> {
    pub(crate) fn new(
        id: CallId,
        parent_id: Option<CallId>,
        description: P,
        sender: Address,
    ) -> Self {
        Self {
            id,
            parent_id,
            description,
            sender,
            status: CallStatus::Unhandled,
            settling: false,
        }
    }

    /// This record's id, unique within its table.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> CallId {
        self.id
    }

    /// The caller's own record id, copied from the inbound route metadata.
    #[inline]
    #[must_use]
    pub const fn parent_id(&self) -> Option<CallId> {
        self.parent_id
    }

    /// The backend's summary of the request.
    #[inline]
    #[must_use]
    pub const fn description(&self) -> &P {
        &self.description
    }

    /// Who receives the eventual reply.
    #[inline]
    #[must_use]
    pub const fn sender(&self) -> &Address {
        &self.sender
    }

    /// The status at the time this copy was taken.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> CallStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: CallStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_four_transitions_are_legal() {
        use CallStatus::*;
        let all = [Unhandled, Running, Success, Failure];
        let legal: Vec<_> = all
            .iter()
            .flat_map(|from| all.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .collect();

        assert_eq!(
            legal,
            vec![
                (Unhandled, Running),
                (Unhandled, Failure),
                (Running, Success),
                (Running, Failure),
            ]
        );
        assert!(Success.is_terminal() && Failure.is_terminal());
        assert!(!Running.is_terminal());
    }
}
