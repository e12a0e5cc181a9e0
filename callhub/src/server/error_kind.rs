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

use crate::server::{CallId, CallStatus};

/// The failures a hub reports back to the sender of the packet that caused them.
///
/// None of these stop the hub. Each is turned into a payload by the backend's error
/// formatter and sent as a REPLY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend could not tell whether a packet is a request or a reply.
    MessageTypeUndetermined,
    /// No child can service the request, or selection itself failed.
    HandlerNotFound,
    /// A reply names no record, or a record this hub never created.
    CallRecordNotMatched,
    /// The call could not be carried out.
    ExecutionError,
    /// The backend could not tell whether a child's report means success or failure.
    ReturnResultTypeUndetermined,
    /// A reply arrived for a record that is not waiting for one.
    ProtocolViolation,
}

impl ErrorKind {
    /// The stable wire code for this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            ErrorKind::MessageTypeUndetermined => "FAILED_TO_DETERMINE_MESSAGE_TYPE",
            ErrorKind::HandlerNotFound => "FAILED_TO_FIND_HANDLER",
            ErrorKind::CallRecordNotMatched => "FAILED_TO_MATCH_API_CALL_RECORD",
            ErrorKind::ExecutionError => "EXECUTION_ERROR",
            ErrorKind::ReturnResultTypeUndetermined => {
                "FAILED_TO_DETERMINE_CHILD_SERVER_RETURN_RESULT_TYPE"
            }
            ErrorKind::ProtocolViolation => "PROTOCOL_VIOLATION",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Rejected operations on a [`CallRecordTable`](crate::server::CallRecordTable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// No record with this id exists.
    NotFound(CallId),
    /// The move is not one of the four legal transitions.
    IllegalTransition {
        /// The record.
        id: CallId,
        /// Its current status.
        from: CallStatus,
        /// The rejected target status.
        to: CallStatus,
    },
    /// A reply was claimed for a record that is not running.
    NotRunning {
        /// The record.
        id: CallId,
        /// Its current status.
        status: CallStatus,
    },
    /// Another reply already claimed this record.
    AlreadySettling(CallId),
    /// Settle or release was called without a prior claim.
    NotClaimed(CallId),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::NotFound(id) => write!(f, "No call record with id {id}"),
            TableError::IllegalTransition { id, from, to } => {
                write!(f, "Illegal transition of {id} from {from} to {to}")
            }
            TableError::NotRunning { id, status } => {
                write!(f, "Record {id} is {status}, not RUNNING")
            }
            TableError::AlreadySettling(id) => {
                write!(f, "Record {id} is already being settled by another reply")
            }
            TableError::NotClaimed(id) => write!(f, "Record {id} was not claimed"),
        }
    }
}

impl std::error::Error for TableError {}
