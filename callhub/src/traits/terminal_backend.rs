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

use async_trait::async_trait;

use crate::message::Payload;

/// Why a terminal server could not complete a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalErrorKind {
    /// The request could not be turned into arguments.
    InvalidArguments,
    /// The call ran and failed.
    ExecutionError,
}

impl fmt::Display for TerminalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalErrorKind::InvalidArguments => write!(f, "INVALID_ARGUMENTS"),
            TerminalErrorKind::ExecutionError => write!(f, "EXECUTION_ERROR"),
        }
    }
}

/// The work a [`TerminalServer`](crate::server::TerminalServer) performs.
#[async_trait]
pub trait TerminalBackend<P: Payload>: Send + Sync + 'static {
    /// Parsed form of a request.
    type Arguments: Send + 'static;

    /// Produces the description stored in the call record. Defaults to the payload itself.
    async fn summarize_request(&self, payload: &P) -> P {
        payload.clone()
    }

    /// Turns a request into arguments, or explains why it cannot.
    async fn parse_arguments(&self, payload: &P) -> Result<Self::Arguments, P>;

    /// Performs the call. `Ok` is the report, `Err` the failure detail.
    async fn execute(&self, arguments: Self::Arguments) -> Result<P, P>;

    /// Renders an error report from a failure detail.
    async fn format_error(&self, kind: TerminalErrorKind, detail: &P) -> P;
}
