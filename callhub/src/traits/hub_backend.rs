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

//! The decisions a hub delegates.
//!
//! A hub never looks inside a payload. Whether a packet is a request or a reply, which
//! child should service it, how to rephrase it for that child, and whether a child's
//! answer means success are all answered by a [`HubBackend`]. Each call is a suspension
//! point and may be slow (a model call, a remote lookup), so the hub holds no locks across
//! them.

use std::fmt;

use async_trait::async_trait;
use derive_new::new;

use crate::message::{Packet, Payload};
use crate::server::{CallRecord, CallStatus, ErrorKind};

/// How the hub should treat an inbound packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// A new call to route down the tree.
    Request,
    /// A report from a child about a call this hub routed.
    Reply,
}

/// What a child's report means for the call it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnResult {
    /// The child completed the call.
    Success,
    /// The child ran the call and it failed.
    Failure,
}

impl From<ReturnResult> for CallStatus {
    fn from(result: ReturnResult) -> Self {
        match result {
            ReturnResult::Success => CallStatus::Success,
            ReturnResult::Failure => CallStatus::Failure,
        }
    }
}

/// A decision the backend could not make, with optional context for the error report.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Undetermined<P: Payload> {
    /// Details to pass to the error formatter.
    pub context: Option<P>,
}

impl<P: Payload> Undetermined<P> {
    /// An undetermined outcome with no context.
    #[must_use]
    pub fn bare() -> Self {
        Self { context: None }
    }
}

impl<P: Payload> fmt::Display for Undetermined<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "Undetermined: {context:?}"),
            None => write!(f, "Undetermined"),
        }
    }
}

/// The outcome of a fallible decision.
pub type Decision<T, P> = Result<T, Undetermined<P>>;

/// The outcome of handler selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<P: Payload> {
    /// Index into the candidate descriptions.
    Matched(usize),
    /// No candidate can service the request.
    NoMatch,
    /// Selection itself failed, with optional context.
    Failed(Option<P>),
}

/// The pluggable decision functions of an [`ApiHub`](crate::server::ApiHub).
#[async_trait]
pub trait HubBackend<P: Payload>: Send + Sync + 'static {
    /// Classifies an inbound packet.
    async fn determine_message_type(&self, packet: &Packet<P>) -> Decision<MessageType, P>;

    /// Produces the description stored in the new call record.
    async fn summarize_request(&self, payload: &P) -> P;

    /// Picks the child that should service `payload` from the candidate descriptions.
    async fn select_handler(&self, payload: &P, candidates: &[P]) -> Selection<P>;

    /// Rephrases `payload` for the child described by `child`.
    async fn format_request_for_child(&self, payload: &P, child: &P) -> P;

    /// Rephrases a child's report for the caller of `record`.
    async fn format_return_for_parent(&self, payload: &P, record: &CallRecord<P>) -> P;

    /// Decides whether a child's report completes `record` with success or failure.
    async fn determine_return_result(
        &self,
        payload: &P,
        record: &CallRecord<P>,
    ) -> Decision<ReturnResult, P>;

    /// Renders an error report.
    async fn format_error(&self, kind: ErrorKind, context: Option<&P>) -> P;
}
