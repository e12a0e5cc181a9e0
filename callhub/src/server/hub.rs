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

use async_trait::async_trait;
use tracing::{error, instrument, trace, warn};

use crate::message::{Packet, Payload};
use crate::process::ProcessContext;
use crate::server::{CallRecord, CallRecordTable, CallStatus, ErrorKind, ReferenceTable, TableError};
use crate::traits::{ApiServer, HubBackend, MessageType, Process, Selection, Undetermined};

/// A router: it services nothing itself, it forwards each request to one child and relays
/// the child's report back to whoever asked.
///
/// Every request gets a [`CallRecord`] the moment it is accepted. The record's id travels
/// down with the forwarded request and comes back in the child's report, which is how the
/// hub finds the original sender again. Nesting hubs chains these records one hop at a
/// time: each hub only knows its immediate parent's id.
///
/// All decisions about payload content are delegated to the [`HubBackend`].
#[derive(Debug)]
pub struct ApiHub<P: Payload, B: HubBackend<P>> {
    references: ReferenceTable<P>,
    backend: B,
    call_records: CallRecordTable<P>,
}

impl<P: Payload, B: HubBackend<P>> ApiHub<P, B> {
    /// Creates a hub that dispatches to the children in `references`.
    pub fn new(references: ReferenceTable<P>, backend: B) -> Self {
        Self {
            references,
            backend,
            call_records: CallRecordTable::new(),
        }
    }

    /// The children this hub dispatches to.
    #[inline]
    #[must_use]
    pub const fn references(&self) -> &ReferenceTable<P> {
        &self.references
    }

    /// The decision functions driving this hub.
    #[inline]
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    async fn reject_unclassified(
        &self,
        packet: Packet<P>,
        undetermined: Undetermined<P>,
        ctx: &ProcessContext<P>,
    ) {
        if packet.report().and_then(|report| report.fault).is_some() {
            warn!(sender = %packet.sender(), "Dropping unclassifiable error report");
            return;
        }
        warn!(sender = %packet.sender(), "Could not determine message type");
        let kind = ErrorKind::MessageTypeUndetermined;
        let error = self
            .backend
            .format_error(kind, undetermined.context.as_ref())
            .await;
        let reply = Packet::fault(ctx.address().clone(), error, packet.route_call_id(), kind);
        ctx.send_reply(reply, packet.sender()).await;
    }

    async fn handle_request(&self, packet: Packet<P>, ctx: &ProcessContext<P>) {
        let payload = packet.payload();
        let description = self.backend.summarize_request(payload).await;
        let record =
            self.call_records
                .create_entry(description, packet.sender().clone(), packet.route_call_id());
        trace!(id = %record.id(), parent = ?record.parent_id(), "Accepted request");

        let candidates = self.references.descriptions();
        let entry = match self.backend.select_handler(payload, &candidates).await {
            Selection::Matched(index) => {
                if let Some(entry) = self.references.get(index) {
                    entry
                } else {
                    error!(
                        index,
                        candidates = candidates.len(),
                        "Handler selector returned an index outside the candidate list"
                    );
                    self.fail_request(&record, ErrorKind::HandlerNotFound, None, ctx)
                        .await;
                    return;
                }
            }
            Selection::NoMatch => {
                trace!(id = %record.id(), "No handler matched");
                self.fail_request(&record, ErrorKind::HandlerNotFound, None, ctx)
                    .await;
                return;
            }
            Selection::Failed(context) => {
                warn!(id = %record.id(), "Handler selection failed");
                self.fail_request(&record, ErrorKind::HandlerNotFound, context.as_ref(), ctx)
                    .await;
                return;
            }
        };

        let request = self
            .backend
            .format_request_for_child(payload, &entry.description)
            .await;

        // A fast child may answer before the send returns, so the record is RUNNING first.
        if let Err(e) = self.call_records.transition(record.id(), CallStatus::Running) {
            error!("Could not mark {} as running: {e}", record.id());
            return;
        }

        let forward = Packet::routed_request(ctx.address().clone(), request, record.id());
        match ctx.send(forward, &entry.address).await {
            Ok(()) => trace!(id = %record.id(), child = %entry.address, "Forwarded request"),
            Err(e) => {
                warn!(id = %record.id(), "Could not forward request: {e}");
                let detail = P::from_text(&e.to_string());
                self.fail_request(&record, ErrorKind::ExecutionError, Some(&detail), ctx)
                    .await;
            }
        }
    }

    /// Ends a request that could not be dispatched and tells its sender why.
    async fn fail_request(
        &self,
        record: &CallRecord<P>,
        kind: ErrorKind,
        context: Option<&P>,
        ctx: &ProcessContext<P>,
    ) {
        if let Err(e) = self.call_records.transition(record.id(), CallStatus::Failure) {
            error!("Could not mark {} as failed: {e}", record.id());
        }
        let error = self.backend.format_error(kind, context).await;
        let reply = Packet::fault(ctx.address().clone(), error, record.parent_id(), kind);
        ctx.send_reply(reply, record.sender()).await;
    }

    async fn handle_reply(&self, packet: Packet<P>, ctx: &ProcessContext<P>) {
        let (upstream, fault) = packet
            .report()
            .map_or((None, None), |report| (report.upstream_call_id, report.fault));

        let Some(id) = upstream else {
            self.reject_reply(&packet, ErrorKind::CallRecordNotMatched, fault.is_some(), ctx)
                .await;
            return;
        };

        let record = match self.call_records.claim_reply(id) {
            Ok(record) => record,
            Err(TableError::NotFound(_)) => {
                self.reject_reply(&packet, ErrorKind::CallRecordNotMatched, fault.is_some(), ctx)
                    .await;
                return;
            }
            Err(e) => {
                warn!(sender = %packet.sender(), "{e}");
                self.reject_reply(&packet, ErrorKind::ProtocolViolation, fault.is_some(), ctx)
                    .await;
                return;
            }
        };

        match self
            .backend
            .determine_return_result(packet.payload(), &record)
            .await
        {
            Ok(result) => {
                let settled = match self.call_records.settle(id, result.into()) {
                    Ok(settled) => settled,
                    Err(e) => {
                        error!("Could not settle {id}: {e}");
                        return;
                    }
                };
                trace!(%id, status = %settled.status(), "Call completed");
                let message = self
                    .backend
                    .format_return_for_parent(packet.payload(), &settled)
                    .await;
                let reply = Packet::reply(ctx.address().clone(), message, settled.parent_id());
                ctx.send_reply(reply, settled.sender()).await;
            }
            Err(undetermined) => {
                if let Err(e) = self.call_records.release(id) {
                    error!("Could not release {id}: {e}");
                }
                warn!(%id, "Could not determine the result of a child's report");
                let kind = ErrorKind::ReturnResultTypeUndetermined;
                let error = self
                    .backend
                    .format_error(kind, undetermined.context.as_ref())
                    .await;
                let reply = Packet::fault(ctx.address().clone(), error, None, kind);
                ctx.send_reply(reply, packet.sender()).await;
            }
        }
    }

    /// Answers a reply that cannot be applied to any running record.
    ///
    /// An unmatched reply that is itself an error report is dropped, otherwise two hubs
    /// could keep answering each other's errors.
    async fn reject_reply(
        &self,
        packet: &Packet<P>,
        kind: ErrorKind,
        is_fault: bool,
        ctx: &ProcessContext<P>,
    ) {
        if is_fault && kind == ErrorKind::CallRecordNotMatched {
            warn!(sender = %packet.sender(), "Dropping unmatched error report");
            return;
        }
        warn!(sender = %packet.sender(), %kind, "Rejecting reply");
        let error = self.backend.format_error(kind, None).await;
        let reply = Packet::fault(ctx.address().clone(), error, None, kind);
        ctx.send_reply(reply, packet.sender()).await;
    }
}

impl<P: Payload, B: HubBackend<P>> ApiServer<P> for ApiHub<P, B> {
    fn call_records(&self) -> &CallRecordTable<P> {
        &self.call_records
    }
}

#[async_trait]
impl<P: Payload, B: HubBackend<P>> Process<P> for ApiHub<P, B> {
    #[instrument(skip_all, fields(hub = %ctx.address(), kind = %packet.kind()))]
    async fn process_message(&self, packet: Packet<P>, ctx: &ProcessContext<P>) {
        match self.backend.determine_message_type(&packet).await {
            Ok(MessageType::Request) => self.handle_request(packet, ctx).await,
            Ok(MessageType::Reply) => self.handle_reply(packet, ctx).await,
            Err(undetermined) => self.reject_unclassified(packet, undetermined, ctx).await,
        }
    }
}
