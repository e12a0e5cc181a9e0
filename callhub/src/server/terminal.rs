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

use crate::message::{Packet, PacketKind, Payload};
use crate::process::ProcessContext;
use crate::server::{CallId, CallRecordTable, CallStatus, ErrorKind};
use crate::traits::{ApiServer, Process, TerminalBackend, TerminalErrorKind};

/// A leaf server: it carries out calls itself instead of routing them.
///
/// Each request is recorded, parsed and executed through the [`TerminalBackend`], and the
/// outcome is reported to the sender against the sender's own record id. Packets other
/// than requests are logged and ignored.
#[derive(Debug)]
pub struct TerminalServer<P: Payload, B: TerminalBackend<P>> {
    backend: B,
    call_records: CallRecordTable<P>,
}

impl<P: Payload, B: TerminalBackend<P>> TerminalServer<P, B> {
    /// Creates a terminal server with an empty record table.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            call_records: CallRecordTable::new(),
        }
    }

    /// The backend that parses and runs requests.
    #[inline]
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    fn finish(&self, id: CallId, status: CallStatus) {
        if let Err(e) = self.call_records.transition(id, status) {
            error!("Could not move {id} to {status}: {e}");
        }
    }
}

impl<P: Payload, B: TerminalBackend<P>> ApiServer<P> for TerminalServer<P, B> {
    fn call_records(&self) -> &CallRecordTable<P> {
        &self.call_records
    }
}

#[async_trait]
impl<P: Payload, B: TerminalBackend<P>> Process<P> for TerminalServer<P, B> {
    #[instrument(skip_all, fields(server = %ctx.address(), kind = %packet.kind()))]
    async fn process_message(&self, packet: Packet<P>, ctx: &ProcessContext<P>) {
        if packet.kind() != PacketKind::Request {
            warn!(sender = %packet.sender(), "Ignoring non-request packet");
            return;
        }

        let description = self.backend.summarize_request(packet.payload()).await;
        let record =
            self.call_records
                .create_entry(description, packet.sender().clone(), packet.route_call_id());
        let id = record.id();

        let reply = match self.backend.parse_arguments(packet.payload()).await {
            Err(detail) => {
                trace!(%id, "Request arguments rejected");
                self.finish(id, CallStatus::Failure);
                let message = self
                    .backend
                    .format_error(TerminalErrorKind::InvalidArguments, &detail)
                    .await;
                Packet::reply(ctx.address().clone(), message, record.parent_id())
            }
            Ok(arguments) => {
                self.finish(id, CallStatus::Running);
                match self.backend.execute(arguments).await {
                    Ok(report) => {
                        trace!(%id, "Call succeeded");
                        self.finish(id, CallStatus::Success);
                        Packet::reply(ctx.address().clone(), report, record.parent_id())
                    }
                    Err(detail) => {
                        trace!(%id, "Call failed");
                        self.finish(id, CallStatus::Failure);
                        let message = self
                            .backend
                            .format_error(TerminalErrorKind::ExecutionError, &detail)
                            .await;
                        Packet::fault(
                            ctx.address().clone(),
                            message,
                            record.parent_id(),
                            ErrorKind::ExecutionError,
                        )
                    }
                }
            }
        };

        ctx.send_reply(reply, record.sender()).await;
    }
}
