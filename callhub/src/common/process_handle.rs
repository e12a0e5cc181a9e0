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

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{instrument, trace, warn};

use crate::common::types::Outbox;
use crate::message::{Address, DeliveryError, Packet, Payload};

/// The external face of a running process.
///
/// A handle is cheap to clone. It can enqueue packets and stop the process, nothing more:
/// processes never reach into each other's state.
#[derive(Debug, Clone)]
pub struct ProcessHandle<P: Payload> {
    address: Address,
    outbox: Outbox<P>,
    tracker: TaskTracker,
    cancellation_token: CancellationToken,
    shutdown_timeout: Duration,
}

impl<P: Payload> ProcessHandle<P> {
    pub(crate) fn new(
        address: Address,
        outbox: Outbox<P>,
        tracker: TaskTracker,
        cancellation_token: CancellationToken,
        shutdown_timeout: Duration,
    ) -> Self {
        Self {
            address,
            outbox,
            tracker,
            cancellation_token,
            shutdown_timeout,
        }
    }

    /// The address this process was registered under.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// Enqueues `packet` for the process.
    ///
    /// Resolves as soon as the packet is in the inbox. Processing happens later on a task
    /// of its own, so this never waits for the packet's effects.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::InboxClosed`] if the process has stopped.
    #[instrument(skip(self, packet), fields(process = %self.address, kind = %packet.kind()))]
    pub async fn handle_message(&self, packet: Packet<P>) -> Result<(), DeliveryError> {
        self.outbox
            .send(packet)
            .await
            .map_err(|e| DeliveryError::from((e, &self.address)))?;
        trace!("Packet accepted");
        Ok(())
    }

    /// Returns `true` once the process no longer accepts packets.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.outbox.is_closed()
    }

    /// Stops the process.
    ///
    /// Sends END, then waits for the inbox to drain and every in-flight packet task to
    /// finish. If that takes longer than the configured process shutdown timeout the
    /// process is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout expired and the process had to be cancelled.
    #[instrument(skip(self), fields(process = %self.address))]
    pub async fn stop(&self) -> anyhow::Result<()> {
        let graceful = async {
            if self.outbox.send(Packet::end(self.address.clone())).await.is_err() {
                trace!("Inbox already closed");
            }
            self.tracker.close();
            self.tracker.wait().await;
        };

        if tokio::time::timeout(self.shutdown_timeout, graceful)
            .await
            .is_err()
        {
            warn!(
                "Process did not stop within {} ms, cancelling",
                self.shutdown_timeout.as_millis()
            );
            self.cancellation_token.cancel();
            return Err(anyhow::anyhow!(
                "Timeout while waiting for {} to stop after {} ms",
                self.address,
                self.shutdown_timeout.as_millis()
            ));
        }

        trace!("Process stopped");
        Ok(())
    }
}
