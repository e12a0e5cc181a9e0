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

use tracing::error;

use crate::common::SystemServer;
use crate::message::{Address, DeliveryError, Packet, Payload};

/// What a process can see of the world while handling a packet: its own address and the
/// transport.
#[derive(Debug, Clone)]
pub struct ProcessContext<P: Payload> {
    address: Address,
    system: SystemServer<P>,
}

impl<P: Payload> ProcessContext<P> {
    pub(crate) fn new(address: Address, system: SystemServer<P>) -> Self {
        Self { address, system }
    }

    /// The address of the process handling the packet.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// The transport this process was spawned on.
    #[inline]
    #[must_use]
    pub const fn system(&self) -> &SystemServer<P> {
        &self.system
    }

    /// Sends `packet` to `to`. Resolves once the destination has queued it.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] if the destination is unknown or stopped.
    pub async fn send(&self, packet: Packet<P>, to: &Address) -> Result<(), DeliveryError> {
        self.system.send_message(packet, to).await
    }

    /// Sends a reply and logs a failure instead of returning it.
    ///
    /// Replies have nowhere further to report a delivery problem.
    pub async fn send_reply(&self, packet: Packet<P>, to: &Address) {
        if let Err(e) = self.send(packet, to).await {
            error!(from = %self.address, "Failed to deliver reply: {e}");
        }
    }
}
