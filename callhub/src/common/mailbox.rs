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

use crate::common::types::Inbox;
use crate::message::{Address, Packet, PacketKind, Payload};

/// A caller-side endpoint with an address and no record table.
///
/// A mailbox sits at the root of a call chain: requests are sent with its address as the
/// sender, and the replies that come back are read with [`recv`](Self::recv). An END
/// packet closes the mailbox; packets already queued can still be read.
#[derive(Debug)]
pub struct Mailbox<P: Payload> {
    address: Address,
    inbox: Inbox<P>,
}

impl<P: Payload> Mailbox<P> {
    pub(crate) fn new(address: Address, inbox: Inbox<P>) -> Self {
        Self { address, inbox }
    }

    /// Where processes send packets meant for this mailbox.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// Waits for the next packet. Returns `None` once the mailbox is closed and drained.
    pub async fn recv(&mut self) -> Option<Packet<P>> {
        loop {
            let packet = self.inbox.recv().await?;
            if packet.kind() == PacketKind::End {
                self.inbox.close();
                continue;
            }
            return Some(packet);
        }
    }

    /// Returns the next packet if one is already queued.
    pub fn try_recv(&mut self) -> Option<Packet<P>> {
        loop {
            let packet = self.inbox.try_recv().ok()?;
            if packet.kind() == PacketKind::End {
                self.inbox.close();
                continue;
            }
            return Some(packet);
        }
    }

    /// Like [`recv`](Self::recv), giving up after `timeout`.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Option<Packet<P>> {
        tokio::time::timeout(timeout, self.recv())
            .await
            .ok()
            .flatten()
    }
}
