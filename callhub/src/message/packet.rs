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
use std::time::SystemTime;

use derive_new::new;
use static_assertions::assert_impl_all;

use crate::message::{Address, Payload, Text};
use crate::server::{CallId, ErrorKind};

/// What a packet is, as stated by its sender.
///
/// A hub does not trust this for routing; it asks its backend to classify every packet.
/// The kind is still useful to default backends and to the process runtime, which treats
/// [`PacketKind::End`] as a request to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    /// A call request travelling down the tree.
    Request,
    /// A report travelling back up the tree.
    Reply,
    /// Asks the receiving process to stop accepting packets.
    End,
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketKind::Request => write!(f, "REQUEST"),
            PacketKind::Reply => write!(f, "REPLY"),
            PacketKind::End => write!(f, "END"),
        }
    }
}

/// Metadata every packet carries.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct PacketHeader {
    /// The kind declared by the sender.
    pub kind: PacketKind,
    /// Where replies to this packet should go.
    pub sender: Address,
}

/// Correlation data attached to a request forwarded down the tree.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteMetadata {
    /// The forwarding hub's record id for this call.
    pub upstream_call_id: CallId,
}

/// Correlation data attached to a report travelling up the tree.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportMetadata {
    /// The id the receiving hub uses to find its own record.
    ///
    /// `None` when the receiver keeps no record table, e.g. the original caller.
    pub upstream_call_id: Option<CallId>,
    /// Set when this report is an error raised by the routing protocol itself.
    pub fault: Option<ErrorKind>,
}

/// The routing metadata variant a packet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metadata {
    /// Downward correlation.
    Route(RouteMetadata),
    /// Upward correlation.
    Report(ReportMetadata),
    /// No correlation, e.g. a request straight from a caller.
    #[default]
    None,
}

/// A header, a payload and routing metadata. Immutable once built.
#[derive(Debug, Clone)]
pub struct Packet<P: Payload> {
    header: PacketHeader,
    payload: P,
    metadata: Metadata,
    timestamp: SystemTime,
}

impl<P: Payload> Packet<P> {
    /// Builds a packet from its parts.
    pub fn new(header: PacketHeader, payload: P, metadata: Metadata) -> Self {
        Self {
            header,
            payload,
            metadata,
            timestamp: SystemTime::now(),
        }
    }

    /// A request with no routing metadata, as sent by an original caller.
    pub fn request(sender: Address, payload: P) -> Self {
        Self::new(
            PacketHeader::new(PacketKind::Request, sender),
            payload,
            Metadata::None,
        )
    }

    /// A request forwarded by a hub under its record `upstream_call_id`.
    pub fn routed_request(sender: Address, payload: P, upstream_call_id: CallId) -> Self {
        Self::new(
            PacketHeader::new(PacketKind::Request, sender),
            payload,
            Metadata::Route(RouteMetadata::new(upstream_call_id)),
        )
    }

    /// A report addressed to the receiver's record `upstream_call_id`.
    pub fn reply(sender: Address, payload: P, upstream_call_id: Option<CallId>) -> Self {
        Self::new(
            PacketHeader::new(PacketKind::Reply, sender),
            payload,
            Metadata::Report(ReportMetadata::new(upstream_call_id, None)),
        )
    }

    /// An error report raised by the routing protocol.
    pub fn fault(
        sender: Address,
        payload: P,
        upstream_call_id: Option<CallId>,
        kind: ErrorKind,
    ) -> Self {
        Self::new(
            PacketHeader::new(PacketKind::Reply, sender),
            payload,
            Metadata::Report(ReportMetadata::new(upstream_call_id, Some(kind))),
        )
    }

    /// A stop request.
    pub fn end(sender: Address) -> Self {
        Self::new(
            PacketHeader::new(PacketKind::End, sender),
            P::empty(),
            Metadata::None,
        )
    }

    /// Kind and sender.
    #[inline]
    #[must_use]
    pub const fn header(&self) -> &PacketHeader {
        &self.header
    }

    /// The kind declared by the sender.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> PacketKind {
        self.header.kind
    }

    /// Where replies to this packet should go.
    #[inline]
    #[must_use]
    pub const fn sender(&self) -> &Address {
        &self.header.sender
    }

    /// The packet content.
    #[inline]
    #[must_use]
    pub const fn payload(&self) -> &P {
        &self.payload
    }

    /// The routing metadata.
    #[inline]
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// When the packet was built.
    #[inline]
    #[must_use]
    pub const fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// The downward correlation id, if this packet carries [`RouteMetadata`].
    #[must_use]
    pub fn route_call_id(&self) -> Option<CallId> {
        match self.metadata {
            Metadata::Route(route) => Some(route.upstream_call_id),
            _ => None,
        }
    }

    /// The upward correlation data, if this packet carries [`ReportMetadata`].
    #[must_use]
    pub fn report(&self) -> Option<&ReportMetadata> {
        match &self.metadata {
            Metadata::Report(report) => Some(report),
            _ => None,
        }
    }

    /// Consumes the packet and returns its payload.
    #[must_use]
    pub fn into_payload(self) -> P {
        self.payload
    }
}

assert_impl_all!(Packet<Text>: Send, Sync);
