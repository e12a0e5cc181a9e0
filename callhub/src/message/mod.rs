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

//! Packets, payloads and the addresses they travel between.

pub use address::Address;
pub use delivery_error::DeliveryError;
pub use packet::{Metadata, Packet, PacketHeader, PacketKind, ReportMetadata, RouteMetadata};
pub use payload::{Payload, Text};

mod address;
mod delivery_error;
mod packet;
mod payload;
