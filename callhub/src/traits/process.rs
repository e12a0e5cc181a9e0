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

use crate::message::{Packet, Payload};
use crate::process::ProcessContext;

/// Behavior of a process spawned on a [`SystemServer`](crate::common::SystemServer).
///
/// `process_message` runs on its own task for every packet the process accepts, so
/// several calls may be in flight at once. Implementations keep their state behind
/// `&self` with interior mutability.
#[async_trait]
pub trait Process<P: Payload>: Send + Sync + 'static {
    /// Handles one packet.
    async fn process_message(&self, packet: Packet<P>, ctx: &ProcessContext<P>);
}
