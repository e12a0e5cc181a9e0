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

use tokio::sync::mpsc::error::SendError;

use crate::message::Address;

/// Why a packet could not be handed to its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// No process is registered at this address.
    UnknownAddress(Address),
    /// The process exists but its inbox no longer accepts packets.
    InboxClosed(Address),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::UnknownAddress(address) => {
                write!(f, "No process registered at {address}")
            }
            DeliveryError::InboxClosed(address) => {
                write!(f, "Inbox of {address} is closed")
            }
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Converts a failed channel send into [`DeliveryError::InboxClosed`] for `address`.
impl<T> From<(SendError<T>, &Address)> for DeliveryError {
    fn from((_, address): (SendError<T>, &Address)) -> Self {
        DeliveryError::InboxClosed(address.clone())
    }
}
