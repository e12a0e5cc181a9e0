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

#![forbid(unsafe_code)]
#![forbid(missing_docs)]

//! # callhub
//!
//! An asynchronous, tree-shaped call router built on Tokio. Processes exchange packets by
//! address; an API hub accepts call requests, dispatches each one to a single child that
//! can service it, and correlates the child's eventual report back to the original caller
//! across any number of nested hubs.
//!
//! ## Key Concepts
//!
//! - **Processes (`Process`)**: Units of behavior spawned on the system server. Each
//!   accepted packet is handled on a task of its own.
//! - **Handles (`ProcessHandle`)**: Enqueue packets and stop a process.
//! - **Packets (`Packet`)**: A header, an opaque `Payload`, and routing metadata
//!   (`RouteMetadata` going down, `ReportMetadata` coming back up).
//! - **Call records (`CallRecordTable`)**: Per-server correlation state with a strict
//!   status lifecycle.
//! - **Hubs (`ApiHub`)**: The dispatch state machine. Content decisions are delegated to a
//!   `HubBackend`, such as the closure-based `FunctionalBackend`.
//! - **Terminal servers (`TerminalServer`)**: Leaves that do the work themselves.
//! - **Runtime (`SystemServer`)**: Address registry, transport and shutdown.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use callhub::prelude::*;
//!
//! let system = SystemServer::<Text>::launch();
//! let mut caller = system.open_mailbox()?;
//! let (hub, handle) = system.spawn_hub(ApiHub::new(references, backend))?;
//! handle
//!     .handle_message(Packet::request(caller.address().clone(), Text::from("resize photo")))
//!     .await?;
//! let report = caller.recv().await;
//! ```

/// The runtime: configuration, the system server and process handles.
pub(crate) mod common;

/// Packets, payloads and addresses.
pub(crate) mod message;

/// The per-process wake loop and handler context.
pub(crate) mod process;

/// Call records and the servers that own them.
pub(crate) mod server;

/// Core traits: processes, API servers and their backends.
pub(crate) mod traits;

/// Ready-made hub backends and stock texts for `Text` payloads.
pub mod backend;

/// A prelude module for conveniently importing the most commonly used items.
///
/// ## External Crates
/// *   [`async_trait::async_trait`](https://docs.rs/async-trait/latest/async_trait/attr.async_trait.html): The macro for implementing the backend traits.
///
/// ## Core Types
/// *   [`crate::common::SystemServer`]: The transport and process registry.
/// *   [`crate::common::ProcessHandle`]: Handle for enqueueing packets and stopping a process.
/// *   [`crate::common::Mailbox`]: Caller-side endpoint that receives replies.
/// *   [`crate::common::CallhubConfig`]: Runtime configuration.
/// *   [`crate::server::ApiHub`]: The dispatching hub.
/// *   [`crate::server::TerminalServer`]: A leaf server that executes calls.
/// *   [`crate::server::CallRecordTable`]: Per-server correlation table.
/// *   [`crate::backend::FunctionalBackend`]: A hub backend built from closures.
pub mod prelude {
    pub use async_trait::async_trait;

    pub use crate::backend::{text, FunctionalBackend};
    pub use crate::common::{CallhubConfig, Mailbox, ProcessHandle, SystemServer, CONFIG};
    pub use crate::message::{
        Address, DeliveryError, Metadata, Packet, PacketHeader, PacketKind, Payload,
        ReportMetadata, RouteMetadata, Text,
    };
    pub use crate::process::ProcessContext;
    pub use crate::server::{
        ApiHub, CallId, CallRecord, CallRecordTable, CallStatus, ErrorKind, ReferenceEntry,
        ReferenceTable, TableError, TerminalServer,
    };
    pub use crate::traits::{
        ApiServer, Decision, HubBackend, MessageType, Process, ReturnResult, Selection,
        TerminalBackend, TerminalErrorKind, Undetermined,
    };
}
