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

#![allow(dead_code)]

use std::sync::Arc;

use callhub::prelude::*;
use callhub_test::prelude::*;

use crate::setup::backends::EchoTool;
use crate::setup::{fault_of, initialize_tracing, upstream_of, ARRIVAL, SILENCE};

mod setup;

/// Tests the three outcomes of a terminal server call.
///
/// **Scenario:**
/// A parent mailbox sends three routed requests: one that runs, one with no arguments, and
/// one whose execution fails.
///
/// **Verification:**
/// - Each reply is addressed to the parent's own call id.
/// - Only the execution failure is marked as a protocol-level fault.
/// - The records end in SUCCESS, FAILURE and FAILURE.
#[callhub_test]
async fn test_terminal_server_reports_every_outcome() -> anyhow::Result<()> {
    initialize_tracing();
    let system = SystemServer::<Text>::launch();
    let mut parent = system.open_named_mailbox("parent")?;
    let leaf = Arc::new(TerminalServer::new(EchoTool));
    let handle = system.spawn("echo", Arc::clone(&leaf))?;

    let cases = [
        (1, "resize photo", "done: resize photo", None, CallStatus::Success),
        (2, "   ", "INVALID_ARGUMENTS: missing arguments", None, CallStatus::Failure),
        (
            3,
            "fail loudly",
            "EXECUTION_ERROR: tool crashed",
            Some(ErrorKind::ExecutionError),
            CallStatus::Failure,
        ),
    ];

    for (parent_id, request, expected, fault, status) in cases {
        handle
            .handle_message(Packet::routed_request(
                parent.address().clone(),
                Text::from(request),
                CallId::new(parent_id),
            ))
            .await?;

        let reply = parent.recv_timeout(ARRIVAL).await.expect("parent gets a reply");
        assert_eq!(reply.kind(), PacketKind::Reply);
        assert_eq!(reply.payload().as_str(), expected);
        assert_eq!(upstream_of(&reply), Some(CallId::new(parent_id)));
        assert_eq!(fault_of(&reply), fault);

        let record = leaf
            .call_records()
            .snapshot()
            .into_iter()
            .find(|record| record.parent_id() == Some(CallId::new(parent_id)))
            .expect("leaf recorded the call");
        assert_eq!(record.status(), status);
        assert_eq!(record.sender(), parent.address());
    }

    system.shutdown_all().await?;
    Ok(())
}

/// Tests that a terminal server ignores anything that is not a request.
#[callhub_test]
async fn test_terminal_server_ignores_replies() -> anyhow::Result<()> {
    initialize_tracing();
    let system = SystemServer::<Text>::launch();
    let mut parent = system.open_named_mailbox("parent")?;
    let leaf = Arc::new(TerminalServer::new(EchoTool));
    let handle = system.spawn("echo", Arc::clone(&leaf))?;

    handle
        .handle_message(Packet::reply(
            parent.address().clone(),
            Text::from("done"),
            Some(CallId::new(1)),
        ))
        .await?;

    assert!(parent.recv_timeout(SILENCE).await.is_none());
    assert!(leaf.call_records().is_empty());

    system.shutdown_all().await?;
    Ok(())
}
