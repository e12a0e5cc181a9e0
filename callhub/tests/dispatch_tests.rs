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

use callhub::prelude::*;
use callhub_test::prelude::*;

use crate::setup::backends::{first_child, fixed_selection, keyword_selector};
use crate::setup::{fault_of, initialize_tracing, upstream_of, ARRIVAL, SILENCE};

mod setup;

/// Tests that a request is forwarded to the child the selector picks.
///
/// **Scenario:**
/// 1. Two children: A "handles images" and B "handles text", both mailboxes.
/// 2. The caller sends "resize photo" to the hub.
///
/// **Verification:**
/// - A receives a REQUEST whose route metadata carries the hub's new record id.
/// - The record is RUNNING, remembers the caller, and has no parent.
/// - B receives nothing.
#[callhub_test]
async fn test_request_is_forwarded_to_selected_child() -> anyhow::Result<()> {
    initialize_tracing();
    let system = SystemServer::<Text>::launch();
    let mut caller = system.open_named_mailbox("caller")?;
    let mut images = system.open_named_mailbox("images")?;
    let mut text = system.open_named_mailbox("text")?;

    let references = ReferenceTable::new()
        .with_entry(images.address().clone(), Text::from("handles images"))
        .with_entry(text.address().clone(), Text::from("handles text"));
    let (hub, handle) = system.spawn_hub(ApiHub::new(references, keyword_selector()))?;

    handle
        .handle_message(Packet::request(
            caller.address().clone(),
            Text::from("resize photo"),
        ))
        .await?;

    let forwarded = images.recv_timeout(ARRIVAL).await.expect("A should get the request");
    assert_eq!(forwarded.kind(), PacketKind::Request);
    assert_eq!(forwarded.sender(), handle.address());
    assert_eq!(forwarded.payload(), &Text::from("resize photo"));

    let id = forwarded.route_call_id().expect("forwarded request carries a call id");
    let record = hub.find_by_id(id).expect("hub recorded the call");
    assert_eq!(record.status(), CallStatus::Running);
    assert_eq!(record.sender(), caller.address());
    assert_eq!(record.parent_id(), None);
    assert_eq!(hub.call_records().len(), 1);

    assert!(text.recv_timeout(SILENCE).await.is_none());
    assert!(caller.try_recv().is_none());

    system.shutdown_all().await?;
    Ok(())
}

/// Tests a hub driven by the stock text backend and a selector that reads the rendered
/// candidate listing, the way a prompt-based selector would.
///
/// **Scenario:**
/// 1. Two children: "handles images" and "handles text", both mailboxes.
/// 2. The caller sends "summarize text"; the text child answers "summary ready".
///
/// **Verification:**
/// - The selector sees the children listed by index in table order.
/// - The text child receives the request.
/// - The caller receives the child's report wrapped in the stock return message.
#[callhub_test]
async fn test_stock_backend_picks_from_rendered_listing() -> anyhow::Result<()> {
    initialize_tracing();
    let system = SystemServer::<Text>::launch();
    let mut caller = system.open_named_mailbox("caller")?;
    let mut images = system.open_named_mailbox("images")?;
    let mut text_child = system.open_named_mailbox("text")?;

    let references = ReferenceTable::new()
        .with_entry(images.address().clone(), Text::from("handles images"))
        .with_entry(text_child.address().clone(), Text::from("handles text"));
    let backend = FunctionalBackend::with_stock_texts(|request: Text, candidates: Vec<Text>| async move {
        let listing = text::list_candidates(&candidates);
        assert_eq!(listing.as_str(), "API 0: handles images\n\nAPI 1: handles text");
        let topic = request.as_str().split_whitespace().last().unwrap_or_default().to_string();
        listing
            .as_str()
            .split("\n\n")
            .find(|block| block.ends_with(&topic))
            .and_then(|block| block.trim_start_matches("API ").split(':').next())
            .and_then(|index| index.parse().ok())
            .map_or(Selection::NoMatch, Selection::Matched)
    });
    let (hub, handle) = system.spawn_hub(ApiHub::new(references, backend))?;

    handle
        .handle_message(Packet::request(caller.address().clone(), Text::from("summarize text")))
        .await?;

    let forwarded = text_child.recv_timeout(ARRIVAL).await.expect("text child gets the request");
    let id = forwarded.route_call_id().expect("routed");
    assert!(images.recv_timeout(SILENCE).await.is_none());

    system
        .send_message(
            Packet::reply(text_child.address().clone(), Text::from("summary ready"), Some(id)),
            handle.address(),
        )
        .await?;

    let reply = caller.recv_timeout(ARRIVAL).await.expect("caller gets the result");
    assert_eq!(fault_of(&reply), None);
    assert_eq!(
        reply.payload().as_str(),
        "The API call has returned. The return message is as follows:\n\nsummary ready\n"
    );
    assert_eq!(hub.find_by_id(id).map(|r| r.status()), Some(CallStatus::Success));

    system.shutdown_all().await?;
    Ok(())
}

/// Tests that a request nobody can handle fails without reaching any child.
#[callhub_test]
async fn test_no_handler_replies_with_error_and_fails_record() -> anyhow::Result<()> {
    initialize_tracing();
    let system = SystemServer::<Text>::launch();
    let mut caller = system.open_named_mailbox("caller")?;
    let mut child = system.open_named_mailbox("child")?;

    let references =
        ReferenceTable::new().with_entry(child.address().clone(), Text::from("handles audio"));
    let (hub, handle) = system.spawn_hub(ApiHub::new(references, fixed_selection(Selection::NoMatch)))?;

    // The caller is itself a hub forwarding under its record 11.
    handle
        .handle_message(Packet::routed_request(
            caller.address().clone(),
            Text::from("resize photo"),
            CallId::new(11),
        ))
        .await?;

    let reply = caller.recv_timeout(ARRIVAL).await.expect("caller gets an error");
    assert_eq!(reply.kind(), PacketKind::Reply);
    assert_eq!(fault_of(&reply), Some(ErrorKind::HandlerNotFound));
    assert_eq!(upstream_of(&reply), Some(CallId::new(11)));
    assert_eq!(reply.payload().as_str(), "FAILED_TO_FIND_HANDLER");

    let records = hub.call_records().snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status(), CallStatus::Failure);
    assert_eq!(records[0].parent_id(), Some(CallId::new(11)));

    assert!(child.recv_timeout(SILENCE).await.is_none());
    assert!(caller.try_recv().is_none());

    system.shutdown_all().await?;
    Ok(())
}

/// Tests that a failed selection passes its context to the error formatter.
#[callhub_test]
async fn test_failed_selection_reports_its_context() -> anyhow::Result<()> {
    initialize_tracing();
    let system = SystemServer::<Text>::launch();
    let mut caller = system.open_named_mailbox("caller")?;
    let child = system.open_named_mailbox("child")?;

    let backend = FunctionalBackend::new(
        |_request, _candidates| async { Selection::Failed(Some(Text::from("model timed out"))) },
        |kind, context: Option<Text>| async move {
            Text::new(format!(
                "{kind}: {}",
                context.map(Text::into_inner).unwrap_or_default()
            ))
        },
    );
    let references = ReferenceTable::new().with_entry(child.address().clone(), Text::from("anything"));
    let (hub, handle) = system.spawn_hub(ApiHub::new(references, backend))?;

    handle
        .handle_message(Packet::request(caller.address().clone(), Text::from("resize")))
        .await?;

    let reply = caller.recv_timeout(ARRIVAL).await.expect("caller gets an error");
    assert_eq!(fault_of(&reply), Some(ErrorKind::HandlerNotFound));
    assert_eq!(reply.payload().as_str(), "FAILED_TO_FIND_HANDLER: model timed out");
    assert_eq!(hub.call_records().snapshot()[0].status(), CallStatus::Failure);

    system.shutdown_all().await?;
    Ok(())
}

/// Tests that a selector index past the end of the candidate list counts as no match.
#[callhub_test]
async fn test_out_of_range_selection_is_no_match() -> anyhow::Result<()> {
    initialize_tracing();
    let system = SystemServer::<Text>::launch();
    let mut caller = system.open_named_mailbox("caller")?;
    let mut child = system.open_named_mailbox("child")?;

    let references =
        ReferenceTable::new().with_entry(child.address().clone(), Text::from("handles images"));
    let (hub, handle) =
        system.spawn_hub(ApiHub::new(references, fixed_selection(Selection::Matched(5))))?;

    handle
        .handle_message(Packet::request(caller.address().clone(), Text::from("resize photo")))
        .await?;

    let reply = caller.recv_timeout(ARRIVAL).await.expect("caller gets an error");
    assert_eq!(fault_of(&reply), Some(ErrorKind::HandlerNotFound));
    assert_eq!(upstream_of(&reply), None);
    assert_eq!(hub.call_records().snapshot()[0].status(), CallStatus::Failure);
    assert!(child.recv_timeout(SILENCE).await.is_none());

    system.shutdown_all().await?;
    Ok(())
}

/// Tests that an unclassifiable packet creates no record and echoes the inbound route id.
#[callhub_test]
async fn test_unclassifiable_packet_creates_no_record() -> anyhow::Result<()> {
    initialize_tracing();
    let system = SystemServer::<Text>::launch();
    let mut caller = system.open_named_mailbox("caller")?;

    let backend = fixed_selection(Selection::Matched(0))
        .with_classifier(|_packet| async { Err(Undetermined::bare()) });
    let (hub, handle) = system.spawn_hub(ApiHub::new(ReferenceTable::new(), backend))?;

    handle
        .handle_message(Packet::routed_request(
            caller.address().clone(),
            Text::from("koalas are so cute"),
            CallId::new(3),
        ))
        .await?;

    let reply = caller.recv_timeout(ARRIVAL).await.expect("caller gets an error");
    assert_eq!(fault_of(&reply), Some(ErrorKind::MessageTypeUndetermined));
    assert_eq!(upstream_of(&reply), Some(CallId::new(3)));
    assert!(hub.call_records().is_empty());

    handle
        .handle_message(Packet::request(caller.address().clone(), Text::from("hello")))
        .await?;
    let reply = caller.recv_timeout(ARRIVAL).await.expect("caller gets an error");
    assert_eq!(upstream_of(&reply), None);
    assert!(hub.call_records().is_empty());

    system.shutdown_all().await?;
    Ok(())
}

/// Tests that a child that cannot be reached turns into an execution error.
#[callhub_test]
async fn test_unreachable_child_fails_with_execution_error() -> anyhow::Result<()> {
    initialize_tracing();
    let system = SystemServer::<Text>::launch();
    let mut caller = system.open_named_mailbox("caller")?;
    let ghost = Address::with_name("ghost")?;

    let references = ReferenceTable::new().with_entry(ghost, Text::from("handles images"));
    let (hub, handle) = system.spawn_hub(ApiHub::new(references, first_child()))?;

    handle
        .handle_message(Packet::routed_request(
            caller.address().clone(),
            Text::from("resize photo"),
            CallId::new(8),
        ))
        .await?;

    let reply = caller.recv_timeout(ARRIVAL).await.expect("caller gets an error");
    assert_eq!(fault_of(&reply), Some(ErrorKind::ExecutionError));
    assert_eq!(upstream_of(&reply), Some(CallId::new(8)));
    assert!(reply
        .payload()
        .as_str()
        .starts_with("There was an error executing the API call."));
    assert!(reply.payload().as_str().contains("No process registered at"));
    assert_eq!(hub.call_records().snapshot()[0].status(), CallStatus::Failure);

    system.shutdown_all().await?;
    Ok(())
}
