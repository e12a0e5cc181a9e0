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
use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::backend::text;
use crate::message::{Packet, PacketKind, Payload, Text};
use crate::server::{CallRecord, ErrorKind};
use crate::traits::{Decision, HubBackend, MessageType, ReturnResult, Selection, Undetermined};

type Classifier<P> = Box<dyn Fn(Packet<P>) -> BoxFuture<'static, Decision<MessageType, P>> + Send + Sync>;
type Rewriter<P> = Box<dyn Fn(P) -> BoxFuture<'static, P> + Send + Sync>;
type Selector<P> = Box<dyn Fn(P, Vec<P>) -> BoxFuture<'static, Selection<P>> + Send + Sync>;
type ChildFormatter<P> = Box<dyn Fn(P, P) -> BoxFuture<'static, P> + Send + Sync>;
type ParentFormatter<P> = Box<dyn Fn(P, CallRecord<P>) -> BoxFuture<'static, P> + Send + Sync>;
type ResultDecider<P> =
    Box<dyn Fn(P, CallRecord<P>) -> BoxFuture<'static, Decision<ReturnResult, P>> + Send + Sync>;
type ErrorFormatter<P> = Box<dyn Fn(ErrorKind, Option<P>) -> BoxFuture<'static, P> + Send + Sync>;

/// A [`HubBackend`] assembled from async closures, one per decision.
///
/// Only the handler selector and the error formatter have to be supplied. The rest
/// default to:
///
/// * classification by the packet's declared kind,
/// * request summaries, child requests and parent reports that pass the payload through
///   unchanged,
/// * every child report counting as success.
///
/// Closures receive owned copies of their inputs so they can move them into the returned
/// future.
///
/// ```rust,ignore
/// let backend = FunctionalBackend::new(
///     |_request, _candidates| async { Selection::Matched(0) },
///     |kind, context| async move { text::default_error_message(kind, context.as_ref()) },
/// )
/// .with_summarizer(|request| async move { request });
/// ```
pub struct FunctionalBackend<P: Payload> {
    classify: Classifier<P>,
    summarize: Rewriter<P>,
    select: Selector<P>,
    format_request: ChildFormatter<P>,
    format_return: ParentFormatter<P>,
    decide_result: ResultDecider<P>,
    format_error: ErrorFormatter<P>,
}

impl<P: Payload> FunctionalBackend<P> {
    /// Creates a backend from the two decisions that have no default.
    pub fn new<S, SFut, E, EFut>(select: S, format_error: E) -> Self
    where
        S: Fn(P, Vec<P>) -> SFut + Send + Sync + 'static,
        SFut: Future<Output = Selection<P>> + Send + 'static,
        E: Fn(ErrorKind, Option<P>) -> EFut + Send + Sync + 'static,
        EFut: Future<Output = P> + Send + 'static,
    {
        Self {
            classify: Box::new(|packet: Packet<P>| {
                futures::future::ready(classify_by_kind(&packet)).boxed()
            }),
            summarize: Box::new(|payload| futures::future::ready(payload).boxed()),
            select: Box::new(move |payload, candidates| select(payload, candidates).boxed()),
            format_request: Box::new(|payload, _child| futures::future::ready(payload).boxed()),
            format_return: Box::new(|payload, _record| futures::future::ready(payload).boxed()),
            decide_result: Box::new(|_payload, _record| {
                futures::future::ready(Ok(ReturnResult::Success)).boxed()
            }),
            format_error: Box::new(move |kind, context| format_error(kind, context).boxed()),
        }
    }

    /// Replaces the message classifier.
    #[must_use]
    pub fn with_classifier<F, Fut>(mut self, classify: F) -> Self
    where
        F: Fn(Packet<P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Decision<MessageType, P>> + Send + 'static,
    {
        self.classify = Box::new(move |packet| classify(packet).boxed());
        self
    }

    /// Replaces the request summarizer.
    #[must_use]
    pub fn with_summarizer<F, Fut>(mut self, summarize: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = P> + Send + 'static,
    {
        self.summarize = Box::new(move |payload| summarize(payload).boxed());
        self
    }

    /// Replaces the formatter for requests forwarded to a child. It receives the request
    /// and the chosen child's description.
    #[must_use]
    pub fn with_request_formatter<F, Fut>(mut self, format: F) -> Self
    where
        F: Fn(P, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = P> + Send + 'static,
    {
        self.format_request = Box::new(move |payload, child| format(payload, child).boxed());
        self
    }

    /// Replaces the formatter for reports relayed to the parent.
    #[must_use]
    pub fn with_return_formatter<F, Fut>(mut self, format: F) -> Self
    where
        F: Fn(P, CallRecord<P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = P> + Send + 'static,
    {
        self.format_return = Box::new(move |payload, record| format(payload, record).boxed());
        self
    }

    /// Replaces the decision on whether a child's report is a success.
    #[must_use]
    pub fn with_result_decider<F, Fut>(mut self, decide: F) -> Self
    where
        F: Fn(P, CallRecord<P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Decision<ReturnResult, P>> + Send + 'static,
    {
        self.decide_result = Box::new(move |payload, record| decide(payload, record).boxed());
        self
    }
}

impl FunctionalBackend<Text> {
    /// A text backend that reports errors and relays child reports with the stock English
    /// texts from [`text`]. Only the handler selector has to be supplied.
    pub fn with_stock_texts<S, SFut>(select: S) -> Self
    where
        S: Fn(Text, Vec<Text>) -> SFut + Send + Sync + 'static,
        SFut: Future<Output = Selection<Text>> + Send + 'static,
    {
        Self::new(select, |kind, context| async move {
            text::default_error_message(kind, context.as_ref())
        })
        .with_return_formatter(|report: Text, _record| async move {
            text::default_return_message(&report)
        })
    }
}

fn classify_by_kind<P: Payload>(packet: &Packet<P>) -> Decision<MessageType, P> {
    match packet.kind() {
        PacketKind::Request => Ok(MessageType::Request),
        PacketKind::Reply => Ok(MessageType::Reply),
        PacketKind::End => Err(Undetermined::bare()),
    }
}

impl<P: Payload> fmt::Debug for FunctionalBackend<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionalBackend").finish_non_exhaustive()
    }
}

#[async_trait]
impl<P: Payload> HubBackend<P> for FunctionalBackend<P> {
    async fn determine_message_type(&self, packet: &Packet<P>) -> Decision<MessageType, P> {
        (self.classify)(packet.clone()).await
    }

    async fn summarize_request(&self, payload: &P) -> P {
        (self.summarize)(payload.clone()).await
    }

    async fn select_handler(&self, payload: &P, candidates: &[P]) -> Selection<P> {
        (self.select)(payload.clone(), candidates.to_vec()).await
    }

    async fn format_request_for_child(&self, payload: &P, child: &P) -> P {
        (self.format_request)(payload.clone(), child.clone()).await
    }

    async fn format_return_for_parent(&self, payload: &P, record: &CallRecord<P>) -> P {
        (self.format_return)(payload.clone(), record.clone()).await
    }

    async fn determine_return_result(
        &self,
        payload: &P,
        record: &CallRecord<P>,
    ) -> Decision<ReturnResult, P> {
        (self.decide_result)(payload.clone(), record.clone()).await
    }

    async fn format_error(&self, kind: ErrorKind, context: Option<&P>) -> P {
        (self.format_error)(kind, context.cloned()).await
    }
}
