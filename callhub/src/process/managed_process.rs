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

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, instrument, trace};

use crate::common::types::Inbox;
use crate::message::{Packet, PacketKind, Payload};
use crate::process::ProcessContext;
use crate::traits::Process;

/// The running side of a process: its inbox and the loop that drains it.
pub(crate) struct ManagedProcess<P: Payload> {
    behavior: Arc<dyn Process<P>>,
    ctx: ProcessContext<P>,
    inbox: Inbox<P>,
    tracker: TaskTracker,
    cancellation_token: CancellationToken,
    catch_panics: bool,
}

impl<P: Payload> ManagedProcess<P> {
    pub(crate) fn new(
        behavior: Arc<dyn Process<P>>,
        ctx: ProcessContext<P>,
        inbox: Inbox<P>,
        tracker: TaskTracker,
        cancellation_token: CancellationToken,
        catch_panics: bool,
    ) -> Self {
        Self {
            behavior,
            ctx,
            inbox,
            tracker,
            cancellation_token,
            catch_panics,
        }
    }

    /// Receives packets until END or cancellation, spawning one tracked task per packet.
    ///
    /// After END the inbox is closed but packets already queued are still dispatched.
    #[instrument(skip(self), fields(process = %self.ctx.address()))]
    pub(crate) async fn wake(mut self) {
        let cancel_token = self.cancellation_token.clone();
        let mut cancel = Box::pin(cancel_token.cancelled());

        loop {
            tokio::select! {
                () = &mut cancel => {
                    trace!("Forceful cancellation triggered");
                    break;
                }

                incoming = self.inbox.recv() => {
                    let Some(packet) = incoming else { break; };
                    trace!(kind = %packet.kind(), sender = %packet.sender(), "Received packet");
                    if packet.kind() == PacketKind::End {
                        trace!("END received, closing inbox");
                        self.inbox.close();
                        continue;
                    }
                    self.dispatch(packet);
                }
            }
        }

        trace!("Message loop finished");
    }

    fn dispatch(&self, packet: Packet<P>) {
        let behavior = Arc::clone(&self.behavior);
        let ctx = self.ctx.clone();
        let token = self.cancellation_token.clone();
        let catch_panics = self.catch_panics;

        self.tracker.spawn(async move {
            let work = behavior.process_message(packet, &ctx);
            if catch_panics {
                tokio::select! {
                    () = token.cancelled() => trace!("Packet task cancelled"),
                    outcome = AssertUnwindSafe(work).catch_unwind() => {
                        if let Err(panic) = outcome {
                            error!(
                                process = %ctx.address(),
                                "Packet task panicked: {}",
                                panic_message(panic.as_ref())
                            );
                        }
                    }
                }
            } else {
                tokio::select! {
                    () = token.cancelled() => trace!("Packet task cancelled"),
                    () = work => {}
                }
            }
        });
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
