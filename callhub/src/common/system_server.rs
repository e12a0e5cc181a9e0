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

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, instrument, trace};

use crate::common::config::{CallhubConfig, CONFIG};
use crate::common::types::ProcessRegistry;
use crate::common::{Mailbox, ProcessHandle};
use crate::message::{Address, DeliveryError, Packet, Payload};
use crate::process::{ManagedProcess, ProcessContext};
use crate::server::ApiHub;
use crate::traits::{HubBackend, Process};

/// The transport and process registry.
///
/// Spawning a process registers its address here; [`send_message`](Self::send_message)
/// resolves an address back to the process inbox. The server is cheap to clone and every
/// clone shares the same registry.
#[derive(Debug, Clone)]
pub struct SystemServer<P: Payload> {
    inner: Arc<SystemInner<P>>,
}

#[derive(Debug)]
struct SystemInner<P: Payload> {
    registry: ProcessRegistry<P>,
    config: CallhubConfig,
    cancellation_token: CancellationToken,
}

impl<P: Payload> SystemServer<P> {
    /// Starts a system server with the global [`CONFIG`].
    #[must_use]
    pub fn launch() -> Self {
        Self::with_config(CONFIG.clone())
    }

    /// Starts a system server with an explicit configuration.
    #[must_use]
    pub fn with_config(config: CallhubConfig) -> Self {
        trace!(?config, "Launching system server");
        Self {
            inner: Arc::new(SystemInner {
                registry: ProcessRegistry::new(),
                config,
                cancellation_token: CancellationToken::new(),
            }),
        }
    }

    /// The configuration this server was launched with.
    #[must_use]
    pub fn config(&self) -> &CallhubConfig {
        &self.inner.config
    }

    /// Registers `process` under a fresh address derived from `name` and starts its wake
    /// loop. An empty name takes the configured default.
    ///
    /// # Errors
    ///
    /// Returns an error if no address can be derived from `name`, or if the configured
    /// inbox capacity is zero.
    #[instrument(skip(self, process))]
    pub fn spawn<T: Process<P>>(
        &self,
        name: &str,
        process: Arc<T>,
    ) -> anyhow::Result<ProcessHandle<P>> {
        let capacity = self.inbox_capacity()?;
        let address = self.allocate_address(name, &self.inner.config.defaults.process_name)?;
        let (outbox, inbox) = mpsc::channel(capacity);
        let tracker = TaskTracker::new();
        let cancellation_token = self.inner.cancellation_token.child_token();

        let handle = ProcessHandle::new(
            address.clone(),
            outbox,
            tracker.clone(),
            cancellation_token.clone(),
            self.inner.config.process_shutdown_timeout(),
        );
        let managed = ManagedProcess::new(
            process,
            ProcessContext::new(address.clone(), self.clone()),
            inbox,
            tracker.clone(),
            cancellation_token,
            self.inner.config.behavior.catch_task_panics,
        );

        self.inner.registry.insert(address.clone(), handle.clone());
        tracker.spawn(managed.wake());
        trace!(%address, "Spawned process");
        Ok(handle)
    }

    /// Spawns `hub` under the configured default hub name.
    ///
    /// Returns the shared hub alongside its handle so its call records stay inspectable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured hub name is not a valid address.
    pub fn spawn_hub<B: HubBackend<P>>(
        &self,
        hub: ApiHub<P, B>,
    ) -> anyhow::Result<(Arc<ApiHub<P, B>>, ProcessHandle<P>)> {
        let hub = Arc::new(hub);
        let handle = self.spawn(&self.inner.config.defaults.hub_name, Arc::clone(&hub))?;
        Ok((hub, handle))
    }

    /// Opens a mailbox under the configured default mailbox name.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured mailbox name is not a valid address.
    pub fn open_mailbox(&self) -> anyhow::Result<Mailbox<P>> {
        self.open_named_mailbox("")
    }

    /// Opens a mailbox registered under an address derived from `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if no address can be derived from `name`, or if the configured
    /// inbox capacity is zero.
    pub fn open_named_mailbox(&self, name: &str) -> anyhow::Result<Mailbox<P>> {
        let capacity = self.inbox_capacity()?;
        let address = self.allocate_address(name, &self.inner.config.defaults.mailbox_name)?;
        let (outbox, inbox) = mpsc::channel(capacity);
        let handle = ProcessHandle::new(
            address.clone(),
            outbox,
            TaskTracker::new(),
            self.inner.cancellation_token.child_token(),
            self.inner.config.process_shutdown_timeout(),
        );
        self.inner.registry.insert(address.clone(), handle);
        trace!(%address, "Opened mailbox");
        Ok(Mailbox::new(address, inbox))
    }

    /// The handle registered at `address`, if any.
    #[must_use]
    pub fn lookup(&self, address: &Address) -> Option<ProcessHandle<P>> {
        self.inner
            .registry
            .get(address)
            .map(|entry| entry.value().clone())
    }

    /// Number of registered processes and mailboxes.
    #[must_use]
    pub fn process_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Delivers `packet` to the process at `to`. Resolves once the packet is queued.
    ///
    /// # Errors
    ///
    /// * [`DeliveryError::UnknownAddress`] if nothing is registered at `to`.
    /// * [`DeliveryError::InboxClosed`] if the process has stopped.
    #[instrument(skip(self, packet), fields(kind = %packet.kind(), from = %packet.sender()))]
    pub async fn send_message(&self, packet: Packet<P>, to: &Address) -> Result<(), DeliveryError> {
        let handle = self
            .lookup(to)
            .ok_or_else(|| DeliveryError::UnknownAddress(to.clone()))?;
        handle.handle_message(packet).await
    }

    /// Stops the process at `address` and removes it from the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is registered at `address` or the process had to be
    /// cancelled.
    pub async fn stop_process(&self, address: &Address) -> anyhow::Result<()> {
        let (_, handle) = self
            .inner
            .registry
            .remove(address)
            .ok_or_else(|| anyhow::anyhow!("No process registered at {address}"))?;
        handle.stop().await
    }

    /// Stops every registered process concurrently.
    ///
    /// If the system shutdown timeout expires first, every remaining process is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout expired.
    #[instrument(skip(self))]
    pub async fn shutdown_all(&self) -> anyhow::Result<()> {
        trace!("Sending END to all processes.");
        let handles: Vec<_> = self
            .inner
            .registry
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        self.inner.registry.clear();

        let stop_futures = handles.into_iter().map(|handle| async move {
            if let Err(e) = handle.stop().await {
                error!("Error stopping process {}: {:?}", handle.address(), e);
            }
        });

        let timeout = self.inner.config.system_shutdown_timeout();
        if tokio::time::timeout(timeout, join_all(stop_futures))
            .await
            .is_err()
        {
            error!(
                "System-wide shutdown timeout expired after {} ms. Forcefully cancelling remaining tasks.",
                timeout.as_millis()
            );
            self.inner.cancellation_token.cancel();
            return Err(anyhow::anyhow!(
                "Timeout while waiting for processes to shut down after {} ms",
                timeout.as_millis()
            ));
        }

        trace!("System shutdown complete.");
        Ok(())
    }

    fn inbox_capacity(&self) -> anyhow::Result<usize> {
        match self.inner.config.limits.inbox_capacity {
            0 => {
                error!("Configured inbox capacity is zero");
                anyhow::bail!("limits.inbox_capacity must be at least 1")
            }
            capacity => Ok(capacity),
        }
    }

    fn allocate_address(&self, name: &str, fallback: &str) -> anyhow::Result<Address> {
        let name = if name.is_empty() { fallback } else { name };
        let address = Address::with_name(name)?;
        if self.inner.registry.contains_key(&address) {
            anyhow::bail!("Address {address} is already registered");
        }
        Ok(address)
    }
}
