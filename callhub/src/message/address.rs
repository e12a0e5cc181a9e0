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

use acton_ern::{Account, Category, Domain, EntityRoot, Ern, Parts};

const ADDRESS_DOMAIN: &str = "callhub";
const ADDRESS_CATEGORY: &str = "process";
const ADDRESS_ACCOUNT: &str = "local";

/// The routable identity of a process.
///
/// An `Address` is handed out by the [`SystemServer`](crate::common::SystemServer) when a
/// process is spawned and stays stable for that process's lifetime. Processes only ever hold
/// addresses of other processes, never handles, so every message crosses the transport.
///
/// Equality and hashing follow the underlying [`Ern`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Address(Ern);

impl Address {
    /// Creates an address rooted at `name` under the `callhub:process` namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid ERN root segment.
    pub fn with_name(name: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self(Ern::new(
            Domain::new(ADDRESS_DOMAIN)?,
            Category::new(ADDRESS_CATEGORY)?,
            Account::new(ADDRESS_ACCOUNT)?,
            EntityRoot::new(name.into())?,
            Parts::default(),
        )))
    }

    /// The root name segment this address was created from.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.root.as_str()
    }

    /// The full [`Ern`] backing this address.
    #[inline]
    #[must_use]
    pub const fn ern(&self) -> &Ern {
        &self.0
    }
}

impl From<Ern> for Address {
    fn from(ern: Ern) -> Self {
        Self(ern)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_compare_by_identity() -> anyhow::Result<()> {
        let hub = Address::with_name("hub")?;
        let same = hub.clone();
        let leaf = Address::with_name("leaf")?;

        assert_eq!(hub, same);
        assert_ne!(hub, leaf);
        assert!(hub.name().starts_with("hub"));
        Ok(())
    }

    #[test]
    fn addresses_live_in_the_callhub_namespace() -> anyhow::Result<()> {
        let hub = Address::with_name("hub")?;
        let rendered = hub.to_string();

        assert!(rendered.starts_with("ern:callhub:process:local:hub"), "{rendered}");
        assert!(!rendered.contains("acton"));
        Ok(())
    }
}
