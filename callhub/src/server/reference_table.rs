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

use derive_new::new;

use crate::message::{Address, Payload};

/// A child a hub may dispatch to, with a description of what it can do.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry<P: Payload> {
    /// Where requests for this child are sent.
    pub address: Address,
    /// What the child can do, as shown to the handler selector.
    pub description: P,
}

/// The children a hub knows about, in the order they were added.
///
/// Handler selection answers with an index into [`descriptions`](Self::descriptions), so
/// the order is part of the contract. Adding an address that is already present replaces
/// its description and keeps its position.
#[derive(Debug, Clone)]
pub struct ReferenceTable<P: Payload> {
    entries: Vec<ReferenceEntry<P>>,
}

impl<P: Payload> Default for ReferenceTable<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<P: Payload> ReferenceTable<P> {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or updates the entry for `address`.
    pub fn insert(&mut self, address: Address, description: P) {
        match self.entries.iter_mut().find(|entry| entry.address == address) {
            Some(entry) => entry.description = description,
            None => self.entries.push(ReferenceEntry::new(address, description)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_entry(mut self, address: Address, description: P) -> Self {
        self.insert(address, description);
        self
    }

    /// The candidate list handed to the selector.
    #[must_use]
    pub fn descriptions(&self) -> Vec<P> {
        self.entries
            .iter()
            .map(|entry| entry.description.clone())
            .collect()
    }

    /// The entry at `index`, in insertion order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ReferenceEntry<P>> {
        self.entries.get(index)
    }

    /// The description recorded for `address`, if any.
    #[must_use]
    pub fn describe(&self, address: &Address) -> Option<&P> {
        self.entries
            .iter()
            .find(|entry| &entry.address == address)
            .map(|entry| &entry.description)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceEntry<P>> {
        self.entries.iter()
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the hub has no children to dispatch to.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Text;

    #[test]
    fn reinserting_an_address_keeps_its_position() -> anyhow::Result<()> {
        let images = Address::with_name("images")?;
        let text = Address::with_name("text")?;
        let table = ReferenceTable::new()
            .with_entry(images.clone(), Text::from("handles images"))
            .with_entry(text.clone(), Text::from("handles text"))
            .with_entry(images.clone(), Text::from("handles photos"));

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.descriptions(),
            vec![Text::from("handles photos"), Text::from("handles text")]
        );
        assert_eq!(table.get(1).map(|entry| &entry.address), Some(&text));
        assert_eq!(table.describe(&images), Some(&Text::from("handles photos")));
        assert!(table.get(2).is_none());
        Ok(())
    }
}
