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

//! The content carried by packets.
//!
//! The routing core never looks inside a payload. It only needs to copy it, join two
//! payloads together, ask whether one is empty, and use one as a template for another.
//! Everything else (what the content means, how it is summarized or classified) belongs to
//! the decision functions supplied to a hub.

use std::fmt::{self, Debug};

use static_assertions::assert_impl_all;

/// Opaque content exchanged between processes.
pub trait Payload: Clone + Debug + Send + Sync + 'static {
    /// The empty value of this payload type.
    fn empty() -> Self;

    /// A payload carrying diagnostic text produced by the runtime itself, such as the
    /// reason a packet could not be delivered.
    fn from_text(text: &str) -> Self;

    /// Returns `true` if this payload carries no content.
    fn is_empty(&self) -> bool;

    /// Returns `self` followed by `other`. Neither input is modified.
    #[must_use]
    fn concat(&self, other: &Self) -> Self;

    /// Uses `self` as a template and fills it with `args`.
    #[must_use]
    fn format(&self, args: &[Self]) -> Self;
}

/// A plain UTF-8 text payload.
///
/// Templates use `{}` for the next argument in order and `{N}` for the argument at index
/// `N`. `{{` and `}}` produce literal braces. A placeholder with no matching argument is
/// left in the output unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Text(String);

impl Text {
    /// Wraps `content` as a text payload.
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    /// The text content.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the payload and returns its content.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Payload for Text {
    fn empty() -> Self {
        Self(String::new())
    }

    fn from_text(text: &str) -> Self {
        Self(text.to_string())
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn concat(&self, other: &Self) -> Self {
        let mut joined = String::with_capacity(self.0.len() + other.0.len());
        joined.push_str(&self.0);
        joined.push_str(&other.0);
        Self(joined)
    }

    fn format(&self, args: &[Self]) -> Self {
        let mut out = String::with_capacity(self.0.len());
        let mut next_positional = 0;
        let mut chars = self.0.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let mut placeholder = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        placeholder.push(inner);
                    }
                    if !closed {
                        out.push('{');
                        out.push_str(&placeholder);
                        continue;
                    }
                    let index = if placeholder.is_empty() {
                        let index = next_positional;
                        next_positional += 1;
                        Some(index)
                    } else {
                        placeholder.trim().parse::<usize>().ok()
                    };
                    match index.and_then(|i| args.get(i)) {
                        Some(arg) => out.push_str(&arg.0),
                        None => {
                            out.push('{');
                            out.push_str(&placeholder);
                            out.push('}');
                        }
                    }
                }
                other => out.push(other),
            }
        }

        Self(out)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Self(value)
    }
}

assert_impl_all!(Text: Payload, Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_joins_without_mutating_inputs() {
        let head = Text::from("resize ");
        let tail = Text::from("photo");
        let joined = head.concat(&tail);

        assert_eq!(joined.as_str(), "resize photo");
        assert_eq!(head.as_str(), "resize ");
        assert!(!joined.is_empty());
        assert!(Text::empty().is_empty());
    }

    #[test]
    fn format_fills_sequential_and_positional_placeholders() {
        let template = Text::from("API {0}: {1} ({0})");
        let filled = template.format(&[Text::from("3"), Text::from("handles images")]);
        assert_eq!(filled.as_str(), "API 3: handles images (3)");

        let sequential = Text::from("The request is \"{}\" for {}.");
        let filled = sequential.format(&[Text::from("resize"), Text::from("A")]);
        assert_eq!(filled.as_str(), "The request is \"resize\" for A.");
    }

    #[test]
    fn format_keeps_escapes_and_unmatched_placeholders() {
        let template = Text::from("{{literal}} {5} {unclosed");
        let filled = template.format(&[Text::from("x")]);
        assert_eq!(filled.as_str(), "{literal} {5} {unclosed");
    }
}
