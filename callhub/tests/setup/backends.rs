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

use std::time::Duration;

use callhub::prelude::*;

/// A hub backend whose selector always answers with `selection`.
///
/// Errors render as their wire code so tests can compare payloads directly.
pub fn fixed_selection(selection: Selection<Text>) -> FunctionalBackend<Text> {
    FunctionalBackend::new(
        move |_request, _candidates| {
            let selection = selection.clone();
            async move { selection }
        },
        |kind, _context| async move { Text::new(kind.code()) },
    )
}

/// A hub backend that always routes to the first child and uses the stock English texts.
pub fn first_child() -> FunctionalBackend<Text> {
    FunctionalBackend::new(
        |_request, _candidates| async { Selection::Matched(0) },
        |kind, context| async move { text::default_error_message(kind, context.as_ref()) },
    )
}

/// A hub backend that picks the first child whose description shares a word with the
/// request, with a couple of synonyms for photos.
pub fn keyword_selector() -> FunctionalBackend<Text> {
    FunctionalBackend::new(
        |request: Text, candidates: Vec<Text>| async move {
            let wanted: Vec<String> = request
                .as_str()
                .split_whitespace()
                .map(|word| match word {
                    "photo" | "picture" => "images".to_string(),
                    other => other.to_string(),
                })
                .collect();
            candidates
                .iter()
                .position(|description| {
                    description
                        .as_str()
                        .split_whitespace()
                        .any(|word| wanted.iter().any(|w| w == word))
                })
                .map_or(Selection::NoMatch, Selection::Matched)
        },
        |kind, _context| async move { Text::new(kind.code()) },
    )
}

/// A hub backend that treats any report containing "???" as undeterminable and any
/// report starting with "error" as a failure.
pub fn picky_results() -> FunctionalBackend<Text> {
    fixed_selection(Selection::Matched(0)).with_result_decider(|report: Text, _record| async move {
        if report.as_str().contains("???") {
            Err(Undetermined::new(Some(report)))
        } else if report.as_str().starts_with("error") {
            Ok(ReturnResult::Failure)
        } else {
            Ok(ReturnResult::Success)
        }
    })
}

/// A hub backend that takes `delay` to decide each child report, then calls it a success.
pub fn slow_results(delay: Duration) -> FunctionalBackend<Text> {
    fixed_selection(Selection::Matched(0)).with_result_decider(move |_report: Text, _record| async move {
        tokio::time::sleep(delay).await;
        Ok(ReturnResult::Success)
    })
}

/// A leaf that "runs" a request by echoing it.
///
/// An empty request has no arguments. A request starting with `fail` runs and fails.
#[derive(Debug, Default)]
pub struct EchoTool;

#[async_trait]
impl TerminalBackend<Text> for EchoTool {
    type Arguments = String;

    async fn parse_arguments(&self, payload: &Text) -> Result<String, Text> {
        let arguments = payload.as_str().trim();
        if arguments.is_empty() {
            Err(Text::from("missing arguments"))
        } else {
            Ok(arguments.to_string())
        }
    }

    async fn execute(&self, arguments: String) -> Result<Text, Text> {
        if arguments.starts_with("fail") {
            Err(Text::from("tool crashed"))
        } else {
            Ok(Text::new(format!("done: {arguments}")))
        }
    }

    async fn format_error(&self, kind: TerminalErrorKind, detail: &Text) -> Text {
        Text::new(format!("{kind}: {detail}"))
    }
}
