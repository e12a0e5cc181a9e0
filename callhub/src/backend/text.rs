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

//! Stock English texts for [`Text`] payloads.

use crate::message::{Payload, Text};
use crate::server::ErrorKind;

/// The stock error report for `kind`.
///
/// Only [`ErrorKind::ExecutionError`] includes `context`, appended after the message.
#[must_use]
pub fn default_error_message(kind: ErrorKind, context: Option<&Text>) -> Text {
    let message = match kind {
        ErrorKind::ReturnResultTypeUndetermined => {
            "I dispatched your API call request to a child server and the child server has \
             returned a result, but I was unable to determine if the result is successful or not."
        }
        ErrorKind::MessageTypeUndetermined => {
            "I am unable to determine the type of the message you sent.\n\n\
             I am an API Hub server and I am supposed to receive API call requests and report \
             messages from API servers.\n\n\
             It seems that you neither requested an API call, nor reported the result of an \
             API call."
        }
        ErrorKind::HandlerNotFound => "It seems that no API call I support can handle your request.",
        ErrorKind::ExecutionError => "There was an error executing the API call.",
        ErrorKind::CallRecordNotMatched => {
            "I am unable to find the API call record pertaining to your report.\n\n\
             It seems that the specific API call operation that your report pertains to does \
             not exist in my records."
        }
        ErrorKind::ProtocolViolation => {
            "Your report pertains to an API call that is not waiting for a result. \
             It has either completed already or another report for it is being processed."
        }
    };

    let message = Text::from(message);
    match (kind, context) {
        (ErrorKind::ExecutionError, Some(context)) => message.concat(
            &Text::from("\n\nThe error message is as follows:\n\n{}\n").format(&[context.clone()]),
        ),
        _ => message,
    }
}

/// The stock report relayed to a parent when a child's call returns.
#[must_use]
pub fn default_return_message(report: &Text) -> Text {
    Text::from("The API call has returned. The return message is as follows:\n\n{}\n")
        .format(&[report.clone()])
}

/// Renders a candidate list as `API <index>: <description>` blocks separated by blank
/// lines, the form a selector prompt refers to by index.
#[must_use]
pub fn list_candidates(candidates: &[Text]) -> Text {
    let item = Text::from("API {}: {}");
    candidates
        .iter()
        .enumerate()
        .map(|(index, description)| item.format(&[Text::new(index.to_string()), description.clone()]))
        .reduce(|listing, next| listing.concat(&Text::from("\n\n")).concat(&next))
        .unwrap_or_else(Text::empty)
}
