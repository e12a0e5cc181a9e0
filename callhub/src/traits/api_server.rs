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

use crate::message::{Address, Payload};
use crate::server::{CallId, CallRecord, CallRecordTable};

/// A process that owns a call record table and takes part in request/reply correlation.
pub trait ApiServer<P: Payload> {
    /// The table of calls this server accepted.
    fn call_records(&self) -> &CallRecordTable<P>;

    /// Allocates a fresh id and records an `Unhandled` call.
    fn create_entry(
        &self,
        description: P,
        sender: Address,
        parent_id: Option<CallId>,
    ) -> CallRecord<P> {
        self.call_records()
            .create_entry(description, sender, parent_id)
    }

    /// Looks a call up by id. `None` if this server never created it.
    fn find_by_id(&self, id: CallId) -> Option<CallRecord<P>> {
        self.call_records().find_by_id(id)
    }
}
