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

//! Call records, the tables that hold them, and the servers that own those tables.

pub use call_record::{CallId, CallRecord, CallStatus};
pub use call_record_table::CallRecordTable;
pub use error_kind::{ErrorKind, TableError};
pub use hub::ApiHub;
pub use reference_table::{ReferenceEntry, ReferenceTable};
pub use terminal::TerminalServer;

mod call_record;
mod call_record_table;
mod error_kind;
mod hub;
mod reference_table;
mod terminal;
