//! Persisted key layout.
//!
//! | Key                         | Value                      |
//! |-----------------------------|----------------------------|
//! | `todolist:next_id`          | list ID counter            |
//! | `todolist:{id}`             | JSON list record           |
//! | `todoitem:{list_id}:next_id`| per-list item ID counter   |
//! | `job:{job_id}`              | JSON job record            |

use crate::model::ListId;

/// Prefix shared by list records and the list counter.
pub const LIST_PREFIX: &str = "todolist:";

/// Counter for list IDs.
pub const LIST_COUNTER: &str = "todolist:next_id";

/// Prefix for job status records.
pub const JOB_PREFIX: &str = "job:";

/// Key of a list record.
#[must_use]
pub fn list_key(id: ListId) -> String {
    format!("{LIST_PREFIX}{id}")
}

/// Key of the item ID counter for one list.
#[must_use]
pub fn item_counter_key(list_id: ListId) -> String {
    format!("todoitem:{list_id}:next_id")
}

/// Key of a job status record.
#[must_use]
pub fn job_key(job_id: &str) -> String {
    format!("{JOB_PREFIX}{job_id}")
}

/// Parse the list ID out of a `todolist:{id}` key.
///
/// Returns `None` for the counter key and anything else under the prefix.
#[must_use]
pub fn parse_list_key(key: &str) -> Option<ListId> {
    key.strip_prefix(LIST_PREFIX)?.parse::<u64>().ok().map(ListId::new)
}
