//! Versionable filter records.
//!
//! A [`FilterRecord`] is the stored form of one revision of a gateway filter:
//! its source code, pipeline stage, ordering hint and the two runtime flags
//! (`active`, `canary`) that decide whether the pipeline assembler picks it up.
//!
//! ```text
//! application:name:type   ──►  revision 1 (inactive)
//!   (FilterRecord::id)    ──►  revision 2 (canary)
//!                         ──►  revision 3 (active)
//! ```
//!
//! Every revision of one logical filter shares the same [`id`](FilterRecord::id).
//! Containers should key on [`FilterRevisionKey`], never on the record itself:
//! record equality includes the mutable flags.

mod error;
mod kind;
mod record;

pub use error::FilterError;
pub use kind::FilterType;
pub use record::{FilterRecord, FilterRevisionKey, FilterRow, build_id, sort_records};
