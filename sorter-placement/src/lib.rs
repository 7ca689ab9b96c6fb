//! sorter-placement: everything that touches the filesystem after
//! classification. Verification, duplicate detection, placement and the
//! checklist/log outputs.

pub mod checklist;
pub mod dedup;
pub mod placement;
pub mod verify;

pub use checklist::{ChecklistRow, LogEntry, Outcome, RunStats, write_checklist, write_json_log};
pub use dedup::{file_sha1, find_duplicates, redundant_copies};
pub use placement::{
    FilePlacer, PlacementError, PlacementOutcome, PlacementPlan, non_conflicting_path,
    plan_placement,
};
pub use verify::{VerifyError, verify_pdf};
