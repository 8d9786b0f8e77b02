//! Merge policy engine
//!
//! Leaf-first:
//! 1. Aggregate - reviews, statuses/checks, branch protection (read-only)
//! 2. Gate - combine them with PR flags into an eligibility verdict
//! 3. Execute - attempt the merge (effectful)
//!
//! [`check_merge`] sequences all three and is the only entry point event
//! handlers use.

mod check;
mod execute;
mod gate;
mod protection;
mod reviews;
mod status;

pub use check::check_merge;
pub use execute::{MergeFailure, classify_merge_error, merge, merge_error_detail};
pub use gate::{EligibleReason, Eligibility, Rejection, can_merge, evaluate_merge};
pub use protection::is_branch_protected;
pub use reviews::{
    ReviewTeam, TeamMembership, effective_reviews, partition_teams, required_approvals,
    review_approval, review_team_slugs,
};
pub use status::{combine_suite_status, is_relevant_suite, status_approval};
