//! Sequence planning
//!
//! Turns the raw stage tokens of a run sequence into ordered stage groups.
//! Planning is purely textual: ids are not checked against the task
//! registry here, so unknown ids surface at execution time as failed task
//! results rather than aborting the run.

/// One stage of the run sequence: the task ids that run concurrently
///
/// A group with a single id is effectively sequential. Members of a group
/// have no intra-group ordering guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageGroup {
    pub task_ids: Vec<String>,
}

/// Plan the ordered stage groups for a run sequence
///
/// Each token is trimmed; a token without a comma becomes a single-task
/// stage, a comma-joined token becomes a concurrent group with each part
/// trimmed. Output order and length match the input tokens. Empty parts of
/// a comma group are dropped.
pub fn plan_stages(sequence: &[String]) -> Vec<StageGroup> {
    sequence
        .iter()
        .map(|token| {
            let token = token.trim();
            let task_ids = if token.contains(',') {
                token
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect()
            } else {
                vec![token.to_string()]
            };
            StageGroup { task_ids }
        })
        .collect()
}
