//! Change capture, activity recording and audit trail queries.

mod interceptor;
mod queries;
mod recorder;

pub use interceptor::ChangeInterceptor;
pub use queries::{
    ActivityQueryError, ActivityQueryResult, ActivityQueryService, ActivityStats, ActivityView,
    RECENT_LIMIT, STATS_RECENT_LIMIT,
};
pub use recorder::{ActivityRecorder, AssignmentChange};
