// Reddit post source — app-only OAuth, hot listings, request pacing.
//
// `traits` holds the PostSource abstraction the pipeline consumes; the rest
// is the production implementation on top of Reddit's OAuth API.

pub mod client;
pub mod posts;
pub mod rate_limiter;
pub mod traits;
