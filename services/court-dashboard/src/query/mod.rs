//! Query cache: keys, per-operation policies and the shared client

pub mod client;
pub mod keys;
pub mod policy;

pub use client::{make_query_client, QueryClient, QueryObserver, QueryState};
pub use keys::{KeySegment, QueryKey};
pub use policy::{retry_delay, QueryPolicy, RetryPolicy, DEFAULT_GC_TIME};
