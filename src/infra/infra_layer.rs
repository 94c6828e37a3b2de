// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "league/mod.rs"]
pub mod league;

#[path = "tracker/http_tracker_client.rs"]
pub mod tracker;

#[path = "servers/http_cloud_control.rs"]
pub mod servers;
