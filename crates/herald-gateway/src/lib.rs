//! HTTP ingress for Herald: Jira webhooks, Alertmanager webhooks and plain
//! messages are turned into chat notifications on the outbound queue.

pub mod gateway_routes;
pub mod gateway_server;

pub use gateway_routes::*;
pub use gateway_server::*;
