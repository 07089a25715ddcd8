#![doc = "The `taskdeck` library crate."]
#![doc = ""]
#![doc = "Contains the domain models, the identity/task store boundaries, the"]
#![doc = "session-token lifecycle (issue, verify, rotate, revoke), the request"]
#![doc = "authorization middleware, routing configuration, and error handling."]
#![doc = "The binary (`main.rs`) wires these together into a running server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod response;
pub mod routes;
pub mod store;
