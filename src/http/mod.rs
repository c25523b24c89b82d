//! Read-only observability surface over HTTP.
//!
//! | path           | status | body                     |
//! |----------------|--------|--------------------------|
//! | `/`            | 200    | log viewer page          |
//! | `/logs`        | 200    | event log snapshot       |
//! | `/favicon.ico` | 204    | empty                    |
//! | anything else  | 404    | `Not found. Try /\n`     |

pub mod page;
pub mod request;
pub mod routes;
pub mod server;
