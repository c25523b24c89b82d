//! Fuzz target: HTTP request head parser
//!
//! Feeds arbitrary bytes to `head_complete` and `parse` and checks:
//! - No panics under arbitrary input
//! - A parsed path always starts with `/` and carries no query or fragment
//! - The route table resolves every parsed path
//!
//! cargo fuzz run fuzz_request_parser

#![no_main]

use doorlock::http::request;
use doorlock::http::routes::Route;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = request::head_complete(data);

    if let Ok(req) = request::parse(data) {
        assert!(req.path.starts_with('/'), "path {:?} not absolute", req.path);
        assert!(!req.path.contains('?'), "query leaked into {:?}", req.path);
        assert!(!req.path.contains('#'), "fragment leaked into {:?}", req.path);
        let _ = Route::resolve(req.path);
    }
});
