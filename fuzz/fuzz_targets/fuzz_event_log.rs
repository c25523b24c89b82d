//! Fuzz target: `EventLog` eviction
//!
//! Splits the input into lines, appends them to a small log and checks
//! after every append:
//! - The buffer never exceeds capacity by more than the newest line
//! - The snapshot is empty or ends with a newline
//! - The snapshot is a suffix of everything appended so far
//!
//! cargo fuzz run fuzz_event_log

#![no_main]

use doorlock::eventlog::EventLog;
use libfuzzer_sys::fuzz_target;

const CAPACITY: usize = 256;
const TRIM_TARGET: usize = 96;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut log = EventLog::new(CAPACITY, TRIM_TARGET);
    let mut written = String::new();

    for line in text.split('\n') {
        log.append(line);

        assert!(
            log.len() <= CAPACITY + line.len() + 1,
            "log grew to {} bytes",
            log.len()
        );
        written.push_str(line);
        written.push('\n');
        let snap = log.snapshot();
        assert!(snap.is_empty() || snap.ends_with('\n'));
        assert!(written.ends_with(snap), "snapshot is not a suffix");
    }
});
