use super::*;
use crate::GLOBAL_LOG_BUFFER_SIZE;

const TOTAL: usize = GLOBAL_LOG_BUFFER_SIZE + 36;

fn flood(log: &LogCore) {
    for i in 0..TOTAL {
        log.log(LogLevel::Info, format_args!("entry {}", i));
    }
}

#[test]
fn test_full_ring_overwrites_oldest() {
    let log = fresh();
    flood(&log);

    assert_eq!(log.len(), GLOBAL_LOG_BUFFER_SIZE);
    assert_eq!(log.dropped(), TOTAL - GLOBAL_LOG_BUFFER_SIZE);
    let oldest = alloc::format!("entry {}", TOTAL - GLOBAL_LOG_BUFFER_SIZE);
    assert_eq!(log.read().unwrap().message(), oldest);
}

#[test]
fn test_ring_usable_after_drain() {
    let log = fresh();
    flood(&log);
    while log.read().is_some() {}

    log.log(LogLevel::Info, format_args!("after"));
    assert_eq!(log.len(), 1);
    assert_eq!(log.read().unwrap().message(), "after");
    assert_eq!(log.dropped(), TOTAL - GLOBAL_LOG_BUFFER_SIZE);
}
