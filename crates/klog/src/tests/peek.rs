use super::*;

#[test]
fn test_peek_leaves_entries() {
    let log = fresh();
    log.log(LogLevel::Info, format_args!("first"));
    log.log(LogLevel::Info, format_args!("second"));

    assert_eq!(log.peek(0).unwrap().message(), "first");
    assert_eq!(log.peek(1).unwrap().message(), "second");
    assert!(log.peek(2).is_none());
    assert_eq!(log.len(), 2);

    log.read();
    assert_eq!(log.peek(0).unwrap().message(), "second");
}

#[test]
fn test_peek_after_wraparound() {
    let log = fresh();
    for i in 0..crate::GLOBAL_LOG_BUFFER_SIZE + 3 {
        log.log(LogLevel::Info, format_args!("e{}", i));
    }
    assert_eq!(log.peek(0).unwrap().message(), "e3");
    let last = log.peek(crate::GLOBAL_LOG_BUFFER_SIZE - 1).unwrap();
    assert_eq!(
        last.message(),
        alloc::format!("e{}", crate::GLOBAL_LOG_BUFFER_SIZE + 2)
    );
}
