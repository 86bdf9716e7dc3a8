//! 面向使用方的日志宏
//!
//! 级别检查在格式化之前完成，被过滤的日志不会求值格式化参数。

#[doc(hidden)]
#[macro_export]
macro_rules! __klog_at {
    ($level:expr, $($arg:tt)*) => {{
        let level = $level;
        if $crate::is_level_enabled(level) {
            $crate::log_impl(level, format_args!($($arg)*));
        }
    }};
}

/// 记录 Emergency 级别日志
#[macro_export]
macro_rules! pr_emerg {
    ($($arg:tt)*) => { $crate::__klog_at!($crate::LogLevel::Emergency, $($arg)*) };
}

/// 记录 Alert 级别日志
#[macro_export]
macro_rules! pr_alert {
    ($($arg:tt)*) => { $crate::__klog_at!($crate::LogLevel::Alert, $($arg)*) };
}

/// 记录 Critical 级别日志
#[macro_export]
macro_rules! pr_crit {
    ($($arg:tt)*) => { $crate::__klog_at!($crate::LogLevel::Critical, $($arg)*) };
}

/// 记录 Error 级别日志
#[macro_export]
macro_rules! pr_err {
    ($($arg:tt)*) => { $crate::__klog_at!($crate::LogLevel::Error, $($arg)*) };
}

/// 记录 Warning 级别日志
#[macro_export]
macro_rules! pr_warn {
    ($($arg:tt)*) => { $crate::__klog_at!($crate::LogLevel::Warning, $($arg)*) };
}

/// 记录 Notice 级别日志
#[macro_export]
macro_rules! pr_notice {
    ($($arg:tt)*) => { $crate::__klog_at!($crate::LogLevel::Notice, $($arg)*) };
}

/// 记录 Info 级别日志
#[macro_export]
macro_rules! pr_info {
    ($($arg:tt)*) => { $crate::__klog_at!($crate::LogLevel::Info, $($arg)*) };
}

/// 记录 Debug 级别日志
#[macro_export]
macro_rules! pr_debug {
    ($($arg:tt)*) => { $crate::__klog_at!($crate::LogLevel::Debug, $($arg)*) };
}
