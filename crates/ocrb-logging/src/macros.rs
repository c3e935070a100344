//! ---
//! ocrb_section: "03-persistence-logging"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Structured logging adapters and sinks."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
/// Emit an informational log enriched with run context.
#[macro_export]
macro_rules! ocrb_info {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::INFO,
            run_id = ctx.run_id.unwrap_or(""),
            workload_id = ctx.workload_id.unwrap_or(""),
            stage = ctx.stage.unwrap_or_default(),
            restart = ctx.restart.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::INFO,
            run_id = ctx.run_id.unwrap_or(""),
            workload_id = ctx.workload_id.unwrap_or(""),
            stage = ctx.stage.unwrap_or_default(),
            restart = ctx.restart.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit a debug log enriched with run context.
#[macro_export]
macro_rules! ocrb_debug {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::DEBUG,
            run_id = ctx.run_id.unwrap_or(""),
            workload_id = ctx.workload_id.unwrap_or(""),
            stage = ctx.stage.unwrap_or_default(),
            restart = ctx.restart.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::DEBUG,
            run_id = ctx.run_id.unwrap_or(""),
            workload_id = ctx.workload_id.unwrap_or(""),
            stage = ctx.stage.unwrap_or_default(),
            restart = ctx.restart.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit a warning enriched with run context.
#[macro_export]
macro_rules! ocrb_warn {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::WARN,
            run_id = ctx.run_id.unwrap_or(""),
            workload_id = ctx.workload_id.unwrap_or(""),
            stage = ctx.stage.unwrap_or_default(),
            restart = ctx.restart.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::WARN,
            run_id = ctx.run_id.unwrap_or(""),
            workload_id = ctx.workload_id.unwrap_or(""),
            stage = ctx.stage.unwrap_or_default(),
            restart = ctx.restart.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit an error log enriched with run context.
#[macro_export]
macro_rules! ocrb_error {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::ERROR,
            run_id = ctx.run_id.unwrap_or(""),
            workload_id = ctx.workload_id.unwrap_or(""),
            stage = ctx.stage.unwrap_or_default(),
            restart = ctx.restart.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::ERROR,
            run_id = ctx.run_id.unwrap_or(""),
            workload_id = ctx.workload_id.unwrap_or(""),
            stage = ctx.stage.unwrap_or_default(),
            restart = ctx.restart.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
}
