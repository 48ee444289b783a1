//! Stack context attached to debug task diagnostics.
//!
//! A process-wide panic hook records the panic location and a backtrace into
//! a thread-local slot. `catch_unwind` returns on the panicking thread, so the
//! dispatcher reads the slot right after catching.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic;
use std::sync::Once;

thread_local! {
    static LAST_PANIC: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Install the recording hook once. The previous hook still runs.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let mut trace = Vec::new();
            if let Some(location) = info.location() {
                trace.push(format!("panicked at {location}"));
            }
            trace.extend(frames(&Backtrace::force_capture()));
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

/// Trace recorded by the most recent panic on this thread, if any.
pub fn take_panic_trace() -> Option<Vec<String>> {
    LAST_PANIC.with(|slot| slot.borrow_mut().take())
}

/// Trace of the current call stack.
pub fn capture() -> Vec<String> {
    frames(&Backtrace::force_capture())
}

fn frames(backtrace: &Backtrace) -> Vec<String> {
    backtrace
        .to_string()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
