//! Termination of the plugin process after a fatal log call.
//!
//! The proxy sends the fatal message first and only then hands control to a
//! [`Terminate`] implementation. Production code uses [`AbortProcess`];
//! harnesses that need to observe the ordering use [`UnwindOnFatal`] and
//! catch the unwind.

/// Ends the current process (or, in a harness, the current control flow).
pub trait Terminate: Send + Sync {
    fn terminate(&self, message: &str) -> !;
}

/// Aborts the process. The default for [`LoggerClient`](crate::client::LoggerClient).
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortProcess;

impl Terminate for AbortProcess {
    fn terminate(&self, _message: &str) -> ! {
        std::process::abort()
    }
}

/// Unwinds with a [`FatalExit`] payload instead of exiting.
///
/// Only for harnesses: code under test must not rely on recovering from it.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnwindOnFatal;

/// Panic payload raised by [`UnwindOnFatal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalExit {
    pub message: String,
}

impl Terminate for UnwindOnFatal {
    fn terminate(&self, message: &str) -> ! {
        std::panic::panic_any(FatalExit {
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;

    #[test]
    fn test_unwind_on_fatal_carries_message() {
        let result = panic::catch_unwind(|| UnwindOnFatal.terminate("disk on fire"));
        let payload = result.err().unwrap();
        let exit = payload.downcast_ref::<FatalExit>().unwrap();
        assert_eq!(exit.message, "disk on fire");
    }

    #[test]
    fn test_terminators_are_object_safe() {
        let terminators: Vec<Box<dyn Terminate>> =
            vec![Box::new(AbortProcess), Box::new(UnwindOnFatal)];
        assert_eq!(terminators.len(), 2);
    }
}
