/// Host logger that feeds the process-wide `log` facade
use crate::context::Context;
use crate::error::Result;
use crate::level::Level;
use crate::logger::threshold::Threshold;
use crate::logger::Logger;

/// Forwards plugin records into whatever `log` backend the host installed
/// (`env_logger`, syslog, ...), so plugin lines interleave with the host's own.
///
/// The threshold here is the authoritative one for connected plugins; the
/// backend may still filter further by target.
pub struct FacadeLogger {
    target: String,
    threshold: Threshold,
}

impl FacadeLogger {
    pub fn new(target: impl Into<String>, level: Level) -> Self {
        Self {
            target: target.into(),
            threshold: Threshold::new(level),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn level(&self) -> Level {
        self.threshold.get()
    }
}

impl Logger for FacadeLogger {
    fn log(&self, level: Level, message: &str, context: Option<&Context>) -> Result<()> {
        if level != Level::Fatal && !self.threshold.permits(level) {
            return Ok(());
        }
        let Some(facade_level) = level.to_facade() else {
            return Ok(());
        };
        // `log` has no fatal level
        let marker = if level == Level::Fatal { "FATAL: " } else { "" };
        let pairs = match context.filter(|c| !c.is_empty()) {
            Some(context) => format!(" {context}"),
            None => String::new(),
        };
        log::logger().log(
            &log::Record::builder()
                .args(format_args!("{marker}{message}{pairs}"))
                .level(facade_level)
                .target(&self.target)
                .module_path(Some(module_path!()))
                .build(),
        );
        Ok(())
    }

    fn is_trace(&self) -> bool {
        self.threshold.permits(Level::Trace)
    }

    fn is_debug(&self) -> bool {
        self.threshold.permits(Level::Debug)
    }

    fn is_info(&self) -> bool {
        self.threshold.permits(Level::Info)
    }

    fn is_warn(&self) -> bool {
        self.threshold.permits(Level::Warn)
    }

    fn set_level(&self, level: Level) -> Result<()> {
        self.threshold.set(level);
        Ok(())
    }
}
