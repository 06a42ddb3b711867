/// Logging capability handed to the input router.
pub trait Diagnostics {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Forwards to the `log` facade under a fixed target.
#[derive(Debug, Clone, Copy)]
pub struct LogDiagnostics {
    target: &'static str,
}

impl LogDiagnostics {
    pub const fn new(target: &'static str) -> Self {
        Self { target }
    }
}

impl Default for LogDiagnostics {
    fn default() -> Self {
        Self::new("glance::router")
    }
}

impl Diagnostics for LogDiagnostics {
    fn info(&self, msg: &str) {
        log::info!(target: self.target, "{}", msg);
    }

    fn warn(&self, msg: &str) {
        log::warn!(target: self.target, "{}", msg);
    }

    fn error(&self, msg: &str) {
        log::error!(target: self.target, "{}", msg);
    }
}
