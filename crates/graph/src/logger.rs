use log::{Level, Log, Metadata, Record};
use std::fmt;

/// Logging capability handed to every component at construction time.
///
/// Wraps a `log::Log` sink and a target name. Without an explicit sink the
/// process-wide `log` facade is looked up on every record, so whatever the
/// binary installs (env_logger) receives them.
#[derive(Clone, Copy)]
pub struct Logger {
    sink: Option<&'static dyn Log>,
    target: &'static str,
}

impl Logger {
    #[must_use]
    pub fn new(sink: &'static dyn Log, target: &'static str) -> Self {
        Self {
            sink: Some(sink),
            target,
        }
    }

    /// Logger forwarding to the global `log` facade.
    #[must_use]
    pub fn facade(target: &'static str) -> Self {
        Self { sink: None, target }
    }

    #[must_use]
    pub fn with_target(self, target: &'static str) -> Self {
        Self { target, ..self }
    }

    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let sink = match self.sink {
            Some(sink) => sink,
            None if level <= log::max_level() => log::logger(),
            None => return,
        };
        let metadata = Metadata::builder().level(level).target(self.target).build();
        if !sink.enabled(&metadata) {
            return;
        }
        sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path_static(Some(module_path!()))
                .build(),
        );
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::facade("inject")
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
