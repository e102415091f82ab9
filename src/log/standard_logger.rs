use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;

use crate::log::LogConfiguration;

// ISO 8601 timestamp, color coded level, then the emitting module
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";

impl LogConfiguration {
    /// Installs a `log4rs` console logger matching this configuration, or
    /// swaps it in if one is already installed.
    pub(in crate::log) fn set_config(&mut self) {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        let mut builder =
            Config::builder().appender(Appender::builder().build("stdout", Box::new(stdout)));
        for (module, level) in &self.module_levels {
            builder = builder.logger(Logger::builder().build(module.clone(), *level));
        }
        let root = Root::builder()
            .appender("stdout")
            .build(self.global_log_level);
        let config = match builder.build(root) {
            Ok(config) => config,
            Err(e) => panic!("failed to build log config: {e}"),
        };

        match self.root_handle {
            Some(ref handle) => handle.set_config(config),
            None => match log4rs::init_config(config) {
                Ok(handle) => self.root_handle = Some(handle),
                // Another logger owns the process; just respect the level.
                Err(_) => log::set_max_level(self.global_log_level),
            },
        }
    }
}
