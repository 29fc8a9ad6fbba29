//! Used when the `logging` feature is off: no logger is installed, and the level is only
//! forwarded to the `log` facade so disabled macros stay cheap.

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.root_level);
    }
}
