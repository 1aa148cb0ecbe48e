//! Build-flag registry.
//!
//! Each module registers a short token string at startup (for example
//! `GPIO_MODULE=1.0`); the firmware-info handler reports the joined list to
//! the host so it can discover what a device was built with.

/// Maximum number of registered flag strings.
pub const MAX_MODULE_FLAGS: usize = 8;

/// Bounded, ordered collection of module flag strings.
#[derive(Debug, Default, Clone)]
pub struct ModuleFlags {
    flags: Vec<String>,
}

impl ModuleFlags {
    /// Create an empty registry.
    pub fn new() -> Self {
        ModuleFlags::default()
    }

    /// Register a flag string. Returns `false` when the registry is full.
    pub fn add(&mut self, flag: &str) -> bool {
        if self.flags.len() >= MAX_MODULE_FLAGS {
            log::warn!("module flag registry full, dropping {:?}", flag);
            return false;
        }
        self.flags.push(flag.to_string());
        true
    }

    /// Number of registered flags.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// All flags joined with single spaces, in registration order.
    pub fn joined(&self) -> String {
        self.flags.join(" ")
    }
}

/// Board identification tokens for the simulated device.
///
/// Real firmware derives these from board macros; the simulator reports the
/// host platform it runs on.
pub fn board_flags() -> String {
    format!(
        "BOARD={} MCU={}",
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
