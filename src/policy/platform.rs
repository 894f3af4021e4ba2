//! Host platform identifiers used as keys in a policy's `platforms` map

use std::fmt;

/// Operating systems a policy can carry platform-specific rules for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Win32,
    Darwin,
    Linux,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Win32, Platform::Darwin, Platform::Linux];

    /// The key used for this platform in policy documents
    pub fn id(&self) -> &'static str {
        match self {
            Platform::Win32 => "win32",
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
        }
    }

    /// Parse a platform key. Unknown keys resolve to no platform.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "win32" => Some(Platform::Win32),
            "darwin" => Some(Platform::Darwin),
            "linux" => Some(Platform::Linux),
            _ => None,
        }
    }

    /// The platform this binary was built for, if it is one policies know about
    pub fn current() -> Option<Self> {
        if cfg!(target_os = "windows") {
            Some(Platform::Win32)
        } else if cfg!(target_os = "macos") {
            Some(Platform::Darwin)
        } else if cfg!(target_os = "linux") {
            Some(Platform::Linux)
        } else {
            None
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
