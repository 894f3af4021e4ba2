//! Default policy written by `command-sandbox init`
//!
//! Common rules cover catastrophic operations on any OS; the platform
//! sections add destructive commands specific to each shell environment.

/// Embedded default policy document
pub const DEFAULT_POLICY_JSON: &str = r#"{
  "version": 1,
  "common": {
    "block": [
      "\\brm\\s+(-[rfv]+\\s+)*/+\\s*$",
      "\\brm\\s+(-[rfv]+\\s+)*/\\*",
      "\\brm\\s+(-[rfv]+\\s+)*(~|\\$HOME)/?\\s*$",
      ":\\(\\)\\s*\\{.*:\\s*\\|\\s*:.*&",
      "\\b(curl|wget)\\b.*\\|\\s*(ba|z)?sh\\b",
      "\\bgit\\s+push\\b.*(-f|--force)\\b.*\\b(main|master)\\b",
      "bash\\s+-i\\s+>&\\s*/dev/tcp/",
      "\\bdocker\\s+run\\b.*-v\\s+/:/"
    ],
    "riskKeywords": [
      "password",
      "passwd",
      "secret",
      "token",
      "api_key",
      "private_key",
      "credentials",
      "sudo ",
      "--force",
      "--no-verify"
    ],
    "notes": "Rules in this section apply on every platform."
  },
  "platforms": {
    "win32": {
      "block": [
        "(?i)\\bformat\\s+[a-z]:",
        "(?i)\\brd\\s+/s\\s+/q\\s+[a-z]:\\\\\\s*$",
        "(?i)\\bdel\\s+/[fsq].*\\s[a-z]:\\\\\\s*$",
        "(?i)\\bremove-item\\b.*-recurse.*\\s[a-z]:\\\\\\s*$",
        "(?i)\\bdiskpart\\b",
        "(?i)\\bbcdedit\\b",
        "(?i)\\breg\\s+delete\\s+hklm"
      ],
      "riskKeywords": [
        "Set-ExecutionPolicy",
        "runas",
        "-EncodedCommand"
      ]
    },
    "darwin": {
      "block": [
        "\\bdiskutil\\s+(eraseDisk|eraseVolume|partitionDisk)\\b",
        "\\bcsrutil\\s+disable\\b",
        "\\brm\\s+(-[rfv]+\\s+)*/(System|Library|Applications|Users)/?\\s*$"
      ],
      "riskKeywords": [
        "find-generic-password",
        "launchctl",
        "spctl"
      ]
    },
    "linux": {
      "block": [
        "\\brm\\s+(-[rfv]+\\s+)*/(etc|usr|var|bin|sbin|lib|boot|opt|home)/?\\s*$",
        "\\bdd\\b.*\\bof=/dev/(sd|nvme|hd|vd|xvd)[a-z]",
        "\\bmkfs\\.\\w+\\s+/dev/",
        "\\bfdisk\\s+/dev/",
        "\\bchmod\\s+-R\\s+777\\s+/\\s*$"
      ],
      "riskKeywords": [
        "systemctl",
        "iptables",
        "/etc/shadow"
      ]
    }
  }
}
"#;
