//! Desktop notifications
//!
//! Shells out to the platform notifier:
//!   - Linux: `notify-send`
//!   - macOS: `osascript -e 'display notification ...'`
//!
//! Permission is granted when the notifier command can be found on PATH.

use std::process::{Command, Stdio};

use tracing::{debug, info};

use super::{AlertError, Notifier, Permission, PermissionState};

pub struct DesktopNotifier {
    program: &'static str,
    permission: PermissionState,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        let program = if cfg!(target_os = "macos") {
            "osascript"
        } else {
            "notify-send"
        };
        Self {
            program,
            permission: PermissionState::default(),
        }
    }

    fn is_available(&self) -> bool {
        let probe = if self.program == "osascript" {
            Command::new(self.program)
                .args(["-e", "return"])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
        } else {
            Command::new(self.program)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
        };
        probe.map(|s| s.success()).unwrap_or(false)
    }

    fn build_command(&self, title: &str, body: &str) -> Command {
        let mut cmd = Command::new(self.program);
        if self.program == "osascript" {
            let script = format!(
                "display notification \"{}\" with title \"{}\"",
                escape_applescript(body),
                escape_applescript(title)
            );
            cmd.args(["-e", &script]);
        } else {
            cmd.args(["--app-name", "todo-alert", title, body]);
        }
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        cmd
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Notifier for DesktopNotifier {
    fn request_permission(&self) -> Permission {
        let permission = if self.is_available() {
            Permission::Granted
        } else {
            info!("{} not found, desktop notifications denied", self.program);
            Permission::Denied
        };
        self.permission.set(permission);
        permission
    }

    fn permission(&self) -> Permission {
        self.permission.get()
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), AlertError> {
        if !self.permission().is_granted() {
            return Err(AlertError::Unavailable(format!(
                "permission {}",
                self.permission().label()
            )));
        }

        debug!("Sending desktop notification via {}", self.program);

        // Fire-and-forget: reap the child off the caller's thread
        let mut child = self
            .build_command(title, body)
            .spawn()
            .map_err(|e| AlertError::CommandFailed(format!("{}: {}", self.program, e)))?;
        std::thread::spawn(move || {
            if let Ok(status) = child.wait() {
                if !status.success() {
                    debug!("Notifier exited with {:?}", status.code());
                }
            }
        });

        Ok(())
    }
}
