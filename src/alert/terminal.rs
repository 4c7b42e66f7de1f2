//! Terminal alerts: rings the bell and writes the alert to stderr

use std::io::Write;

use super::{AlertError, Notifier, Permission, PermissionState};

#[derive(Default)]
pub struct TerminalNotifier {
    permission: PermissionState,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for TerminalNotifier {
    fn request_permission(&self) -> Permission {
        // The terminal is always there
        self.permission.set(Permission::Granted);
        Permission::Granted
    }

    fn permission(&self) -> Permission {
        self.permission.get()
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), AlertError> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "\x07⏰ {}: {}", title, body)?;
        stderr.flush()?;
        Ok(())
    }
}
