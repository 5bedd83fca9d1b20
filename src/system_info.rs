//! System identification for prompt context.

use crate::executor::ProcessRunner;

/// Returns a one-line description of the host system, used to tag prompts
/// so suggestions target the right platform.
///
/// On Unix this is the trimmed output of `uname -a`; elsewhere (or when the
/// probe fails) it falls back to the compile-time OS name.
pub fn probe(runner: &dyn ProcessRunner) -> String {
    if cfg!(unix) {
        match runner.capture("uname", &["-a"]) {
            Ok(info) if !info.is_empty() => return info,
            _ => {}
        }
    }
    std::env::consts::OS.to_string()
}
