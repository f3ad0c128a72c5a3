use crate::{Query, QueryMap, ReadError, RemoteReader};
use std::process::Stdio;
use std::time::Duration;
use tele_config::{DeviceConfig, QueryConfig};
use tokio::process::Command;

/// [`RemoteReader`] backed by `adb shell`.
///
/// Each read spawns `adb [-s SERIAL] shell <command>` and waits at most
/// `timeout`; a command that overruns is killed.
#[derive(Debug, Clone)]
pub struct AdbReader {
    program: String,
    serial:  Option<String>,
    timeout: Duration,
    queries: QueryMap,
}

impl AdbReader {
    pub fn new(program: impl Into<String>, serial: Option<String>, timeout: Duration, queries: QueryMap) -> Self {
        Self {
            program: program.into(),
            serial,
            timeout,
            queries,
        }
    }

    /// Build a reader from the `[device]` and `[queries]` config sections.
    pub fn from_config(device: &DeviceConfig, queries: &QueryConfig) -> Self {
        Self::new(
            device.adb_path.clone(),
            device.serial.clone(),
            device.timeout(),
            QueryMap::from_config(queries),
        )
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arguments passed to `adb` for a remote `command`.
    fn args<'a>(&'a self, command: &'a str) -> Vec<&'a str> {
        let mut args = Vec::with_capacity(4);
        if let Some(serial) = &self.serial {
            args.extend(["-s", serial.as_str()]);
        }
        args.extend(["shell", command]);
        args
    }
}

impl RemoteReader for AdbReader {
    async fn read(&self, query: Query) -> Result<String, ReadError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(self.queries.command(query)));
        let result = exec(cmd, self.timeout).await;
        if let Err(e) = &result {
            tracing::trace!("adb read '{query}' failed: {e}");
        }
        result
    }
}

/// Run `cmd` to completion within `timeout` and return its trimmed stdout.
async fn exec(mut cmd: Command, timeout: Duration) -> Result<String, ReadError> {
    cmd.stdin(Stdio::null()).kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(out) => out?,
        Err(_) => return Err(ReadError::Timeout(timeout)),
    };

    if !output.status.success() {
        return Err(ReadError::ExitStatus(output.status.code()));
    }

    let text = String::from_utf8(output.stdout).map_err(|_| ReadError::Utf8)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(ReadError::Empty);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(serial: Option<&str>) -> AdbReader {
        AdbReader::new("adb", serial.map(String::from), Duration::from_secs(2), QueryMap::default())
    }

    #[test]
    fn args_without_serial() {
        let r = reader(None);
        assert_eq!(r.args("getprop ro.product.model"), ["shell", "getprop ro.product.model"]);
    }

    #[test]
    fn args_with_serial() {
        let r = reader(Some("ZY22"));
        assert_eq!(r.args("cat x"), ["-s", "ZY22", "shell", "cat x"]);
    }

    #[test]
    fn from_config_uses_device_timeout() {
        let device = DeviceConfig { timeout_ms: 750, ..DeviceConfig::default() };
        let r = AdbReader::from_config(&device, &QueryConfig::default());
        assert_eq!(r.timeout(), Duration::from_millis(750));
    }

    #[cfg(unix)]
    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exec_trims_output() {
        let out = exec(sh("printf '  45230\\n'"), Duration::from_secs(5)).await.unwrap();
        assert_eq!(out, "45230");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exec_reports_exit_status() {
        let err = exec(sh("exit 3"), Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, ReadError::ExitStatus(Some(3))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exec_reports_empty_output() {
        let err = exec(sh("true"), Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, ReadError::Empty));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exec_times_out() {
        let err = exec(sh("sleep 5"), Duration::from_millis(100)).await.unwrap_err();
        assert!(matches!(err, ReadError::Timeout(d) if d == Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let r = AdbReader::new(
            "/nonexistent/adb-for-tests",
            None,
            Duration::from_secs(1),
            QueryMap::default(),
        );
        let err = r.read(Query::Temperature).await.unwrap_err();
        assert!(matches!(err, ReadError::Spawn(_)));
    }
}
