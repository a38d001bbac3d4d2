use std::{
    io::{self, PipeReader, Read},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::{debug, trace};

use crate::constants::{CHILD_POLL_INTERVAL_MS, DEFAULT_TOOL, LIST_FLAG};
use crate::error::{StLinkError, StLinkResult};

/// Where to find the vendor tool and how long to wait for it
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub program: PathBuf,
    pub timeout: Option<Duration>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            program: PathBuf::from(DEFAULT_TOOL),
            timeout: None,
        }
    }
}

/// Captured result of one vendor tool run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub status: Option<i32>,
    /// stdout and stderr interleaved as printed, split into lines
    pub lines: Vec<String>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

pub trait CommandRunner {
    /// Run the vendor tool with `args` and capture everything it prints.
    /// A non-zero exit status is not an error.
    fn run(&self, args: &[String]) -> StLinkResult<ToolOutput>;
}

/// Arguments for the probe listing command
pub fn list_args() -> Vec<String> {
    vec![LIST_FLAG.to_owned()]
}

/// Arguments for programming `firmware` through probe `probe`: connect over
/// SWD under reset with hardware reset mode, program quietly, verify, pulse
/// the hardware reset line and reset the core.
pub fn flash_args(firmware: &Path, probe: u32) -> Vec<String> {
    vec![
        "-c".to_owned(),
        format!("ID={}", probe),
        "SWD".to_owned(),
        "UR".to_owned(),
        "Hrst".to_owned(),
        "-Q".to_owned(),
        "-P".to_owned(),
        firmware.display().to_string(),
        "-V".to_owned(),
        "-HardRST".to_owned(),
        "HIGH".to_owned(),
        "-Rst".to_owned(),
    ]
}

/// Runs the real vendor executable as a child process
pub struct VendorTool {
    config: ToolConfig,
}

impl VendorTool {
    pub fn new(config: ToolConfig) -> Self {
        VendorTool { config }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Start the tool with stdout and stderr sharing one pipe, so the
    /// returned reader sees lines in the order they were printed
    fn spawn(&self, args: &[String]) -> StLinkResult<(Child, PipeReader)> {
        let pipe_error = |e: io::Error| {
            StLinkError::Invocation(format!("Failed to create output pipe: {}", e))
        };
        let (reader, writer) = io::pipe().map_err(pipe_error)?;
        let stdout = writer.try_clone().map_err(pipe_error)?;

        let mut command = Command::new(&self.config.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(writer);

        let child = command.spawn().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StLinkError::ToolNotFound(self.config.program.clone())
            } else {
                StLinkError::Invocation(format!(
                    "Failed to start {:?}: {}",
                    self.config.program, e
                ))
            }
        })?;

        // The command still owns write ends; the reader only sees EOF once they are gone
        drop(command);

        Ok((child, reader))
    }

    fn wait(&self, child: &mut Child) -> StLinkResult<ExitStatus> {
        let Some(timeout) = self.config.timeout else {
            return child
                .wait()
                .map_err(|e| StLinkError::Invocation(format!("Failed to wait for tool: {}", e)));
        };

        let started = Instant::now();
        loop {
            let polled = child
                .try_wait()
                .map_err(|e| StLinkError::Invocation(format!("Failed to poll tool: {}", e)))?;
            if let Some(status) = polled {
                return Ok(status);
            }

            if started.elapsed() >= timeout {
                // Already exited between the poll and the kill is fine
                let _ = child.kill();
                if let Err(e) = child.wait() {
                    debug!("Could not reap timed out tool: {}", e);
                }
                return Err(StLinkError::Timeout(timeout));
            }

            thread::sleep(Duration::from_millis(CHILD_POLL_INTERVAL_MS));
        }
    }
}

impl CommandRunner for VendorTool {
    fn run(&self, args: &[String]) -> StLinkResult<ToolOutput> {
        debug!("Running {:?} {:?}", self.config.program, args);
        let (mut child, reader) = self.spawn(args)?;

        // Drain while waiting so the child never blocks on a full pipe
        let output = drain(reader);

        let status = self.wait(&mut child)?;
        let text = collect(output)?;

        let lines: Vec<String> = text.lines().map(str::to_owned).collect();
        for line in &lines {
            trace!("tool: {}", line);
        }
        debug!("Tool exited with {:?}", status.code());

        Ok(ToolOutput {
            status: status.code(),
            lines,
        })
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn collect(reader: JoinHandle<io::Result<Vec<u8>>>) -> StLinkResult<String> {
    let bytes = reader
        .join()
        .map_err(|_| StLinkError::Invocation("Output reader thread panicked".to_owned()))?
        .map_err(|e| StLinkError::Invocation(format!("Failed to read tool output: {}", e)))?;

    // The tool prints in the console code page; keep going on stray bytes
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
