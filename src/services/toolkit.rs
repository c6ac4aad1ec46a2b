use camino::{Utf8Path, Utf8PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

/// Errors that can occur while invoking an external tool
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to run {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolved paths to the four external extraction tools.
///
/// All four executables live under a `dependencies/` directory next to the
/// program; BinderTool ships in its own versioned subfolder. None of the
/// paths are verified at construction time - a missing tool simply fails at
/// invocation and the stage moves on.
#[derive(Debug, Clone)]
pub struct ToolKit {
    /// BinderTool by Atvaark - unpacks `*.bdt` archives.
    binder_tool: Utf8PathBuf,
    /// fsbext by Luigi Auriemma - decrypts FSB sound banks.
    fsb_ext: Utf8PathBuf,
    /// fsb5_split by Naram 'CyberBotX' Qashat - splits multitrack FSBs.
    fsb5_split: Utf8PathBuf,
    /// fsb_aud_extr by 'id-daemon' - decodes a single-track FSB to WAV.
    fsb_aud_extr: Utf8PathBuf,
}

impl ToolKit {
    /// Resolve the tool paths under the given dependencies directory.
    pub fn new<P: AsRef<Utf8Path>>(dependencies_dir: P) -> Self {
        let dir = dependencies_dir.as_ref();
        Self {
            binder_tool: dir.join("BinderTool.v0.5.2").join("BinderTool.exe"),
            fsb_ext: dir.join("fsbext.exe"),
            fsb5_split: dir.join("fsb5_split.exe"),
            fsb_aud_extr: dir.join("fsb_aud_extr.exe"),
        }
    }

    pub fn binder_tool(&self) -> &Utf8Path {
        &self.binder_tool
    }

    pub fn fsb_ext(&self) -> &Utf8Path {
        &self.fsb_ext
    }

    pub fn fsb5_split(&self) -> &Utf8Path {
        &self.fsb5_split
    }

    pub fn fsb_aud_extr(&self) -> &Utf8Path {
        &self.fsb_aud_extr
    }
}

/// Run one external tool to completion, discarding its output.
///
/// Stdout and stderr go to null - the tools are chatty and would trample the
/// progress bars. `work_dir` sets the *child's* working directory, which is
/// how fsb_aud_extr is told where to write (it has no output flag and always
/// writes to its own cwd). The orchestrator's working directory is never
/// touched.
///
/// There is deliberately no timeout: a hung tool blocks the pipeline until
/// the user kills it.
///
/// # Returns
/// The tool's exit status. Spawn failures (missing executable, permissions)
/// surface as [`ToolError::Io`].
pub async fn run_tool(
    program: &Utf8Path,
    args: &[&str],
    work_dir: Option<&Utf8Path>,
) -> Result<ExitStatus, ToolError> {
    let mut cmd = Command::new(program.as_std_path());
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    if let Some(dir) = work_dir {
        cmd.current_dir(dir.as_std_path());
    }

    tracing::debug!("Executing: {} {}", program, args.join(" "));

    cmd.status().await.map_err(|source| ToolError::Io {
        tool: program.to_string(),
        source,
    })
}
