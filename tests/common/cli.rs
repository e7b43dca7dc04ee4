use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct IstoreWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl IstoreWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join("ingest.db")
    }
}

pub struct RunOutput {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run `istore` inside the workspace against its database.
pub fn run_istore<I, S>(workspace: &IstoreWorkspace, args: I) -> RunOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let output = Command::cargo_bin("istore")
        .expect("istore binary")
        .current_dir(&workspace.root)
        .env_remove("RUST_LOG")
        .env_remove("APP_DB_NAME")
        .env_remove("APP_DB_DIR")
        .env_remove("APP_DB_POOL_SIZE")
        .env_remove("APP_DB_CONNECT_TIMEOUT_MS")
        .env_remove("APP_DB_BUSY_TIMEOUT_MS")
        .env("APP_DB_PATH", workspace.db_path())
        .args(args)
        .output()
        .expect("run istore");
    RunOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
