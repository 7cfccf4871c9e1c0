//! External placement engines.
//!
//! The engine gets a subtree (leaves labelled `label%%token`), an alignment
//! of the subtree's references plus the query, and returns a jplace document
//! whose edge numbers refer to its own copy of the subtree.

use super::jplace::JplaceDocument;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{0} not found in PATH")]
    NotFound(String),

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}, see {log}")]
    Failed {
        program: String,
        status: String,
        log: String,
    },

    #[error("{program} killed after {secs} seconds")]
    Timeout { program: String, secs: u64 },

    #[error("cannot read engine output {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("engine output {path} is not a placement document: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EngineError {
    /// Failures of the engine process itself. The query is skipped and the
    /// run goes on. A document that was written but cannot be read as jplace
    /// is not recoverable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::Parse { .. })
    }
}

/// Files of one engine invocation.
#[derive(Debug, Clone)]
pub struct EngineJob {
    pub query: String,
    /// Subtree, token-labelled Newick
    pub tree_file: PathBuf,
    /// References of the subtree followed by the query
    pub aln_file: PathBuf,
    /// References of the subtree only
    pub ref_aln_file: PathBuf,
    /// Where the engine writes its jplace
    pub out_file: PathBuf,
    pub refpkg_dir: PathBuf,
    /// stdout and stderr of every program of the engine, appended
    pub log_file: PathBuf,
}

pub trait PlacementEngine {
    fn place(&self, job: &EngineJob) -> Result<JplaceDocument, EngineError>;
}

/// pplacer, optionally behind a taxit reference package.
#[derive(Debug, Clone)]
pub struct PplacerEngine {
    pplacer: PathBuf,
    taxit: Option<PathBuf>,
    model: String,
    info: PathBuf,
    timeout: Option<Duration>,
}

const POLL: Duration = Duration::from_millis(100);

/// Full path of `program`, searched in PATH unless it already is a path.
pub fn locate(program: &str) -> Result<PathBuf, EngineError> {
    which::which(program).map_err(|_| EngineError::NotFound(program.to_string()))
}

impl PplacerEngine {
    /// `taxit` is only needed when building reference packages.
    pub fn new(
        pplacer: &str,
        taxit: Option<&str>,
        model: &str,
        info: &Path,
        timeout: Option<Duration>,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            pplacer: locate(pplacer)?,
            taxit: taxit.map(locate).transpose()?,
            model: model.to_string(),
            info: info.to_path_buf(),
            timeout,
        })
    }

    fn taxit_command(&self, taxit: &Path, job: &EngineJob) -> Command {
        let mut cmd = Command::new(taxit);
        cmd.arg("create")
            .arg("-P")
            .arg(&job.refpkg_dir)
            .arg("-l")
            .arg(&job.query)
            .arg("--aln-fasta")
            .arg(&job.ref_aln_file)
            .arg("--tree-file")
            .arg(&job.tree_file)
            .arg("--tree-stats")
            .arg(&self.info);
        cmd
    }

    fn pplacer_command(&self, job: &EngineJob) -> Command {
        let mut cmd = Command::new(&self.pplacer);
        cmd.arg("-m").arg(&self.model);
        if self.taxit.is_some() {
            cmd.arg("-c").arg(&job.refpkg_dir);
        } else {
            cmd.arg("-s").arg(&self.info).arg("-t").arg(&job.tree_file);
        }
        cmd.arg("-o").arg(&job.out_file).arg("-j").arg("1").arg(&job.aln_file);
        cmd
    }

    fn run(&self, mut cmd: Command, log_file: &Path) -> Result<(), EngineError> {
        let program = cmd.get_program().to_string_lossy().to_string();
        let log_err = |source| EngineError::Spawn {
            program: program.clone(),
            source,
        };

        // taxit and pplacer share the job's log
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .map_err(log_err)?;
        let log2 = log.try_clone().map_err(log_err)?;
        cmd.stdin(Stdio::null()).stdout(log).stderr(log2);

        tracing::debug!("{:?}", cmd);
        let mut child = cmd.spawn().map_err(log_err)?;

        let status: ExitStatus = match self.timeout {
            None => child.wait().map_err(log_err)?,
            Some(limit) => {
                let start = Instant::now();
                loop {
                    if let Some(status) = child.try_wait().map_err(log_err)? {
                        break status;
                    }
                    if start.elapsed() > limit {
                        child.kill().ok();
                        child.wait().ok();
                        return Err(EngineError::Timeout {
                            program: program.clone(),
                            secs: limit.as_secs(),
                        });
                    }
                    std::thread::sleep(POLL);
                }
            }
        };

        if !status.success() {
            return Err(EngineError::Failed {
                program: program.clone(),
                status: status.to_string(),
                log: log_file.display().to_string(),
            });
        }
        Ok(())
    }
}

impl PlacementEngine for PplacerEngine {
    fn place(&self, job: &EngineJob) -> Result<JplaceDocument, EngineError> {
        if let Some(taxit) = &self.taxit {
            self.run(self.taxit_command(taxit, job), &job.log_file)?;
        }
        self.run(self.pplacer_command(job), &job.log_file)?;
        read_output(&job.out_file)
    }
}

/// Load the jplace an engine wrote.
pub fn read_output(path: &Path) -> Result<JplaceDocument, EngineError> {
    let text = std::fs::read_to_string(path).map_err(|source| EngineError::Output {
        path: path.display().to_string(),
        source,
    })?;
    JplaceDocument::parse(&text).map_err(|source| EngineError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(dir: &Path) -> EngineJob {
        EngineJob {
            query: "Q1".to_string(),
            tree_file: dir.join("tree_Q1.nwk"),
            aln_file: dir.join("aln_Q1.fa"),
            ref_aln_file: dir.join("ref_Q1.fa"),
            out_file: dir.join("Q1.jplace"),
            refpkg_dir: dir.join("Q1.refpkg"),
            log_file: dir.join("Q1.log"),
        }
    }

    fn engine(taxit: bool) -> PplacerEngine {
        PplacerEngine {
            pplacer: PathBuf::from("pplacer"),
            taxit: taxit.then(|| PathBuf::from("taxit")),
            model: "GTR".to_string(),
            info: PathBuf::from("RAxML_info.txt"),
            timeout: None,
        }
    }

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_pplacer_command_lines() {
        let dir = PathBuf::from("work");
        let job = job(&dir);

        let cmd = engine(true).pplacer_command(&job);
        assert_eq!(
            args(&cmd),
            vec![
                "-m",
                "GTR",
                "-c",
                "work/Q1.refpkg",
                "-o",
                "work/Q1.jplace",
                "-j",
                "1",
                "work/aln_Q1.fa"
            ]
        );

        let cmd = engine(false).pplacer_command(&job);
        assert_eq!(
            args(&cmd),
            vec![
                "-m",
                "GTR",
                "-s",
                "RAxML_info.txt",
                "-t",
                "work/tree_Q1.nwk",
                "-o",
                "work/Q1.jplace",
                "-j",
                "1",
                "work/aln_Q1.fa"
            ]
        );

        let e = engine(true);
        let cmd = e.taxit_command(Path::new("taxit"), &job);
        assert_eq!(args(&cmd)[0], "create");
        assert!(args(&cmd).contains(&"work/ref_Q1.fa".to_string()));
        assert!(args(&cmd).contains(&"--tree-stats".to_string()));
    }

    #[test]
    fn test_missing_output_is_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_output(&dir.path().join("none.jplace")).unwrap_err();
        assert!(err.is_recoverable());

        let path = dir.path().join("bad.jplace");
        std::fs::write(&path, "{\"tree\": ").unwrap();
        let err = read_output(&path).unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_timeout_and_failure() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = |name: &str, body: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        };
        let slow = script("slow.sh", "sleep 5");
        let ready = script("ready.sh", "echo refpkg ready");
        let failing = script("failing.sh", "echo boom >&2\nexit 3");

        let mut e = engine(false);
        e.timeout = Some(Duration::from_secs(1));
        let log = dir.path().join("Q1.log");

        let start = Instant::now();
        let err = e.run(Command::new(&slow), &log).unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(4));
        assert!(matches!(err, EngineError::Timeout { secs: 1, .. }));
        assert!(err.is_recoverable());

        e.run(Command::new(&ready), &log).unwrap();

        let err = e.run(Command::new(&failing), &log).unwrap_err();
        assert!(matches!(err, EngineError::Failed { .. }));
        assert!(err.to_string().contains("exit status: 3"));
        assert!(err.is_recoverable());

        // Earlier output survives a later failure
        assert_eq!(
            std::fs::read_to_string(&log).unwrap(),
            "refpkg ready\nboom\n"
        );
    }

    #[test]
    fn test_missing_program() {
        let err = locate("no-such-placement-program-xyz").unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
        assert!(err.is_recoverable());
    }
}
