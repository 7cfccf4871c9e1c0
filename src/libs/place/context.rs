use super::engine::EngineJob;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch space of one run.
///
/// All intermediate files live in `subplace.<run id>.XXXXXX` under the parent
/// directory. The directory is removed when the context is dropped, unless
/// it was asked to be kept.
#[derive(Debug)]
pub struct RunContext {
    run_id: String,
    dir: TempDir,
    keep: bool,
}

impl RunContext {
    pub fn new(parent: &Path, run_id: &str, keep: bool) -> std::io::Result<Self> {
        std::fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("subplace.{}.", run_id))
            .disable_cleanup(keep)
            .tempdir_in(parent)?;
        if keep {
            tracing::info!("intermediate files kept in {}", dir.path().display());
        }

        Ok(Self {
            run_id: run_id.to_string(),
            dir,
            keep,
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Per-query file names, stemmed `<index>_<query>`. Path separators and
    /// whitespace in the query name are replaced.
    pub fn job(&self, index: usize, query: &str) -> EngineJob {
        let name: String = query
            .chars()
            .map(|c| {
                if c == '/' || c == '\\' || c.is_whitespace() {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        let stem = format!("{}_{}", index, name);
        let file = |name: String| -> PathBuf { self.path().join(name) };

        EngineJob {
            query: query.to_string(),
            tree_file: file(format!("tree_{}.nwk", stem)),
            aln_file: file(format!("aln_{}.fa", stem)),
            ref_aln_file: file(format!("ref_{}.fa", stem)),
            out_file: file(format!("{}.jplace", stem)),
            refpkg_dir: file(format!("{}.refpkg", stem)),
            log_file: file(format!("{}.log", stem)),
        }
    }

    /// Remove the per-query files once the query is done, unless kept.
    pub fn clean(&self, job: &EngineJob) {
        if !self.keep {
            for path in [
                &job.tree_file,
                &job.aln_file,
                &job.ref_aln_file,
                &job.out_file,
                &job.log_file,
            ] {
                std::fs::remove_file(path).ok();
            }
            std::fs::remove_dir_all(&job.refpkg_dir).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_on_drop() {
        let parent = tempfile::tempdir().unwrap();
        let path = {
            let ctx = RunContext::new(parent.path(), "7", false).unwrap();
            assert!(ctx.path().exists());
            let name = ctx.path().file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with("subplace.7."));
            ctx.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_kept() {
        let parent = tempfile::tempdir().unwrap();
        let path = {
            let ctx = RunContext::new(parent.path(), "0", true).unwrap();
            ctx.path().to_path_buf()
        };
        assert!(path.exists());
    }

    #[test]
    fn test_job_names() {
        let parent = tempfile::tempdir().unwrap();
        let ctx = RunContext::new(parent.path(), "0", false).unwrap();
        let job = ctx.job(4, "seq 1/a");

        assert_eq!(job.query, "seq 1/a");
        assert!(job.tree_file.ends_with("tree_4_seq_1_a.nwk"));
        assert!(job.aln_file.ends_with("aln_4_seq_1_a.fa"));
        assert!(job.out_file.ends_with("4_seq_1_a.jplace"));
        assert!(job.refpkg_dir.ends_with("4_seq_1_a.refpkg"));
        assert_eq!(job.tree_file.parent(), Some(ctx.path()));

        // Names that sanitize alike still get their own files
        let a = ctx.job(0, "q 1");
        let b = ctx.job(1, "q_1");
        assert_ne!(a.out_file, b.out_file);
        assert_ne!(a.log_file, b.log_file);
        assert_ne!(a.refpkg_dir, b.refpkg_dir);
    }
}
