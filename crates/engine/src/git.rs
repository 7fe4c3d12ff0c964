//! Git plumbing for version discovery and snapshot export
//!
//! All history lives in one bare mirror repository. Each version is fetched
//! into it by ref, then the allow-listed directories of that version's tree
//! are written straight from the object database. No working tree is ever
//! checked out.

use hookscope_core::{Error, Result, Version};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the remote configured in the mirror
const REMOTE_NAME: &str = "origin";

/// Git file mode of a symbolic link
const SYMLINK_MODE: i32 = 0o120_000;

/// Add context to a libgit2 error
fn git_err(action: &str) -> impl FnOnce(git2::Error) -> Error + '_ {
    move |e| Error::Message(format!("Git error while {action}: {}", e.message()))
}

/// List the tag names advertised by a remote, without fetching anything
///
/// Peeled entries (`v1.0.0^{}`) are skipped, and `refs/tags/` is stripped.
pub fn list_remote_tags(url: &str) -> Result<Vec<String>> {
    use git2::{Direction, Remote};

    let mut remote = Remote::create_detached(url).map_err(git_err("creating remote"))?;
    remote
        .connect(Direction::Fetch)
        .map_err(git_err("connecting to remote"))?;

    let tags = remote
        .list()
        .map_err(git_err("listing remote refs"))?
        .iter()
        .filter_map(|head| head.name().strip_prefix("refs/tags/"))
        .filter(|name| !name.ends_with("^{}"))
        .map(String::from)
        .collect();

    // Best effort; the connection is closed on drop anyway
    let _ = remote.disconnect();
    Ok(tags)
}

/// Bare mirror of the scanned repository
///
/// Cheap to clone; every method opens its own repository handle, so one
/// mirror can be used from many worker threads.
#[derive(Debug, Clone)]
pub struct Mirror {
    path: PathBuf,
    depth: Option<u32>,
}

impl Mirror {
    /// Open the mirror at `path`, creating it if needed, and point it at `remote`
    ///
    /// `depth` limits fetched history; `None` fetches full history.
    pub fn open_or_init(path: &Path, remote: &str, depth: Option<u32>) -> Result<Self> {
        use git2::Repository;

        let repo = match Repository::open_bare(path) {
            Ok(repo) => repo,
            Err(_) => {
                fs::create_dir_all(path)?;
                debug!(path = %path.display(), "Initializing bare mirror");
                Repository::init_bare(path).map_err(git_err("initializing mirror"))?
            }
        };

        if repo.find_remote(REMOTE_NAME).is_ok() {
            repo.remote_set_url(REMOTE_NAME, remote)
                .map_err(git_err("updating remote url"))?;
        } else {
            repo.remote(REMOTE_NAME, remote)
                .map_err(git_err("adding remote"))?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            depth,
        })
    }

    /// Path of the bare repository
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<git2::Repository> {
        git2::Repository::open_bare(&self.path).map_err(git_err("opening mirror"))
    }

    fn fetch(&self, repo: &git2::Repository, refspec: &str) -> Result<()> {
        use git2::{AutotagOption, FetchOptions, RemoteCallbacks};

        let mut callbacks = RemoteCallbacks::new();
        callbacks.transfer_progress(|stats| {
            if stats.received_objects() == stats.total_objects() && stats.total_objects() > 0 {
                debug!(
                    objects = stats.total_objects(),
                    bytes = stats.received_bytes(),
                    "Fetch transfer complete"
                );
            }
            true
        });

        let mut options = FetchOptions::new();
        options.remote_callbacks(callbacks);
        options.download_tags(AutotagOption::None);
        if let Some(depth) = self.depth {
            options.depth(i32::try_from(depth).unwrap_or(i32::MAX));
        }

        let mut remote = repo
            .find_remote(REMOTE_NAME)
            .map_err(git_err("finding remote"))?;
        debug!(refspec, "Fetching");
        remote
            .fetch(&[refspec], Some(&mut options), None)
            .map_err(git_err("fetching"))?;
        Ok(())
    }

    fn local_commit(repo: &git2::Repository, reference: &str) -> Option<git2::Oid> {
        repo.find_reference(reference)
            .and_then(|r| r.peel_to_commit())
            .map(|commit| commit.id())
            .ok()
    }

    /// Make `version` available locally and return its commit
    ///
    /// Releases already present in the mirror are not fetched again; the
    /// `latest` ref (`latest_ref` on the remote) is fetched on every call.
    pub fn fetch_version(&self, version: &Version, latest_ref: &str) -> Result<git2::Oid> {
        let repo = self.open()?;

        if version.is_latest() {
            let local = format!("refs/remotes/{REMOTE_NAME}/{latest_ref}");
            self.fetch(&repo, &format!("+refs/heads/{latest_ref}:{local}"))?;
            return Self::local_commit(&repo, &local).ok_or_else(|| {
                Error::snapshot(version, format!("branch '{latest_ref}' not found on remote"))
            });
        }

        let candidates = version.tag_candidates();
        for tag in &candidates {
            if let Some(oid) = Self::local_commit(&repo, &format!("refs/tags/{tag}")) {
                return Ok(oid);
            }
        }

        let mut last_error = None;
        for tag in &candidates {
            let reference = format!("refs/tags/{tag}");
            match self.fetch(&repo, &format!("+{reference}:{reference}")) {
                Ok(()) => {
                    if let Some(oid) = Self::local_commit(&repo, &reference) {
                        return Ok(oid);
                    }
                }
                Err(e) => last_error = Some(e),
            }
        }

        let reason = last_error.map_or_else(
            || format!("no tag named {}", candidates.join(" or ")),
            |e| e.to_string(),
        );
        Err(Error::snapshot(version, reason))
    }

    /// Write the files of `directories` at `commit` under `dest`
    ///
    /// Only blobs whose path passes `accept` are written. Symlinks and
    /// submodules are skipped, as are directories missing from the tree.
    /// Returns the number of files written.
    pub fn export<F>(
        &self,
        commit: git2::Oid,
        directories: &[String],
        accept: F,
        dest: &Path,
    ) -> Result<usize>
    where
        F: Fn(&Path) -> bool,
    {
        use git2::{ErrorCode, ObjectType, TreeWalkMode, TreeWalkResult};

        let repo = self.open()?;
        let tree = repo
            .find_commit(commit)
            .and_then(|c| c.tree())
            .map_err(git_err("reading commit tree"))?;

        let mut written = 0usize;
        for directory in directories {
            let entry = match tree.get_path(Path::new(directory)) {
                Ok(entry) => entry,
                Err(e) if e.code() == ErrorCode::NotFound => continue,
                Err(e) => return Err(git_err("resolving directory")(e)),
            };
            if entry.kind() != Some(ObjectType::Tree) {
                continue;
            }
            let subtree = repo
                .find_tree(entry.id())
                .map_err(git_err("reading directory tree"))?;

            let mut failure: Option<Error> = None;
            let walked = subtree.walk(TreeWalkMode::PreOrder, |parent, item| {
                if item.kind() != Some(ObjectType::Blob) || item.filemode() == SYMLINK_MODE {
                    return TreeWalkResult::Ok;
                }
                let Some(name) = item.name() else {
                    return TreeWalkResult::Ok;
                };

                let relative = Path::new(directory).join(parent).join(name);
                if !accept(&relative) {
                    return TreeWalkResult::Ok;
                }

                match write_blob(&repo, item.id(), &dest.join(&relative)) {
                    Ok(()) => {
                        written += 1;
                        TreeWalkResult::Ok
                    }
                    Err(e) => {
                        failure = Some(e);
                        TreeWalkResult::Abort
                    }
                }
            });

            if let Some(e) = failure {
                return Err(e);
            }
            walked.map_err(git_err("walking tree"))?;
        }

        Ok(written)
    }
}

fn write_blob(repo: &git2::Repository, id: git2::Oid, path: &Path) -> Result<()> {
    let blob = repo.find_blob(id).map_err(git_err("reading blob"))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, blob.content())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use git2::{Repository, Signature};
    use tempfile::TempDir;

    /// Upstream repository with one commit tagged `v1.0.0`
    fn upstream() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let files = [
            ("app/a.js", "applyValueTransformer(\"x\", y);\n"),
            ("app/img.png", "not source"),
            ("docs/readme.js", "ignored"),
        ];
        for (rel, body) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }

        let oid = {
            let mut index = repo.index().unwrap();
            index
                .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
                .unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = Signature::now("Test", "test@example.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
                .unwrap()
        };
        {
            let commit = repo.find_commit(oid).unwrap();
            repo.tag_lightweight("v1.0.0", commit.as_object(), false)
                .unwrap();
        }
        (dir, repo)
    }

    #[test]
    fn test_list_remote_tags() {
        let (dir, _repo) = upstream();
        let url = dir.path().to_str().unwrap();
        let tags = list_remote_tags(url).unwrap();
        assert_eq!(tags, vec!["v1.0.0".to_string()]);
    }

    #[test]
    fn test_fetch_and_export() {
        let (upstream_dir, _repo) = upstream();
        let cache = TempDir::new().unwrap();
        let mirror = Mirror::open_or_init(
            &cache.path().join("repo.git"),
            upstream_dir.path().to_str().unwrap(),
            None,
        )
        .unwrap();

        let version: Version = "1.0.0".parse().unwrap();
        let oid = mirror.fetch_version(&version, "main").unwrap();

        let dest = cache.path().join("out");
        let written = mirror
            .export(
                oid,
                &["app".to_string(), "missing".to_string()],
                |p| p.extension().is_some_and(|e| e == "js"),
                &dest,
            )
            .unwrap();

        assert_eq!(written, 1);
        assert!(dest.join("app/a.js").is_file());
        assert!(!dest.join("app/img.png").exists());
        assert!(!dest.join("docs").exists());
    }

    #[test]
    fn test_fetch_unknown_tag_fails() {
        let (upstream_dir, _repo) = upstream();
        let cache = TempDir::new().unwrap();
        let mirror = Mirror::open_or_init(
            &cache.path().join("repo.git"),
            upstream_dir.path().to_str().unwrap(),
            None,
        )
        .unwrap();

        let version: Version = "9.9.9".parse().unwrap();
        let err = mirror.fetch_version(&version, "main").unwrap_err();
        assert!(err.to_string().contains("v9.9.9"));
    }

    #[test]
    fn test_reopen_updates_remote() {
        let cache = TempDir::new().unwrap();
        let path = cache.path().join("repo.git");
        Mirror::open_or_init(&path, "https://example.invalid/a.git", None).unwrap();
        let mirror = Mirror::open_or_init(&path, "https://example.invalid/b.git", Some(1)).unwrap();

        let repo = Repository::open_bare(mirror.path()).unwrap();
        let remote = repo.find_remote(REMOTE_NAME).unwrap();
        assert_eq!(remote.url(), Some("https://example.invalid/b.git"));
    }
}
