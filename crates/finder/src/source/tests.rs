use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;
use crate::error::{FinderError, Result};

async fn run_source(source: Source) -> Vec<String> {
	let pool = CandidatePool::new();
	let mut progress = pool.subscribe();
	start(source, Arc::clone(&pool), GenerationToken::root(1), 4, 3);
	tokio::time::timeout(Duration::from_secs(10), async {
		while !progress.borrow_and_update().complete {
			progress.changed().await.expect("pool alive");
		}
	})
	.await
	.expect("source completes");
	pool.read_from(0, usize::MAX).iter().map(|item| item.to_string()).collect()
}

fn write(root: &Path, relative: &str, contents: &str) {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).expect("create parent dirs");
	}
	std::fs::write(path, contents).expect("write fixture");
}

#[tokio::test]
async fn list_replays_in_order() {
	let items: Vec<String> = (0..10).map(|idx| format!("item{idx}")).collect();
	assert_eq!(run_source(Source::List(items.clone())).await, items);
}

#[tokio::test]
async fn walk_is_breadth_first_and_honors_ignores() {
	let dir = tempfile::tempdir().expect("tempdir");
	let root = dir.path();
	write(root, "b.txt", "");
	write(root, "a.txt", "");
	write(root, ".gitignore", "*.log\ntarget/\n");
	write(root, "debug.log", "");
	write(root, "src/main.rs", "");
	write(root, "src/.ignore", "gen.rs\n");
	write(root, "src/gen.rs", "");
	write(root, "src/nested/deep.log", "");
	write(root, "src/nested/keep.rs", "");
	write(root, "target/out.rs", "");
	write(root, ".git/HEAD", "");
	std::fs::create_dir_all(root.join("empty")).expect("empty dir");

	let found = run_source(Source::Walk {
		root: root.to_path_buf(),
		prefix: None,
	})
	.await;

	assert_eq!(found, [".gitignore", "a.txt", "b.txt", "src/.ignore", "src/main.rs", "src/nested/keep.rs"]);
}

#[tokio::test]
async fn walk_prefixes_explicit_base() {
	let dir = tempfile::tempdir().expect("tempdir");
	write(dir.path(), "one/two.rs", "");

	let found = run_source(Source::Walk {
		root: dir.path().to_path_buf(),
		prefix: Some("~/proj".to_string()),
	})
	.await;
	assert_eq!(found, ["~/proj/one/two.rs"]);
}

#[tokio::test]
async fn walk_of_missing_root_is_empty() {
	let dir = tempfile::tempdir().expect("tempdir");
	let found = run_source(Source::Walk {
		root: dir.path().join("absent"),
		prefix: None,
	})
	.await;
	assert!(found.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn process_streams_lines_and_strips_carriage_returns() {
	let dir = tempfile::tempdir().expect("tempdir");
	let found = run_source(Source::Process {
		command: "printf 'a\\r\\nb\\nlast'".to_string(),
		cwd: dir.path().to_path_buf(),
	})
	.await;
	assert_eq!(found, ["a", "b", "last"]);
}

#[cfg(unix)]
#[tokio::test]
async fn process_runs_in_base_dir() {
	let dir = tempfile::tempdir().expect("tempdir");
	write(dir.path(), "marker.txt", "");
	let found = run_source(Source::Process {
		command: "ls".to_string(),
		cwd: dir.path().to_path_buf(),
	})
	.await;
	assert_eq!(found, ["marker.txt"]);
}

#[cfg(unix)]
#[tokio::test]
async fn process_delivers_lines_before_exit() {
	let dir = tempfile::tempdir().expect("tempdir");
	let pool = CandidatePool::new();
	let mut progress = pool.subscribe();
	let token = GenerationToken::root(1);
	start(
		Source::Process {
			command: "echo first; sleep 5; echo second".to_string(),
			cwd: dir.path().to_path_buf(),
		},
		Arc::clone(&pool),
		token.clone(),
		4,
		1,
	);

	tokio::time::timeout(Duration::from_secs(3), async {
		while progress.borrow_and_update().len == 0 {
			progress.changed().await.expect("pool alive");
		}
	})
	.await
	.expect("first line arrives while the command still runs");
	assert_eq!(pool.read_from(0, 10), vec![Arc::<str>::from("first")]);
	assert!(!pool.progress().complete);

	token.cancel();
	tokio::time::timeout(Duration::from_secs(1), async {
		while !progress.borrow_and_update().complete {
			progress.changed().await.expect("pool alive");
		}
	})
	.await
	.expect("cancel completes the pool");
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn cancel_kills_running_command() {
	let dir = tempfile::tempdir().expect("tempdir");
	let pool = CandidatePool::new();
	let mut progress = pool.subscribe();
	let token = GenerationToken::root(1);
	start(
		Source::Process {
			command: "echo $$ > pid; echo ready; exec sleep 30".to_string(),
			cwd: dir.path().to_path_buf(),
		},
		Arc::clone(&pool),
		token.clone(),
		4,
		1,
	);

	tokio::time::timeout(Duration::from_secs(3), async {
		while progress.borrow_and_update().len == 0 {
			progress.changed().await.expect("pool alive");
		}
	})
	.await
	.expect("command prints before sleeping");
	let pid = std::fs::read_to_string(dir.path().join("pid")).expect("pid file");
	let proc_stat = std::path::PathBuf::from(format!("/proc/{}/stat", pid.trim()));

	token.cancel();
	let gone = tokio::time::timeout(Duration::from_secs(2), async {
		loop {
			match std::fs::read_to_string(&proc_stat) {
				Err(_) => return,
				// Field 3 is the state; a zombie is already dead.
				Ok(stat) if stat.rsplit(')').next().is_some_and(|rest| rest.trim_start().starts_with('Z')) => return,
				Ok(_) => tokio::time::sleep(Duration::from_millis(20)).await,
			}
		}
	})
	.await;
	assert!(gone.is_ok(), "command {} still running after cancel", pid.trim());
}

#[tokio::test]
async fn spawn_failure_yields_no_candidates() {
	let found = run_source(Source::Process {
		command: "true".to_string(),
		cwd: std::path::PathBuf::from("/definitely/not/a/dir"),
	})
	.await;
	assert!(found.is_empty());
}

#[tokio::test]
async fn cancelled_producer_stops_without_a_reader() {
	let (tx, _rx) = mpsc::channel(1);
	let token = GenerationToken::root(1);
	let mut emitter = Emitter::new(tx, token.clone());
	assert!(emitter.emit("first").await);

	let canceller = token.clone();
	tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(20)).await;
		canceller.cancel();
	});
	let delivered = tokio::time::timeout(Duration::from_secs(1), emitter.emit("blocked"))
		.await
		.expect("emit returns after cancel");
	assert!(!delivered);
	assert_eq!(emitter.emitted, 1);
}

struct FakeRemote {
	dirs: HashMap<String, Vec<RemoteEntry>>,
	ignores: HashMap<String, String>,
}

#[async_trait::async_trait]
impl RemoteLister for FakeRemote {
	async fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>> {
		self.dirs.get(path).cloned().ok_or_else(|| FinderError::Remote {
			path: path.to_string(),
			message: "no such directory".to_string(),
		})
	}

	async fn read_ignore(&self, dir: &str) -> Option<String> {
		self.ignores.get(dir).cloned()
	}

	fn home_dir(&self) -> Option<String> {
		Some("/home/r".to_string())
	}
}

fn entry(name: &str, is_dir: bool) -> RemoteEntry {
	RemoteEntry {
		name: name.to_string(),
		is_dir,
	}
}

#[tokio::test]
async fn remote_walk_uses_lister() {
	let remote = FakeRemote {
		dirs: HashMap::from([
			("/home/r/p".to_string(), vec![entry("sub", true), entry("z.rs", false), entry("skip.tmp", false), entry("gone", true)]),
			("/home/r/p/sub".to_string(), vec![entry("a.rs", false)]),
		]),
		ignores: HashMap::from([("/home/r/p".to_string(), "*.tmp".to_string())]),
	};
	let lister: Arc<dyn RemoteLister> = Arc::new(remote);
	let options = FinderOptions {
		dir: Some("~/p".to_string()),
		..FinderOptions::default()
	};
	let source = Source::from_options(&options, Some(&lister));
	assert_eq!(source.kind(), "remote");

	assert_eq!(run_source(source).await, ["~/p/z.rs", "~/p/sub/a.rs"]);
}

struct StalledRemote {
	_held: Arc<()>,
}

#[async_trait::async_trait]
impl RemoteLister for StalledRemote {
	async fn list_dir(&self, _path: &str) -> Result<Vec<RemoteEntry>> {
		std::future::pending().await
	}
}

#[tokio::test]
async fn cancel_releases_a_stalled_remote_listing() {
	let held = Arc::new(());
	let lister: Arc<dyn RemoteLister> = Arc::new(StalledRemote { _held: Arc::clone(&held) });
	let pool = CandidatePool::new();
	let token = GenerationToken::root(1);
	start(
		Source::Remote {
			lister,
			root: "/r".to_string(),
			prefix: None,
		},
		Arc::clone(&pool),
		token.clone(),
		4,
		1,
	);

	tokio::time::sleep(Duration::from_millis(50)).await;
	assert_eq!(Arc::strong_count(&held), 2);
	token.cancel();

	tokio::time::timeout(Duration::from_secs(1), async {
		while Arc::strong_count(&held) > 1 {
			tokio::time::sleep(Duration::from_millis(10)).await;
		}
	})
	.await
	.expect("producer drops the lister after cancel");
	assert!(pool.read_from(0, usize::MAX).is_empty());
}

#[test]
fn explicit_source_beats_remote() {
	let lister: Arc<dyn RemoteLister> = Arc::new(FakeRemote {
		dirs: HashMap::new(),
		ignores: HashMap::new(),
	});
	let options = FinderOptions {
		source: Some(SourceSpec::List(vec!["x".to_string()])),
		..FinderOptions::default()
	};
	assert_eq!(Source::from_options(&options, Some(&lister)).kind(), "list");
	assert_eq!(Source::from_options(&FinderOptions::default(), None).kind(), "walk");
}
