use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const PASSPHRASE: &str = "correct horse battery";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_loona"))
}

/// Isolated config/data/runtime dirs with a fast hasher config.
struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let root = TempDir::new().expect("temp dir");
        let sandbox = Self { root };
        for dir in ["config", "data", "runtime"] {
            std::fs::create_dir_all(sandbox.root.path().join(dir)).expect("create xdg dir");
        }
        sandbox.write_config();
        sandbox
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    fn store_path(&self) -> PathBuf {
        self.path("data").join("journal.db")
    }

    fn write_config(&self) {
        let config_path = self.path("config").join("loona").join("config.toml");
        std::fs::create_dir_all(config_path.parent().expect("config parent"))
            .expect("create config dir");
        let contents = format!(
            "[store]\npath = \"{}\"\n\n[security]\nunlock_ttl_seconds = 900\nhash_memory_kib = 8\nhash_iterations = 1\n",
            self.store_path().to_string_lossy()
        );
        std::fs::write(config_path, contents).expect("write config");
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(bin());
        cmd.args(args)
            .env("XDG_CONFIG_HOME", self.path("config"))
            .env("XDG_DATA_HOME", self.path("data"))
            .env("XDG_RUNTIME_DIR", self.path("runtime"))
            .env_remove("LOONA_CONFIG")
            .env_remove("LOONA_DB")
            .env_remove("LOONA_PASSPHRASE")
            .env_remove("LOONA_NEW_PASSPHRASE")
            .env_remove("LOONA_LOG")
            .env("NO_COLOR", "1")
            .stdin(Stdio::null());
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("run loona")
    }

    fn run_with_passphrase(&self, args: &[&str], passphrase: &str) -> Output {
        self.command(args)
            .env("LOONA_PASSPHRASE", passphrase)
            .output()
            .expect("run loona")
    }

    fn login(&self) {
        let output = self.run(&["login", "writer@example.com"]);
        assert_success(&output);
    }

    fn login_and_unlock(&self) {
        self.login();
        let output = self.run_with_passphrase(&["unlock", "--no-input"], PASSPHRASE);
        assert_success(&output);
    }

    fn drop_unlock_caches(&self) {
        remove_if_exists(&self.path("runtime").join("loona").join("unlock-cache.json"));
        remove_if_exists(&self.path("data").join("loona").join("unlock-cache.json"));
    }
}

fn remove_if_exists(path: &Path) {
    if path.exists() {
        std::fs::remove_file(path).expect("remove cache file");
    }
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("json output")
}

#[test]
fn test_add_list_show_flow() {
    let sandbox = Sandbox::new();
    sandbox.login_and_unlock();

    let output = sandbox.run_with_passphrase(
        &[
            "add",
            "--title",
            "Monday",
            "--body",
            "Walked to the river.",
            "--date",
            "2024-03-01",
            "--no-input",
        ],
        PASSPHRASE,
    );
    assert_success(&output);

    let output = sandbox.run_with_passphrase(&["list", "--json", "--no-input"], PASSPHRASE);
    assert_success(&output);
    let entries = stdout_json(&output);
    let entries = entries.as_array().expect("array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "Monday");
    assert_eq!(entries[0]["created_at"], "2024-03-01T00:00:00Z");
    assert!(entries[0].get("account").is_none());

    let id = entries[0]["id"].as_str().expect("id").to_string();
    let output =
        sandbox.run_with_passphrase(&["show", &id[..8], "--json", "--no-input"], PASSPHRASE);
    assert_success(&output);
    let entry = stdout_json(&output);
    assert_eq!(entry["id"], id.as_str());
    assert_eq!(entry["body"], "Walked to the river.");
}

#[test]
fn test_cached_unlock_skips_passphrase() {
    let sandbox = Sandbox::new();
    sandbox.login_and_unlock();

    let output = sandbox.run(&["list", "--json", "--no-input"]);
    assert_success(&output);
    assert_eq!(stdout_json(&output), serde_json::json!([]));
}

#[test]
fn test_wrong_passphrase_exits_auth_failed() {
    let sandbox = Sandbox::new();
    sandbox.login_and_unlock();
    sandbox.drop_unlock_caches();

    let output = sandbox.run_with_passphrase(&["unlock", "--no-input"], "not the passphrase");
    assert_eq!(output.status.code(), Some(5));

    let output = sandbox.run_with_passphrase(&["unlock", "--no-input"], PASSPHRASE);
    assert_success(&output);
}

#[test]
fn test_not_signed_in_exits_with_code() {
    let sandbox = Sandbox::new();

    let output = sandbox.run_with_passphrase(&["list", "--no-input"], PASSPHRASE);
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_short_passphrase_rejected_at_setup() {
    let sandbox = Sandbox::new();
    sandbox.login();

    let output = sandbox.run_with_passphrase(&["unlock", "--no-input"], "abc");
    assert_eq!(output.status.code(), Some(4));

    let output = sandbox.run(&["status", "--json"]);
    assert_success(&output);
    assert_eq!(stdout_json(&output)["state"], "needs_passphrase_setup");
}

#[test]
fn test_logout_requires_reentry() {
    let sandbox = Sandbox::new();
    sandbox.login_and_unlock();

    let output = sandbox.run(&["logout"]);
    assert_success(&output);

    let output = sandbox.run(&["status", "--json"]);
    assert_success(&output);
    let status = stdout_json(&output);
    assert_eq!(status["signed_in"], false);
    assert_eq!(status["unlocked"], false);

    sandbox.login();
    let output = sandbox.run(&["status", "--json"]);
    assert_success(&output);
    assert_eq!(stdout_json(&output)["state"], "needs_passphrase_entry");

    let output = sandbox.run_with_passphrase(&["unlock", "--no-input"], PASSPHRASE);
    assert_success(&output);
    let output = sandbox.run(&["status", "--json"]);
    let status = stdout_json(&output);
    assert_eq!(status["unlocked"], true);
    assert_eq!(status["account"], "writer@example.com");
}

#[test]
fn test_passwd_changes_passphrase() {
    let sandbox = Sandbox::new();
    sandbox.login_and_unlock();

    let output = sandbox
        .command(&["passwd", "--no-input"])
        .env("LOONA_PASSPHRASE", PASSPHRASE)
        .env("LOONA_NEW_PASSPHRASE", "a brand new phrase")
        .output()
        .expect("run loona");
    assert_success(&output);

    sandbox.drop_unlock_caches();
    let output = sandbox.run_with_passphrase(&["unlock", "--no-input"], PASSPHRASE);
    assert_eq!(output.status.code(), Some(5));
    let output = sandbox.run_with_passphrase(&["unlock", "--no-input"], "a brand new phrase");
    assert_success(&output);
}

#[test]
fn test_delete_requires_yes_without_tty() {
    let sandbox = Sandbox::new();
    sandbox.login_and_unlock();

    let output = sandbox.run(&["add", "--title", "Tuesday", "--body", "Rain.", "--no-input"]);
    assert_success(&output);
    let output = sandbox.run(&["list", "--json", "--no-input"]);
    let id = stdout_json(&output)[0]["id"]
        .as_str()
        .expect("id")
        .to_string();

    let output = sandbox.run(&["delete", &id, "--no-input"]);
    assert_eq!(output.status.code(), Some(4));

    let output = sandbox.run(&["delete", &id, "--yes", "--no-input"]);
    assert_success(&output);
    let output = sandbox.run(&["list", "--json", "--no-input"]);
    assert_eq!(stdout_json(&output), serde_json::json!([]));
}

#[test]
fn test_init_refuses_to_overwrite_config() {
    let sandbox = Sandbox::new();

    let output = sandbox.run(&["init"]);
    assert_eq!(output.status.code(), Some(4));

    let output = sandbox.run(&["init", "--force", "--timezone", "Europe/Paris"]);
    assert_success(&output);
    let config = std::fs::read_to_string(
        sandbox.path("config").join("loona").join("config.toml"),
    )
    .expect("read config");
    assert!(config.contains("Europe/Paris"));
}

#[test]
fn test_switching_accounts_purges_cached_unlock() {
    let sandbox = Sandbox::new();
    sandbox.login_and_unlock();

    let output = sandbox.run(&["login", "other@example.com"]);
    assert_success(&output);
    sandbox.login();

    let output = sandbox.run(&["status", "--json"]);
    assert_success(&output);
    assert_eq!(stdout_json(&output)["state"], "needs_passphrase_entry");

    let output = sandbox.run(&["list", "--json", "--no-input"]);
    assert_ne!(output.status.code(), Some(0));
}

#[test]
fn test_whitespace_passphrase_accepted() {
    let sandbox = Sandbox::new();
    sandbox.login();

    let output = sandbox.run_with_passphrase(&["unlock", "--no-input"], "    ");
    assert_success(&output);

    sandbox.drop_unlock_caches();
    let output = sandbox.run_with_passphrase(&["unlock", "--no-input"], "    ");
    assert_success(&output);
}
