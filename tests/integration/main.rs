//! Integration tests for shmgr

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Isolated home, cache root and provider search directory
    struct Sandbox {
        temp: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            let sandbox = Self {
                temp: TempDir::new().unwrap(),
            };
            fs::create_dir_all(sandbox.providers()).unwrap();
            sandbox
        }

        fn cache(&self) -> PathBuf {
            self.temp.path().join("cache")
        }

        fn providers(&self) -> PathBuf {
            self.temp.path().join("providers")
        }

        /// Install a directory provider offering `alias` at `version`
        fn install(&self, id: &str, alias: &str, version: &str, content: &str) {
            let dir = self.providers().join(id);
            fs::create_dir_all(&dir).unwrap();
            fs::write(
                dir.join("provider.toml"),
                format!("[provider]\nalias = \"{alias}\"\nversion = \"{version}\"\n"),
            )
            .unwrap();
            fs::write(dir.join(format!("{version}.sh")), content).unwrap();
        }

        /// Put a library straight into the cache
        fn seed_cache(&self, alias: &str, version: &str, content: impl AsRef<[u8]>) {
            let dir = self.cache().join(alias);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(format!("{version}.sh")), content).unwrap();
        }

        fn cached(&self, alias: &str, version: &str) -> Option<String> {
            fs::read_to_string(self.cache().join(alias).join(format!("{version}.sh"))).ok()
        }

        fn shmgr(&self) -> Command {
            let home = self.temp.path().join("home");
            let mut cmd = cargo_bin_cmd!("shmgr");
            cmd.env("HOME", &home)
                .env("XDG_CONFIG_HOME", home.join(".config"))
                .env("XDG_CACHE_HOME", home.join(".cache"))
                .env("SHMGR_CONFIG", self.temp.path().join("config.toml"))
                .env("SHMGR_CACHE_DIR", self.cache())
                .env("SHMGR_PROVIDER_PATH", self.providers())
                .env_remove("RUST_LOG");
            cmd
        }

        fn write_config(&self, content: &str) {
            fs::write(self.temp.path().join("config.toml"), content).unwrap();
        }

        fn path(&self) -> &Path {
            self.temp.path()
        }
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("shmgr")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("shell library"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("shmgr")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("shmgr"));
    }

    #[test]
    fn load_without_libraries_is_usage_error() {
        Sandbox::new().shmgr().arg("load").assert().code(2);
    }

    #[test]
    fn first_load_fetches_from_provider_and_caches() {
        let sandbox = Sandbox::new();
        sandbox.install("foo-lib", "foo", "1.2.3", "foo_version=1.2.3\n");

        sandbox
            .shmgr()
            .args(["load", "foo:1"])
            .assert()
            .success()
            .stdout("foo_version=1.2.3\n");

        assert_eq!(
            sandbox.cached("foo", "1.2.3").as_deref(),
            Some("foo_version=1.2.3\n")
        );
    }

    #[test]
    fn cached_library_loads_without_providers() {
        let sandbox = Sandbox::new();
        sandbox.seed_cache("foo", "1.2.3", "from cache\n");

        sandbox
            .shmgr()
            .args(["load", "foo:1.2"])
            .assert()
            .success()
            .stdout("from cache\n");
    }

    #[test]
    fn non_utf8_library_is_printed_verbatim() {
        let sandbox = Sandbox::new();
        sandbox.seed_cache("foo", "1.0.0", b"# caf\xe9\necho foo\n");

        sandbox
            .shmgr()
            .args(["load", "foo:1"])
            .assert()
            .success()
            .stdout(&b"# caf\xe9\necho foo\n"[..]);
    }

    #[test]
    fn cached_version_below_floor_fails() {
        let sandbox = Sandbox::new();
        sandbox.seed_cache("foo", "1.2.3", "from cache\n");
        sandbox.install("foo-lib", "foo", "1.5.0", "newer\n");

        sandbox
            .shmgr()
            .args(["load", "foo:1.3"])
            .assert()
            .failure()
            .stdout("")
            .stderr(predicate::str::contains("found 1.2.3, need >=1.3.0"))
            .stderr(predicate::str::contains("cache clear"));
    }

    #[test]
    fn highest_offer_wins_and_every_major_is_cached() {
        let sandbox = Sandbox::new();
        sandbox.install("a", "foo", "2.0.0", "two-oh\n");
        sandbox.install("b", "foo", "2.5.0", "two-five\n");
        sandbox.install("c", "foo", "1.0.1", "one\n");

        sandbox
            .shmgr()
            .args(["load", "foo:2.1"])
            .assert()
            .success()
            .stdout("two-five\n");

        assert!(sandbox.cached("foo", "2.5.0").is_some());
        assert!(sandbox.cached("foo", "2.0.0").is_none());
        assert_eq!(sandbox.cached("foo", "1.0.1").as_deref(), Some("one\n"));
    }

    #[test]
    fn mixed_requests_print_successes_and_fail() {
        let sandbox = Sandbox::new();
        sandbox.install("foo-lib", "foo", "1.0.0", "foo\n");
        sandbox.install("baz-lib", "baz", "2.0.0", "baz\n");

        sandbox
            .shmgr()
            .args(["load", "baz:2", "bar:9", "foo:1", "broken"])
            .assert()
            .failure()
            .stdout("baz\nfoo\n")
            .stderr(predicate::str::contains("bar:9"))
            .stderr(predicate::str::contains("Unknown shell library"))
            .stderr(predicate::str::contains("Malformed library request 'broken'"));
    }

    #[test]
    fn broken_provider_does_not_block_others() {
        let sandbox = Sandbox::new();
        sandbox.install("foo-lib", "foo", "1.0.0", "foo\n");
        let broken = sandbox.providers().join("broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join("provider.toml"), "[provider]\nalias = ").unwrap();

        sandbox
            .shmgr()
            .args(["load", "foo:1"])
            .assert()
            .success()
            .stdout("foo\n");
    }

    #[test]
    fn providers_from_config_file() {
        let sandbox = Sandbox::new();
        let extra = sandbox.path().join("extra");
        let dir = extra.join("qux-lib");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("provider.toml"),
            "[provider]\nalias = \"qux\"\nversion = \"0.3.0\"\nfile = \"qux.sh\"\n",
        )
        .unwrap();
        fs::write(dir.join("qux.sh"), "qux\n").unwrap();
        sandbox.write_config(&format!(
            "[providers]\ndirs = [{:?}]\n",
            extra.display().to_string()
        ));

        sandbox
            .shmgr()
            .args(["load", "qux:0.2"])
            .assert()
            .success()
            .stdout("qux\n");
    }

    #[test]
    fn invalid_config_is_reported() {
        let sandbox = Sandbox::new();
        sandbox.write_config("[cache\n");

        sandbox
            .shmgr()
            .args(["load", "foo:1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn cache_dir_flag_overrides_environment() {
        let sandbox = Sandbox::new();
        let other = sandbox.path().join("other-cache");
        fs::create_dir_all(other.join("foo")).unwrap();
        fs::write(other.join("foo/1.0.0.sh"), "other\n").unwrap();

        sandbox
            .shmgr()
            .args(["load", "--cache-dir"])
            .arg(&other)
            .arg("foo:1")
            .assert()
            .success()
            .stdout("other\n");
    }

    #[test]
    fn list_shows_installed_and_cached() {
        let sandbox = Sandbox::new();
        sandbox.install("foo-lib", "foo", "1.2.0", "foo\n");
        sandbox.seed_cache("old", "0.1.0", "old\n");

        sandbox
            .shmgr()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout("foo:1.2.0\nold:0.1.0\n");
    }

    #[test]
    fn list_json_for_one_alias() {
        let sandbox = Sandbox::new();
        sandbox.install("foo-lib", "foo", "1.2.0", "foo\n");
        sandbox.install("bar-lib", "bar", "3.0.0", "bar\n");

        sandbox
            .shmgr()
            .args(["list", "foo", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"provider\": \"foo-lib\""))
            .stdout(predicate::str::contains("bar").not());
    }

    #[test]
    fn list_empty() {
        Sandbox::new()
            .shmgr()
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout("[]\n");
    }

    #[test]
    fn cache_path_prints_root() {
        let sandbox = Sandbox::new();
        sandbox
            .shmgr()
            .args(["cache", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains(sandbox.cache().display().to_string()));
    }

    #[test]
    fn cache_list_plain() {
        let sandbox = Sandbox::new();
        sandbox.seed_cache("foo", "1.0.0", "foo\n");

        sandbox
            .shmgr()
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("1.0.0.sh"));
    }

    #[test]
    fn cache_clear_needs_confirmation() {
        let sandbox = Sandbox::new();
        sandbox.seed_cache("foo", "1.0.0", "foo\n");

        // Not a terminal, so the prompt answers no
        sandbox.shmgr().args(["cache", "clear"]).assert().success();
        assert!(sandbox.cached("foo", "1.0.0").is_some());

        sandbox
            .shmgr()
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Removed 1 cached library file(s)"));
        assert!(sandbox.cached("foo", "1.0.0").is_none());
    }

    #[test]
    fn cache_clear_one_alias_then_refetch() {
        let sandbox = Sandbox::new();
        sandbox.seed_cache("foo", "1.0.0", "stale\n");
        sandbox.seed_cache("bar", "1.0.0", "bar\n");
        sandbox.install("foo-lib", "foo", "1.4.0", "fresh\n");

        sandbox
            .shmgr()
            .args(["cache", "clear", "foo", "--yes"])
            .assert()
            .success();
        assert!(sandbox.cached("bar", "1.0.0").is_some());

        sandbox
            .shmgr()
            .args(["load", "foo:1.4"])
            .assert()
            .success()
            .stdout("fresh\n");
    }
}
