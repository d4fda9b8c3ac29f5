//! Integration tests for pylayer

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn pylayer() -> Command {
        cargo_bin_cmd!("pylayer")
    }

    #[test]
    fn help_displays() {
        pylayer()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("CPython layer builder"));
    }

    #[test]
    fn version_displays() {
        pylayer()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("pylayer"));
    }

    #[test]
    fn build_requires_layers() {
        pylayer()
            .arg("build")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--layers"));
    }
}

mod build_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use sha2::{Digest, Sha256};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const ARTIFACT: &[u8] = b"cpython 3.10.2 build";

    /// App dir, layers dir, catalog, artifact and an isolated config path
    struct Workspace {
        root: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let root = TempDir::new().unwrap();
            fs::create_dir_all(root.path().join("app")).unwrap();

            let artifact = root.path().join("python-3.10.2.tgz");
            fs::write(&artifact, ARTIFACT).unwrap();
            let sha = hex::encode(Sha256::digest(ARTIFACT));

            let catalog = format!(
                r#"
[[dependencies]]
id = "cpython"
version = "3.9.1"
checksum = "sha256:{sha}"
uri = "file://{dir}/missing-3.9.1.tgz"

[[dependencies]]
id = "cpython"
version = "3.10.2"
checksum = "sha256:{sha}"
uri = "file://{artifact}"
"#,
                sha = sha,
                dir = root.path().display(),
                artifact = artifact.display(),
            );
            fs::write(root.path().join("catalog.toml"), catalog).unwrap();

            Self { root }
        }

        fn path(&self, name: &str) -> String {
            self.root.path().join(name).display().to_string()
        }

        fn app(&self) -> std::path::PathBuf {
            self.root.path().join("app")
        }

        fn layers(&self) -> std::path::PathBuf {
            self.root.path().join("layers")
        }

        fn request(&self, version: &str) {
            fs::write(
                self.app().join("buildpack.yml"),
                format!("cpython:\n  version: \"{}\"\n", version),
            )
            .unwrap();
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("pylayer");
            cmd.env("PYLAYER_CONFIG", self.path("config.toml"))
                .env_remove("BP_CPYTHON_VERSION")
                .env_remove("CNB_STACK_ID");
            cmd
        }

        fn build(&self) -> Command {
            let mut cmd = self.cmd();
            cmd.args([
                "build",
                "--app",
                &self.path("app"),
                "--layers",
                &self.path("layers"),
                "--catalog",
                &self.path("catalog.toml"),
            ]);
            cmd
        }
    }

    fn metadata(layers: &Path) -> String {
        fs::read_to_string(layers.join("cpython.toml")).unwrap()
    }

    #[test]
    fn catalog_list_shows_entries() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["catalog", "list", "--catalog", &ws.path("catalog.toml")])
            .assert()
            .success()
            .stdout(predicate::str::contains("3.10.2"))
            .stdout(predicate::str::contains("Total: 2 entries"));
    }

    #[test]
    fn catalog_list_plain_is_highest_first() {
        let ws = Workspace::new();
        ws.cmd()
            .args([
                "catalog",
                "list",
                "--catalog",
                &ws.path("catalog.toml"),
                "--format",
                "plain",
            ])
            .assert()
            .success()
            .stdout("cpython 3.10.2\ncpython 3.9.1\n");
    }

    #[test]
    fn resolve_reports_candidates() {
        let ws = Workspace::new();
        ws.request("3.9.1");
        ws.cmd()
            .args([
                "resolve",
                "--app",
                &ws.path("app"),
                "--catalog",
                &ws.path("catalog.toml"),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Candidate version sources (in priority order):",
            ))
            .stdout(predicate::str::contains("buildpack.yml      -> \"3.9.1\""))
            .stdout(predicate::str::contains(
                "Selected CPython version (using buildpack.yml): 3.9.1",
            ));
    }

    #[test]
    fn resolve_env_override_when_no_config_file() {
        let ws = Workspace::new();
        ws.cmd()
            .env("BP_CPYTHON_VERSION", "3.9")
            .args([
                "resolve",
                "--app",
                &ws.path("app"),
                "--catalog",
                &ws.path("catalog.toml"),
                "--format",
                "plain",
            ])
            .assert()
            .success()
            .stdout("3.9.1\n");
    }

    #[test]
    fn second_build_reuses_layer() {
        let ws = Workspace::new();

        ws.build()
            .assert()
            .success()
            .stdout(predicate::str::contains("  Resolving CPython version"))
            .stdout(predicate::str::contains("    Installing CPython 3.10.2"))
            .stdout(predicate::str::contains("Completed in"));

        assert!(ws.layers().join("cpython").join("python-3.10.2.tgz").exists());
        let first = metadata(&ws.layers());
        assert!(first.contains("version = \"3.10.2\""));

        ws.build()
            .assert()
            .success()
            .stdout(predicate::str::contains("  Reusing cached layer "))
            .stdout(predicate::str::contains("Installing").not());

        assert_eq!(metadata(&ws.layers()), first);
    }

    #[test]
    fn unknown_version_fails_and_keeps_layer() {
        let ws = Workspace::new();
        ws.build().assert().success();
        let before = metadata(&ws.layers());

        ws.request("9.9.9");
        ws.build()
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"))
            .stderr(predicate::str::contains("No version of cpython matches \"9.9.9\""));

        assert_eq!(metadata(&ws.layers()), before);
    }

    #[test]
    fn failed_install_keeps_layer() {
        let ws = Workspace::new();
        ws.build().assert().success();
        let before = metadata(&ws.layers());

        // 3.9.1 points at an artifact that does not exist
        ws.request("3.9.1");
        ws.build().assert().failure();

        assert_eq!(metadata(&ws.layers()), before);
        assert!(ws.layers().join("cpython").join("python-3.10.2.tgz").exists());
    }

    #[test]
    fn layer_show_and_clear() {
        let ws = Workspace::new();
        ws.build().assert().success();

        ws.cmd()
            .args(["layer", "show", "--layers", &ws.path("layers"), "--format", "plain"])
            .assert()
            .success()
            .stdout("3.10.2\n");

        ws.cmd()
            .args(["layer", "clear", "--layers", &ws.path("layers"), "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Layer cleared"));

        assert!(!ws.layers().join("cpython.toml").exists());

        ws.build()
            .assert()
            .success()
            .stdout(predicate::str::contains("Installing CPython 3.10.2"));
    }

    #[test]
    fn config_path_uses_env() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("BP_CPYTHON_VERSION"));
    }

    #[test]
    fn invalid_config_is_reported_and_init_repairs_it() {
        let ws = Workspace::new();
        fs::write(ws.path("config.toml"), "[general]\nlog_format = \"xml\"\n").unwrap();

        ws.cmd()
            .args(["catalog", "list", "--catalog", &ws.path("catalog.toml")])
            .assert()
            .failure()
            .stderr(predicate::str::contains("log_format"));

        ws.cmd()
            .args(["config", "init", "--force"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));

        ws.cmd()
            .args(["catalog", "list", "--catalog", &ws.path("catalog.toml")])
            .assert()
            .success();
    }

    #[test]
    fn catalog_path_from_config_is_relative_to_it() {
        let ws = Workspace::new();
        fs::write(ws.path("config.toml"), "[catalog]\npath = \"catalog.toml\"\n").unwrap();

        ws.cmd()
            .current_dir(ws.app())
            .args(["catalog", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout("cpython 3.10.2\ncpython 3.9.1\n");
    }

    #[test]
    fn unquoted_minor_in_buildpack_yml_resolves() {
        let ws = Workspace::new();
        fs::write(ws.app().join("buildpack.yml"), "cpython:\n  version: 3.10\n").unwrap();

        ws.cmd()
            .args([
                "resolve",
                "--app",
                &ws.path("app"),
                "--catalog",
                &ws.path("catalog.toml"),
                "--format",
                "plain",
            ])
            .assert()
            .success()
            .stdout("3.10.2\n");
    }
}
