//! Integration tests that run the CLI binary.

fn bin(home: &std::path::Path) -> std::process::Command {
    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_postsmith"));
    // Isolate from the developer's real session and config.
    cmd.env_remove("POSTSMITH_ACCESS_TOKEN");
    cmd.env_remove("POSTSMITH_USER_ID");
    cmd.env_remove("POSTSMITH_MODEL");
    cmd.env_remove("POSTSMITH_PLAN");
    cmd.env_remove("POSTSMITH_ENDPOINT");
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join(".config"));
    cmd.env("XDG_DATA_HOME", home.join(".local/share"));
    cmd.current_dir(home);
    cmd
}

fn tmp_home() -> tempfile::TempDir {
    tempfile::TempDir::new().expect("temp dir")
}

#[test]
fn cli_help_succeeds_and_outputs_usage() {
    let home = tmp_home();
    let output = bin(home.path())
        .arg("--help")
        .output()
        .expect("binary not found - run cargo build first");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.is_empty());
    assert!(
        stdout.contains("postsmith") || stdout.contains("prompt"),
        "expected usage text in output"
    );
}

#[test]
fn cli_version_succeeds() {
    let home = tmp_home();
    let output = bin(home.path())
        .arg("--version")
        .output()
        .expect("binary not found - run cargo build first");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("postsmith"));
}

#[test]
fn cli_prompt_without_token_exits_with_error() {
    let home = tmp_home();
    let output = bin(home.path())
        .arg("-p")
        .arg("hello")
        .output()
        .expect("binary not found - run cargo build first");

    assert!(
        !output.status.success(),
        "expected failure when no access token is set"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("POSTSMITH_ACCESS_TOKEN"),
        "expected token error message, got: {}",
        stderr
    );
}

#[test]
fn cli_models_lists_catalog_offline() {
    let home = tmp_home();
    let output = bin(home.path())
        .arg("models")
        .output()
        .expect("binary not found - run cargo build first");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("gemini-pro"));
    assert!(stdout.contains("google"));
}

#[test]
fn cli_models_query_filters() {
    let home = tmp_home();
    let output = bin(home.path())
        .args(["models", "--query", "sonnet"])
        .output()
        .expect("binary not found - run cargo build first");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("claude-3-5-sonnet"));
    assert!(!stdout.contains("gemini-pro"));
}

#[test]
fn cli_models_set_default_rejects_unknown_id() {
    let home = tmp_home();
    let output = bin(home.path())
        .args(["models", "set-default", "not-a-model"])
        .output()
        .expect("binary not found - run cargo build first");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown model"), "got: {}", stderr);
}

#[test]
fn cli_templates_lists_builtins() {
    let home = tmp_home();
    let output = bin(home.path())
        .arg("templates")
        .output()
        .expect("binary not found - run cargo build first");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("caption"));
    assert!(stdout.contains("topic"));
}

#[test]
fn cli_templates_add_list_remove_roundtrip() {
    let home = tmp_home();

    let output = bin(home.path())
        .args([
            "templates",
            "add",
            "launch",
            "--description",
            "Product launch post",
            "--body",
            "Announce {product} to {audience}",
        ])
        .output()
        .expect("binary not found - run cargo build first");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output = bin(home.path()).arg("templates").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("launch"));
    assert!(stdout.contains("product, audience"));

    let output = bin(home.path())
        .args(["templates", "remove", "launch"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = bin(home.path()).arg("templates").output().unwrap();
    assert!(!String::from_utf8_lossy(&output.stdout).contains("launch"));
}

#[test]
fn cli_templates_add_rejects_builtin_collision() {
    let home = tmp_home();
    let output = bin(home.path())
        .args([
            "templates", "add", "caption", "--description", "x", "--body", "y {topic}",
        ])
        .output()
        .expect("binary not found - run cargo build first");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("conflicts with built-in"), "got: {}", stderr);
}

#[test]
fn cli_templates_remove_builtin_is_rejected() {
    let home = tmp_home();
    let output = bin(home.path())
        .args(["templates", "remove", "tweet"])
        .output()
        .expect("binary not found - run cargo build first");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("built-in"), "got: {}", stderr);
}

#[test]
fn cli_generate_unknown_template_errors() {
    let home = tmp_home();
    let output = bin(home.path())
        .env("POSTSMITH_ACCESS_TOKEN", "test-token")
        .args(["generate", "-t", "nope"])
        .output()
        .expect("binary not found - run cargo build first");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no template named 'nope'"), "got: {}", stderr);
}

#[test]
fn cli_history_list_is_empty_without_any_session() {
    let home = tmp_home();
    let output = bin(home.path())
        .args(["history", "list"])
        .output()
        .expect("binary not found - run cargo build first");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No history yet."));
}
