use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

const CATALOG: &str = r#"
[kinds]
OpticalFiber = []
Coax = []
WirelessLan = []
Ethernet = ["OpticalFiber", "Coax"]
IPv4 = ["Ethernet", "WirelessLan"]
Tcp = ["IPv4"]

[graphs.lab.kinds]
WirelessLan = []
IPv4 = ["WirelessLan"]

[requirements]
scenario = "Tcp > OpticalFiber"
setup = "Tcp > IPv4 > (Ethernet > OpticalFiber | WirelessLan)"
"#;

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "linkage-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn catalog(&self) -> PathBuf {
        let path = self.path.join("linkage.toml");
        fs::write(&path, CATALOG).expect("catalog should be written");
        path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_linkage<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_linkage");
    Command::new(bin)
        .args(args)
        .env_remove("LINKAGE_LOG")
        .output()
        .expect("linkage command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_failure(output: &Output) {
    if output.status.success() {
        panic!(
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

#[test]
fn kinds_json_lists_the_active_graph() {
    let tmp = TempDirGuard::new("kinds");
    let catalog = tmp.catalog();
    let output = run_linkage([
        OsStr::new("kinds"),
        OsStr::new("--catalog"),
        catalog.as_os_str(),
        OsStr::new("--json"),
    ]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["graph"], "");
    let kinds = payload["kinds"].as_array().expect("kinds should be an array");
    assert_eq!(kinds.len(), 6);
    let ipv4 = kinds
        .iter()
        .find(|entry| entry["kind"] == "IPv4")
        .expect("IPv4 should be listed");
    assert_eq!(ipv4["parents"], serde_json::json!(["Ethernet", "WirelessLan"]));
}

#[test]
fn graph_flag_switches_graph() {
    let tmp = TempDirGuard::new("graph");
    let catalog = tmp.catalog();
    let output = run_linkage([
        OsStr::new("ancestors"),
        OsStr::new("IPv4"),
        OsStr::new("--catalog"),
        catalog.as_os_str(),
        OsStr::new("--graph"),
        OsStr::new("lab"),
        OsStr::new("--json"),
    ]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["graph"], "lab");
    assert_eq!(payload["ancestors"], serde_json::json!(["WirelessLan"]));

    let output = run_linkage([
        OsStr::new("kinds"),
        OsStr::new("--catalog"),
        catalog.as_os_str(),
        OsStr::new("--graph"),
        OsStr::new("field"),
    ]);
    assert_failure(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("error: unknown graph"));
}

#[test]
fn resolve_expands_fan_out() {
    let tmp = TempDirGuard::new("resolve");
    let catalog = tmp.catalog();
    let output = run_linkage([
        OsStr::new("resolve"),
        OsStr::new("IPv4 > OpticalFiber | Tcp > WirelessLan"),
        OsStr::new("--catalog"),
        catalog.as_os_str(),
        OsStr::new("--json"),
    ]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["resolved"], false);
    assert_eq!(
        payload["singles"],
        serde_json::json!([
            "IPv4 > Ethernet > OpticalFiber",
            "Tcp > IPv4 > WirelessLan",
        ])
    );
}

#[test]
fn check_compares_named_requirements() {
    let tmp = TempDirGuard::new("check");
    let catalog = tmp.catalog();
    let output = run_linkage([
        OsStr::new("check"),
        OsStr::new("@scenario"),
        OsStr::new("@setup"),
        OsStr::new("--catalog"),
        catalog.as_os_str(),
        OsStr::new("--json"),
    ]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["left"], "Tcp > IPv4 > Ethernet > OpticalFiber");
    assert_eq!(payload["left_in_right"], true);
    assert_eq!(payload["right_in_left"], true);
    assert_eq!(payload["equal"], false);
    assert_eq!(payload["intersection"], "Tcp > IPv4 > Ethernet > OpticalFiber");

    let text = run_linkage([
        OsStr::new("check"),
        OsStr::new("@scenario"),
        OsStr::new("Tcp > IPv4 > WirelessLan"),
        OsStr::new("--catalog"),
        catalog.as_os_str(),
    ]);
    assert_success(&text);
    let stdout = String::from_utf8_lossy(&text.stdout);
    assert!(stdout.contains("Left within right: no"));
    assert!(stdout.contains("Intersection: Tcp > IPv4"));
}

#[test]
fn illegal_requirement_fails_with_error_line() {
    let tmp = TempDirGuard::new("illegal");
    let catalog = tmp.catalog();
    let output = run_linkage([
        OsStr::new("resolve"),
        OsStr::new("OpticalFiber > Tcp"),
        OsStr::new("--catalog"),
        catalog.as_os_str(),
    ]);
    assert_failure(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: illegal link type"), "{stderr}");

    let missing = tmp.path().join("missing.toml");
    let output = run_linkage([
        OsStr::new("kinds"),
        OsStr::new("--catalog"),
        missing.as_os_str(),
    ]);
    assert_failure(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read file"));
}
