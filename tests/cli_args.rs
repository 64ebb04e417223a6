//! Integration tests for CLI behavior
//!
//! Runs the compiled binary against prepopulated cache directories so no
//! test ever touches the network.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chaindata"))
        .args(args)
        .output()
        .expect("Failed to execute chaindata")
}

/// Same as `run_cli` with extra environment variables set for the child
fn run_cli_with_env(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_chaindata"));
    command.args(args);
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().expect("Failed to execute chaindata")
}

/// Writes a fresh registry snapshot into `cache_dir` in the on-disk layout
/// the binary itself caches with, so registry commands run offline.
fn write_snapshot(cache_dir: &Path) {
    let namespace = cache_dir.join("blockchain");
    fs::create_dir_all(&namespace).expect("create cache namespace");

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_secs();
    let entry = serde_json::json!({
        "timestamp": now,
        "data": [
            {
                "chainId": 1,
                "name": "Ethereum Mainnet",
                "shortName": "eth",
                "chain": "ETH",
                "rpc": [{"url": "https://cloudflare-eth.com"}],
                "nativeCurrency": {"name": "Ether", "symbol": "ETH", "decimals": 18}
            },
            {
                "chainId": 42161,
                "name": "Arbitrum One",
                "shortName": "arb1",
                "rpc": ["https://arb1.arbitrum.io/rpc"]
            }
        ]
    });
    fs::write(
        namespace.join("blockchain_data.json"),
        serde_json::to_string(&entry).expect("serialize snapshot"),
    )
    .expect("write snapshot");
}

#[test]
fn test_help_lists_subcommands() {
    let output = run_cli(&["--help"]);

    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    for subcommand in ["chainlist", "defillama", "etherscan", "shell", "cache"] {
        assert!(
            stdout.contains(subcommand),
            "Help should mention {subcommand}: {stdout}"
        );
    }
}

#[test]
fn test_version_flag_prints_package_name() {
    let output = run_cli(&["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("chaindata"), "Version output: {stdout}");
}

#[test]
fn test_unknown_subcommand_fails() {
    let output = run_cli(&["stakepools"]);

    assert!(
        !output.status.success(),
        "Expected unknown subcommand to fail"
    );
}

#[test]
fn test_chainlist_requires_subcommand() {
    let output = run_cli(&["chainlist"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "Should print usage: {stderr}");
}

#[test]
fn test_chainlist_list_runs_offline_from_fresh_cache() {
    let cache_dir = TempDir::new().expect("create temp dir");
    write_snapshot(cache_dir.path());

    let output = run_cli(&[
        "chainlist",
        "list",
        "--cache-dir",
        cache_dir.path().to_str().expect("utf-8 temp path"),
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ethereum Mainnet"), "stdout: {stdout}");
    assert!(stdout.contains("Arbitrum One"), "stdout: {stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Using cached chain data"),
        "stderr: {stderr}"
    );
}

#[test]
fn test_chainlist_info_json_round_trips_unknown_fields() {
    let cache_dir = TempDir::new().expect("create temp dir");
    write_snapshot(cache_dir.path());

    let output = run_cli(&[
        "chainlist",
        "info",
        "1",
        "--format",
        "json",
        "--cache-dir",
        cache_dir.path().to_str().expect("utf-8 temp path"),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let chain: serde_json::Value = serde_json::from_str(&stdout).expect("stdout should be JSON");
    assert_eq!(chain["name"], "Ethereum Mainnet");
    assert_eq!(chain["chainId"], 1);
    // "chain" is not a modeled field; it must survive through the flatten map
    assert_eq!(chain["chain"], "ETH");
}

#[test]
fn test_chainlist_search_without_matches_warns_and_succeeds() {
    let cache_dir = TempDir::new().expect("create temp dir");
    write_snapshot(cache_dir.path());

    let output = run_cli(&[
        "chainlist",
        "search",
        "zzzznope",
        "--cache-dir",
        cache_dir.path().to_str().expect("utf-8 temp path"),
    ]);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("No results found"),
        "stderr: {stderr}"
    );
}

#[test]
fn test_cache_clear_removes_namespaces() {
    let cache_dir = TempDir::new().expect("create temp dir");
    write_snapshot(cache_dir.path());
    fs::create_dir_all(cache_dir.path().join("defillama")).expect("create namespace");

    let output = run_cli(&[
        "cache",
        "clear",
        "--cache-dir",
        cache_dir.path().to_str().expect("utf-8 temp path"),
    ]);

    assert!(output.status.success());
    assert!(!cache_dir.path().join("blockchain").exists());
    assert!(!cache_dir.path().join("defillama").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cleared cache"), "stderr: {stderr}");
}

#[test]
fn test_cache_clear_single_namespace_leaves_the_other() {
    let cache_dir = TempDir::new().expect("create temp dir");
    write_snapshot(cache_dir.path());
    fs::create_dir_all(cache_dir.path().join("defillama")).expect("create namespace");

    let output = run_cli(&[
        "cache",
        "clear",
        "--namespace",
        "defillama",
        "--cache-dir",
        cache_dir.path().to_str().expect("utf-8 temp path"),
    ]);

    assert!(output.status.success());
    assert!(cache_dir.path().join("blockchain").exists());
    assert!(!cache_dir.path().join("defillama").exists());
}

#[test]
fn test_cache_clear_is_idempotent_on_empty_dir() {
    let cache_dir = TempDir::new().expect("create temp dir");

    let output = run_cli(&[
        "cache",
        "clear",
        "--cache-dir",
        cache_dir.path().to_str().expect("utf-8 temp path"),
    ]);

    assert!(output.status.success());
}

/// A config file pointing the registry at a dead local port makes a forced
/// fetch fail fast; with nothing cached the command must report the empty
/// index instead of hanging or panicking.
#[cfg(target_os = "linux")]
#[test]
fn test_unreachable_registry_reports_no_chain_data() {
    let config_home = TempDir::new().expect("create temp dir");
    let config_dir = config_home.path().join("chaindata");
    fs::create_dir_all(&config_dir).expect("create config dir");
    fs::write(
        config_dir.join("config.json"),
        r#"{"services": {"chainlist_url": "http://127.0.0.1:1/rpcs.json"}}"#,
    )
    .expect("write config");
    let cache_dir = TempDir::new().expect("create temp dir");

    let output = run_cli_with_env(
        &[
            "chainlist",
            "list",
            "--cache-dir",
            cache_dir.path().to_str().expect("utf-8 temp path"),
        ],
        &[(
            "XDG_CONFIG_HOME",
            config_home.path().to_str().expect("utf-8 temp path"),
        )],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("no chain data available"),
        "stderr: {stderr}"
    );
}

#[cfg(test)]
mod unit_tests {
    //! CLI parsing checks through the library crate, no binary spawn needed

    use clap::Parser;

    use chaindata::cli::{ChainlistCommand, Cli, Command, RpcTypeArg};

    #[test]
    fn test_cache_dir_flag_is_global() {
        let cli = Cli::parse_from(["chaindata", "chainlist", "list", "--cache-dir", "/tmp/x"]);

        assert_eq!(
            cli.cache_dir.as_deref(),
            Some(std::path::Path::new("/tmp/x"))
        );
    }

    #[test]
    fn test_rpcs_flags_parse() {
        let cli = Cli::parse_from([
            "chaindata",
            "chainlist",
            "rpcs",
            "ethereum",
            "--type",
            "wss",
            "--no-tracking",
        ]);

        match cli.command {
            Command::Chainlist {
                command:
                    ChainlistCommand::Rpcs {
                        chain,
                        rpc_type,
                        no_tracking,
                        ..
                    },
            } => {
                assert_eq!(chain, "ethereum");
                assert!(matches!(rpc_type, RpcTypeArg::Wss));
                assert!(no_tracking);
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }
}
