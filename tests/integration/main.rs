//! Integration tests for ComfyPod

mod cli_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;

    fn comfypod() -> Command {
        let mut cmd = Command::cargo_bin("comfypod").unwrap();
        // keep the selector env var out of these tests' way
        cmd.env_remove("APP");
        cmd
    }

    #[test]
    fn help_displays() {
        comfypod()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("ComfyUI workload deployment"));
    }

    #[test]
    fn version_displays() {
        comfypod()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("comfypod"));
    }

    #[test]
    fn serve_without_workload_fails_fast() {
        // No APP env var and no argument: parsing fails before any
        // image-build or network step
        comfypod()
            .arg("serve")
            .assert()
            .failure()
            .stderr(predicate::str::contains("WORKLOAD"));
    }

    #[test]
    fn serve_unknown_workload_lists_candidates() {
        comfypod()
            .args(["serve", "sdxl"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("sdxl").and(predicate::str::contains("ace-step")));
    }

    #[test]
    fn build_reads_workload_from_env() {
        // An unknown value from APP must also fail during parsing
        comfypod()
            .arg("build")
            .env("APP", "definitely-not-a-workload")
            .assert()
            .failure()
            .stderr(predicate::str::contains("definitely-not-a-workload"));
    }

    #[test]
    fn workloads_lists_all_five() {
        let output = comfypod()
            .args(["workloads", "--format", "plain"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let listed: Vec<&str> = std::str::from_utf8(&output)
            .unwrap()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        assert_eq!(listed, vec!["ace-step", "flux", "krita", "qwen", "wan"]);
    }

    #[test]
    fn workloads_json_has_unique_names() {
        let output = comfypod()
            .args(["workloads", "--format", "json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let rows: Vec<serde_json::Value> = serde_json::from_slice(&output).unwrap();
        assert_eq!(rows.len(), 5);

        let apps: std::collections::HashSet<&str> =
            rows.iter().map(|r| r["app"].as_str().unwrap()).collect();
        let volumes: std::collections::HashSet<&str> = rows
            .iter()
            .map(|r| r["output_volume"].as_str().unwrap())
            .collect();
        assert_eq!(apps.len(), 5);
        assert_eq!(volumes.len(), 5);
    }

    #[test]
    fn workloads_table_shows_gpu_tiers() {
        comfypod()
            .args(["workloads"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("A100-80GB")
                    .and(predicate::str::contains("L40S"))
                    .and(predicate::str::contains("T4")),
            );
    }

    #[test]
    fn config_path() {
        comfypod()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        comfypod()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[serve]"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        comfypod()
            .args(["config", "set", "serve.nope", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown configuration key"));
    }

    #[test]
    fn cache_info_runs() {
        comfypod().args(["cache", "info"]).assert().success();
    }

    #[test]
    fn cache_verify_runs() {
        comfypod()
            .args(["cache", "verify"])
            .assert()
            .success();
    }

    #[test]
    fn completions_generate() {
        comfypod()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("comfypod"));
    }
}
