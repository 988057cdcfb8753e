use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use serde_json::{json, Value};
use supportdesk_agent::steps::{bug_report, classification};
use supportdesk_agent::ScriptedCompletionClient;
use supportdesk_cli::commands::process::ProcessArgs;
use supportdesk_cli::commands::{catalog, doctor, process};
use supportdesk_core::config::{ConfigOverrides, LoadOptions};
use tempfile::TempDir;

const CATALOG_JSON: &str = r#"{
  "products": {
    "MobileApp": {
      "description": "Customer-facing mobile application",
      "component_team_mapping": {
        "Authentication Module": "Identity Team",
        "Payments": "Payments Team"
      },
      "general_inquiry": {
        "resource_dict": {
          "Billing": ["https://help.example.com/billing"],
          "Account Management": ["https://help.example.com/account"]
        }
      }
    }
  }
}"#;

#[test]
fn catalog_lists_products_from_configured_file() {
    let dir = catalog_dir();
    let catalog_path = dir.path().join("products.json");

    with_env(&[("OPENAI_API_KEY", "sk-test"), ("SUPPORTDESK_CATALOG_PATH", path_str(&catalog_path))], || {
        let result = catalog::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 0, "expected catalog listing to succeed: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "catalog");
        assert_eq!(payload["status"], "ok");
        let products = payload["data"]["products"].as_array().expect("products array");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["name"], "MobileApp");
        assert_eq!(products[0]["inquiry_categories"], json!(["Account Management", "Billing"]));
    });
}

#[test]
fn catalog_reports_missing_file_with_catalog_exit_code() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("absent.json");

    with_env(&[("OPENAI_API_KEY", "sk-test"), ("SUPPORTDESK_CATALOG_PATH", path_str(&missing))], || {
        let result = catalog::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 3);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "catalog_load");
    });
}

#[test]
fn catalog_returns_config_failure_without_api_key() {
    with_env(&[], || {
        let result = catalog::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn catalog_override_replaces_env_catalog_path() {
    let dir = catalog_dir();
    let catalog_path = dir.path().join("products.json");
    let missing = dir.path().join("absent.json");

    with_env(&[("OPENAI_API_KEY", "sk-test"), ("SUPPORTDESK_CATALOG_PATH", path_str(&missing))], || {
        let options = LoadOptions {
            overrides: ConfigOverrides {
                catalog_path: Some(catalog_path.clone()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        };
        let result = catalog::run(&options);
        assert_eq!(result.exit_code, 0, "override should point at the real catalog: {}", result.output);
        assert_eq!(parse_payload(&result.output)["data"]["products"][0]["name"], "MobileApp");
    });
}

#[test]
fn doctor_json_passes_with_valid_config_and_catalog() {
    let dir = catalog_dir();
    let catalog_path = dir.path().join("products.json");

    with_env(&[("OPENAI_API_KEY", "sk-test"), ("SUPPORTDESK_CATALOG_PATH", path_str(&catalog_path))], || {
        let result = doctor::run(&LoadOptions::default(), true);
        assert_eq!(result.exit_code, 0, "doctor should pass: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        let checks = payload["checks"].as_array().expect("checks array");
        let names: Vec<&str> = checks.iter().filter_map(|check| check["name"].as_str()).collect();
        assert_eq!(names, vec!["config_validation", "catalog_readiness", "completion_client_config"]);
        assert!(checks[2]["details"]
            .as_str()
            .is_some_and(|details| details.contains("/v1/chat/completions")));
    });
}

#[test]
fn doctor_skips_dependent_checks_when_config_fails() {
    with_env(&[("SUPPORTDESK_LLM_PROVIDER", "carrier-pigeon")], || {
        let result = doctor::run(&LoadOptions::default(), true);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "skipped");
        assert_eq!(payload["checks"][2]["status"], "skipped");
    });
}

#[test]
fn doctor_human_output_lists_each_check() {
    let dir = catalog_dir();
    let catalog_path = dir.path().join("products.json");

    with_env(&[("OPENAI_API_KEY", "sk-test"), ("SUPPORTDESK_CATALOG_PATH", path_str(&catalog_path))], || {
        let result = doctor::run(&LoadOptions::default(), false);
        assert_eq!(result.exit_code, 0);
        assert!(result.output.starts_with("doctor: all readiness checks passed"));
        assert!(result.output.contains("- [ok] catalog_readiness: 1 products loaded"));
    });
}

#[test]
fn process_triages_bug_report_with_scripted_backend() {
    let dir = catalog_dir();
    let catalog_path = dir.path().join("products.json");
    let client = ScriptedCompletionClient::new()
        .with_reply(
            classification::SCHEMA_NAME,
            json!({ "classification": "bug_report", "confidence_score": 0.92 }),
        )
        .with_reply(
            bug_report::SCHEMA_NAME,
            json!({
                "title": "Login Issue",
                "reproduction_steps": "Open the app and tap login",
                "affected_components": ["Authentication Module"]
            }),
        );

    with_env(&[("OPENAI_API_KEY", "sk-test"), ("SUPPORTDESK_CATALOG_PATH", path_str(&catalog_path))], || {
        let result = process::run_with_client(
            &LoadOptions::default(),
            args("MobileApp", "I can't log in"),
            Arc::new(client.clone()),
        );
        assert_eq!(result.exit_code, 0, "process should succeed: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "process");
        assert_eq!(payload["message"], "message triaged as bug_report");
        assert!(payload["data"]["correlation_id"]
            .as_str()
            .is_some_and(|id| id.starts_with("cli-")));

        let processed = &payload["data"]["result"];
        assert_eq!(processed["message_type"], "bug_report");
        assert_eq!(processed["response_data"]["ticket"]["title"], "Login Issue");
        assert_eq!(
            processed["response_data"]["ticket"]["reproduction_steps"],
            json!(["Open the app and tap login"])
        );
        assert_eq!(processed["response_data"]["ticket"]["assigned_team"], json!(["Identity Team"]));
        assert!(processed["response_data"]["ticket"]["id"]
            .as_str()
            .is_some_and(|id| id.starts_with("BUG-")));
    });

    assert_eq!(client.call_count(), 2);
}

#[test]
fn process_reports_unknown_product_without_calling_backend() {
    let dir = catalog_dir();
    let catalog_path = dir.path().join("products.json");
    let client = ScriptedCompletionClient::new();

    with_env(&[("OPENAI_API_KEY", "sk-test"), ("SUPPORTDESK_CATALOG_PATH", path_str(&catalog_path))], || {
        let result = process::run_with_client(
            &LoadOptions::default(),
            args("DesktopApp", "Where is my invoice?"),
            Arc::new(client.clone()),
        );
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["message"], "product `DesktopApp` is not in the catalog");
        assert_eq!(payload["data"]["result"]["customer_response"], "Invalid Product Name");
        assert_eq!(payload["data"]["result"]["message_type"], "");
    });

    assert_eq!(client.call_count(), 0);
}

#[test]
fn process_reads_config_file_passed_explicitly() {
    let dir = catalog_dir();
    let catalog_path = dir.path().join("products.json");
    let config_path = dir.path().join("supportdesk.toml");
    fs::write(
        &config_path,
        format!(
            "[llm]\napi_key = \"${{SUPPORTDESK_TEST_KEY}}\"\nmodel = \"gpt-4o\"\n\n[catalog]\npath = {:?}\n",
            path_str(&catalog_path)
        ),
    )
    .expect("write config");
    let client = ScriptedCompletionClient::new().with_reply(
        classification::SCHEMA_NAME,
        json!({ "classification": "general_inquiry", "confidence_score": 0.7 }),
    );

    with_env(&[("SUPPORTDESK_TEST_KEY", "sk-from-file")], || {
        let options = LoadOptions {
            config_path: Some(config_path.clone()),
            require_file: true,
            ..LoadOptions::default()
        };
        let result = process::run_with_client(
            &options,
            args("MobileApp", "How do I change my plan?"),
            Arc::new(client.clone()),
        );
        assert_eq!(result.exit_code, 0, "process should succeed: {}", result.output);

        let payload = parse_payload(&result.output);
        let processed = &payload["data"]["result"];
        assert_eq!(processed["message_type"], "general_inquiry");
        // No inquiry reply is scripted, so the step degrades to human review.
        assert_eq!(processed["response_data"]["inquiry_category"], "Other");
        assert_eq!(processed["response_data"]["requires_human_review"], true);
    });

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|call| call.model == "gpt-4o"));
}

fn args(product: &str, message: &str) -> ProcessArgs {
    ProcessArgs {
        product: product.to_string(),
        message: message.to_string(),
        customer_id: "cust-1".to_string(),
    }
}

fn catalog_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("products.json"), CATALOG_JSON).expect("write catalog");
    dir
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp paths are utf-8")
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid json")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "OPENAI_API_KEY",
        "SUPPORTDESK_TEST_KEY",
        "SUPPORTDESK_LLM_PROVIDER",
        "SUPPORTDESK_LLM_API_KEY",
        "SUPPORTDESK_LLM_BASE_URL",
        "SUPPORTDESK_LLM_MODEL",
        "SUPPORTDESK_LLM_TIMEOUT_SECS",
        "SUPPORTDESK_CATALOG_PATH",
        "SUPPORTDESK_SERVER_BIND_ADDRESS",
        "SUPPORTDESK_SERVER_PORT",
        "SUPPORTDESK_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "SUPPORTDESK_LOGGING_LEVEL",
        "SUPPORTDESK_LOGGING_FORMAT",
        "SUPPORTDESK_LOG_LEVEL",
        "SUPPORTDESK_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
