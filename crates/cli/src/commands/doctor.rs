use serde::Serialize;
use supportdesk_agent::OpenAiCompletionClient;
use supportdesk_core::catalog::ProductCatalog;
use supportdesk_core::config::{AppConfig, LoadOptions};

use crate::commands::{CommandResult, EXIT_CONFIG};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_CONFIG };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_catalog(&config));
            checks.push(check_completion_client_config(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("catalog_readiness"));
            checks.push(skipped("completion_client_config"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: "skipped because configuration did not load".to_string(),
    }
}

fn check_catalog(config: &AppConfig) -> DoctorCheck {
    match ProductCatalog::load(&config.catalog.path) {
        Ok(catalog) => DoctorCheck {
            name: "catalog_readiness",
            status: CheckStatus::Pass,
            details: format!(
                "{} products loaded from `{}`",
                catalog.len(),
                config.catalog.path.display()
            ),
        },
        Err(error) => DoctorCheck {
            name: "catalog_readiness",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

// Builds the client only; no request is sent.
fn check_completion_client_config(config: &AppConfig) -> DoctorCheck {
    match OpenAiCompletionClient::from_config(&config.llm) {
        Ok(client) => DoctorCheck {
            name: "completion_client_config",
            status: CheckStatus::Pass,
            details: format!("{} using model `{}`", client.endpoint(), config.llm.model),
        },
        Err(error) => DoctorCheck {
            name: "completion_client_config",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
