use std::sync::Arc;

use serde_json::json;
use supportdesk_agent::{CompletionClient, OpenAiCompletionClient, TriageRuntime};
use supportdesk_core::catalog::ProductCatalog;
use supportdesk_core::config::{AppConfig, LoadOptions};
use supportdesk_core::domain::state::CustomerMessage;

use crate::commands::{CommandResult, EXIT_CATALOG, EXIT_CONFIG, EXIT_RUNTIME};

const COMMAND: &str = "process";

#[derive(Clone, Debug)]
pub struct ProcessArgs {
    pub product: String,
    pub message: String,
    pub customer_id: String,
}

pub fn run(options: &LoadOptions, args: ProcessArgs) -> CommandResult {
    let config = match load_config(options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let client = match OpenAiCompletionClient::from_config(&config.llm) {
        Ok(client) => client,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "completion_client",
                error.to_string(),
                EXIT_RUNTIME,
            )
        }
    };

    execute(&config, args, Arc::new(client))
}

/// Same as [`run`], with the completion backend supplied by the caller.
pub fn run_with_client(
    options: &LoadOptions,
    args: ProcessArgs,
    client: Arc<dyn CompletionClient>,
) -> CommandResult {
    match load_config(options) {
        Ok(config) => execute(&config, args, client),
        Err(result) => result,
    }
}

fn load_config(options: &LoadOptions) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::failure(COMMAND, "config_validation", error.to_string(), EXIT_CONFIG)
    })
}

fn execute(config: &AppConfig, args: ProcessArgs, client: Arc<dyn CompletionClient>) -> CommandResult {
    let catalog = match ProductCatalog::load(&config.catalog.path) {
        Ok(catalog) => catalog,
        Err(error) => {
            return CommandResult::failure(COMMAND, "catalog_load", error.to_string(), EXIT_CATALOG)
        }
    };

    let tokio_runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to start async runtime: {error}"),
                EXIT_RUNTIME,
            )
        }
    };

    let triage = TriageRuntime::new(Arc::new(catalog), client, config.llm.model.clone());
    let correlation_id = format!("cli-{}", uuid::Uuid::new_v4());
    let input = CustomerMessage {
        customer_id: args.customer_id,
        message: args.message,
        product: args.product.clone(),
    };

    match tokio_runtime.block_on(triage.process(input, &correlation_id)) {
        Ok(processed) => {
            let message = if processed.message_type.is_empty() {
                format!("product `{}` is not in the catalog", args.product)
            } else {
                format!("message triaged as {}", processed.message_type)
            };
            CommandResult::success_with_data(
                COMMAND,
                message,
                json!({ "correlation_id": correlation_id, "result": processed }),
            )
        }
        Err(error) => CommandResult::failure(COMMAND, "triage", error.to_string(), EXIT_RUNTIME),
    }
}
