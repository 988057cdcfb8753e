use std::sync::Arc;

use supportdesk_agent::{CompletionError, OpenAiCompletionClient, TriageRuntime};
use supportdesk_core::catalog::{CatalogError, ProductCatalog};
use supportdesk_core::config::{AppConfig, ConfigError, LoadOptions};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub catalog: Arc<ProductCatalog>,
    pub runtime: TriageRuntime,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("completion client setup failed: {0}")]
    Client(#[source] CompletionError),
}

pub fn load_config(options: LoadOptions) -> Result<AppConfig, BootstrapError> {
    Ok(AppConfig::load(options)?)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let catalog = Arc::new(ProductCatalog::load(&config.catalog.path)?);
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        path = %config.catalog.path.display(),
        products = catalog.len(),
        "product catalog loaded"
    );

    let client = OpenAiCompletionClient::from_config(&config.llm).map_err(BootstrapError::Client)?;
    info!(
        event_name = "system.bootstrap.client_ready",
        correlation_id = "bootstrap",
        provider = ?config.llm.provider,
        endpoint = %client.endpoint(),
        model = %config.llm.model,
        "completion client configured"
    );

    let runtime = TriageRuntime::new(catalog.clone(), Arc::new(client), config.llm.model.clone());
    Ok(Application { config, catalog, runtime })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use secrecy::SecretString;
    use supportdesk_core::config::AppConfig;
    use tempfile::TempDir;

    use crate::bootstrap::{bootstrap_with_config, BootstrapError};

    fn config_with_catalog(dir: &TempDir, contents: &str) -> AppConfig {
        let path = dir.path().join("products.json");
        fs::write(&path, contents).expect("write catalog");

        let mut config = AppConfig::default();
        config.catalog.path = path;
        config.llm.api_key = Some(SecretString::from("sk-test".to_string()));
        config
    }

    #[test]
    fn bootstrap_loads_catalog_and_builds_runtime() {
        let dir = TempDir::new().expect("temp dir");
        let config = config_with_catalog(
            &dir,
            r#"{"products":{"MobileApp":{"description":"d","component_team_mapping":{"UI":"Design"},"general_inquiry":{"resource_dict":{}}}}}"#,
        );

        let app = bootstrap_with_config(config).expect("bootstrap succeeds");

        assert_eq!(app.catalog.len(), 1);
        assert!(app.runtime.catalog().contains("MobileApp"));
        assert_eq!(app.runtime.model(), "gpt-4o-mini");
    }

    #[test]
    fn bootstrap_fails_fast_on_missing_catalog() {
        let dir = TempDir::new().expect("temp dir");
        let mut config = config_with_catalog(&dir, "{}");
        config.catalog.path = dir.path().join("missing.json");

        let error = bootstrap_with_config(config).err().expect("missing catalog");

        assert!(matches!(error, BootstrapError::Catalog(_)));
        assert!(error.to_string().contains("missing.json"));
    }

    #[test]
    fn bootstrap_rejects_empty_catalog() {
        let dir = TempDir::new().expect("temp dir");
        let config = config_with_catalog(&dir, r#"{"products":{}}"#);

        let error = bootstrap_with_config(config).err().expect("empty catalog");

        assert!(error.to_string().contains("at least one product"));
    }
}
