use serde_json::json;
use supportdesk_core::catalog::ProductCatalog;
use supportdesk_core::config::{AppConfig, LoadOptions};

use crate::commands::{CommandResult, EXIT_CATALOG, EXIT_CONFIG};

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("catalog", "config_validation", error.to_string(), EXIT_CONFIG)
        }
    };

    let catalog = match ProductCatalog::load(&config.catalog.path) {
        Ok(catalog) => catalog,
        Err(error) => {
            return CommandResult::failure("catalog", "catalog_load", error.to_string(), EXIT_CATALOG)
        }
    };

    let products: Vec<_> = catalog
        .products()
        .map(|product| {
            json!({
                "name": product.name,
                "description": product.profile.description,
                "components": product
                    .profile
                    .component_team_mapping
                    .iter()
                    .map(|(component, team)| json!({ "component": component, "team": team }))
                    .collect::<Vec<_>>(),
                "inquiry_categories": product.profile.inquiry_categories(),
            })
        })
        .collect();

    CommandResult::success_with_data(
        "catalog",
        format!("{} products loaded from `{}`", catalog.len(), config.catalog.path.display()),
        json!({ "products": products }),
    )
}
