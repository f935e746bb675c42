//! End-to-end cost calculation tests
//!
//! Full pipeline: plan file on disk -> parser -> rules -> pricing ->
//! breakdown. Remote prices come from a mockito server; the offline tests
//! pin every price to the static tables so no network is involved.

use mockito::Matcher;
use serde_json::json;
use terracost::{CostCalculator, PricingClient};

fn write_plan(dir: &tempfile::TempDir, plan: serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join("plan.json");
    std::fs::write(&path, plan.to_string()).expect("write plan file");
    path
}

fn change(
    resource_type: &str,
    name: &str,
    after: serde_json::Value,
) -> serde_json::Value {
    json!({
        "address": format!("{}.{}", resource_type, name),
        "type": resource_type,
        "name": name,
        "change": { "actions": ["create"], "after": after }
    })
}

fn offline_calculator(plan_file: &std::path::Path) -> CostCalculator {
    CostCalculator::with_pricing_client(
        plan_file,
        PricingClient::with_base_url("http://127.0.0.1:1"),
    )
}

#[tokio::test]
async fn test_vm_and_storage_via_pricing_api() {
    let mut server = mockito::Server::new_async().await;
    let vm_mock = server
        .mock("GET", "/")
        .match_query(Matcher::UrlEncoded(
            "$filter".into(),
            "serviceName eq 'Virtual Machines' and armRegionName eq 'eastus' \
             and contains(skuName, 'Standard_E4s_v5')"
                .into(),
        ))
        .with_status(200)
        .with_body(r#"{"Items":[{"retailPrice":0.1,"unitPrice":0.1,"currencyCode":"USD"}]}"#)
        .create_async()
        .await;
    let storage_mock = server
        .mock("GET", "/")
        .match_query(Matcher::UrlEncoded(
            "$filter".into(),
            "serviceName eq 'Storage' and armRegionName eq 'eastus' \
             and contains(skuName, 'Cool_ZRS')"
                .into(),
        ))
        .with_status(200)
        .with_body(r#"{"Items":[{"retailPrice":0.02,"unitPrice":0.02,"currencyCode":"USD"}]}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let plan = write_plan(
        &dir,
        json!({
            "resource_changes": [
                change(
                    "azurerm_linux_virtual_machine",
                    "web",
                    json!({ "location": "eastus", "size": "Standard_E4s_v5" })
                ),
                change(
                    "azurerm_storage_account",
                    "logs",
                    json!({
                        "location": "eastus",
                        "account_tier": "Cool",
                        "account_replication_type": "ZRS"
                    })
                )
            ]
        }),
    );

    let mut calculator = CostCalculator::with_pricing_client(
        &plan,
        PricingClient::with_base_url(server.url()),
    );
    let breakdown = calculator.calculate_costs().await.unwrap();

    assert_eq!(breakdown.resources.len(), 2);
    assert!(breakdown.unknown_costs.is_empty());

    // VM: $0.10/hour * 730 hours = $73.00
    let vm = &breakdown.resources[0];
    assert_eq!(vm.resource_type, "azurerm_linux_virtual_machine");
    assert!((vm.monthly_cost.unwrap() - 73.0).abs() < 1e-6);

    // Storage: $0.02/GB * 100 GB = $2.00
    let storage = &breakdown.resources[1];
    assert_eq!(storage.resource_type, "azurerm_storage_account");
    assert!((storage.monthly_cost.unwrap() - 2.0).abs() < 1e-6);

    // Total: $75.00
    assert!((breakdown.total_monthly_cost - 75.0).abs() < 1e-6);

    vm_mock.assert_async().await;
    storage_mock.assert_async().await;
}

#[tokio::test]
async fn test_offline_static_pricing_breakdown() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write_plan(
        &dir,
        json!({
            "resource_changes": [
                // Managed disk 64 GB Standard_LRS -> P6 -> $10.21 flat
                change(
                    "azurerm_managed_disk",
                    "data",
                    json!({
                        "location": "eastus",
                        "storage_account_type": "Standard_LRS",
                        "disk_size_gb": 64
                    })
                ),
                // Subnet: zero-cost, but a known cost
                change("azurerm_subnet", "internal", json!({})),
                // Logic App workflow: 100000 * $0.000125 = $12.50
                change("azurerm_logic_app_workflow", "flow", json!({ "location": "eastus" })),
                // App Service Plan B1: $54.75
                change(
                    "azurerm_service_plan",
                    "plan",
                    json!({ "location": "eastus", "sku_name": "B1" })
                ),
                // No rule registered for key vaults
                change("azurerm_key_vault", "secrets", json!({ "location": "eastus" }))
            ]
        }),
    );

    let mut calculator = offline_calculator(&plan);
    let breakdown = calculator.calculate_costs().await.unwrap();

    assert_eq!(breakdown.resources.len(), 4);
    assert_eq!(breakdown.unknown_costs, vec!["azurerm_key_vault.secrets"]);

    let costs: Vec<f64> = breakdown
        .resources
        .iter()
        .map(|r| r.monthly_cost.unwrap())
        .collect();
    assert!((costs[0] - 10.21).abs() < 1e-6);
    assert_eq!(costs[1], 0.0);
    assert!((costs[2] - 12.5).abs() < 1e-6);
    assert!((costs[3] - 54.75).abs() < 1e-6);

    // Sum property: total equals the sum of known costs; the zero-cost
    // subnet is known, the unpriced key vault contributes nothing
    let sum: f64 = costs.iter().sum();
    assert!((breakdown.total_monthly_cost - sum).abs() < 1e-9);
    assert!((breakdown.total_monthly_cost - 77.46).abs() < 1e-6);
}

#[tokio::test]
async fn test_vm_with_os_disk_adds_disk_cost() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write_plan(
        &dir,
        json!({
            "resource_changes": [
                change(
                    "azurerm_windows_virtual_machine",
                    "app",
                    json!({
                        "location": "eastus",
                        "size": "Standard_D2s_v3",
                        "os_disk": [{ "storage_account_type": "Premium_LRS" }]
                    })
                )
            ]
        }),
    );

    let mut calculator = offline_calculator(&plan);
    let breakdown = calculator.calculate_costs().await.unwrap();

    // Base: 0.096 * 730 = 70.08; OS disk: 128 GB Premium_LRS -> P10 -> 59.13
    assert_eq!(breakdown.resources.len(), 1);
    let cost = breakdown.resources[0].monthly_cost.unwrap();
    assert!((cost - (0.096 * 730.0 + 59.13)).abs() < 1e-6);
}

#[tokio::test]
async fn test_vm_without_size_is_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write_plan(
        &dir,
        json!({
            "resource_changes": [
                change(
                    "azurerm_linux_virtual_machine",
                    "incomplete",
                    json!({ "location": "eastus" })
                )
            ]
        }),
    );

    let mut calculator = offline_calculator(&plan);
    let breakdown = calculator.calculate_costs().await.unwrap();

    assert!(breakdown.resources.is_empty());
    assert_eq!(
        breakdown.unknown_costs,
        vec!["azurerm_linux_virtual_machine.incomplete"]
    );
    assert_eq!(breakdown.total_monthly_cost, 0.0);
}

#[tokio::test]
async fn test_unpriceable_resources_never_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write_plan(
        &dir,
        json!({
            "resource_changes": [
                // Remote pricing unreachable and not in the static table
                change(
                    "azurerm_linux_virtual_machine",
                    "exotic",
                    json!({ "location": "eastus", "size": "Standard_M128ms" })
                ),
                // Still priced from the static table afterwards
                change(
                    "azurerm_managed_disk",
                    "data",
                    json!({
                        "location": "eastus",
                        "storage_account_type": "Premium_LRS",
                        "disk_size_gb": 32
                    })
                )
            ]
        }),
    );

    let mut calculator = offline_calculator(&plan);
    let breakdown = calculator.calculate_costs().await.unwrap();

    assert_eq!(
        breakdown.unknown_costs,
        vec!["azurerm_linux_virtual_machine.exotic"]
    );
    assert_eq!(breakdown.resources.len(), 1);
    assert!((breakdown.total_monthly_cost - 15.84).abs() < 1e-6);
}

#[tokio::test]
async fn test_details_carry_display_fields() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write_plan(
        &dir,
        json!({
            "resource_changes": [
                change(
                    "azurerm_linux_virtual_machine",
                    "web",
                    json!({ "location": "eastus", "size": "Standard_D2s_v3" })
                )
            ]
        }),
    );

    let mut calculator = offline_calculator(&plan);
    let breakdown = calculator.calculate_costs().await.unwrap();

    let details = &breakdown.resources[0].details;
    assert_eq!(details.get("location").map(String::as_str), Some("eastus"));
    assert_eq!(
        details.get("size").map(String::as_str),
        Some("Standard_D2s_v3")
    );
    assert!(!details.contains_key("tier"));
}

#[tokio::test]
async fn test_every_resource_lands_in_exactly_one_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write_plan(
        &dir,
        json!({
            "resource_changes": [
                change("azurerm_subnet", "a", json!({})),
                change("azurerm_key_vault", "b", json!({})),
                change("azurerm_resource_group", "c", json!({})),
                change("azurerm_cosmosdb_account", "d", json!({}))
            ]
        }),
    );

    let mut calculator = offline_calculator(&plan);
    let breakdown = calculator.calculate_costs().await.unwrap();

    let known: Vec<&str> = breakdown
        .resources
        .iter()
        .map(|r| r.address.as_str())
        .collect();
    assert_eq!(known, vec!["azurerm_subnet.a", "azurerm_resource_group.c"]);
    assert_eq!(
        breakdown.unknown_costs,
        vec!["azurerm_key_vault.b", "azurerm_cosmosdb_account.d"]
    );
    assert_eq!(
        breakdown.resources.len() + breakdown.unknown_costs.len(),
        4
    );
}
