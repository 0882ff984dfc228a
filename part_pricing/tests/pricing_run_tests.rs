//! End-to-end runs: CSV in, mock Octopart, JSON report out.

use std::io::Write;
use std::time::Duration;

use part_pricing::{
    query_part_info, read_components, write_report, ClientConfig, NoProgress, OctopartClient,
    PricingError, PricingReport, QueryOptions,
};
use parts_common::{DistributorRegistry, QtyIncrement};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OctopartClient {
    OctopartClient::new(ClientConfig {
        api_key: None,
        api_base: format!("{}/api/v3", server.uri()),
        proxy_base: server.uri(),
        timeout: Duration::from_secs(5),
        max_retries: 1,
        retry_backoff: Duration::from_millis(10),
    })
    .unwrap()
}

fn component_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn match_body() -> serde_json::Value {
    serde_json::json!({
        "results": [
            {
                "reference": "0",
                "items": [{
                    "mpn": "LM358DR",
                    "specs": {"lifecycle_status": {"value": ["Active"]}},
                    "datasheets": [{"url": "https://www.ti.com/lit/ds/symlink/lm358.pdf"}],
                    "offers": [
                        {
                            "seller": {"name": "Digi-Key"},
                            "prices": {"USD": [[2500, "0.12"], [5000, "0.11"]]},
                            "sku": "296-1395-2-ND",
                            "in_stock_quantity": 40000
                        },
                        {
                            "seller": {"name": "Digi-Key"},
                            "prices": {"USD": [[1, "0.45"], [10, "0.38"], [100, "0.25"]]},
                            "sku": "296-1395-1-ND",
                            "product_url": "https://www.digikey.com/p/296-1395-1-ND",
                            "in_stock_quantity": 15000
                        },
                        {
                            "seller": {"name": "Some Broker"},
                            "prices": {"USD": [[1, "0.01"]]},
                            "sku": "BROKER-1"
                        }
                    ]
                }]
            },
            {
                "reference": "2",
                "items": [{
                    "mpn": "NE555P",
                    "specs": {"lifecycle_status": {"value": ["Obsolete"]}},
                    "offers": [{
                        "seller": {"name": "Mouser"},
                        "prices": {"EUR": [[1, 0.52]]},
                        "sku": "595-NE555P",
                        "in_stock_quantity": "1200"
                    }]
                }]
            }
        ]
    })
}

// ── full run ─────────────────────────────────────────────────────────

#[tokio::test]
async fn csv_to_report_through_mock_octopart() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/parts/match"))
        .respond_with(ResponseTemplate::new(200).set_body_json(match_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let input = component_csv(
        "refs,manf#,digikey#\n\
         U1,LM358DR,\n\
         TP1,,\n\
         U2,NE555P,\n",
    );
    let mut parts = read_components(input.path()).unwrap();
    let accepted = vec!["digikey".to_string(), "mouser".to_string()];

    let summary = query_part_info(
        &client_for(&mock_server),
        &mut parts,
        &DistributorRegistry::default(),
        accepted.as_slice(),
        &QueryOptions::default(),
        &mut NoProgress,
    )
    .await
    .unwrap();

    assert_eq!(summary.queried, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.requests, 1);

    let digikey = parts[0].distributor("digikey").unwrap();
    assert_eq!(digikey.part_num.as_deref(), Some("296-1395-1-ND"));
    assert_eq!(digikey.qty_avail, Some(15000));
    assert_eq!(digikey.qty_increment, Some(QtyIncrement::Finite(9)));
    assert_eq!(
        digikey.price_tiers.keys().copied().collect::<Vec<_>>(),
        vec![1, 10, 100, 2500, 5000]
    );
    assert_eq!(digikey.currency.as_deref(), Some("USD"));
    assert_eq!(parts[0].distributors.len(), 1);
    assert_eq!(
        parts[0].datasheet.as_deref(),
        Some("https://www.ti.com/lit/ds/symlink/lm358.pdf")
    );
    assert!(!parts[0].is_obsolete());

    assert!(parts[1].distributors.is_empty());

    let mouser = parts[2].distributor("mouser").unwrap();
    assert_eq!(mouser.part_num.as_deref(), Some("595-NE555P"));
    assert_eq!(mouser.qty_increment, Some(QtyIncrement::Unbounded));
    assert_eq!(mouser.currency.as_deref(), Some("EUR"));
    assert!(parts[2].is_obsolete());

    let output = tempfile::NamedTempFile::new().unwrap();
    write_report(
        std::fs::File::create(output.path()).unwrap(),
        &PricingReport::new(&accepted, &parts),
    )
    .unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output.path()).unwrap()).unwrap();
    assert_eq!(report["parts"].as_array().unwrap().len(), 3);
    assert_eq!(
        report["parts"][0]["distributors"]["digikey"]["part_num"],
        "296-1395-1-ND"
    );
    assert_eq!(report["parts"][2]["lifecycle"], "obsolete");
}

#[tokio::test]
async fn malformed_offer_leaves_rest_of_batch_priced() {
    let mock_server = MockServer::start().await;
    let body = serde_json::json!({
        "results": [
            {"reference": 0, "items": [{
                "mpn": "LM358DR",
                "offers": [
                    {"seller": null, "sku": 12345, "product_url": 7},
                    {"seller": {"name": "Digi-Key"}, "sku": "296-1395-1-ND", "prices": {"USD": [[1, "0.45"]]}}
                ]
            }]},
            {"reference": 1, "items": [{
                "mpn": "NE555P",
                "datasheets": null,
                "offers": [{"seller": {"name": "Mouser"}, "sku": "595-NE555P", "prices": {"USD": [[1, 0.52]]}}]
            }]}
        ]
    });
    Mock::given(method("GET"))
        .and(path("/parts/match"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let input = component_csv("manf#
LM358DR
NE555P
");
    let mut parts = read_components(input.path()).unwrap();

    query_part_info(
        &client_for(&mock_server),
        &mut parts,
        &DistributorRegistry::default(),
        &["digikey", "mouser"],
        &QueryOptions::default(),
        &mut NoProgress,
    )
    .await
    .unwrap();

    assert_eq!(
        parts[0].distributor("digikey").unwrap().part_num.as_deref(),
        Some("296-1395-1-ND")
    );
    assert_eq!(
        parts[1].distributor("mouser").unwrap().part_num.as_deref(),
        Some("595-NE555P")
    );
}

#[tokio::test]
async fn rejected_key_aborts_run() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/parts/match"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let input = component_csv("manf#\nLM358DR\n");
    let mut parts = read_components(input.path()).unwrap();

    let err = query_part_info(
        &client_for(&mock_server),
        &mut parts,
        &DistributorRegistry::default(),
        &["digikey"],
        &QueryOptions::default(),
        &mut NoProgress,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PricingError::Unauthorized(_)));
    assert!(parts[0].distributors.is_empty());
}

// ── input errors ─────────────────────────────────────────────────────

#[test]
fn missing_input_file_is_io_error() {
    let err = read_components("/nonexistent/bom.csv").unwrap_err();
    assert!(matches!(err, PricingError::Io(_)));
}
