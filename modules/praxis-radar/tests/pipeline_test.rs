//! Integration tests for processing + ingestion against a real Neo4j.
//! Run with: cargo test -p praxis-radar --test pipeline_test -- --ignored --nocapture

use praxis_common::{MethodologyCreate, Movement, Quadrant, RadarTechnique, Ring};
use praxis_graph::testutil::neo4j_container;
use praxis_graph::{query, GraphClient, MethodologyRepository};
use praxis_radar::{GraphIngestor, RadarIngest, RadarProcessor};

fn fuzz_testing(ring: Ring) -> RadarTechnique {
    RadarTechnique {
        name: "Fuzz Testing".to_string(),
        quadrant: Quadrant::Techniques,
        ring,
        movement: Movement::NoChange,
        description: "Automated security testing that feeds random inputs to programs."
            .to_string(),
        volume: 32,
        edition_date: "2025-04".to_string(),
        source_url: Some(
            "https://www.thoughtworks.com/radar/techniques/summary/fuzz-testing".to_string(),
        ),
        related_blips: vec![],
    }
}

async fn seed_devops(client: &GraphClient) {
    MethodologyRepository::new(client.clone())
        .create(&MethodologyCreate {
            name: "DevOps".to_string(),
            description: Some("Culture of shared delivery responsibility".to_string()),
            origin: None,
            year_created: Some(2009),
            category: Some("Process".to_string()),
        })
        .await
        .unwrap();
}

async fn count_nodes(client: &GraphClient, cypher: &str) -> i64 {
    let mut stream = client.inner().execute(query(cypher)).await.unwrap();
    let row = stream.next().await.unwrap().unwrap();
    row.get("n").unwrap_or(0)
}

#[tokio::test]
#[ignore] // requires Docker
async fn reingest_skips_existing_entities_but_duplicates_evidence() {
    let (_container, client) = neo4j_container().await;
    seed_devops(&client).await;

    let ingestor = GraphIngestor::new(client.clone());
    let processed = RadarProcessor::new().process(&fuzz_testing(Ring::Adopt));

    let first = ingestor.ingest_processed(&processed).await;
    assert!(first.errors.is_empty(), "errors: {:?}", first.errors);
    assert_eq!(first.methodologies_created, 1); // Quality Assurance
    assert_eq!(first.practices_created, 2); // DevOps practice + QA practice
    assert_eq!(first.rules_created, 1);
    assert_eq!(first.evidence_created, 1);
    assert_eq!(first.connections_created, 1);

    let second = ingestor.ingest_processed(&processed).await;
    assert_eq!(second.methodologies_created, 0);
    assert_eq!(second.practices_created, 0);
    assert_eq!(second.rules_created, 0);
    // Evidence has no existence check, so re-ingestion duplicates it.
    assert_eq!(second.evidence_created, 1);
    assert_eq!(second.connections_created, 1);

    let evidence_nodes = count_nodes(
        &client,
        "MATCH (e:Evidence {name: 'thoughtworks-fuzz-testing'}) RETURN count(e) AS n",
    )
    .await;
    assert_eq!(evidence_nodes, 2);

    let rule_nodes = count_nodes(
        &client,
        "MATCH (r:Rule {name: 'thoughtworks-fuzz-testing'}) RETURN count(r) AS n",
    )
    .await;
    assert_eq!(rule_nodes, 1);
}

#[tokio::test]
#[ignore] // requires Docker
async fn technique_upsert_is_idempotent_and_updates_ring() {
    let (_container, client) = neo4j_container().await;
    seed_devops(&client).await;

    let ingestor = GraphIngestor::new(client.clone());
    let processed = RadarProcessor::new().process(&fuzz_testing(Ring::Adopt));
    ingestor.ingest_processed(&processed).await;

    ingestor.ingest_technique(&fuzz_testing(Ring::Adopt)).await.unwrap();
    let mut updated = fuzz_testing(Ring::Trial);
    updated.description = "Revised assessment of fuzz testing.".to_string();
    ingestor.ingest_technique(&updated).await.unwrap();

    let nodes = count_nodes(
        &client,
        "MATCH (rt:RadarTechnique {name: 'Fuzz Testing'}) RETURN count(rt) AS n",
    )
    .await;
    assert_eq!(nodes, 1);

    let summary = ingestor.techniques_summary().await.unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].ring, "Trial");
    assert_eq!(summary[0].description, "Revised assessment of fuzz testing.");
    // Keyword "fuzz" matches the QA practice created from the same technique.
    assert!(summary[0]
        .related_practices
        .contains(&"Fuzz Testing".to_string()));

    let connections = ingestor
        .technique_connections("Fuzz Testing")
        .await
        .unwrap()
        .expect("stored technique");
    assert!(connections
        .connected_practices
        .contains(&"Fuzz Testing".to_string()));
    assert!(connections
        .connected_methodologies
        .contains(&"Quality Assurance".to_string()));
}

#[tokio::test]
#[ignore] // requires Docker
async fn update_ring_reports_missing_technique() {
    let (_container, client) = neo4j_container().await;
    let ingestor = GraphIngestor::new(client);

    assert!(!ingestor.update_ring("No Such Technique", Ring::Hold).await.unwrap());

    ingestor.ingest_technique(&fuzz_testing(Ring::Adopt)).await.unwrap();
    assert!(ingestor.update_ring("Fuzz Testing", Ring::Hold).await.unwrap());

    let summary = ingestor.techniques_summary().await.unwrap();
    assert_eq!(summary[0].ring, "Hold");
}
