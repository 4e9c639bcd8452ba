//! Integration tests for the entity repositories against a real Neo4j.
//! Run with: cargo test -p praxis-graph --test repository_test -- --ignored --nocapture

use praxis_common::{
    ContextCreate, EvidenceCreate, MethodologyCreate, PracticeCreate, Priority, RuleCreate,
};
use praxis_graph::testutil::neo4j_container;
use praxis_graph::{
    query, ContextRepository, EvidenceRepository, GraphClient, MethodologyRepository,
    PracticeRepository, RuleRepository,
};

fn methodology(name: &str) -> MethodologyCreate {
    MethodologyCreate {
        name: name.to_string(),
        description: Some("A test methodology".to_string()),
        origin: None,
        year_created: Some(2001),
        category: Some("Process".to_string()),
    }
}

fn practice(name: &str, methodology_name: &str) -> PracticeCreate {
    PracticeCreate {
        name: name.to_string(),
        methodology_name: methodology_name.to_string(),
        description: Some("A test practice".to_string()),
        tools: vec!["JUnit".to_string()],
        difficulty_level: Some("Beginner".to_string()),
        estimated_time: None,
    }
}

fn rule(name: &str, practice_name: &str) -> RuleCreate {
    RuleCreate {
        name: name.to_string(),
        practice_name: practice_name.to_string(),
        title: format!("Adopt {name}"),
        detail: "Always do the thing.".to_string(),
        priority: Priority::High,
        category: Some("testing".to_string()),
        tags: vec!["tdd".to_string()],
    }
}

#[tokio::test]
#[ignore] // requires Docker
async fn create_and_fetch_methodology() {
    let (_container, client) = neo4j_container().await;
    let repo = MethodologyRepository::new(client);

    let created = repo.create(&methodology("Extreme Programming")).await.unwrap();
    assert_eq!(created.name, "Extreme Programming");
    assert_eq!(created.year_created, Some(2001));
    // Origin was omitted and must come back as absent, not empty.
    assert_eq!(created.origin, None);

    let fetched = repo.get_by_name("Extreme Programming").await.unwrap();
    assert!(fetched.is_some());
    assert_eq!(fetched.unwrap().category.as_deref(), Some("Process"));

    assert!(repo.get_by_name("Nonexistent").await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // requires Docker
async fn get_all_orders_by_name() {
    let (_container, client) = neo4j_container().await;
    let repo = MethodologyRepository::new(client);

    repo.create(&methodology("Scrum")).await.unwrap();
    repo.create(&methodology("Kanban")).await.unwrap();

    let all = repo.get_all().await.unwrap();
    let names: Vec<&str> = all.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Kanban", "Scrum"]);
}

#[tokio::test]
#[ignore] // requires Docker
async fn practice_requires_existing_methodology() {
    let (_container, client) = neo4j_container().await;
    let practices = PracticeRepository::new(client);

    let err = practices
        .create(&practice("Pair Programming", "No Such Methodology"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed to create practice"));
}

#[tokio::test]
#[ignore] // requires Docker
async fn methodology_detail_collects_practices_and_rules() {
    let (_container, client) = neo4j_container().await;
    let methodologies = MethodologyRepository::new(client.clone());
    let practices = PracticeRepository::new(client.clone());
    let rules = RuleRepository::new(client);

    methodologies.create(&methodology("DevOps")).await.unwrap();
    practices
        .create(&practice("Continuous Integration", "DevOps"))
        .await
        .unwrap();
    rules
        .create(&rule("ci-build-on-commit", "Continuous Integration"))
        .await
        .unwrap();

    let detail = methodologies
        .get_with_practices("DevOps")
        .await
        .unwrap()
        .expect("methodology should exist");
    assert_eq!(detail.methodology.name, "DevOps");
    assert_eq!(detail.practices.len(), 1);
    assert_eq!(detail.practices[0].practice.name, "Continuous Integration");
    assert_eq!(detail.practices[0].rules.len(), 1);
    assert_eq!(detail.practices[0].rules[0].priority, Priority::High);
}

#[tokio::test]
#[ignore] // requires Docker
async fn delete_detaches_and_reports() {
    let (_container, client) = neo4j_container().await;
    let methodologies = MethodologyRepository::new(client.clone());
    let practices = PracticeRepository::new(client.clone());

    methodologies.create(&methodology("Lean")).await.unwrap();
    practices
        .create(&practice("Value Stream Mapping", "Lean"))
        .await
        .unwrap();

    assert!(methodologies.delete("Lean").await.unwrap());
    assert!(!methodologies.delete("Lean").await.unwrap());
    assert!(methodologies.get_by_name("Lean").await.unwrap().is_none());

    // Child practice survives the detach delete, only the link is gone.
    assert!(practices
        .get_by_name("Value Stream Mapping")
        .await
        .unwrap()
        .is_some());
}

async fn link_methodologies(client: &GraphClient, from: &str, to: &str) {
    let q = query(
        "MATCH (a:Methodology {name: $from}), (b:Methodology {name: $to})
         CREATE (a)-[:RELATED_TO]->(b)",
    )
    .param("from", from)
    .param("to", to);
    client.inner().run(q).await.unwrap();
}

#[tokio::test]
#[ignore] // requires Docker
async fn find_related_walks_shared_practices_and_related_to() {
    let (_container, client) = neo4j_container().await;
    let methodologies = MethodologyRepository::new(client.clone());
    let practices = PracticeRepository::new(client.clone());

    for name in ["Scrum", "Agile", "Waterfall", "Kanban"] {
        methodologies.create(&methodology(name)).await.unwrap();
    }
    practices
        .create(&practice("Sprint Planning", "Agile"))
        .await
        .unwrap();
    // Scrum shares the Sprint Planning practice with Agile.
    client
        .inner()
        .run(query(
            "MATCH (m:Methodology {name: 'Scrum'}), (p:Practice {name: 'Sprint Planning'})
             CREATE (m)-[:HAS_PRACTICE]->(p)",
        ))
        .await
        .unwrap();
    link_methodologies(&client, "Scrum", "Waterfall").await;

    let related = methodologies.find_related("Scrum", 5).await.unwrap();
    let names: Vec<&str> = related.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(related.len(), 2);
    assert!(names.contains(&"Agile"));
    assert!(names.contains(&"Waterfall"));
    // Kanban has no path to Scrum and stays out.
    assert!(!names.contains(&"Kanban"));

    // Reachability also runs through multi-hop paths: Agile reaches
    // Waterfall via the shared practice and Scrum's RELATED_TO edge.
    let from_agile = methodologies.find_related("Agile", 5).await.unwrap();
    assert!(from_agile.iter().any(|m| m.name == "Waterfall"));

    let capped = methodologies.find_related("Scrum", 1).await.unwrap();
    assert_eq!(capped.len(), 1);

    assert!(methodologies.find_related("Kanban", 5).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore] // requires Docker
async fn find_applicable_matches_constraints_and_team_size() {
    let (_container, client) = neo4j_container().await;
    let methodologies = MethodologyRepository::new(client.clone());
    let practices = PracticeRepository::new(client.clone());
    let rules = RuleRepository::new(client.clone());
    let contexts = ContextRepository::new(client.clone());

    methodologies.create(&methodology("Agile")).await.unwrap();
    practices
        .create(&practice("Sprint Planning", "Agile"))
        .await
        .unwrap();
    for name in ["capacity-planning", "compliance-review", "unscoped-rule"] {
        rules.create(&rule(name, "Sprint Planning")).await.unwrap();
    }

    contexts
        .create(&ContextCreate {
            name: "Startup Environment".to_string(),
            description: None,
            constraints: vec!["Limited budget".to_string(), "Tight deadlines".to_string()],
            team_size: Some("1-3".to_string()),
            project_type: None,
            industry: None,
        })
        .await
        .unwrap();
    contexts
        .create(&ContextCreate {
            name: "Enterprise Project".to_string(),
            description: None,
            constraints: vec!["Strict compliance".to_string()],
            team_size: Some("16+".to_string()),
            project_type: None,
            industry: None,
        })
        .await
        .unwrap();

    for (rule_name, context_name) in [
        ("capacity-planning", "Startup Environment"),
        ("compliance-review", "Enterprise Project"),
    ] {
        let q = query(
            "MATCH (r:Rule {name: $rule_name}), (c:Context {name: $context_name})
             CREATE (r)-[:APPLIES_IN]->(c)",
        )
        .param("rule_name", rule_name)
        .param("context_name", context_name);
        client.inner().run(q).await.unwrap();
    }

    let constraints = vec!["Limited budget".to_string()];
    let matched = rules.find_applicable(&constraints, None).await.unwrap();
    let names: Vec<&str> = matched.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["capacity-planning"]);

    // One shared constraint per context is enough; rules without an
    // APPLIES_IN link never match.
    let both = vec!["Limited budget".to_string(), "Strict compliance".to_string()];
    let matched = rules.find_applicable(&both, None).await.unwrap();
    assert_eq!(matched.len(), 2);
    assert!(!matched.iter().any(|r| r.name == "unscoped-rule"));

    // Team size narrows to contexts with that exact size.
    let matched = rules.find_applicable(&constraints, Some("1-3")).await.unwrap();
    assert_eq!(matched.len(), 1);
    assert!(rules
        .find_applicable(&constraints, Some("16+"))
        .await
        .unwrap()
        .is_empty());

    assert!(rules
        .find_applicable(&["No such constraint".to_string()], None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore] // requires Docker
async fn evidence_links_to_rule() {
    let (_container, client) = neo4j_container().await;
    let methodologies = MethodologyRepository::new(client.clone());
    let practices = PracticeRepository::new(client.clone());
    let rules = RuleRepository::new(client.clone());
    let evidence = EvidenceRepository::new(client);

    methodologies.create(&methodology("Quality Assurance")).await.unwrap();
    practices
        .create(&practice("Fuzz Testing", "Quality Assurance"))
        .await
        .unwrap();
    rules
        .create(&rule("thoughtworks-fuzz-testing", "Fuzz Testing"))
        .await
        .unwrap();
    evidence
        .create(&EvidenceCreate {
            name: "thoughtworks-fuzz-testing".to_string(),
            title: "ThoughtWorks Technology Radar: Fuzz testing".to_string(),
            url: Some("https://www.thoughtworks.com/radar/techniques/summary/fuzz-testing".to_string()),
            summary: None,
            source_type: Some("technology-radar".to_string()),
            credibility_score: Some(8.5),
        })
        .await
        .unwrap();

    let linked = evidence
        .link_to_rule("thoughtworks-fuzz-testing", "thoughtworks-fuzz-testing")
        .await
        .unwrap();
    assert!(linked);

    let with_evidence = rules.get_with_evidence("Fuzz Testing").await.unwrap();
    assert_eq!(with_evidence.len(), 1);
    assert_eq!(with_evidence[0].evidence.len(), 1);
    assert_eq!(with_evidence[0].evidence[0].credibility_score, Some(8.5));

    // Linking with a missing endpoint reports false rather than erroring.
    let missing = evidence
        .link_to_rule("thoughtworks-fuzz-testing", "no-such-rule")
        .await
        .unwrap();
    assert!(!missing);
}
