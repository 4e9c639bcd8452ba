//! Seed the graph with a small sample dataset for local development.
//!
//! Run with: cargo run -p praxis-api --bin seed
//!
//! Creation continues past individual failures, so re-running against a
//! populated graph logs duplicate warnings without aborting the rest.

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use praxis_common::{
    Config, ContextCreate, EvidenceCreate, MethodologyCreate, PracticeCreate, Priority, RuleCreate,
};
use praxis_graph::{
    ContextRepository, EvidenceRepository, GraphClient, MethodologyRepository, PracticeRepository,
    RuleRepository,
};

fn methodologies() -> Vec<MethodologyCreate> {
    let entries = [
        (
            "Agile",
            "Iterative development methodology focusing on collaboration, customer feedback, and rapid delivery",
            "Agile Manifesto Authors",
            2001,
            "Agile",
        ),
        (
            "Scrum",
            "Framework for developing and sustaining complex products in a complex environment",
            "Ken Schwaber and Jeff Sutherland",
            1995,
            "Agile",
        ),
        (
            "Waterfall",
            "Sequential development process where progress flows downwards through distinct phases",
            "Winston W. Royce",
            1970,
            "Traditional",
        ),
        (
            "DevOps",
            "Set of practices that combines software development and IT operations",
            "Patrick Debois",
            2009,
            "DevOps",
        ),
        (
            "Kanban",
            "Visual workflow management method for defining, managing and improving services",
            "Toyota Production System",
            1940,
            "Lean",
        ),
    ];
    entries
        .into_iter()
        .map(|(name, description, origin, year, category)| MethodologyCreate {
            name: name.to_string(),
            description: Some(description.to_string()),
            origin: Some(origin.to_string()),
            year_created: Some(year),
            category: Some(category.to_string()),
        })
        .collect()
}

fn practices() -> Vec<PracticeCreate> {
    let entries = [
        (
            "User Stories",
            "Short, simple descriptions of features told from the perspective of the end user",
            "Agile",
            vec!["Jira", "Azure DevOps", "Trello"],
            "Beginner",
            "2-4 hours per story",
        ),
        (
            "Sprint Planning",
            "Event in Scrum where the team plans work to be performed during the sprint",
            "Agile",
            vec!["Jira", "Azure DevOps", "Miro"],
            "Intermediate",
            "2-4 hours per sprint",
        ),
        (
            "Daily Scrum",
            "Daily time-boxed event for the development team to synchronize activities",
            "Scrum",
            vec!["Teams", "Slack", "Zoom"],
            "Beginner",
            "15 minutes daily",
        ),
        (
            "Sprint Review",
            "Event where the Scrum Team and stakeholders inspect the increment",
            "Scrum",
            vec!["Teams", "PowerPoint", "Demo environment"],
            "Intermediate",
            "1-2 hours per sprint",
        ),
        (
            "Sprint Retrospective",
            "Event where the Scrum Team inspects itself and creates improvement plans",
            "Scrum",
            vec!["Miro", "Retrium", "FunRetro"],
            "Intermediate",
            "1-2 hours per sprint",
        ),
        (
            "Continuous Integration",
            "Practice of merging developer working copies to a shared mainline frequently",
            "DevOps",
            vec!["Jenkins", "GitHub Actions", "Azure DevOps"],
            "Advanced",
            "Initial setup: 1-2 weeks",
        ),
        (
            "Infrastructure as Code",
            "Managing and provisioning infrastructure through machine-readable definition files",
            "DevOps",
            vec!["Terraform", "Ansible", "CloudFormation"],
            "Advanced",
            "Setup: 2-4 weeks",
        ),
        (
            "Visualize Workflow",
            "Make work visible through boards and cards representing work items",
            "Kanban",
            vec!["Kanban boards", "Jira", "Trello"],
            "Beginner",
            "1-2 days setup",
        ),
        (
            "Limit Work in Progress",
            "Constrain how much work can be in each stage of the workflow",
            "Kanban",
            vec!["Physical boards", "Digital tools"],
            "Intermediate",
            "Ongoing adjustment",
        ),
    ];
    entries
        .into_iter()
        .map(
            |(name, description, methodology, tools, difficulty, time)| PracticeCreate {
                name: name.to_string(),
                description: Some(description.to_string()),
                methodology_name: methodology.to_string(),
                tools: tools.into_iter().map(str::to_string).collect(),
                difficulty_level: Some(difficulty.to_string()),
                estimated_time: Some(time.to_string()),
            },
        )
        .collect()
}

fn rules() -> Vec<RuleCreate> {
    let entries = [
        (
            "daily-scrum-timebox",
            "Daily Scrum Time-box",
            "The Daily Scrum is time-boxed to 15 minutes regardless of team size",
            "Daily Scrum",
            Priority::High,
            "timeboxing",
            vec!["scrum", "meeting", "timebox"],
        ),
        (
            "daily-scrum-three-questions",
            "Three Questions Format",
            "Each team member answers: What did I do yesterday? What will I do today? What impediments are in my way?",
            "Daily Scrum",
            Priority::High,
            "format",
            vec!["scrum", "questions", "format"],
        ),
        (
            "sprint-planning-capacity",
            "Team Capacity Planning",
            "Consider team member availability, holidays, and other commitments when planning sprint capacity",
            "Sprint Planning",
            Priority::High,
            "planning",
            vec!["capacity", "planning", "team"],
        ),
        (
            "user-story-invest",
            "INVEST Criteria",
            "User stories should be Independent, Negotiable, Valuable, Estimable, Small, and Testable",
            "User Stories",
            Priority::High,
            "quality",
            vec!["invest", "criteria", "quality"],
        ),
        (
            "ci-commit-frequency",
            "Frequent Commits",
            "Developers should commit code to the main branch at least once per day",
            "Continuous Integration",
            Priority::Medium,
            "frequency",
            vec!["commits", "integration", "frequency"],
        ),
        (
            "ci-automated-tests",
            "Automated Test Suite",
            "Every commit should trigger automated tests to ensure code quality",
            "Continuous Integration",
            Priority::Critical,
            "testing",
            vec!["automation", "testing", "quality"],
        ),
        (
            "kanban-wip-limits",
            "Enforce WIP Limits",
            "Strictly enforce work-in-progress limits to prevent overloading the system",
            "Limit Work in Progress",
            Priority::High,
            "workflow",
            vec!["wip", "limits", "flow"],
        ),
    ];
    entries
        .into_iter()
        .map(
            |(name, title, detail, practice, priority, category, tags)| RuleCreate {
                name: name.to_string(),
                title: title.to_string(),
                detail: detail.to_string(),
                practice_name: practice.to_string(),
                priority,
                category: Some(category.to_string()),
                tags: tags.into_iter().map(str::to_string).collect(),
            },
        )
        .collect()
}

fn contexts() -> Vec<ContextCreate> {
    let entries = [
        (
            "Remote Team",
            "Distributed development team working from different locations",
            vec![
                "Time zone differences",
                "Communication challenges",
                "Limited face-to-face interaction",
            ],
            "4-7",
            "Web App",
            "Technology",
        ),
        (
            "Startup Environment",
            "Fast-paced startup environment with limited resources",
            vec![
                "Limited budget",
                "Tight deadlines",
                "Small team",
                "Changing requirements",
            ],
            "1-3",
            "Mobile App",
            "Fintech",
        ),
        (
            "Enterprise Project",
            "Large-scale enterprise project with complex requirements",
            vec![
                "Strict compliance",
                "Legacy systems",
                "Multiple stakeholders",
                "Long approval cycles",
            ],
            "16+",
            "API",
            "Finance",
        ),
        (
            "Open Source Project",
            "Community-driven open source software project",
            vec![
                "Volunteer contributors",
                "Asynchronous collaboration",
                "Documentation heavy",
            ],
            "8-15",
            "Desktop",
            "Open Source",
        ),
    ];
    entries
        .into_iter()
        .map(
            |(name, description, constraints, team_size, project_type, industry)| ContextCreate {
                name: name.to_string(),
                description: Some(description.to_string()),
                constraints: constraints.into_iter().map(str::to_string).collect(),
                team_size: Some(team_size.to_string()),
                project_type: Some(project_type.to_string()),
                industry: Some(industry.to_string()),
            },
        )
        .collect()
}

fn evidence() -> Vec<EvidenceCreate> {
    let entries = [
        (
            "agile-manifesto",
            "Agile Manifesto",
            "https://agilemanifesto.org/",
            "The original Agile Manifesto that established the foundation for agile methodologies",
            "website",
            10.0,
        ),
        (
            "scrum-guide",
            "The Scrum Guide",
            "https://scrumguides.org/",
            "Official guide to Scrum by Ken Schwaber and Jeff Sutherland",
            "guide",
            10.0,
        ),
        (
            "devops-handbook",
            "The DevOps Handbook",
            "https://itrevolution.com/the-devops-handbook/",
            "Comprehensive guide to DevOps practices and principles",
            "book",
            9.5,
        ),
        (
            "kanban-toyota",
            "Toyota Production System",
            "https://www.toyota-global.com/company/vision_philosophy/toyota_production_system/",
            "Original source of Kanban methodology from Toyota's manufacturing system",
            "documentation",
            9.8,
        ),
    ];
    entries
        .into_iter()
        .map(|(name, title, url, summary, source_type, score)| EvidenceCreate {
            name: name.to_string(),
            title: title.to_string(),
            url: Some(url.to_string()),
            summary: Some(summary.to_string()),
            source_type: Some(source_type.to_string()),
            credibility_score: Some(score),
        })
        .collect()
}

const EVIDENCE_LINKS: &[(&str, &str)] = &[
    ("scrum-guide", "daily-scrum-timebox"),
    ("scrum-guide", "daily-scrum-three-questions"),
    ("agile-manifesto", "user-story-invest"),
    ("devops-handbook", "ci-automated-tests"),
    ("kanban-toyota", "kanban-wip-limits"),
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("praxis=info".parse()?))
        .init();

    let config = Config::from_env();
    info!("Connecting to Neo4j at {}", config.neo4j_uri);
    let client =
        GraphClient::connect(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password)
            .await?;

    let methodology_repo = MethodologyRepository::new(client.clone());
    let practice_repo = PracticeRepository::new(client.clone());
    let rule_repo = RuleRepository::new(client.clone());
    let context_repo = ContextRepository::new(client.clone());
    let evidence_repo = EvidenceRepository::new(client.clone());

    info!("Creating sample data");

    for m in methodologies() {
        match methodology_repo.create(&m).await {
            Ok(created) => info!(name = %created.name, "Created methodology"),
            Err(e) => warn!(name = %m.name, error = %e, "Failed to create methodology"),
        }
    }

    for p in practices() {
        match practice_repo.create(&p).await {
            Ok(created) => info!(name = %created.name, "Created practice"),
            Err(e) => warn!(name = %p.name, error = %e, "Failed to create practice"),
        }
    }

    for r in rules() {
        match rule_repo.create(&r).await {
            Ok(created) => info!(name = %created.name, "Created rule"),
            Err(e) => warn!(name = %r.name, error = %e, "Failed to create rule"),
        }
    }

    for c in contexts() {
        match context_repo.create(&c).await {
            Ok(created) => info!(name = %created.name, "Created context"),
            Err(e) => warn!(name = %c.name, error = %e, "Failed to create context"),
        }
    }

    for e in evidence() {
        match evidence_repo.create(&e).await {
            Ok(created) => info!(name = %created.name, "Created evidence"),
            Err(e2) => warn!(name = %e.name, error = %e2, "Failed to create evidence"),
        }
    }

    for (evidence_name, rule_name) in EVIDENCE_LINKS {
        match evidence_repo.link_to_rule(evidence_name, rule_name).await {
            Ok(true) => info!(evidence = evidence_name, rule = rule_name, "Linked evidence to rule"),
            Ok(false) => warn!(
                evidence = evidence_name,
                rule = rule_name,
                "Evidence or rule missing, link skipped"
            ),
            Err(e) => warn!(
                evidence = evidence_name,
                rule = rule_name,
                error = %e,
                "Failed to link evidence to rule"
            ),
        }
    }

    info!("Sample data creation completed");
    Ok(())
}
