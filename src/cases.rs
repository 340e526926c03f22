//! The four updater scenarios.
//!
//! Every case has the same shape: build a payload, run one updater, load the
//! document it wrote and check a handful of fields. The cases know nothing
//! about snapshots; [`crate::runner`] wraps each one in its own scope.

use crate::config::Layout;
use crate::document::{self, contains_id, contains_str, seq_at, str_at};
use crate::error::{CheckError, Result};
use crate::payload::Payload;
use crate::updater::Updater;
use serde::Serialize;
use serde_yaml::Value;
use tracing::debug;

pub struct CheckCase {
    pub name: &'static str,
    pub updater: Updater,
    payload: fn() -> Result<Payload>,
    verify: fn(&Value, &mut Findings),
}

impl CheckCase {
    pub fn payload(&self) -> Result<Payload> {
        (self.payload)()
    }

    /// Runs the updater and checks its output. Mutates the plan directory.
    pub fn execute(&self, layout: &Layout) -> Result<()> {
        let prepared = self.payload()?.prepare()?;
        let invoked = self.updater.invoke(layout, prepared.args());
        // The payload file goes away whether or not the updater succeeded.
        let discarded = prepared.discard();
        invoked?;
        discarded?;

        let output = self.updater.output_path(layout);
        let doc = document::load(&output)?;
        debug!(case = self.name, output = %output.display(), "loaded updated document");

        self.verify(&doc)
    }

    pub fn verify(&self, doc: &Value) -> Result<()> {
        let mut findings = Findings::default();
        (self.verify)(doc, &mut findings);
        findings.into_result(self.name)
    }
}

/// Failed expectations collected while checking one document.
#[derive(Debug, Default)]
pub struct Findings {
    failures: Vec<String>,
}

impl Findings {
    fn expect(&mut self, ok: bool, message: impl FnOnce() -> String) {
        if !ok {
            self.failures.push(message());
        }
    }

    fn into_result(self, case: &str) -> Result<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        Err(CheckError::Assertion {
            case: case.to_string(),
            message: self.failures.join("; "),
        })
    }
}

pub const PRD_PRODUCT_NAME: &str = "Unit Test";
pub const PRD_PROJECT_CODE: &str = "UNIT-001";
pub const PRD_SUMMARY: &str = "Unit summary";
pub const PRD_GOAL: &str = "G1";
pub const PERSONA_ID: &str = "P-UT";
pub const STRATEGIC_GOAL_ID: &str = "SG-UT";
pub const ROADMAP_GOAL: &str = "SG-UT-RM";
pub const MILESTONE_ID: &str = "M-UT-01";
pub const RISK_ID: &str = "RM-UT-01";

#[derive(Serialize)]
struct Persona {
    id: &'static str,
    name: &'static str,
    role: &'static str,
}

#[derive(Serialize)]
struct PersonasInput {
    primary_personas: Vec<Persona>,
}

#[derive(Serialize)]
struct StrategicGoal {
    id: &'static str,
    description: &'static str,
    time_horizon: &'static str,
}

#[derive(Serialize)]
struct StrategyInput {
    strategic_goals: Vec<StrategicGoal>,
}

#[derive(Serialize)]
struct Milestone {
    id: &'static str,
    description: &'static str,
    key_outcome: &'static str,
}

#[derive(Serialize)]
struct Horizon {
    goals: Vec<&'static str>,
    milestones: Vec<Milestone>,
}

#[derive(Serialize)]
struct TimeHorizons {
    short_term: Horizon,
}

#[derive(Serialize)]
struct Risk {
    id: &'static str,
    description: &'static str,
    mitigation: &'static str,
}

#[derive(Serialize)]
struct RoadmapInput {
    time_horizons: TimeHorizons,
    risks_assumptions: Vec<Risk>,
}

fn prd_payload() -> Result<Payload> {
    Ok(Payload::args([
        ("--product-name", PRD_PRODUCT_NAME),
        ("--project-code", PRD_PROJECT_CODE),
        ("--summary", PRD_SUMMARY),
        ("--goal", PRD_GOAL),
    ]))
}

fn verify_prd(doc: &Value, findings: &mut Findings) {
    let product_name = str_at(doc, "metadata.product_name");
    findings.expect(product_name == Some(PRD_PRODUCT_NAME), || {
        format!("metadata.product_name is {product_name:?}, expected {PRD_PRODUCT_NAME:?}")
    });
    findings.expect(contains_str(seq_at(doc, "overview.goals"), PRD_GOAL), || {
        format!("overview.goals does not contain {PRD_GOAL:?}")
    });
}

fn personas_payload() -> Result<Payload> {
    Payload::document(&PersonasInput {
        primary_personas: vec![Persona {
            id: PERSONA_ID,
            name: "Unit Tester",
            role: "QA",
        }],
    })
}

fn verify_personas(doc: &Value, findings: &mut Findings) {
    findings.expect(contains_id(seq_at(doc, "primary_personas"), PERSONA_ID), || {
        format!("primary_personas has no entry with id {PERSONA_ID:?}")
    });
}

fn strategy_payload() -> Result<Payload> {
    Payload::document(&StrategyInput {
        strategic_goals: vec![StrategicGoal {
            id: STRATEGIC_GOAL_ID,
            description: "Unit goal",
            time_horizon: "short-term",
        }],
    })
}

fn verify_strategy(doc: &Value, findings: &mut Findings) {
    findings.expect(
        contains_id(seq_at(doc, "strategic_goals"), STRATEGIC_GOAL_ID),
        || format!("strategic_goals has no entry with id {STRATEGIC_GOAL_ID:?}"),
    );
}

fn roadmap_payload() -> Result<Payload> {
    Payload::document(&RoadmapInput {
        time_horizons: TimeHorizons {
            short_term: Horizon {
                goals: vec![ROADMAP_GOAL],
                milestones: vec![Milestone {
                    id: MILESTONE_ID,
                    description: "Validate roadmap updater",
                    key_outcome: "Roadmap automation verified",
                }],
            },
        },
        risks_assumptions: vec![Risk {
            id: RISK_ID,
            description: "Roadmap script regression",
            mitigation: "Covered by unit test",
        }],
    })
}

fn verify_roadmap(doc: &Value, findings: &mut Findings) {
    findings.expect(
        contains_str(seq_at(doc, "time_horizons.short_term.goals"), ROADMAP_GOAL),
        || format!("time_horizons.short_term.goals does not contain {ROADMAP_GOAL:?}"),
    );
    findings.expect(
        contains_id(seq_at(doc, "time_horizons.short_term.milestones"), MILESTONE_ID),
        || format!("time_horizons.short_term.milestones has no entry with id {MILESTONE_ID:?}"),
    );
    findings.expect(contains_id(seq_at(doc, "risks_assumptions"), RISK_ID), || {
        format!("risks_assumptions has no entry with id {RISK_ID:?}")
    });
}

/// All cases, in the order they are run and reported.
pub fn all() -> Vec<CheckCase> {
    vec![
        CheckCase {
            name: "prd",
            updater: Updater::Prd,
            payload: prd_payload,
            verify: verify_prd,
        },
        CheckCase {
            name: "personas",
            updater: Updater::Personas,
            payload: personas_payload,
            verify: verify_personas,
        },
        CheckCase {
            name: "strategy",
            updater: Updater::Strategy,
            payload: strategy_payload,
            verify: verify_strategy,
        },
        CheckCase {
            name: "roadmap",
            updater: Updater::Roadmap,
            payload: roadmap_payload,
            verify: verify_roadmap,
        },
    ]
}

/// The cases named in `only` (all of them when empty), still in fixed order.
pub fn select(only: &[String]) -> Result<Vec<CheckCase>> {
    let cases = all();
    if let Some(unknown) = only
        .iter()
        .find(|name| !cases.iter().any(|case| case.name == name.as_str()))
    {
        return Err(CheckError::UnknownCase {
            name: unknown.clone(),
            available: cases.iter().map(|case| case.name.to_string()).collect(),
        });
    }
    if only.is_empty() {
        return Ok(cases);
    }
    Ok(cases
        .into_iter()
        .filter(|case| only.iter().any(|name| name == case.name))
        .collect())
}
