use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use facelog_matcher::Decision;
use facelog_recognizer::Recognizer;
use serde::Serialize;

use super::{print_json, read_vector};

#[derive(Args)]
pub struct RecognizeCommand {
    /// JSON file holding the query embedding
    #[arg(long)]
    pub vector: PathBuf,
}

#[derive(Serialize)]
struct DecisionView<'a> {
    matched: bool,
    identity_id: Option<&'a str>,
    name: Option<&'a str>,
    position: Option<&'a str>,
    distance: Option<f32>,
    second_distance: Option<f32>,
    reason: &'static str,
}

impl<'a> From<&'a Decision> for DecisionView<'a> {
    fn from(d: &'a Decision) -> Self {
        Self {
            matched: d.matched,
            identity_id: d.identity_id(),
            name: d.identity.as_ref().map(|r| r.name.as_str()),
            position: d.identity.as_ref().map(|r| r.position.as_str()),
            distance: d.distance,
            second_distance: d.second_distance,
            reason: d.reason.as_str(),
        }
    }
}

impl RecognizeCommand {
    pub fn run(&self, r: &Recognizer, json: bool) -> Result<()> {
        let query = read_vector(&self.vector)?;
        let decision = r.recognize_vector(&query)?;
        if json {
            return print_json(&DecisionView::from(&decision));
        }
        match (&decision.identity, decision.distance) {
            (Some(id), Some(d)) if decision.matched => {
                println!("matched: {} ({}) distance={d:.4}", id.name, id.id);
            }
            (_, Some(d)) => println!("unknown: {} distance={d:.4}", decision.reason),
            (_, None) => println!("unknown: {}", decision.reason),
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct EnrollCommand {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Job title or role
    #[arg(long, default_value = "")]
    pub position: String,

    /// JSON file holding the embedding
    #[arg(long)]
    pub vector: PathBuf,
}

#[derive(Serialize)]
struct EnrolledView<'a> {
    id: &'a str,
    name: &'a str,
    position: &'a str,
}

impl EnrollCommand {
    pub fn run(&self, r: &Recognizer, json: bool) -> Result<()> {
        let embedding = read_vector(&self.vector)?;
        let record = r.enroll_vector(&self.name, &self.position, embedding)?;
        if json {
            return print_json(&EnrolledView {
                id: &record.id,
                name: &record.name,
                position: &record.position,
            });
        }
        println!("enrolled: {} ({})", record.name, record.id);
        Ok(())
    }
}

#[derive(Args)]
pub struct SetActiveCommand {
    /// Identity id
    pub id: String,
}

impl SetActiveCommand {
    pub fn run(&self, r: &Recognizer, active: bool, json: bool) -> Result<()> {
        r.set_active(&self.id, active)?;
        if json {
            return print_json(&serde_json::json!({ "id": self.id, "active": active }));
        }
        let state = if active { "activated" } else { "deactivated" };
        println!("{state}: {}", self.id);
        Ok(())
    }
}
