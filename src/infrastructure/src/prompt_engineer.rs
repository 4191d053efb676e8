//! Prompt construction for both generation pipelines.
//!
//! Structured mode turns CLI parameters into an explicit, ordered command plan
//! the model is asked to reproduce. Conversational mode wraps a free-text
//! request with context and the loaded-structure registry.

use domain::entities::MolecularStructure;
use serde_json::Value;
use shared::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

const STRUCTURED_SYSTEM_PROMPT: &str = "You are a PyMOL command generator.
RULES:
- Output ONLY PyMOL commands, one per line.
- No prose, no code fences, no comments, no explanations.
- Assume a clean session.
- If the requested object is not loaded, fetch the given PDB id under the requested object name.
- Default style: hide everything; show cartoon; color by secondary structure (H=red, S=yellow, L=white); bg_color white.
- For aggregation: create explicit copies and translate each copy by the given step along the chosen axis.
- Finish with: zoom all";

const CONVERSATIONAL_SYSTEM_PROMPT: &str = "You are a PyMOL command generator that checks its own output before answering.

OUTPUT RULES:
- Output ONLY PyMOL commands, each on its own line
- No explanations, comments, markdown or code blocks
- Nothing before or after the commands
- Every line must run as-is on the PyMOL command line

CHECK BEFORE ANSWERING:
- Verb spelling (cartoon, not cartoom)
- Color names and selection syntax
- Object names exist before they are referenced
- Commands that need arguments have them (show/hide need a representation, fetch needs an id)
- Animations define their frames (mset) before storing views (mview store)

EXAMPLE: static display
fetch 1abc
hide everything
show cartoon
color red, chain A
zoom

EXAMPLE: multi-copy layout along x
fetch 1a2b
create copy1, 1a2b
create copy2, 1a2b
translate [20,0,0], copy1
translate [40,0,0], copy2
zoom all

EXAMPLE: frame-keyed aggregation toward the origin
fetch 1a2b
create copy1, 1a2b
create copy2, 1a2b
translate [30,0,0], copy1
translate [-30,0,0], copy2
mset 1 x60
mview store, 1
translate [-10,0,0], copy1
translate [10,0,0], copy2
mview store, 30
translate [-10,0,0], copy1
translate [10,0,0], copy2
mview store, 60
mview interpolate
mplay

Your response must contain ONLY PyMOL commands.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn unit(self, step: f64) -> [f64; 3] {
        match self {
            Axis::X => [step, 0.0, 0.0],
            Axis::Y => [0.0, step, 0.0],
            Axis::Z => [0.0, 0.0, step],
        }
    }
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(Error::InvalidArguments(format!(
                "axis must be one of x, y, z (got '{}')",
                other
            ))),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

/// Validated aggregation triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregation {
    pub copies: u32,
    pub step: f64,
    pub axis: Axis,
}

/// Parameters of the non-conversational pipeline.
#[derive(Debug, Clone, Default)]
pub struct StructuredRequest {
    pub object: String,
    pub source_id: Option<String>,
    pub copies: Option<u32>,
    pub step: Option<f64>,
    pub axis: Option<String>,
    pub extra: Option<String>,
}

impl StructuredRequest {
    pub fn new(object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            ..Self::default()
        }
    }

    /// The aggregation triple is all-or-nothing.
    pub fn aggregation(&self) -> Result<Option<Aggregation>> {
        match (self.copies, self.step, self.axis.as_deref()) {
            (None, None, None) => Ok(None),
            (Some(copies), Some(step), Some(axis)) => {
                if copies == 0 {
                    return Err(Error::InvalidArguments(
                        "--copies must be at least 1".to_string(),
                    ));
                }
                if !step.is_finite() {
                    return Err(Error::InvalidArguments(
                        "--step must be a finite number".to_string(),
                    ));
                }
                Ok(Some(Aggregation {
                    copies,
                    step,
                    axis: axis.parse()?,
                }))
            }
            _ => Err(Error::InvalidArguments(
                "--copies, --step and --axis must be provided together".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StructuredPrompt {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Ordered reference commands embedded in the user prompt. Always ends with `zoom all`.
    pub plan: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PromptEngineer;

impl PromptEngineer {
    pub fn new() -> Self {
        Self
    }

    pub fn structured(&self, request: &StructuredRequest) -> Result<StructuredPrompt> {
        let object = request.object.trim();
        if object.is_empty() {
            return Err(Error::InvalidArguments(
                "object name must not be empty".to_string(),
            ));
        }
        let aggregation = request.aggregation()?;
        let plan = self.build_plan(object, request.source_id.as_deref(), aggregation);

        let mut parts = vec![format!("Object name: {}", object)];
        if let Some(id) = &request.source_id {
            parts.push(format!("PDB id to fetch if missing: {}", id));
        }
        if let Some(agg) = aggregation {
            parts.push(format!(
                "Aggregation: make {} total units, shift {} Å per copy along {}.",
                agg.copies,
                format_number(agg.step),
                agg.axis
            ));
        }
        parts.push("Tasks:".to_string());
        if request.source_id.is_some() {
            parts.push("1) Load/fetch structure.".to_string());
        } else {
            parts.push(format!(
                "1) Object '{}' is assumed to be loaded already; do not fetch or load it.",
                object
            ));
        }
        parts.push(
            "2) Hide everything; show cartoon; color by secondary structure; bg_color white."
                .to_string(),
        );
        if let Some(agg) = aggregation.filter(|a| a.copies > 1) {
            parts.push(format!(
                "3) Create {} copies and translate each by {} Å along {}, \
                 keeping the first at origin.",
                agg.copies - 1,
                format_number(agg.step),
                agg.axis
            ));
        }
        parts.push("4) Finish with zoom all.".to_string());
        parts.push("Reference command sequence:".to_string());
        parts.extend(plan.iter().cloned());
        parts.push("IMPORTANT: One PyMOL command per line, no prose.".to_string());
        if let Some(extra) = request.extra.as_deref().filter(|e| !e.trim().is_empty()) {
            parts.push(format!("Extra request: {}", extra.trim()));
        }

        Ok(StructuredPrompt {
            system_prompt: STRUCTURED_SYSTEM_PROMPT.to_string(),
            user_prompt: parts.join("\n"),
            plan,
        })
    }

    fn build_plan(
        &self,
        object: &str,
        source_id: Option<&str>,
        aggregation: Option<Aggregation>,
    ) -> Vec<String> {
        let mut plan = Vec::new();
        if let Some(id) = source_id {
            plan.push(format!("fetch {}, {}", id, object));
        }
        plan.push("hide everything".to_string());
        plan.push("show cartoon".to_string());
        plan.push("color red, ss h".to_string());
        plan.push("color yellow, ss s".to_string());
        plan.push("color white, ss l+''".to_string());
        plan.push("bg_color white".to_string());

        if let Some(agg) = aggregation {
            let [dx, dy, dz] = agg.axis.unit(agg.step);
            let mut previous = object.to_string();
            // Each copy starts from the previous one, so equal steps stack along the axis.
            for k in 2..=agg.copies {
                let copy = format!("{}_{}", object, k);
                plan.push(format!("create {}, {}", copy, previous));
                plan.push(format!(
                    "translate [{}, {}, {}], {}",
                    format_number(dx),
                    format_number(dy),
                    format_number(dz),
                    copy
                ));
                previous = copy;
            }
        }

        plan.push("zoom all".to_string());
        plan
    }

    pub fn conversational_system_prompt(&self) -> &'static str {
        CONVERSATIONAL_SYSTEM_PROMPT
    }

    /// User message for the conversational pipeline.
    pub fn conversational(
        &self,
        request: &str,
        context: Option<&Value>,
        structures: &[&MolecularStructure],
    ) -> String {
        let mut prompt = String::with_capacity(request.len() + 256);
        prompt.push('\n');
        prompt.push_str(request.trim());
        prompt.push('\n');

        if let Some(context) = context.filter(|c| !c.is_null()) {
            let rendered =
                serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_string());
            prompt.push_str("\n\nContext: ");
            prompt.push_str(&rendered);
        }

        if !structures.is_empty() {
            prompt.push_str("\n\nCurrently loaded structures:\n");
            for structure in structures {
                prompt.push_str("- ");
                prompt.push_str(&structure.summary());
                prompt.push('\n');
            }
        }
        prompt
    }
}

/// Whole numbers keep one decimal so `15` renders as `15.0`.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
