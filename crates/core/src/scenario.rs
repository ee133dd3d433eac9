//! Scripted recording runs: a host setup, a recorder config and a list of
//! gestures, played against a [`ScriptedHost`].

use std::rc::Rc;

use replay_lens_protocol::Segment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::ManualClock;
use crate::config::RecorderConfig;
use crate::error::RecorderError;
use crate::host::{HostSetup, ScriptedHost};
use crate::session::RecorderSession;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Recorder(#[from] RecorderError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Resize { width: f64, height: f64 },
    ScrollTo { x: f64, y: f64 },
    ScrollBy { dx: f64, dy: f64 },
    PinchZoom { scale: f64 },
    PinchScroll { dx: f64, dy: f64 },
    Advance { ms: f64 },
    Flush,
    Stop,
}

fn default_step_interval() -> f64 {
    16.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub config: RecorderConfig,
    #[serde(default)]
    pub host: HostSetup,
    /// Clock advance applied before every gesture step.
    #[serde(default = "default_step_interval")]
    pub step_interval_ms: f64,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json(data: &[u8]) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Play every step and return the flushed segments in order. Records
    /// still buffered at the end are flushed into a final segment.
    pub fn run(&self) -> Result<Vec<Segment>, ScenarioError> {
        let host = Rc::new(ScriptedHost::new(self.host.clone()));
        let clock = ManualClock::new(0.0);
        let mut session = RecorderSession::start(
            &self.config,
            Rc::clone(&host),
            host.as_ref(),
            Box::new(clock.clone()),
        )?;

        let mut segments = Vec::new();
        for step in &self.steps {
            match *step {
                Step::Advance { ms } => {
                    clock.advance(ms);
                    continue;
                }
                Step::Flush => {
                    segments.push(session.flush());
                    continue;
                }
                Step::Stop => {
                    session.stop();
                    continue;
                }
                _ => clock.advance(self.step_interval_ms),
            }
            match *step {
                Step::Resize { width, height } => host.resize(width, height),
                Step::ScrollTo { x, y } => host.scroll_to(x, y),
                Step::ScrollBy { dx, dy } => host.scroll_by(dx, dy),
                Step::PinchZoom { scale } => host.pinch_zoom(scale),
                Step::PinchScroll { dx, dy } => host.pinch_scroll(dx, dy),
                Step::Advance { .. } | Step::Flush | Step::Stop => {}
            }
        }

        let tail = session.flush();
        if !tail.is_empty() || segments.is_empty() {
            segments.push(tail);
        }
        session.stop();
        Ok(segments)
    }
}
