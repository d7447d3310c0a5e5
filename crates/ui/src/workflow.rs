//! Transaction workflow: build, then submit.
//!
//! A build pass collects every argument input's value in declaration order
//! and hands them to the workflow's [`TransactionBuilder`]. The outcome drives
//! the status message and the trigger gate: success clears the message and
//! enables the trigger, failure shows the detail and disables it.
//!
//! A submit pass always builds first, then forwards the artifact to the
//! shared submitter. Only one submit runs per workflow at a time. Builds are
//! tagged with a generation so a pass that finishes after a newer one has
//! started leaves the visible state alone. A submit whose build was overtaken
//! builds again from the current values instead of sending the old artifact.
//!
//! [`TransactionBuilder`]: txpanel_engine::TransactionBuilder

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use txpanel_types::{ArgValues, NodeId, Transaction};

use crate::error::{UiError, WorkflowError};
use crate::node::Arena;
use crate::tree::Tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowPhase {
    #[default]
    Idle,
    Building,
    Ready,
    BuildFailed,
    Submitting,
    SubmitFailed,
}

/// Point-in-time view of a workflow's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSnapshot {
    pub phase: WorkflowPhase,
    pub last_message: String,
    pub submit_enabled: bool,
    pub submit_in_flight: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct WorkflowState {
    phase: WorkflowPhase,
    last_message: String,
    submit_enabled: bool,
    submit_in_flight: bool,
    /// Generation of the most recently started build.
    build_generation: u64,
    /// Generation whose outcome the message and gate reflect.
    settled_generation: u64,
}

impl WorkflowState {
    pub fn new(submit_enabled: bool) -> Self {
        Self {
            phase: WorkflowPhase::Idle,
            last_message: String::new(),
            submit_enabled,
            submit_in_flight: false,
            build_generation: 0,
            settled_generation: 0,
        }
    }

    fn build_pending(&self) -> bool {
        self.settled_generation < self.build_generation
    }

    /// Builds only move the phase while no submit owns it.
    fn set_build_phase(&mut self, phase: WorkflowPhase) {
        if !self.submit_in_flight {
            self.phase = phase;
        }
    }

    fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            phase: self.phase,
            last_message: self.last_message.clone(),
            submit_enabled: self.submit_enabled,
            submit_in_flight: self.submit_in_flight,
        }
    }
}

impl Tree {
    pub fn workflow_state(&self, id: NodeId) -> Result<WorkflowSnapshot, UiError> {
        Ok(self.lock().function(id)?.state.snapshot())
    }

    /// Argument values of every input, merged in declaration order.
    pub fn function_arg_values(&self, id: NodeId) -> Result<ArgValues, UiError> {
        let args: Vec<NodeId> = self.lock().function(id)?.args.values().copied().collect();
        let mut values = ArgValues::new();
        for arg in args {
            values.extend(self.input_arg_values(arg)?);
        }
        Ok(values)
    }

    /// Run a build pass.
    ///
    /// Failures are shown in the status message and also returned, so a
    /// direct caller can react to them.
    pub async fn build_transaction(&self, id: NodeId) -> Result<Transaction, WorkflowError> {
        let (_, result) = self.build_pass(id).await?;
        result
    }

    async fn build_pass(&self, id: NodeId) -> Result<(u64, Result<Transaction, WorkflowError>), UiError> {
        let args = self.function_arg_values(id)?;
        let (generation, builder) = {
            let mut arena = self.lock();
            let function = arena.function_mut(id)?;
            function.state.build_generation += 1;
            function.state.set_build_phase(WorkflowPhase::Building);
            (function.state.build_generation, Arc::clone(&function.builder))
        };
        debug!(node = %id, generation, "build started");

        let result = builder.build_transaction(&args).await.map_err(WorkflowError::from);
        self.finish_build(id, generation, &result)?;
        Ok((generation, result))
    }

    fn finish_build(&self, id: NodeId, generation: u64, result: &Result<Transaction, WorkflowError>) -> Result<(), UiError> {
        let mut arena = self.lock();
        let state = &mut arena.function_mut(id)?.state;
        if state.build_generation != generation {
            debug!(node = %id, generation, latest = state.build_generation, "discarding stale build");
            return Ok(());
        }
        state.settled_generation = generation;
        match result {
            Ok(_) => {
                debug!(node = %id, generation, "build succeeded");
                state.last_message.clear();
                state.submit_enabled = true;
                state.set_build_phase(WorkflowPhase::Ready);
            }
            Err(error) => {
                warn!(node = %id, error = %error, "build failed");
                state.last_message = error.to_string();
                state.submit_enabled = false;
                state.set_build_phase(WorkflowPhase::BuildFailed);
            }
        }
        publish(&arena, id)
    }

    fn is_latest_build(&self, id: NodeId, generation: u64) -> Result<bool, UiError> {
        Ok(self.lock().function(id)?.state.build_generation == generation)
    }

    /// Run a submit pass: build, then hand the artifact to the submitter.
    ///
    /// Returns [`WorkflowError::Busy`] without side effects while another
    /// submit on the same workflow is in flight.
    pub async fn submit_transaction(&self, id: NodeId) -> Result<Value, WorkflowError> {
        let kind = {
            let mut arena = self.lock();
            let function = arena.function_mut(id)?;
            if function.state.submit_in_flight {
                warn!(node = %id, "submit rejected, another is in flight");
                return Err(WorkflowError::Busy);
            }
            function.state.submit_in_flight = true;
            function.state.phase = WorkflowPhase::Submitting;
            function.kind.clone()
        };
        debug!(node = %id, kind = %kind, "submit started");

        let result = self.build_and_submit(id, &kind).await;
        self.finish_submission(id, &result)?;
        result
    }

    /// Only an artifact from the latest build is ever sent.
    async fn build_and_submit(&self, id: NodeId, kind: &str) -> Result<Value, WorkflowError> {
        loop {
            let (generation, built) = self.build_pass(id).await?;
            if !self.is_latest_build(id, generation)? {
                debug!(node = %id, generation, "submit build overtaken, rebuilding");
                continue;
            }
            let transaction = built?;
            return Ok(self.services.submitter.submit(&transaction, kind).await?);
        }
    }

    fn finish_submission(&self, id: NodeId, result: &Result<Value, WorkflowError>) -> Result<(), UiError> {
        let mut arena = self.lock();
        let state = &mut arena.function_mut(id)?.state;
        state.submit_in_flight = false;
        let submit_failed = match result {
            Ok(_) => {
                debug!(node = %id, "submit succeeded");
                // A build that settled after the artifact was sent keeps its failure shown.
                if state.submit_enabled {
                    state.last_message.clear();
                }
                false
            }
            // Message and gate were settled by the build pass.
            Err(WorkflowError::Build(_)) => false,
            Err(error) => {
                warn!(node = %id, error = %error, "submit failed");
                state.last_message = error.to_string();
                true
            }
        };
        state.phase = if state.build_pending() {
            WorkflowPhase::Building
        } else if submit_failed {
            WorkflowPhase::SubmitFailed
        } else if !state.submit_enabled {
            WorkflowPhase::BuildFailed
        } else if result.is_ok() {
            WorkflowPhase::Idle
        } else {
            WorkflowPhase::Ready
        };
        publish(&arena, id)
    }

    /// Submit without failing: resolves with an empty string on success and
    /// otherwise with the status message currently shown, including when a
    /// concurrent submit was rejected.
    pub async fn send_transaction(&self, id: NodeId) -> String {
        match self.submit_transaction(id).await {
            Ok(receipt) => {
                debug!(node = %id, receipt = %receipt, "transaction submitted");
                String::new()
            }
            Err(error) => self
                .workflow_state(id)
                .map(|state| state.last_message)
                .unwrap_or_else(|_| error.to_string()),
        }
    }
}

/// Mirror a workflow's message and gate onto its info region and trigger.
/// Runs under the arena lock so the display always matches the state.
fn publish(arena: &Arena, id: NodeId) -> Result<(), UiError> {
    let function = arena.function(id)?;
    let info = &arena.binding(id)?.info;
    let trigger = &arena.binding(function.button)?.primary;
    info.set_text(&function.state.last_message);
    trigger.set_disabled(!function.state.submit_enabled);
    Ok(())
}
