//! The loop controller: plan, act, observe, repeat.
//!
//! Each run owns its transcript and action history, so a [`Workflow`] is
//! shared by reference and several runs may proceed concurrently on
//! separate tasks.
//!
//! # Termination
//!
//! A run ends in exactly one of three ways:
//! - **FinalAnswer**: the model wrote `Final Answer:`
//! - **LoopDetected**: the model repeated an identical tool call; the
//!   observations gathered so far are returned instead
//! - **MaxIterations**: the iteration budget ran out
//!
//! A model service error aborts the run. A model call that exceeds its
//! timeout only costs the iteration.

use chrono::{DateTime, Utc};
use dossier_config::AppConfig;
use dossier_core::error::Result;
use dossier_core::provider::TextGenerator;
use dossier_core::tool::ToolRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dispatcher::ToolDispatcher;
use crate::interpreter::{InterpretedResponse, interpret};
use crate::progress::{ProgressEvent, ProgressSink, StderrProgress, preview};
use crate::prompt::base_prompt;
use crate::transcript::{ActionHistory, ActionRecord, Transcript};

pub const MAX_ITERATIONS_MESSAGE: &str =
    "Agent reached maximum iterations. Please try a more specific instruction.";

pub const LOOP_WITHOUT_EVIDENCE_MESSAGE: &str =
    "Agent was unable to complete the task: it repeated the same action without gathering any information.";

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    FinalAnswer,
    LoopDetected,
    MaxIterations,
}

impl std::fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FinalAnswer => write!(f, "final answer"),
            Self::LoopDetected => write!(f, "loop detected"),
            Self::MaxIterations => write!(f, "max iterations"),
        }
    }
}

/// The outcome of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    /// The answer, the loop synthesis, or the budget message.
    pub text: String,
    pub terminal_reason: TerminalReason,
    pub run_id: Uuid,
    /// Model calls attempted, timeouts included.
    pub iterations: u32,
    /// Tool dispatches made.
    pub tool_calls: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Per-run overrides of the workflow defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Iteration cap. `None` or `Some(0)` uses the workflow default.
    pub max_iterations: Option<u32>,
    /// Emit progress events for this run.
    pub verbose: Option<bool>,
}

impl RunOptions {
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }
}

/// Drives a [`TextGenerator`] through the tool loop.
pub struct Workflow {
    generator: Arc<dyn TextGenerator>,
    dispatcher: ToolDispatcher,
    max_iterations: u32,
    verbose: bool,
    model_timeout: Duration,
    preview_chars: usize,
    progress: Arc<dyn ProgressSink>,
}

/// Mutable state owned by a single run.
struct RunState {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    verbose: bool,
    transcript: Transcript,
    history: ActionHistory,
    tool_calls: u32,
}

impl Workflow {
    /// Create a workflow with the default budget (10 iterations, 60 s per
    /// model call) and progress on stderr when verbose.
    pub fn new(generator: Arc<dyn TextGenerator>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            generator,
            dispatcher: ToolDispatcher::new(registry),
            max_iterations: 10,
            verbose: false,
            model_timeout: Duration::from_secs(60),
            preview_chars: 200,
            progress: Arc::new(StderrProgress),
        }
    }

    /// Create a workflow using the `[agent]` and `[llm]` config sections.
    pub fn from_config(
        generator: Arc<dyn TextGenerator>,
        registry: Arc<ToolRegistry>,
        config: &AppConfig,
    ) -> Self {
        Self::new(generator, registry)
            .with_max_iterations(config.agent.max_iterations)
            .with_verbose(config.agent.verbose)
            .with_preview_chars(config.agent.observation_preview_chars)
            .with_model_timeout(Duration::from_secs(config.llm.request_timeout_secs))
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set how long a single model call may take.
    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    /// Set how many characters of each observation a progress event shows.
    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    /// Send progress events somewhere other than stderr.
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.dispatcher.registry()
    }

    /// Run the loop for one instruction.
    pub async fn run(&self, instruction: &str, options: RunOptions) -> Result<WorkflowResult> {
        let max_iterations = options
            .max_iterations
            .filter(|&n| n > 0)
            .unwrap_or(self.max_iterations);

        let mut state = RunState {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            verbose: options.verbose.unwrap_or(self.verbose),
            transcript: Transcript::new(),
            history: ActionHistory::new(),
            tool_calls: 0,
        };

        info!(run_id = %state.run_id, max_iterations, "Workflow started");
        self.emit(
            &state,
            ProgressEvent::Started {
                run_id: state.run_id,
                max_iterations,
            },
        );

        let base = base_prompt(instruction, self.registry());

        for iteration in 1..=max_iterations {
            self.emit(&state, ProgressEvent::Iteration { number: iteration });

            let prompt = format!("{base}{}", state.transcript.render());
            let response =
                match tokio::time::timeout(self.model_timeout, self.generator.generate(&prompt))
                    .await
                {
                    Ok(Ok(text)) => text,
                    Ok(Err(e)) => {
                        warn!(run_id = %state.run_id, iteration, error = %e, "Model call failed");
                        return Err(e.into());
                    }
                    Err(_) => {
                        warn!(
                            run_id = %state.run_id,
                            iteration,
                            timeout_secs = self.model_timeout.as_secs_f64(),
                            "Model call timed out"
                        );
                        self.emit(&state, ProgressEvent::Timeout { iteration });
                        continue;
                    }
                };

            debug!(run_id = %state.run_id, iteration, chars = response.len(), "Model responded");
            self.emit(
                &state,
                ProgressEvent::ModelResponse {
                    text: response.clone(),
                },
            );

            match interpret(&response) {
                InterpretedResponse::Final { answer } => {
                    return Ok(self.finish(state, TerminalReason::FinalAnswer, answer, iteration));
                }
                InterpretedResponse::Action {
                    tool_name,
                    raw_input,
                } => {
                    let record = ActionRecord {
                        tool_name: tool_name.clone(),
                        raw_input: raw_input.clone(),
                    };
                    if !state.history.insert(record) {
                        warn!(
                            run_id = %state.run_id,
                            tool = %tool_name,
                            "Repeated identical tool call, stopping"
                        );
                        let text = synthesize_from_observations(&state.transcript);
                        return Ok(self.finish(state, TerminalReason::LoopDetected, text, iteration));
                    }

                    self.emit(
                        &state,
                        ProgressEvent::ToolCall {
                            tool: tool_name.clone(),
                            input: raw_input.clone(),
                        },
                    );
                    let observation = self.dispatcher.execute(&tool_name, &raw_input).await;
                    state.tool_calls += 1;
                    self.emit(
                        &state,
                        ProgressEvent::Observation {
                            preview: preview(&observation, self.preview_chars),
                        },
                    );
                    state.transcript.push_observation(response, observation);
                }
                InterpretedResponse::Unparseable => {
                    debug!(run_id = %state.run_id, iteration, "No action or final answer, nudging");
                    self.emit(&state, ProgressEvent::Nudge);
                    state.transcript.push_nudge(response);
                }
            }
        }

        warn!(run_id = %state.run_id, max_iterations, "Iteration budget exhausted");
        Ok(self.finish(
            state,
            TerminalReason::MaxIterations,
            MAX_ITERATIONS_MESSAGE.to_string(),
            max_iterations,
        ))
    }

    /// Run the loop and return only the text.
    pub async fn run_text(&self, instruction: &str, options: RunOptions) -> Result<String> {
        self.run(instruction, options).await.map(|r| r.text)
    }

    fn finish(
        &self,
        state: RunState,
        reason: TerminalReason,
        text: String,
        iterations: u32,
    ) -> WorkflowResult {
        info!(
            run_id = %state.run_id,
            reason = %reason,
            iterations,
            tool_calls = state.tool_calls,
            "Workflow finished"
        );
        self.emit(&state, ProgressEvent::Finished { reason, iterations });

        WorkflowResult {
            text,
            terminal_reason: reason,
            run_id: state.run_id,
            iterations,
            tool_calls: state.tool_calls,
            started_at: state.started_at,
            finished_at: Utc::now(),
        }
    }

    fn emit(&self, state: &RunState, event: ProgressEvent) {
        if state.verbose {
            self.progress.emit(&event);
        }
    }
}

/// Best-effort answer after a loop: every observation so far, in order.
fn synthesize_from_observations(transcript: &Transcript) -> String {
    let observations: Vec<&str> = transcript.observations().collect();
    if observations.is_empty() {
        LOOP_WITHOUT_EVIDENCE_MESSAGE.to_string()
    } else {
        observations.join("\n\n")
    }
}
