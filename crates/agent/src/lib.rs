//! The Dossier agent loop.
//!
//! The agent follows a **Plan → Act → Observe** cycle:
//!
//! 1. **Build the prompt** (instructions + tool list + question + scratchpad)
//! 2. **Ask the model** for the next step
//! 3. **Interpret** the text as a final answer, a tool call, or noise
//! 4. **If a tool call**: recover its arguments, run it, and append the
//!    observation to the scratchpad, then loop back to step 1
//! 5. **If a final answer**: return it
//!
//! The loop also stops when the model repeats an identical tool call or the
//! iteration budget runs out.

pub mod args;
pub mod dispatcher;
pub mod interpreter;
pub mod progress;
pub mod prompt;
pub mod transcript;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use args::parse_arguments;
pub use dispatcher::ToolDispatcher;
pub use interpreter::{InterpretedResponse, OBSERVATION_MARKER, interpret};
pub use progress::{ProgressEvent, ProgressSink, StderrProgress};
pub use transcript::{ActionHistory, ActionRecord, Transcript, TranscriptEntry};
pub use workflow::{RunOptions, TerminalReason, Workflow, WorkflowResult};
