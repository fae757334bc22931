//! Operator prompt for application-identifier mismatches
//!
//! When no config file serves the target's identifier, the operator is asked
//! to pick one of the identifiers the config files do serve. Cancelling sets
//! a [`SpamGuard`] so the same mismatch is not raised again until the
//! candidate set changes.

use colored::Colorize;
use dialoguer::Select;

use crate::error::Result;

/// Suppresses repeated prompts for one unresolved mismatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpamGuard {
    set: bool,
}

impl SpamGuard {
    pub fn is_set(&self) -> bool {
        self.set
    }

    pub fn set(&mut self) {
        self.set = true;
    }

    pub fn reset(&mut self) {
        self.set = false;
    }
}

/// What the operator is asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    /// Identifier currently configured, if any
    pub current: Option<String>,
    /// Identifiers served by config files, sorted
    pub candidates: Vec<String>,
}

impl PromptRequest {
    pub fn message(&self) -> String {
        match &self.current {
            Some(current) => format!(
                "No config file serves '{current}'. Switch the application identifier to"
            ),
            None => "No application identifier is set. Use".to_string(),
        }
    }
}

/// The operator's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Picked(String),
    Cancelled,
}

/// Presents a [`PromptRequest`] to the operator.
pub trait Prompter {
    fn choose(&mut self, request: &PromptRequest) -> Result<PromptOutcome>;
}

/// Result of one disambiguation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptStatus {
    /// The identifier is served, or there is nothing to choose from
    NoMismatch,
    /// A previous prompt for this mismatch was cancelled
    Suppressed,
    /// A prompt is already open
    Dropped,
    /// A prompt was opened and awaits [`InteractiveDisambiguator::complete`]
    Open(PromptRequest),
    /// The operator picked an identifier and it was applied
    Applied(String),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Idle,
    Prompting(PromptRequest),
}

/// Idle/Prompting state machine around one [`Prompter`].
#[derive(Debug)]
pub struct InteractiveDisambiguator {
    state: State,
    guard: SpamGuard,
}

impl InteractiveDisambiguator {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            guard: SpamGuard::default(),
        }
    }

    pub fn guard(&self) -> SpamGuard {
        self.guard
    }

    pub fn is_prompting(&self) -> bool {
        matches!(self.state, State::Prompting(_))
    }

    /// Clear the guard. Called whenever the candidate set changes.
    pub fn reset_guard(&mut self) {
        if self.guard.is_set() {
            tracing::debug!("Prompt guard reset");
        }
        self.guard.reset();
    }

    /// Check for a mismatch and open a prompt if one is due.
    pub fn begin<I, S>(&mut self, candidates: I, current: Option<&str>) -> PromptStatus
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.is_prompting() {
            tracing::debug!("Prompt already open, request dropped");
            return PromptStatus::Dropped;
        }

        let mut candidates: Vec<String> = candidates.into_iter().map(Into::into).collect();
        candidates.sort();
        candidates.dedup();

        let served = current.is_some_and(|id| candidates.iter().any(|c| c == id));
        if candidates.is_empty() || served {
            return PromptStatus::NoMismatch;
        }
        if self.guard.is_set() {
            return PromptStatus::Suppressed;
        }

        let request = PromptRequest {
            current: current.map(str::to_string),
            candidates,
        };
        self.state = State::Prompting(request.clone());
        PromptStatus::Open(request)
    }

    /// Close the open prompt with the operator's answer.
    ///
    /// A pick outside the offered candidates counts as a cancel.
    pub fn complete<F>(&mut self, outcome: PromptOutcome, apply: F) -> PromptStatus
    where
        F: FnOnce(&str),
    {
        let State::Prompting(request) = std::mem::replace(&mut self.state, State::Idle) else {
            return PromptStatus::Dropped;
        };

        match outcome {
            PromptOutcome::Picked(id) if request.candidates.contains(&id) => {
                apply(&id);
                self.guard.reset();
                PromptStatus::Applied(id)
            }
            PromptOutcome::Picked(id) => {
                tracing::warn!(identifier = %id, "Picked identifier was not offered, ignoring");
                self.guard.set();
                PromptStatus::Cancelled
            }
            PromptOutcome::Cancelled => {
                tracing::info!("Identifier prompt cancelled, not asking again until configs change");
                self.guard.set();
                PromptStatus::Cancelled
            }
        }
    }

    /// Run a whole prompt synchronously.
    ///
    /// A prompter error closes the prompt as if cancelled.
    pub fn maybe_prompt<I, S, F>(
        &mut self,
        candidates: I,
        current: Option<&str>,
        prompter: &mut dyn Prompter,
        apply: F,
    ) -> Result<PromptStatus>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce(&str),
    {
        let request = match self.begin(candidates, current) {
            PromptStatus::Open(request) => request,
            status => return Ok(status),
        };

        match prompter.choose(&request) {
            Ok(outcome) => Ok(self.complete(outcome, apply)),
            Err(e) => {
                self.complete(PromptOutcome::Cancelled, apply);
                Err(e)
            }
        }
    }
}

impl Default for InteractiveDisambiguator {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal selection list.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn choose(&mut self, request: &PromptRequest) -> Result<PromptOutcome> {
        eprintln!();
        eprintln!("{}", "Config mismatch".yellow().bold());

        let picked = Select::new()
            .with_prompt(request.message())
            .items(&request.candidates)
            .default(0)
            .interact_opt()?;

        Ok(picked
            .and_then(|i| request.candidates.get(i).cloned())
            .map_or(PromptOutcome::Cancelled, PromptOutcome::Picked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn served_identifier_is_not_a_mismatch() {
        let mut d = InteractiveDisambiguator::new();
        assert_eq!(d.begin(["com.app.x"], Some("com.app.x")), PromptStatus::NoMismatch);
        assert!(!d.is_prompting());
    }

    #[test]
    fn no_candidates_is_not_a_mismatch() {
        let mut d = InteractiveDisambiguator::new();
        assert_eq!(d.begin(Vec::<String>::new(), Some("com.app.x")), PromptStatus::NoMismatch);
    }

    #[test]
    fn second_request_while_open_is_dropped() {
        let mut d = InteractiveDisambiguator::new();
        assert!(matches!(d.begin(["b", "a"], Some("z")), PromptStatus::Open(_)));
        assert_eq!(d.begin(["b", "a"], Some("z")), PromptStatus::Dropped);
    }

    #[test]
    fn candidates_are_offered_sorted() {
        let mut d = InteractiveDisambiguator::new();
        let PromptStatus::Open(request) = d.begin(["b", "a", "b"], None) else {
            panic!("expected an open prompt");
        };
        assert_eq!(request.candidates, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(request.current, None);
    }

    #[test]
    fn complete_without_open_prompt_is_dropped() {
        let mut d = InteractiveDisambiguator::new();
        let status = d.complete(PromptOutcome::Picked("a".into()), |_| panic!("applied"));
        assert_eq!(status, PromptStatus::Dropped);
    }

    #[test]
    fn pick_outside_candidates_counts_as_cancel() {
        let mut d = InteractiveDisambiguator::new();
        d.begin(["a"], Some("z"));
        let status = d.complete(PromptOutcome::Picked("q".into()), |_| panic!("applied"));
        assert_eq!(status, PromptStatus::Cancelled);
        assert!(d.guard().is_set());
    }
}
