// dscl-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

use super::command::DsclCommand;
use super::executor::DsclRunner;
use crate::error::{CoreError, CoreResult, ExitError};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// The canned outcome of one expected invocation.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Output(Vec<u8>),
    Exit { status: i32, stderr: Vec<u8> },
}

/// Represents an expected dscl call and its mock result.
#[derive(Debug, Clone)]
pub struct MockDsclExpectation {
    pub verb: String,
    pub path: Option<String>,
    pub outcome: MockOutcome,
}

impl MockDsclExpectation {
    fn matches(&self, cmd: &DsclCommand) -> bool {
        if cmd.verb() != Some(self.verb.as_str()) {
            return false;
        }
        match &self.path {
            Some(path) => cmd.operands().first() == Some(path),
            None => true,
        }
    }
}

/// Mock implementation of DsclRunner supporting multiple expectations.
///
/// Each call consumes the first queued expectation whose verb (and path, if
/// given) matches. Every received argument vector is recorded.
#[derive(Clone, Default)]
pub struct MockDsclRunner {
    expectations: Rc<RefCell<VecDeque<MockDsclExpectation>>>,
    received_calls: Rc<RefCell<Vec<DsclCommand>>>,
}

impl MockDsclRunner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(&self, verb: &str, path: Option<&str>, outcome: MockOutcome) {
        self.expectations.borrow_mut().push_back(MockDsclExpectation {
            verb: verb.to_string(),
            path: path.map(str::to_string),
            outcome,
        });
    }

    pub fn expect_output(&self, verb: &str, path: &str, output: &str) {
        self.add_expectation(verb, Some(path), MockOutcome::Output(output.as_bytes().to_vec()));
    }

    pub fn expect_success(&self, verb: &str, path: &str) {
        self.add_expectation(verb, Some(path), MockOutcome::Output(Vec::new()));
    }

    pub fn expect_exit(&self, verb: &str, path: &str, status: i32, stderr: &str) {
        self.add_expectation(
            verb,
            Some(path),
            MockOutcome::Exit {
                status,
                stderr: stderr.as_bytes().to_vec(),
            },
        );
    }

    pub fn received_calls(&self) -> Vec<DsclCommand> {
        self.received_calls.borrow().clone()
    }

    /// Verbs of every received call, in order.
    pub fn received_verbs(&self) -> Vec<String> {
        self.received_calls
            .borrow()
            .iter()
            .filter_map(|c| c.verb().map(str::to_string))
            .collect()
    }

    /// Operand lists (everything after the verb) of calls with `verb`.
    pub fn operands_for(&self, verb: &str) -> Vec<Vec<String>> {
        self.received_calls
            .borrow()
            .iter()
            .filter(|c| c.verb() == Some(verb))
            .map(|c| c.operands().to_vec())
            .collect()
    }

    pub fn remaining_expectations(&self) -> usize {
        self.expectations.borrow().len()
    }
}

impl DsclRunner for MockDsclRunner {
    fn run(&self, cmd: &DsclCommand) -> CoreResult<Vec<u8>> {
        self.received_calls.borrow_mut().push(cmd.clone());

        let mut expectations = self.expectations.borrow_mut();
        let Some(index) = expectations.iter().position(|exp| exp.matches(cmd)) else {
            log::error!("MockDsclRunner: No expectation found for command: {cmd}");
            panic!("MockDsclRunner: No expectation found for command: {cmd}");
        };
        let expectation = expectations
            .remove(index)
            .expect("index returned by position is in bounds");
        log::info!("MockDsclRunner: Matched expectation for {}", expectation.verb);

        match expectation.outcome {
            MockOutcome::Output(bytes) => Ok(bytes),
            MockOutcome::Exit { status, stderr } => Err(CoreError::Exit(ExitError::new(status, stderr))),
        }
    }
}
