use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use assetflow::errors::Result;
use assetflow::exec::{Invocation, ToolBackend, ToolOutcome};

/// A fake tool backend that:
/// - records every invocation instead of spawning a process
/// - succeeds, unless a failure was scripted for the invocation's task.
///
/// Clones share their state, so a test can keep one handle while the runner
/// owns another.
#[derive(Clone, Default)]
pub struct FakeBackend {
    invocations: Arc<Mutex<Vec<Invocation>>>,
    failures: Arc<Mutex<HashMap<String, i32>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation of `task` exit with `code`.
    pub fn fail_task(&self, task: &str, code: i32) {
        self.failures.lock().unwrap().insert(task.to_string(), code);
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Commands run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.invocations().into_iter().map(|i| i.command).collect()
    }

    /// Task names of the invocations so far, in order.
    pub fn tasks(&self) -> Vec<String> {
        self.invocations().into_iter().map(|i| i.task).collect()
    }

    pub fn clear(&self) {
        self.invocations.lock().unwrap().clear();
    }
}

impl ToolBackend for FakeBackend {
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<ToolOutcome>> + Send + 'a>> {
        Box::pin(async move {
            self.invocations.lock().unwrap().push(invocation.clone());
            let outcome = match self.failures.lock().unwrap().get(&invocation.task) {
                Some(&code) => ToolOutcome::failed(code),
                None => ToolOutcome::success(),
            };
            Ok(outcome)
        })
    }
}
