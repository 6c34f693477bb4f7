//! Scripted gateway used by the use case tests.

use crate::ports::model_gateway::{Completion, GatewayError, ModelGateway};
use async_trait::async_trait;
use council_domain::{GenerationOptions, TokenUsage};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

enum Script {
    /// Reply `"{name}-reply-{n}"` on the n-th call
    Answer(String),
    Fail(GatewayError),
    /// Fail the first `failures` calls, then answer
    FailThenAnswer {
        failures: usize,
        error: GatewayError,
        name: String,
    },
}

pub(crate) struct FakeGateway {
    script: Script,
    delay: Duration,
    available: bool,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    options: Mutex<Vec<GenerationOptions>>,
}

impl FakeGateway {
    fn scripted(script: Script) -> Self {
        Self {
            script,
            delay: Duration::ZERO,
            available: true,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            options: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn answering(name: &str) -> Self {
        Self::scripted(Script::Answer(name.to_string()))
    }

    pub(crate) fn failing(error: GatewayError) -> Self {
        Self::scripted(Script::Fail(error))
    }

    pub(crate) fn flaky(name: &str, failures: usize, error: GatewayError) -> Self {
        Self::scripted(Script::FailThenAnswer {
            failures,
            error,
            name: name.to_string(),
        })
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn last_options(&self) -> Option<GenerationOptions> {
        self.options.lock().unwrap().last().cloned()
    }
}

fn reply(name: &str, n: usize) -> Completion {
    Completion::new(format!("fake-{}", name), format!("{}-reply-{}", name, n))
        .with_usage(TokenUsage::new(10, 5))
}

#[async_trait]
impl ModelGateway for FakeGateway {
    async fn invoke(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Completion, GatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.options.lock().unwrap().push(options.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.script {
            Script::Answer(name) => Ok(reply(name, n)),
            Script::Fail(error) => Err(error.clone()),
            Script::FailThenAnswer {
                failures,
                error,
                name,
            } => {
                if n <= *failures {
                    Err(error.clone())
                } else {
                    Ok(reply(name, n))
                }
            }
        }
    }

    fn is_available(&self) -> bool {
        self.available
    }
}
