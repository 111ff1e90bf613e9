#![allow(dead_code)]

use async_trait::async_trait;
use futures::{stream, StreamExt};
use geniesite::RelayConfig;
use geniesite_model::{ModelError, ModelPart, PartSource, PartStream};
use geniesite_protocol::ProtocolEvent;
use std::sync::Mutex;
use std::time::Duration;

pub const PAGE: &str = "<!DOCTYPE html><html><head><title>Landing</title></head>\
<body><nav><a href=\"#features\">Features</a></nav><section id=\"features\"></section></body></html>";

/// One step of a scripted model run
#[derive(Debug, Clone)]
pub enum Step {
    Part(ModelPart),
    Fail(String),
}

/// Part source that replays a fixed script instead of calling a model
pub struct ScriptedSource {
    steps: Vec<Step>,
    refuse: bool,
    stall: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            refuse: false,
            stall: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails before producing a stream, like a missing API key
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::new(Vec::new())
        }
    }

    /// Replays the script, then never ends
    pub fn stalling(steps: Vec<Step>) -> Self {
        Self {
            stall: true,
            ..Self::new(steps)
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PartSource for ScriptedSource {
    async fn stream_parts(&self, prompt: &str) -> Result<PartStream, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.refuse {
            return Err(ModelError::MissingApiKey);
        }

        let steps = stream::iter(self.steps.clone()).map(|step| match step {
            Step::Part(part) => Ok(part),
            Step::Fail(message) => Err(ModelError::Api(message)),
        });

        if self.stall {
            Ok(Box::new(steps.chain(stream::pending())))
        } else {
            Ok(Box::new(steps))
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// A typical run: two thoughts, then the page in three pieces
pub fn landing_page_script() -> Vec<Step> {
    let (head, rest) = PAGE.split_at(40);
    let (middle, tail) = rest.split_at(40);
    vec![
        Step::Part(ModelPart::thought("The user wants a landing page.")),
        Step::Part(ModelPart::thought("Hero, features,\nfooter.")),
        Step::Part(ModelPart::output(format!("```html\n{}", head))),
        Step::Part(ModelPart::output(middle)),
        Step::Part(ModelPart::output(format!("{}\n```", tail))),
    ]
}

pub fn fast_config() -> RelayConfig {
    RelayConfig {
        thought_delay: Duration::ZERO,
        ..RelayConfig::default()
    }
}

pub fn kinds(events: &[ProtocolEvent]) -> Vec<&'static str> {
    events.iter().map(ProtocolEvent::kind).collect()
}

/// Sequence invariant: at most one of each start event, one terminal event, last
pub fn assert_well_formed(events: &[ProtocolEvent]) {
    let count = |kind: &str| events.iter().filter(|e| e.kind() == kind).count();
    assert!(count("thoughts_start") <= 1, "{:?}", kinds(events));
    assert!(count("answer_start") <= 1, "{:?}", kinds(events));
    assert_eq!(
        events.iter().filter(|e| e.is_terminal()).count(),
        1,
        "{:?}",
        kinds(events)
    );
    assert!(events.last().map(ProtocolEvent::is_terminal).unwrap_or(false));
}
