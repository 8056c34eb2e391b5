use std::sync::{Arc, Mutex};

use textcommand::{Dispatcher, DispatchConfig, Message, MessageSender, TargetId};

/// Sender double that records everything the dispatcher emits.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
    errors: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingSender {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn is_silent(&self) -> bool {
        self.sent().is_empty() && self.errors().is_empty()
    }
}

impl MessageSender for RecordingSender {
    fn send(&self, target: &TargetId, message: &Message) {
        self.sent
            .lock()
            .unwrap()
            .push((target.to_string(), message.to_string()));
    }

    fn send_error(&self, message: &Message) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

#[allow(dead_code)]
pub fn dispatcher() -> (Dispatcher, Arc<RecordingSender>) {
    dispatcher_with(DispatchConfig::default())
}

pub fn dispatcher_with(config: DispatchConfig) -> (Dispatcher, Arc<RecordingSender>) {
    let recorder = Arc::new(RecordingSender::default());
    let dispatcher = Dispatcher::new(recorder.clone()).with_config(config);
    (dispatcher, recorder)
}
