use std::sync::Arc;

use crate::core::{Message, TargetId};

/// Outbound side of the embedding transport.
pub trait MessageSender: Send + Sync {
    fn send(&self, target: &TargetId, message: &Message);

    /// Operator-facing channel, used only for fatal failures.
    fn send_error(&self, message: &Message);
}

type SendFn = Arc<dyn Fn(&TargetId, &Message) + Send + Sync>;
type SendErrorFn = Arc<dyn Fn(&Message) + Send + Sync>;

/// [`MessageSender`] built from two closures.
#[derive(Clone)]
pub struct CallbackSender {
    send: SendFn,
    send_error: SendErrorFn,
}

impl CallbackSender {
    pub fn new<S, E>(send: S, send_error: E) -> Self
    where
        S: Fn(&TargetId, &Message) + Send + Sync + 'static,
        E: Fn(&Message) + Send + Sync + 'static,
    {
        Self {
            send: Arc::new(send),
            send_error: Arc::new(send_error),
        }
    }
}

impl MessageSender for CallbackSender {
    fn send(&self, target: &TargetId, message: &Message) {
        (self.send)(target, message)
    }

    fn send_error(&self, message: &Message) {
        (self.send_error)(message)
    }
}
