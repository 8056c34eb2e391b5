/// Dispatch tests
///
/// End-to-end behaviour of resolution, binding and outcome classification
/// Run with: cargo test --test dispatch_tests
mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::dispatcher;
use textcommand::{
    CommandError, CommandRegistry, CommandTable, Dispatcher, HandlerSet, Matcher, Outcome,
};

#[derive(Default)]
struct Handlers {
    nothing_calls: AtomicUsize,
}

impl HandlerSet for Handlers {
    fn register(table: &mut CommandTable<Self>) {
        table.command(Matcher::exact(["Nothing"]), |handlers, _| {
            handlers.nothing_calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        });

        table
            .command(Matcher::names(["Echo", "E"]), |_, args| {
                Ok(Some(args.text(0)?.to_string()))
            })
            .optional("content", "fork");

        table
            .command(Matcher::names(["Fork"]), |_, args| {
                Ok(Some(args.big_int(0)?.to_string()))
            })
            .big_int("num");

        table
            .command(Matcher::names(["Fork2"]), |_, args| {
                Ok(Some(args.float(0)?.to_string()))
            })
            .float("num");

        table
            .command(Matcher::names(["Fork3"]), |_, args| {
                Ok(Some(args.int32(0)?.to_string()))
            })
            .int32("num")
            .int64("big");

        table
            .command(Matcher::names(["Combine"]), |_, args| {
                Ok(Some(args.text(0)?.to_string()))
            })
            .combine_params()
            .text("param");

        table.command(Matcher::names(["Exception"]), |_, _| {
            Err(anyhow::anyhow!("exception of type 'Exception' was thrown").into())
        });

        table.command(Matcher::names(["Panic"]), |_, _| panic!("handler exploded"));

        table.command(Matcher::names(["Refuse"]), |_, _| {
            Err(CommandError::user("you are not allowed to do that"))
        });

        table.command(Matcher::names(["Decline"]), |_, _| Err(CommandError::NoMatch));

        table
            .command(Matcher::names(["DefinitionError"]), |_, _| Ok(None))
            .combine_end()
            .optional("a", "");

        table
            .command(Matcher::names(["Money"]), |_, _| Ok(None))
            .declared("amount", "decimal");

        table
            .command(Matcher::names(["Blank"]), |_, _| Ok(Some("   ".to_string())));

        table
            .command(Matcher::names(["Misread"]), |_, args| {
                Ok(Some(args.int32(0)?.to_string()))
            })
            .text("word");
    }
}

async fn run(message: &str) -> (Outcome, Arc<common::RecordingSender>, Arc<Handlers>) {
    let (dispatcher, recorder) = dispatcher();
    let handlers = Arc::new(Handlers::default());
    let outcome = dispatcher.process_input(&handlers, "debug", message).await;
    (outcome, recorder, handlers)
}

#[tokio::test]
async fn test_blank_input_is_unmatched_and_silent() {
    for message in ["", " ", "\t\n", "    "] {
        let (outcome, recorder, _) = run(message).await;
        assert_eq!(outcome.into_parts(), (false, None));
        assert!(recorder.is_silent());
    }
}

#[tokio::test]
async fn test_unknown_command_is_unmatched_and_silent() {
    for message in ["Hello", "hello world", "echo 1", "Echoes", "Nothing 1"] {
        let (outcome, recorder, _) = run(message).await;
        assert_eq!(outcome, Outcome::Unmatched, "input {:?}", message);
        assert!(recorder.is_silent());
    }
}

#[tokio::test]
async fn test_zero_argument_command_runs_side_effect() {
    let (outcome, recorder, handlers) = run("Nothing").await;
    assert_eq!(outcome, Outcome::Success(None));
    assert_eq!(handlers.nothing_calls.load(Ordering::SeqCst), 1);
    assert!(recorder.is_silent());

    let (outcome, _, handlers) = run("Nothing 1").await;
    assert!(!outcome.matched());
    assert_eq!(handlers.nothing_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_echo_default_and_alias() {
    let (outcome, recorder, _) = run("Echo").await;
    assert_eq!(outcome.output(), Some("fork"));
    assert_eq!(recorder.sent(), vec![("debug".to_string(), "fork".to_string())]);

    let (outcome, _, _) = run("Echo 1").await;
    assert_eq!(outcome.output(), Some("1"));

    let (outcome, _, _) = run("  E 1  ").await;
    assert_eq!(outcome.output(), Some("1"));

    let (outcome, recorder, _) = run("Echo 1 2").await;
    assert_eq!(outcome, Outcome::HandledError("Too many arguments".into()));
    assert_eq!(recorder.sent_texts(), vec!["Too many arguments".to_string()]);
    assert!(recorder.errors().is_empty());
}

#[tokio::test]
async fn test_big_integer_argument() {
    let (outcome, _, _) = run("Fork 123").await;
    assert_eq!(outcome.output(), Some("123"));

    let (outcome, _, _) = run("Fork 340282366920938463463374607431768211456").await;
    assert_eq!(outcome.output(), Some("340282366920938463463374607431768211456"));

    let (outcome, recorder, _) = run("Fork").await;
    assert_eq!(outcome, Outcome::HandledError("Too few arguments".into()));
    assert!(recorder.errors().is_empty());
}

#[tokio::test]
async fn test_non_numeric_argument_is_user_error() {
    for message in ["Fork abc", "Fork 人", "Fork 1_000", "Fork2 ...1", "Fork3 x 1"] {
        let (outcome, recorder, _) = run(message).await;
        match &outcome {
            Outcome::HandledError(text) => assert!(text.contains("not a number"), "{}", text),
            other => panic!("unexpected outcome for {:?}: {:?}", message, other),
        }
        assert_eq!(recorder.sent().len(), 1);
        assert!(recorder.errors().is_empty());
    }
}

#[tokio::test]
async fn test_float_and_fixed_width_arguments() {
    let (outcome, _, _) = run("Fork2 2.02").await;
    assert_eq!(outcome.output(), Some("2.02"));

    let (outcome, _, _) = run("Fork3 1 2").await;
    assert_eq!(outcome.output(), Some("1"));

    let (outcome, _, _) = run("Fork3 1").await;
    assert_eq!(outcome, Outcome::HandledError("Too few arguments".into()));
}

#[tokio::test]
async fn test_combine_params_round_trip() {
    let (outcome, _, _) = run("Combine 1 1 1").await;
    assert_eq!(outcome.output(), Some("1 1 1"));

    let (outcome, _, _) = run("Combine").await;
    assert_eq!(outcome, Outcome::HandledError("Too few arguments".into()));
}

#[tokio::test]
async fn test_handler_failure_is_fatal_and_reported() {
    let (outcome, recorder, _) = run("Exception").await;
    let (matched, output) = outcome.clone().into_parts();
    assert!(matched);
    let output = output.unwrap();
    assert!(output.starts_with("Sorry"));
    assert!(output.contains("exception of type 'Exception' was thrown"));
    assert!(outcome.is_fatal());

    assert_eq!(recorder.sent_texts(), vec![output]);
    let errors = recorder.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("[debug]"));
    assert!(errors[0].contains("[Exception]"));
}

#[tokio::test]
async fn test_panicking_handler_is_fatal() {
    let (outcome, recorder, _) = run("Panic").await;
    assert!(outcome.is_fatal());
    assert!(outcome.output().unwrap().contains("handler exploded"));
    assert_eq!(recorder.errors().len(), 1);
}

#[tokio::test]
async fn test_user_error_from_handler() {
    let (outcome, recorder, _) = run("Refuse").await;
    assert_eq!(
        outcome,
        Outcome::HandledError("you are not allowed to do that".into())
    );
    assert!(recorder.errors().is_empty());
}

#[tokio::test]
async fn test_declining_handler_is_silent() {
    let (outcome, recorder, _) = run("Decline").await;
    assert_eq!(outcome, Outcome::Unmatched);
    assert!(recorder.is_silent());
}

#[tokio::test]
async fn test_definition_errors_are_fatal() {
    for message in ["DefinitionError 1", "Money 3", "Misread word"] {
        let (outcome, recorder, _) = run(message).await;
        assert!(outcome.is_fatal(), "input {:?} gave {:?}", message, outcome);
        assert!(outcome.output().unwrap().contains("Definition error"));
        assert_eq!(recorder.errors().len(), 1);
    }
}

#[tokio::test]
async fn test_definition_errors_are_reported_by_validate() {
    let registry = CommandRegistry::new();
    let err = registry.validate::<Handlers>().unwrap_err();
    assert!(err.is_definition_error());
    assert!(err.to_string().contains("DefinitionError"));
}

#[tokio::test]
async fn test_blank_reply_is_not_sent() {
    let (outcome, recorder, _) = run("Blank").await;
    assert!(outcome.matched());
    assert!(recorder.is_silent());
}

#[tokio::test]
async fn test_shared_registry_keeps_one_table() {
    let registry = Arc::new(CommandRegistry::new());
    let recorder = Arc::new(common::RecordingSender::default());
    let first = Dispatcher::with_registry(Arc::clone(&registry), recorder.clone());
    let second = Dispatcher::with_registry(Arc::clone(&registry), recorder.clone());
    let handlers = Arc::new(Handlers::default());

    let a = first.process_input(&handlers, "a", "Echo x").await;
    let b = second.process_input(&handlers, "b", "E y").await;
    assert_eq!(a.output(), Some("x"));
    assert_eq!(b.output(), Some("y"));
    assert_eq!(registry.len().unwrap(), 1);
    assert_eq!(
        recorder.sent(),
        vec![
            ("a".to_string(), "x".to_string()),
            ("b".to_string(), "y".to_string())
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dispatches_are_independent() {
    let (dispatcher, recorder) = dispatcher();
    let dispatcher = Arc::new(dispatcher);
    let handlers = Arc::new(Handlers::default());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            let handlers = Arc::clone(&handlers);
            tokio::spawn(async move {
                dispatcher
                    .process_input(&handlers, format!("user{}", i), &format!("Fork {}", i))
                    .await
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let outcome = task.await.unwrap();
        assert_eq!(outcome.output(), Some(i.to_string().as_str()));
    }
    assert_eq!(recorder.sent().len(), 16);
}

struct Pinger;

impl HandlerSet for Pinger {
    fn register(table: &mut CommandTable<Self>) {
        table.command(Matcher::exact(["ping"]), |_, _| Ok(Some("pong".to_string())));
    }
}

#[tokio::test]
async fn test_global_registry_serves_global_dispatchers() {
    let recorder = Arc::new(common::RecordingSender::default());
    let dispatcher = Dispatcher::global(recorder.clone());
    assert!(Arc::ptr_eq(dispatcher.registry(), CommandRegistry::global()));

    let outcome = dispatcher.process_input(&Arc::new(Pinger), "g", "ping").await;
    assert_eq!(outcome.output(), Some("pong"));
    assert!(CommandRegistry::global().is_initialized::<Pinger>().unwrap());

    let first = CommandRegistry::global().operations::<Pinger>().unwrap();
    let second = Dispatcher::global(recorder.clone())
        .registry()
        .operations::<Pinger>()
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(recorder.sent_texts(), vec!["pong".to_string()]);
}
