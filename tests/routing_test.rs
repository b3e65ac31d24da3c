//! Routing integration tests
//! Run with: cargo test --test routing_test

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use multibot::{
    ArgumentCatalog, BotConnection, BotError, BotRegistry, CatalogEntry, CommandRouter, CommandService,
    ConnectionHandle, DispatchError, HandleId, IgnoreReason, Message, RegistrationError, RouteOutcome, TypeTag,
    Value,
};

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

#[derive(Default)]
struct RecordingHandle {
    id: HandleId,
    shutdowns: AtomicUsize,
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl ConnectionHandle for RecordingHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }

    async fn send_message(&self, _chat_id: &str, text: &str) -> Result<(), BotError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

struct Host {
    registry: Arc<BotRegistry>,
    commands: CommandService,
    router: CommandRouter,
}

fn host() -> Host {
    ensure_init();
    let registry = Arc::new(BotRegistry::new());
    let catalog = Arc::new(ArgumentCatalog::with_builtins());
    catalog.insert(CatalogEntry::without_parser("location", TypeTag::Text));
    Host {
        commands: CommandService::new(registry.clone(), catalog),
        router: CommandRouter::new(registry.clone()),
        registry,
    }
}

fn connect(host: &Host, name: &str) -> Arc<RecordingHandle> {
    let handle = Arc::new(RecordingHandle::default());
    host.registry.register(BotConnection::new(name, handle.clone()));
    handle
}

#[tokio::test]
async fn test_ban_routes_to_handler_with_typed_args() {
    let host = host();
    let handle = connect(&host, "mod-bot");
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();

    let ban = host
        .commands
        .define("ban", &["user-id", "duration"])
        .unwrap()
        .with_handler(move |inv| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert_eq!(
                inv.args.as_slice(),
                &[Value::UserId(42), Value::Duration(Duration::from_secs(600))]
            );
            Ok(None)
        });
    host.commands.register("mod-bot", ban).unwrap();

    match host.router.route(Message::new(handle.id, "general", "ban 42 10m")) {
        RouteOutcome::Dispatched(dispatch) => {
            assert_eq!(dispatch.bot(), "mod-bot");
            assert!(dispatch.join().await.unwrap().is_none());
        }
        other => panic!("expected dispatch, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let outcome = host.router.route(Message::new(handle.id, "general", "ban 42"));
    assert!(matches!(
        outcome,
        RouteOutcome::Rejected(DispatchError::ArityMismatch { expected: 2, found: 1, .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_commands_are_scoped_per_bot() {
    let host = host();
    let alpha = connect(&host, "alpha");
    let beta = connect(&host, "beta");

    let ping = host
        .commands
        .define("ping", &[])
        .unwrap()
        .with_handler(|inv| Ok(Some(format!("pong from {}", inv.bot))));
    host.commands.register("alpha", ping).unwrap();

    assert!(host.router.route(Message::new(alpha.id, "c", "ping")).is_dispatched());
    assert!(matches!(
        host.router.route(Message::new(beta.id, "c", "ping")),
        RouteOutcome::Ignored(IgnoreReason::NoMatchingCommand)
    ));
}

#[tokio::test]
async fn test_unsafe_type_rejects_whole_registration() {
    let host = host();
    connect(&host, "alpha");

    let tp = host
        .commands
        .define("tp", &["user-id", "location"])
        .unwrap()
        .with_handler(|_| Ok(None));
    let err = host.commands.register("alpha", tp).unwrap_err();
    assert_eq!(
        err,
        RegistrationError::UnsafeArgumentType {
            command: "tp".to_string(),
            entry: "location".to_string()
        }
    );
    assert!(host.registry.get("alpha").unwrap().commands().is_empty());
}

#[tokio::test]
async fn test_replacing_a_bot_drops_its_commands_and_old_handle() {
    let host = host();
    let old = connect(&host, "alpha");
    let ping = host.commands.define("ping", &[]).unwrap().with_handler(|_| Ok(None));
    host.commands.register("alpha", ping).unwrap();

    let new = connect(&host, "alpha");

    assert_eq!(old.shutdowns.load(Ordering::SeqCst), 1);
    assert_eq!(host.registry.len(), 1);
    assert!(matches!(
        host.router.route(Message::new(old.id, "c", "ping")),
        RouteOutcome::Ignored(IgnoreReason::UnknownConnection)
    ));
    assert!(matches!(
        host.router.route(Message::new(new.id, "c", "ping")),
        RouteOutcome::Ignored(IgnoreReason::NoMatchingCommand)
    ));
}

#[tokio::test]
async fn test_in_flight_handler_survives_disable() {
    let host = host();
    let handle = connect(&host, "alpha");
    let (tx, rx) = std::sync::mpsc::channel::<()>();
    let rx = Mutex::new(rx);
    let slow = host
        .commands
        .define("slow", &[])
        .unwrap()
        .with_handler(move |_| {
            let _ = rx.lock().unwrap().recv_timeout(Duration::from_secs(5));
            Ok(Some("done".to_string()))
        });
    host.commands.register("alpha", slow).unwrap();

    let RouteOutcome::Dispatched(dispatch) = host.router.route(Message::new(handle.id, "c", "slow")) else {
        panic!("expected dispatch");
    };
    host.registry.disable_all();
    tx.send(()).unwrap();

    assert_eq!(dispatch.join().await.unwrap(), Some("done".to_string()));
    // The bot is gone, so the reply is dropped rather than sent through a shut down connection.
    assert!(handle.sent.lock().unwrap().is_empty());
    assert_eq!(handle.shutdowns.load(Ordering::SeqCst), 1);
}
