//! Bot registry - the live bot connections of the process, keyed by name
//!
//! Created empty by the host at startup and torn down with [`BotRegistry::disable_all`] at shutdown.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::entities::BotConnection;
use crate::domain::traits::HandleId;

/// Registry of live bot connections
///
/// Connections are shut down while the write lock is held, so a
/// [`ConnectionHandle::shutdown`](crate::domain::traits::ConnectionHandle::shutdown) that calls
/// back into the registry deadlocks.
pub struct BotRegistry {
    bots: RwLock<HashMap<String, Arc<BotConnection>>>,
}

impl BotRegistry {
    pub fn new() -> Self {
        Self {
            bots: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<BotConnection>>> {
        self.bots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<BotConnection>>> {
        self.bots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a connection under its name.
    ///
    /// A connection already registered under that name is shut down and replaced; its
    /// name is returned so the caller can warn about it.
    pub fn register(&self, bot: BotConnection) -> Option<String> {
        let name = bot.name().to_string();
        let mut bots = self.write();
        let replaced = bots.remove(&name).map(|old| {
            old.handle().shutdown();
            tracing::warn!("A bot with this name ({}) already exists! It was replaced", name);
            old.name().to_string()
        });
        bots.insert(name.clone(), Arc::new(bot));
        tracing::info!("Registered bot: {}", name);
        replaced
    }

    /// Get a bot by its exact name
    pub fn get(&self, name: &str) -> Option<Arc<BotConnection>> {
        self.read().get(name).cloned()
    }

    /// Get the bot owning the given connection handle
    pub fn get_by_handle(&self, handle: HandleId) -> Option<Arc<BotConnection>> {
        self.read()
            .values()
            .find(|bot| bot.handle_id() == handle)
            .cloned()
    }

    /// Any registered bot, for when the host needs one and none was named
    pub fn first(&self) -> Option<Arc<BotConnection>> {
        let bot = self.read().values().next().cloned();
        if bot.is_none() {
            tracing::debug!("There was no bot to perform this action. Please register a bot!");
        }
        bot
    }

    /// Shut down and remove a bot by name. Unknown names are ignored.
    pub fn disable(&self, name: &str) {
        let mut bots = self.write();
        if let Some(bot) = bots.remove(name) {
            bot.handle().shutdown();
            tracing::info!("The bot {} just got shutdown.", name);
        }
    }

    /// Shut down and remove a bot, if this exact connection is still the registered one.
    pub fn disable_connection(&self, bot: &BotConnection) {
        let mut bots = self.write();
        let is_current = bots
            .get(bot.name())
            .is_some_and(|current| current.handle_id() == bot.handle_id());
        if is_current {
            if let Some(removed) = bots.remove(bot.name()) {
                removed.handle().shutdown();
                tracing::info!("The bot {} just got shutdown.", removed.name());
            }
        }
    }

    /// Shut down and remove every registered bot
    pub fn disable_all(&self) {
        let mut bots = self.write();
        for (name, bot) in bots.drain() {
            bot.handle().shutdown();
            tracing::info!("The bot {} just got shutdown.", name);
        }
    }

    /// Check if a bot with the given name is registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BotRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::errors::BotError;
    use crate::domain::traits::ConnectionHandle;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records shutdowns and sent messages
    #[derive(Default)]
    pub(crate) struct FakeHandle {
        pub id: HandleId,
        pub shutdowns: AtomicUsize,
        pub sent: Mutex<Vec<(String, String)>>,
    }

    impl FakeHandle {
        pub fn shutdown_count(&self) -> usize {
            self.shutdowns.load(Ordering::SeqCst)
        }

        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ConnectionHandle for FakeHandle {
        fn id(&self) -> HandleId {
            self.id
        }

        fn shutdown(&self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }

        async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), BotError> {
            self.sent.lock().unwrap().push((chat_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    pub(crate) fn bot(name: &str) -> (BotConnection, Arc<FakeHandle>) {
        let handle = Arc::new(FakeHandle::default());
        (BotConnection::new(name, handle.clone()), handle)
    }

    #[test]
    fn test_register_and_get() {
        let registry = BotRegistry::new();
        let (alpha, alpha_handle) = bot("alpha");
        let (beta, _) = bot("beta");
        registry.register(alpha);
        registry.register(beta);

        assert!(registry.is_registered("alpha"));
        assert!(registry.is_registered("beta"));
        assert!(!registry.is_registered("Alpha"));
        assert_eq!(registry.get("alpha").unwrap().handle_id(), alpha_handle.id);
        assert_eq!(registry.names(), vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn test_replacement_shuts_down_previous_once() {
        let registry = BotRegistry::new();
        let (first, first_handle) = bot("alpha");
        let (second, second_handle) = bot("alpha");

        assert_eq!(registry.register(first), None);
        assert_eq!(registry.register(second), Some("alpha".to_string()));

        assert_eq!(registry.len(), 1);
        assert_eq!(first_handle.shutdown_count(), 1);
        assert_eq!(second_handle.shutdown_count(), 0);
        assert_eq!(registry.get("alpha").unwrap().handle_id(), second_handle.id);
        assert!(registry.get_by_handle(first_handle.id).is_none());
    }

    #[test]
    fn test_disable_is_idempotent() {
        let registry = BotRegistry::new();
        let (alpha, handle) = bot("alpha");
        registry.register(alpha);

        registry.disable("alpha");
        registry.disable("alpha");
        registry.disable("unknown");

        assert!(!registry.is_registered("alpha"));
        assert_eq!(handle.shutdown_count(), 1);
    }

    #[test]
    fn test_disable_connection_ignores_stale_instance() {
        let registry = BotRegistry::new();
        let (old, old_handle) = bot("alpha");
        let stale = BotConnection::new("alpha", old_handle.clone());
        registry.register(old);
        let (new, new_handle) = bot("alpha");
        registry.register(new);

        registry.disable_connection(&stale);
        assert!(registry.is_registered("alpha"));
        assert_eq!(new_handle.shutdown_count(), 0);

        let current = registry.get("alpha").unwrap();
        registry.disable_connection(&current);
        assert!(!registry.is_registered("alpha"));
        assert_eq!(new_handle.shutdown_count(), 1);
        assert_eq!(old_handle.shutdown_count(), 1);
    }

    #[test]
    fn test_first() {
        let registry = BotRegistry::new();
        assert!(registry.first().is_none());

        let (alpha, handle) = bot("alpha");
        registry.register(alpha);
        assert_eq!(registry.first().unwrap().handle_id(), handle.id);

        registry.disable("alpha");
        assert!(registry.first().is_none());
    }

    #[test]
    fn test_get_by_handle() {
        let registry = BotRegistry::new();
        let (alpha, alpha_handle) = bot("alpha");
        let (beta, beta_handle) = bot("beta");
        registry.register(alpha);
        registry.register(beta);

        assert_eq!(registry.get_by_handle(beta_handle.id).unwrap().name(), "beta");
        assert_eq!(registry.get_by_handle(alpha_handle.id).unwrap().name(), "alpha");
        assert!(registry.get_by_handle(HandleId::new()).is_none());
    }

    #[test]
    fn test_disable_all() {
        let registry = BotRegistry::new();
        let handles: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|name| {
                let (bot, handle) = bot(name);
                registry.register(bot);
                handle
            })
            .collect();

        registry.disable_all();

        assert!(registry.is_empty());
        assert!(handles.iter().all(|h| h.shutdown_count() == 1));
    }

    #[test]
    fn test_concurrent_register_and_lookup() {
        let registry = Arc::new(BotRegistry::new());
        let workers: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let name = format!("bot-{}", i % 4);
                    for _ in 0..50 {
                        let (bot, _) = bot(&name);
                        registry.register(bot);
                        if let Some(found) = registry.get(&name) {
                            assert_eq!(found.name(), name);
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(registry.len(), 4);
    }
}
