//! Provider manager: one active provider with a permanent local fallback.
//!
//! Every public operation tries the current provider and, when it is
//! unavailable or fails, demotes `current` to the rule-based fallback and
//! answers from there. Demotion is sticky until [`ProviderManager::switch_provider`]
//! or [`ProviderManager::switch_to`] installs a new primary. Callers always
//! get a well-formed value back; errors only surface in logs and in the
//! [`RequestLogEntry`] handed to the log callback.
//!
//! # Example
//!
//! ```rust,ignore
//! use housemind::providers::{ProviderFactory, ProviderManager};
//!
//! async fn example() {
//!     let manager = ProviderManager::new(ProviderFactory::from_env());
//!     manager.set_log_callback(|entry| println!("{} ok={}", entry.operation, entry.success));
//!     println!("{}", manager.generate_welcome_message().await);
//! }
//! ```

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::factory::ProviderFactory;
use super::request_log::{LogCallback, RequestLogEntry};
use super::rule_based::RuleBasedProvider;
use super::types::{GenerationRequest, HouseProvider, ProviderInfo, ProviderKind};
use crate::config::Config;
use crate::error::{ProviderError, Result};
use crate::house::{BehaviorResponse, BehaviorRequest, RefreshMessage, Room, RoomSchema, StreamMessage};

/// Text a log entry previews for each result type.
trait ResponsePreview {
    fn preview_text(&self) -> String;
}

impl ResponsePreview for BehaviorResponse {
    fn preview_text(&self) -> String {
        self.message.clone()
    }
}

impl ResponsePreview for String {
    fn preview_text(&self) -> String {
        self.clone()
    }
}

impl ResponsePreview for StreamMessage {
    fn preview_text(&self) -> String {
        self.message.clone()
    }
}

impl ResponsePreview for RefreshMessage {
    fn preview_text(&self) -> String {
        self.message.clone()
    }
}

impl ResponsePreview for Room {
    fn preview_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.id.clone())
    }
}

/// The primary (as installed) and the provider currently answering.
struct ActiveProviders {
    primary: Arc<dyn HouseProvider>,
    current: Arc<dyn HouseProvider>,
}

pub struct ProviderManager {
    factory: ProviderFactory,
    active: RwLock<ActiveProviders>,
    fallback: Arc<RuleBasedProvider>,
    callback: RwLock<Option<LogCallback>>,
}

impl ProviderManager {
    /// Manager over the factory's auto-selected provider.
    pub fn new(factory: ProviderFactory) -> Self {
        let provider: Arc<dyn HouseProvider> = Arc::from(factory.auto_select());
        Self::from_parts(factory, provider)
    }

    /// Manager over an explicit provider. `switch_provider` uses a default
    /// (credential-less) factory.
    pub fn with_provider(provider: Arc<dyn HouseProvider>) -> Self {
        Self::from_parts(ProviderFactory::new(Config::default()), provider)
    }

    pub fn from_parts(factory: ProviderFactory, provider: Arc<dyn HouseProvider>) -> Self {
        info!(
            provider = %provider.kind(),
            model = %provider.model(),
            available = provider.check_availability(),
            "Provider manager ready"
        );
        Self {
            factory,
            active: RwLock::new(ActiveProviders {
                primary: Arc::clone(&provider),
                current: provider,
            }),
            fallback: Arc::new(RuleBasedProvider::new()),
            callback: RwLock::new(None),
        }
    }

    /// Replace the fallback (seeded providers make demotions reproducible).
    pub fn with_fallback(mut self, fallback: RuleBasedProvider) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    // ------------------------------------------------------------------------
    // Provider control
    // ------------------------------------------------------------------------

    /// Build a provider of `kind` and install it as primary and current.
    ///
    /// The configured model is replaced by `model` when given. State is left
    /// untouched when the new provider is unavailable.
    pub fn switch_provider(&self, kind: ProviderKind, model: Option<&str>) -> Result<()> {
        let mut provider_config = self
            .factory
            .config()
            .provider_config(kind)
            .unwrap_or_default();
        if let Some(model) = model {
            provider_config.model = Some(model.to_string());
        }

        let provider = self.factory.create(kind, &provider_config)?;
        if !provider.check_availability() {
            warn!(provider = %kind, "Refusing to switch to unavailable provider");
            return Err(ProviderError::Unavailable(kind));
        }
        self.switch_to(Arc::from(provider));
        Ok(())
    }

    /// Install `provider` as primary and current in one step.
    pub fn switch_to(&self, provider: Arc<dyn HouseProvider>) {
        info!(provider = %provider.kind(), model = %provider.model(), "Switching provider");
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        active.primary = Arc::clone(&provider);
        active.current = provider;
    }

    /// Register the observer that receives one entry per call.
    pub fn set_log_callback<F>(&self, callback: F)
    where
        F: Fn(&RequestLogEntry) + Send + Sync + 'static,
    {
        let callback: LogCallback = Arc::new(callback);
        *self.callback.write().unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    pub fn clear_log_callback(&self) {
        *self.callback.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn current_provider(&self) -> Arc<dyn HouseProvider> {
        Arc::clone(&self.active.read().unwrap_or_else(PoisonError::into_inner).current)
    }

    pub fn primary_provider(&self) -> Arc<dyn HouseProvider> {
        Arc::clone(&self.active.read().unwrap_or_else(PoisonError::into_inner).primary)
    }

    pub fn current_provider_kind(&self) -> ProviderKind {
        self.current_provider().kind()
    }

    pub fn current_provider_info(&self) -> ProviderInfo {
        self.current_provider().info()
    }

    /// Whether calls are currently served by the fallback after a demotion.
    pub fn is_degraded(&self) -> bool {
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
        !same_provider(&active.primary, &active.current)
    }

    pub fn fallback(&self) -> &RuleBasedProvider {
        &self.fallback
    }

    /// Kinds that would be available if switched to, in priority order.
    pub fn available_providers(&self) -> Vec<ProviderKind> {
        self.factory
            .enumerate_all()
            .into_iter()
            .filter(|info| info.available)
            .map(|info| info.kind)
            .collect()
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    pub async fn generate_behavior_response(&self, request: &BehaviorRequest) -> BehaviorResponse {
        self.dispatch(
            GenerationRequest::Behavior(request),
            |provider| async move { provider.generate_behavior_response(request).await },
            |fallback| fallback.respond(request),
        )
        .await
    }

    pub async fn generate_welcome_message(&self) -> String {
        self.dispatch(
            GenerationRequest::Welcome,
            |provider| async move { provider.generate_welcome_message().await },
            RuleBasedProvider::welcome,
        )
        .await
    }

    pub async fn generate_consciousness_stream(
        &self,
        context: &str,
        room_data: &Value,
    ) -> StreamMessage {
        self.dispatch(
            GenerationRequest::ConsciousnessStream { context, room_data },
            |provider| async move {
                Ok(provider
                    .generate_consciousness_stream(context, room_data)
                    .await)
            },
            |fallback| fallback.stream(context, room_data),
        )
        .await
    }

    pub async fn generate_room(&self, index: u32, schema: Option<&RoomSchema>) -> Room {
        self.dispatch(
            GenerationRequest::Room { index, schema },
            |provider| async move { provider.generate_room(index, schema).await },
            |fallback| fallback.room(index, schema),
        )
        .await
    }

    pub async fn generate_refresh_message(&self) -> RefreshMessage {
        self.dispatch(
            GenerationRequest::Refresh,
            |provider| async move { Ok(provider.generate_refresh_message().await) },
            RuleBasedProvider::refresh,
        )
        .await
    }

    /// Try the current provider, else demote and serve from the fallback.
    /// Emits exactly one log entry.
    async fn dispatch<T, Call, Fut, Local>(
        &self,
        request: GenerationRequest<'_>,
        call: Call,
        local: Local,
    ) -> T
    where
        T: ResponsePreview,
        Call: FnOnce(Arc<dyn HouseProvider>) -> Fut,
        Fut: Future<Output = Result<T>>,
        Local: FnOnce(&RuleBasedProvider) -> T,
    {
        let provider = self.current_provider();
        let kind = provider.kind();
        let model = provider.model().to_string();

        let error = if provider.check_availability() {
            match call(Arc::clone(&provider)).await {
                Ok(result) => {
                    debug!(provider = %kind, operation = request.operation(), "Call succeeded");
                    self.emit(RequestLogEntry::success(
                        &request,
                        kind,
                        &model,
                        &result.preview_text(),
                    ));
                    return result;
                }
                Err(e) => e,
            }
        } else {
            ProviderError::Unavailable(kind)
        };

        warn!(
            provider = %kind,
            operation = request.operation(),
            error = %error,
            "Provider failed, serving rule-based fallback"
        );
        self.demote(&provider);

        let result = local(&self.fallback);
        self.emit(RequestLogEntry::failure(
            &request,
            kind,
            &model,
            &error.to_string(),
            &result.preview_text(),
            ProviderKind::RuleBased,
        ));
        result
    }

    /// Point `current` at the fallback if it still points at `failed`.
    fn demote(&self, failed: &Arc<dyn HouseProvider>) {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        if same_provider(&active.current, failed) {
            let fallback: Arc<dyn HouseProvider> = self.fallback.clone();
            if !same_provider(&active.current, &fallback) {
                info!(from = %failed.kind(), "Demoting to rule-based provider");
            }
            active.current = fallback;
        }
    }

    fn emit(&self, entry: RequestLogEntry) {
        let callback = self
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(callback) = callback {
            callback(&entry);
        }
    }
}

fn same_provider(a: &Arc<dyn HouseProvider>, b: &Arc<dyn HouseProvider>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::house::BehaviorRequest;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Network-like provider that fails every fallible call.
    struct BrokenProvider {
        kind: ProviderKind,
        available: bool,
        calls: AtomicUsize,
    }

    impl BrokenProvider {
        fn new(kind: ProviderKind, available: bool) -> Self {
            Self {
                kind,
                available,
                calls: AtomicUsize::new(0),
            }
        }

        fn fail(&self) -> ProviderError {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ProviderError::Transport(TransportError::Timeout("30s".to_string()))
        }
    }

    #[async_trait]
    impl HouseProvider for BrokenProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }
        fn model(&self) -> &str {
            "broken-1"
        }
        fn initialize(&mut self) -> bool {
            self.available
        }
        fn check_availability(&self) -> bool {
            self.available
        }
        async fn generate_behavior_response(
            &self,
            _request: &BehaviorRequest,
        ) -> Result<BehaviorResponse> {
            Err(self.fail())
        }
        async fn generate_welcome_message(&self) -> Result<String> {
            Err(self.fail())
        }
        async fn generate_consciousness_stream(&self, _c: &str, _r: &Value) -> StreamMessage {
            self.calls.fetch_add(1, Ordering::SeqCst);
            StreamMessage::degraded("static")
        }
        async fn generate_room(&self, _i: u32, _s: Option<&RoomSchema>) -> Result<Room> {
            Err(self.fail())
        }
        async fn generate_refresh_message(&self) -> RefreshMessage {
            self.calls.fetch_add(1, Ordering::SeqCst);
            RefreshMessage::degraded("static")
        }
    }

    fn collecting(manager: &ProviderManager) -> Arc<Mutex<Vec<RequestLogEntry>>> {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&entries);
        manager.set_log_callback(move |entry| sink.lock().unwrap().push(entry.clone()));
        entries
    }

    #[tokio::test]
    async fn test_success_logs_once() {
        let manager = ProviderManager::with_provider(Arc::new(RuleBasedProvider::with_seed(1)));
        let entries = collecting(&manager);

        let welcome = manager.generate_welcome_message().await;
        assert!(!welcome.is_empty());

        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].success);
        assert_eq!(entries[0].provider, ProviderKind::RuleBased);
        assert_eq!(entries[0].served_by, ProviderKind::RuleBased);
        assert_eq!(entries[0].response_preview, welcome);
    }

    #[tokio::test]
    async fn test_failure_falls_back_and_demotes() {
        let broken = Arc::new(BrokenProvider::new(ProviderKind::OpenAI, true));
        let manager = ProviderManager::with_provider(broken.clone());
        let entries = collecting(&manager);

        let response = manager
            .generate_behavior_response(&BehaviorRequest::new("meditate"))
            .await;
        assert!(!response.message.is_empty());
        assert_eq!(broken.calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.current_provider_kind(), ProviderKind::RuleBased);
        assert_eq!(manager.primary_provider().kind(), ProviderKind::OpenAI);
        assert!(manager.is_degraded());

        {
            let entries = entries.lock().unwrap();
            assert_eq!(entries.len(), 1);
            let entry = &entries[0];
            assert!(!entry.success);
            assert_eq!(entry.provider, ProviderKind::OpenAI);
            assert_eq!(entry.model, "broken-1");
            assert_eq!(entry.served_by, ProviderKind::RuleBased);
            assert!(entry.error.as_deref().unwrap().contains("Timeout"));
            assert_eq!(entry.response_preview, response.message);
        }

        // Sticky: the broken provider is not consulted again.
        manager.generate_room(0, None).await;
        manager.generate_welcome_message().await;
        assert_eq!(broken.calls.load(Ordering::SeqCst), 1);

        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[1..].iter().all(|e| e.success && e.provider == ProviderKind::RuleBased));
    }

    #[tokio::test]
    async fn test_unavailable_provider_is_never_called() {
        let broken = Arc::new(BrokenProvider::new(ProviderKind::Groq, false));
        let manager = ProviderManager::with_provider(broken.clone());
        let entries = collecting(&manager);

        let stream = manager
            .generate_consciousness_stream("ctx", &json!({"id": "ROOM_001"}))
            .await;
        assert!(stream.consciousness_update);
        assert_eq!(broken.calls.load(Ordering::SeqCst), 0);

        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].success);
        assert_eq!(entries[0].operation, "generate_consciousness_stream");
        assert_eq!(
            entries[0].args.as_deref(),
            Some(r#"context=ctx room_data={"id":"ROOM_001"}"#)
        );
    }

    #[tokio::test]
    async fn test_degraded_stream_is_not_a_failure() {
        let broken = Arc::new(BrokenProvider::new(ProviderKind::Anthropic, true));
        let manager = ProviderManager::with_provider(broken.clone());

        let refresh = manager.generate_refresh_message().await;
        assert_eq!(refresh.message, "static");
        assert!(!manager.is_degraded());
    }

    #[tokio::test]
    async fn test_switch_to_restores_primary() {
        let broken = Arc::new(BrokenProvider::new(ProviderKind::OpenAI, true));
        let manager = ProviderManager::with_provider(broken);
        manager.generate_welcome_message().await;
        assert!(manager.is_degraded());

        manager.switch_to(Arc::new(RuleBasedProvider::with_seed(3)));
        assert!(!manager.is_degraded());
        assert_eq!(manager.current_provider_kind(), ProviderKind::RuleBased);
    }

    #[test]
    fn test_switch_provider_without_credentials_is_refused() {
        let manager = ProviderManager::with_provider(Arc::new(RuleBasedProvider::new()));
        let err = manager
            .switch_provider(ProviderKind::OpenAI, Some("gpt-4o"))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(ProviderKind::OpenAI)));
        assert_eq!(manager.current_provider_kind(), ProviderKind::RuleBased);
    }

    #[test]
    fn test_switch_provider_with_model_override() {
        let mut config = Config::default();
        config.providers.groq = Some(crate::config::ProviderConfig::with_api_key("gsk-test"));
        let manager = ProviderManager::from_parts(
            ProviderFactory::new(config),
            Arc::new(RuleBasedProvider::new()),
        );

        manager
            .switch_provider(ProviderKind::Groq, Some("llama-3.3-70b-versatile"))
            .unwrap();
        let info = manager.current_provider_info();
        assert_eq!(info.kind, ProviderKind::Groq);
        assert_eq!(info.model, "llama-3.3-70b-versatile");
        assert_eq!(
            manager.available_providers(),
            vec![ProviderKind::Groq, ProviderKind::RuleBased]
        );
    }
}
