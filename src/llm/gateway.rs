// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Resilient generation gateway
//!
//! Wraps an [`LlmProvider`] with bounded retries, exponential backoff and a
//! fixed set of user-facing fallback messages. Callers always get text back:
//! provider failures are never propagated as errors.
//!
//! Each gateway owns its metrics. Sharing one gateway behind an `Arc` across
//! sessions is fine; updates go through a mutex.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::config::settings::{GenerationConfig, Settings};
use crate::error::{ApiError, CopilotError, Result};
use crate::llm::factory::ProviderFactory;
use crate::llm::message::Message;
use crate::llm::metrics::{GatewayMetrics, MetricsSummary};
use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider};
use crate::llm::retry::{with_retry, RetryConfig};

/// Terminal failure categories, each with a fixed non-technical message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// HTTP 400
    InvalidRequest,
    /// HTTP 401/403
    InvalidCredentials,
    /// 5xx after retries were exhausted
    ServiceUnavailable,
    /// Timeout after retries were exhausted
    TimedOut,
    /// Anything else
    Connectivity,
}

impl Fallback {
    /// Classify a final provider error
    pub fn from_error(error: &CopilotError) -> Self {
        match error {
            CopilotError::Api(ApiError::InvalidRequest(_)) => Fallback::InvalidRequest,
            CopilotError::Api(ApiError::AuthenticationFailed) => Fallback::InvalidCredentials,
            CopilotError::Api(ApiError::ServerError { status, .. })
                if (500..600).contains(status) =>
            {
                Fallback::ServiceUnavailable
            }
            CopilotError::Api(ApiError::Timeout) => Fallback::TimedOut,
            _ => Fallback::Connectivity,
        }
    }

    /// User-facing text for this fallback
    pub fn message(&self) -> &'static str {
        match self {
            Fallback::InvalidRequest => {
                "La solicitud no es válida. Revisa tu mensaje e inténtalo de nuevo."
            }
            Fallback::InvalidCredentials => {
                "Las credenciales del servicio de IA son inválidas. Contacta al administrador."
            }
            Fallback::ServiceUnavailable => {
                "El servicio de IA está experimentando problemas en este momento. \
                 Por favor, intenta más tarde."
            }
            Fallback::TimedOut => {
                "El modelo tardó demasiado en responder. Por favor, intenta nuevamente."
            }
            Fallback::Connectivity => {
                "Hubo un problema al conectarme con el modelo. \
                 Por favor, intenta nuevamente en unos momentos."
            }
        }
    }
}

/// Text produced by one `generate` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Provider content, or the fallback message
    pub text: String,
    /// Set when `text` is a fallback message
    pub fallback: Option<Fallback>,
}

impl Generation {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Provider wrapper with retries, fallbacks and metrics
pub struct GenerationGateway {
    provider: Arc<dyn LlmProvider>,
    model: String,
    generation: GenerationConfig,
    retry: RetryConfig,
    timeout: Duration,
    metrics: Mutex<GatewayMetrics>,
}

impl GenerationGateway {
    /// Create a gateway with default sampling, retry and timeout settings
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        let settings = Settings::default();
        Self {
            provider,
            model: model.into(),
            generation: settings.generation,
            retry: RetryConfig::from(&settings.resilience),
            timeout: Duration::from_secs(settings.provider.timeout_secs),
            metrics: Mutex::new(GatewayMetrics::default()),
        }
    }

    /// Build the Groq-backed gateway described by `settings`.
    ///
    /// Fails when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let provider = ProviderFactory::create_groq(settings)?;
        Ok(Self::new(provider, settings.get_model())
            .with_generation_config(settings.generation.clone())
            .with_retry_config(RetryConfig::from(&settings.resilience))
            .with_timeout(Duration::from_secs(settings.provider.timeout_secs)))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// Send `messages` to the provider and return the reply or a fallback text
    pub async fn generate(&self, messages: Vec<Message>) -> String {
        self.generate_detailed(messages).await.text
    }

    /// Like [`generate`](Self::generate), but reports which fallback fired
    pub async fn generate_detailed(&self, messages: Vec<Message>) -> Generation {
        self.lock_metrics().record_call();

        let request = CompletionRequest::new(self.model.clone(), messages)
            .with_max_tokens(self.generation.max_tokens)
            .with_temperature(self.generation.temperature)
            .with_top_p(self.generation.top_p)
            .with_seed(self.generation.seed);

        let outcome = with_retry(
            || self.attempt(request.clone()),
            &self.retry,
            "generate",
        )
        .await;

        let mut metrics = self.lock_metrics();
        metrics.record_retries(outcome.retries);

        match outcome.result {
            Ok((response, latency)) => {
                let tokens = response.usage.as_ref().map(|u| u.total_tokens());
                metrics.record_success(latency, tokens);
                tracing::info!(
                    model = %response.model,
                    latency_ms = latency.as_millis() as u64,
                    tokens = tokens.unwrap_or(0),
                    "generation succeeded"
                );
                Generation {
                    text: response.content,
                    fallback: None,
                }
            }
            Err(error) => {
                let fallback = Fallback::from_error(&error);
                metrics.record_fallback();
                tracing::warn!(?fallback, "generation fell back: {}", error);
                Generation {
                    text: fallback.message().to_string(),
                    fallback: Some(fallback),
                }
            }
        }
    }

    /// One provider call bounded by the configured timeout
    async fn attempt(&self, request: CompletionRequest) -> Result<(CompletionResponse, Duration)> {
        let start = Instant::now();
        match tokio::time::timeout(self.timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => Ok((response, start.elapsed())),
            Ok(Err(error)) => Err(error),
            Err(_) => Err(CopilotError::Api(ApiError::Timeout)),
        }
    }

    /// Snapshot of the accumulated metrics
    pub fn metrics(&self) -> MetricsSummary {
        self.lock_metrics().summary()
    }

    fn lock_metrics(&self) -> MutexGuard<'_, GatewayMetrics> {
        match self.metrics.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Gateway metrics lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock_provider::{MockOutcome, MockProvider};
    use crate::llm::provider::Usage;

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 4,
            jitter: 0.0,
        }
    }

    fn gateway(provider: &MockProvider) -> GenerationGateway {
        GenerationGateway::new(Arc::new(provider.clone()), "mock-model")
            .with_retry_config(fast_retry())
    }

    fn messages() -> Vec<Message> {
        vec![Message::user("hello")]
    }

    #[tokio::test]
    async fn test_success_returns_text_verbatim() {
        let provider = MockProvider::new().with_response("response OK");
        let gateway = gateway(&provider);

        let result = gateway.generate(messages()).await;

        assert_eq!(result, "response OK");
        assert_eq!(provider.call_count(), 1);
        let metrics = gateway.metrics();
        assert_eq!(metrics.total_calls, 1);
        assert_eq!(metrics.total_retries, 0);
        assert_eq!(metrics.total_fallbacks, 0);
        assert_eq!(metrics.total_tokens, 30);
        assert_eq!(gateway.lock_metrics().latencies.len(), 1);
    }

    #[tokio::test]
    async fn test_request_carries_sampling_params() {
        let provider = MockProvider::new();
        let gateway = gateway(&provider);
        gateway.generate(messages()).await;

        let request = provider.last_request().unwrap();
        assert_eq!(request.model, "mock-model");
        assert_eq!(request.max_tokens, 300);
        assert_eq!(request.seed, Some(42));
        assert!((request.temperature - 0.3).abs() < 1e-6);
        assert!((request.top_p - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_400_no_retry() {
        let provider = MockProvider::failing_with_status(400);
        let gateway = gateway(&provider);

        let result = gateway.generate_detailed(messages()).await;

        assert!(result.text.contains("no es válida"));
        assert_eq!(result.fallback, Some(Fallback::InvalidRequest));
        assert_eq!(provider.call_count(), 1);
        assert_eq!(gateway.metrics().total_retries, 0);
        assert_eq!(gateway.metrics().total_fallbacks, 1);
    }

    #[tokio::test]
    async fn test_401_and_403_invalid_credentials() {
        for status in [401u16, 403] {
            let provider = MockProvider::failing_with_status(status);
            let gateway = gateway(&provider);

            let result = gateway.generate_detailed(messages()).await;

            assert_eq!(result.fallback, Some(Fallback::InvalidCredentials));
            assert!(result.text.contains("credenciales"));
            assert_eq!(provider.call_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_500_retries_then_falls_back() {
        let provider = MockProvider::failing_with_status(500);
        let gateway = gateway(&provider);

        let result = gateway.generate(messages()).await;

        assert!(result.contains("experimentando problemas"));
        assert_eq!(provider.call_count(), 3);
        let metrics = gateway.metrics();
        assert_eq!(metrics.total_retries, 2);
        assert_eq!(metrics.total_fallbacks, 1);
        assert_eq!(metrics.p50_latency, 0.0);
    }

    #[tokio::test]
    async fn test_503_is_retried() {
        let provider = MockProvider::new()
            .with_outcomes(vec![MockOutcome::Status(503), MockOutcome::reply("listo")]);
        let gateway = gateway(&provider);

        let result = gateway.generate_detailed(messages()).await;

        assert_eq!(result.text, "listo");
        assert!(!result.is_fallback());
        assert_eq!(provider.call_count(), 2);
        assert_eq!(gateway.metrics().total_retries, 1);
    }

    #[tokio::test]
    async fn test_timeout_behaves_like_500() {
        let provider = MockProvider::new().with_outcomes(vec![MockOutcome::Timeout]);
        let gateway = gateway(&provider);

        let result = gateway.generate(messages()).await;

        assert!(result.contains("tardó demasiado"));
        assert_eq!(provider.call_count(), 3);
        assert_eq!(gateway.metrics().total_retries, 2);
    }

    #[tokio::test]
    async fn test_slow_provider_hits_gateway_timeout() {
        let provider = MockProvider::new().with_delay(Duration::from_millis(200));
        let gateway = gateway(&provider).with_timeout(Duration::from_millis(10));

        let result = gateway.generate_detailed(messages()).await;

        assert_eq!(result.fallback, Some(Fallback::TimedOut));
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_other_errors_not_retried() {
        let provider =
            MockProvider::new().with_outcomes(vec![MockOutcome::Network("refused".to_string())]);
        let gateway = gateway(&provider);

        let result = gateway.generate_detailed(messages()).await;

        assert_eq!(result.fallback, Some(Fallback::Connectivity));
        assert!(result.text.contains("Hubo un problema al conectarme"));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_usage_tolerated() {
        let provider = MockProvider::new().with_outcomes(vec![MockOutcome::Reply {
            text: "sin uso".to_string(),
            usage: None,
        }]);
        let gateway = gateway(&provider);

        assert_eq!(gateway.generate(messages()).await, "sin uso");
        assert_eq!(gateway.metrics().total_tokens, 0);
    }

    #[tokio::test]
    async fn test_metrics_accumulate_across_calls() {
        let provider = MockProvider::new().with_outcomes(vec![
            MockOutcome::Reply {
                text: "a".to_string(),
                usage: Some(Usage {
                    input_tokens: 1,
                    output_tokens: 1,
                }),
            },
            MockOutcome::Status(400),
        ]);
        let gateway = gateway(&provider);

        gateway.generate(messages()).await;
        gateway.generate(messages()).await;

        let metrics = gateway.metrics();
        assert_eq!(metrics.total_calls, 2);
        assert_eq!(metrics.total_tokens, 2);
        assert_eq!(metrics.total_fallbacks, 1);
    }

    #[tokio::test]
    async fn test_independent_gateways_have_independent_metrics() {
        let provider = MockProvider::new();
        let first = gateway(&provider);
        let second = gateway(&provider);

        first.generate(messages()).await;

        assert_eq!(first.metrics().total_calls, 1);
        assert_eq!(second.metrics().total_calls, 0);
    }

    #[test]
    fn test_fallback_from_error_classification() {
        assert_eq!(
            Fallback::from_error(&CopilotError::Api(ApiError::RateLimited("x".into()))),
            Fallback::Connectivity
        );
        assert_eq!(
            Fallback::from_error(&CopilotError::Api(ApiError::ServerError {
                status: 404,
                message: "x".into()
            })),
            Fallback::Connectivity
        );
        assert_eq!(
            Fallback::from_error(&CopilotError::Api(ApiError::ServerError {
                status: 502,
                message: "x".into()
            })),
            Fallback::ServiceUnavailable
        );
    }

    #[test]
    fn test_from_settings_without_key_fails() {
        let mut settings = Settings::default();
        settings.provider.api_key_env = "COPILOT_TEST_UNSET_KEY_VAR".to_string();
        let err = match GenerationGateway::from_settings(&settings) {
            Ok(_) => panic!("gateway built without credentials"),
            Err(e) => e,
        };
        assert!(matches!(err, CopilotError::Config(_)));
    }
}
