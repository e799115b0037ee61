//! Per-call orchestration.
//!
//! # Responsibilities
//! - Run every check in order and stop at the first rejection
//! - Audit every decision, including internal failures
//! - Forward admitted calls and time them
//!
//! # Design Decisions
//! - Checks are synchronous; the handler call is the only await point
//! - Unknown channels are refused before rate limiting so arbitrary channel
//!   names cannot grow the window table
//! - Panics in the pipeline or a handler become an `error` audit entry and a
//!   generic caller-facing failure
//! - Policy runs on both the raw and the sanitized arguments; only what
//!   passes both is forwarded

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::audit::{AuditDecision, AuditEntry, AuditLog};
use crate::config::validation::validate_config;
use crate::config::GatewayConfig;
use crate::gateway::context::{CallOrigin, SecurityContext};
use crate::gateway::error::{Decision, GatewayError, InitError, InternalFailure, Rejection};
use crate::gateway::handler::HandlerRegistry;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::performance::{PerformanceRecorder, SampleId};
use crate::policy::ChannelPolicyRegistry;
use crate::security::channel::{clip_for_audit, is_valid_channel};
use crate::security::object_safety::nesting_depth;
use crate::security::{
    ArgumentSanitizer, BuildMode, RateLimiter, SecurityViolation, ThreatScanner,
};

/// Reason stored in the audit log for internal failures.
const INTERNAL_AUDIT_REASON: &str = "Internal failure";

/// The secure IPC gateway: one admit-or-reject decision per call.
pub struct Gateway {
    config: GatewayConfig,
    rate_limiter: RateLimiter,
    scanner: ThreatScanner,
    policies: ChannelPolicyRegistry,
    sanitizer: ArgumentSanitizer,
    audit: AuditLog,
    performance: PerformanceRecorder,
    handlers: HandlerRegistry,
    shutdown: Shutdown,
}

impl Gateway {
    /// Build a gateway with the default channel policy table.
    pub fn new(
        config: GatewayConfig,
        build_mode: BuildMode,
        handlers: HandlerRegistry,
    ) -> Result<Self, InitError> {
        Self::with_policies(config, build_mode, ChannelPolicyRegistry::new(), handlers)
    }

    /// Build a gateway with a custom channel policy table.
    pub fn with_policies(
        config: GatewayConfig,
        build_mode: BuildMode,
        policies: ChannelPolicyRegistry,
        handlers: HandlerRegistry,
    ) -> Result<Self, InitError> {
        validate_config(&config).map_err(InitError::Config)?;

        let sanitizer = ArgumentSanitizer::new()?;
        let scanner = ThreatScanner::new(build_mode, sanitizer.clone())?;

        tracing::info!(
            build_mode = ?build_mode,
            handlers = handlers.len(),
            max_calls = config.rate_limit.max_calls,
            window_secs = config.rate_limit.window_secs,
            audit_capacity = config.audit.capacity,
            "Gateway initialized"
        );

        Ok(Self {
            rate_limiter: RateLimiter::new(&config.rate_limit),
            audit: AuditLog::new(&config.audit),
            performance: PerformanceRecorder::new(&config.performance),
            scanner,
            policies,
            sanitizer,
            handlers,
            config,
            shutdown: Shutdown::new(),
        })
    }

    /// Run `channel` with `args` on behalf of `origin`.
    ///
    /// Resolves to the privileged operation's result if the call is admitted,
    /// otherwise to a [`GatewayError`] whose `Display` is the reason string.
    pub async fn invoke(
        &self,
        channel: &str,
        args: Vec<Value>,
        origin: &CallOrigin,
    ) -> Result<Value, GatewayError> {
        let context = SecurityContext::new(clip_for_audit(channel), origin);
        let decision = self.evaluate(channel, &args);
        // Only derived data outlives the decision.
        drop(args);

        match decision {
            Err(failure) => Err(self.fail(context, &failure)),
            Ok(Decision::Rejected(rejection)) => {
                let error = GatewayError::from(rejection);
                tracing::warn!(
                    channel = %context.channel(),
                    session = %context.session_id(),
                    reason = %error,
                    "Call blocked"
                );
                self.record(context, AuditDecision::Blocked, Some(error.to_string()));
                Err(error)
            }
            Ok(Decision::Admitted { arguments }) => {
                tracing::debug!(
                    channel = %channel,
                    session = %context.session_id(),
                    "Call admitted"
                );
                self.record(context.clone(), AuditDecision::Allowed, None);
                self.forward(channel, arguments, context).await
            }
        }
    }

    /// Run the checks for one call without forwarding or auditing it.
    ///
    /// Counts against the channel's rate window like a real call.
    pub fn evaluate(&self, channel: &str, args: &[Value]) -> Result<Decision, InternalFailure> {
        std::panic::catch_unwind(AssertUnwindSafe(|| self.run_checks(channel, args)))
            .map_err(InternalFailure::from_panic)
    }

    fn run_checks(&self, channel: &str, args: &[Value]) -> Decision {
        let reject = |v: SecurityViolation| Decision::Rejected(Rejection::Security(v));

        if self.is_shut_down() {
            return reject(SecurityViolation::ShutDown);
        }
        if !is_valid_channel(channel) {
            return reject(SecurityViolation::InvalidChannel);
        }
        if !self.handlers.contains(channel) {
            return reject(SecurityViolation::UnknownChannel);
        }

        if !self.rate_limiter.is_allowed(channel) {
            metrics::record_rate_limited(channel);
            return reject(SecurityViolation::RateLimitExceeded);
        }

        // Everything after this point recurses into the arguments.
        let max_depth = self.config.threats.max_nesting_depth;
        if args.iter().any(|arg| nesting_depth(arg) > max_depth) {
            return Decision::Rejected(Rejection::Validation(format!(
                "Arguments nested deeper than {max_depth} levels"
            )));
        }

        if let Some(violation) = self.scanner.scan(channel, args).violation() {
            return reject(violation);
        }

        let outcome = self.policies.validate(channel, args);
        if !outcome.allowed {
            return Decision::from(outcome);
        }

        // Sanitizing rewrites keys and strings, so the forwarded form must
        // satisfy the same object-safety check and contract as the raw one.
        let sanitized = self.sanitizer.sanitize_all(args);
        let outcome = self.policies.validate(channel, &sanitized);
        if !outcome.allowed {
            return Decision::from(outcome);
        }
        Decision::from(outcome.with_sanitized(sanitized))
    }

    async fn forward(
        &self,
        channel: &str,
        arguments: Vec<Value>,
        context: SecurityContext,
    ) -> Result<Value, GatewayError> {
        let Some(handler) = self.handlers.get(channel) else {
            let failure = InternalFailure(format!("handler for '{channel}' disappeared"));
            return Err(self.fail(context, &failure));
        };

        let sample = self.performance.start(channel, &arguments);
        let result = AssertUnwindSafe(handler.handle(arguments)).catch_unwind().await;

        match result {
            Ok(Ok(value)) => {
                self.finish_sample(sample, true, None);
                Ok(value)
            }
            Ok(Err(e)) => {
                tracing::warn!(channel = %channel, error = %e, "Privileged operation failed");
                self.finish_sample(sample, false, Some(e.to_string()));
                Err(GatewayError::Operation(e.to_string()))
            }
            Err(panic) => {
                self.finish_sample(sample, false, Some(INTERNAL_AUDIT_REASON.to_string()));
                Err(self.fail(context, &InternalFailure::from_panic(panic)))
            }
        }
    }

    fn finish_sample(&self, sample: SampleId, success: bool, error: Option<String>) {
        if let Err(e) = self.performance.end(sample, success, error) {
            tracing::warn!(error = %e, "Performance sample lost");
        }
    }

    /// Log and audit an internal failure, returning the generic caller error.
    fn fail(&self, context: SecurityContext, failure: &InternalFailure) -> GatewayError {
        tracing::error!(
            channel = %context.channel(),
            session = %context.session_id(),
            error = %failure,
            "Internal failure during gateway call"
        );
        self.record(
            context,
            AuditDecision::Error,
            Some(INTERNAL_AUDIT_REASON.to_string()),
        );
        GatewayError::Internal
    }

    fn record(&self, context: SecurityContext, decision: AuditDecision, reason: Option<String>) {
        let label = if is_valid_channel(context.channel()) {
            context.channel()
        } else {
            "<invalid>"
        };
        metrics::record_decision(label, decision);
        self.audit.record(AuditEntry::new(decision, reason, context));
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn performance(&self) -> &PerformanceRecorder {
        &self.performance
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn policies(&self) -> &ChannelPolicyRegistry {
        &self.policies
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn build_mode(&self) -> BuildMode {
        self.scanner.build_mode()
    }

    /// Clear rate windows, audit entries and performance data.
    pub fn reset(&self) {
        self.rate_limiter.reset();
        self.audit.clear();
        self.performance.clear();
    }

    /// Refuse all further calls and drop accumulated state.
    pub fn shutdown(&self) {
        if !self.shutdown.trigger() {
            return;
        }
        self.reset();
        tracing::info!("Gateway shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Receiver that fires when [`shutdown`](Self::shutdown) is called.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown.subscribe()
    }
}
