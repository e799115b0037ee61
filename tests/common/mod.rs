//! Shared utilities for gateway integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use ipc_gateway::config::GatewayConfig;
use ipc_gateway::gateway::{CallOrigin, Gateway, HandlerError, HandlerRegistry};
use ipc_gateway::policy::ChannelPolicyRegistry;
use ipc_gateway::security::threat::DEV_ONLY_CHANNELS;
use ipc_gateway::security::BuildMode;
use serde_json::Value;

/// Channels without a specific contract that tests also call.
pub const EXTRA_CHANNELS: &[&str] = &["window:minimize", "window:maximize"];

/// Every call that reached a privileged handler, in arrival order.
#[derive(Clone, Default)]
pub struct Forwarded(Arc<Mutex<Vec<(String, Vec<Value>)>>>);

impl Forwarded {
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.0.lock().unwrap().clone()
    }

    pub fn last_args(&self) -> Option<Vec<Value>> {
        self.0.lock().unwrap().last().map(|(_, args)| args.clone())
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Register a recording echo handler for every known channel.
pub fn recording_handlers() -> (HandlerRegistry, Forwarded) {
    let forwarded = Forwarded::default();
    let mut handlers = HandlerRegistry::new();

    let policy_channels = ChannelPolicyRegistry::new();
    let channels = policy_channels
        .channels()
        .into_iter()
        .chain(DEV_ONLY_CHANNELS.iter().copied())
        .chain(EXTRA_CHANNELS.iter().copied());

    for channel in channels {
        let sink = forwarded.clone();
        let name = channel.to_string();
        handlers.register_fn(channel, move |args| {
            sink.0.lock().unwrap().push((name.clone(), args.clone()));
            async move { Ok::<_, HandlerError>(Value::Array(args)) }
        });
    }

    (handlers, forwarded)
}

pub fn gateway_with(config: GatewayConfig, mode: BuildMode) -> (Gateway, Forwarded) {
    let (handlers, forwarded) = recording_handlers();
    let gateway = Gateway::new(config, mode, handlers).unwrap();
    (gateway, forwarded)
}

pub fn gateway() -> (Gateway, Forwarded) {
    gateway_with(GatewayConfig::default(), BuildMode::Development)
}

pub fn origin() -> CallOrigin {
    CallOrigin::new("app://renderer", "integration-test", "session-test")
}
