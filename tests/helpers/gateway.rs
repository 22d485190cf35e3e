// ABOUTME: Gateway resource builders for integration tests
// ABOUTME: Wires configs, key stores, and routers in-process without touching the environment

use std::sync::Arc;

use eventgate::config::{AuthConfig, Environment, ServerConfig, StreamConfig};
use eventgate::keys::{ApiKey, KeyStore, MemoryKeyStore};
use eventgate::middleware::AuthGate;
use eventgate::server::{GatewayServer, ServerResources};
use eventgate::stream::EventHub;

/// Channels every test gateway registers
pub const TEST_CHANNELS: [&str; 2] = ["events", "jobs"];

/// A config that never reads process environment
pub fn test_config(require_key: bool, debug: bool) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_owned(),
        http_port: 0,
        auth: AuthConfig {
            require_key,
            keys_file: None,
        },
        streams: StreamConfig {
            channels: TEST_CHANNELS.iter().map(|c| (*c).to_owned()).collect(),
            channel_capacity: 32,
        },
        debug,
        environment: Environment::Testing,
    }
}

/// Resources with no API key requirement
pub fn open_resources() -> Arc<ServerResources> {
    resources_with(test_config(false, false), Vec::new())
}

/// Resources that accept exactly the given keys
pub fn keyed_resources(keys: Vec<ApiKey>) -> Arc<ServerResources> {
    resources_with(test_config(true, false), keys)
}

/// Resources from an explicit config plus pre-inserted keys
pub fn resources_with(config: ServerConfig, keys: Vec<ApiKey>) -> Arc<ServerResources> {
    let store = Arc::new(MemoryKeyStore::new());
    for key in keys {
        store.insert(key).expect("duplicate test key");
    }
    let hub = Arc::new(EventHub::new(config.streams.channel_capacity));
    for channel in &config.streams.channels {
        hub.register(channel.clone());
    }
    let auth = Arc::new(AuthGate::new(
        config.auth.require_key,
        Arc::clone(&store) as Arc<dyn KeyStore>,
    ));
    Arc::new(ServerResources::new(Arc::new(config), store, hub, auth))
}

/// Resources whose gate also applies the given post-authorization check
pub fn resources_with_post_auth(
    keys: Vec<ApiKey>,
    check: eventgate::middleware::PostAuthCheck,
) -> Arc<ServerResources> {
    let config = test_config(true, false);
    let store = Arc::new(MemoryKeyStore::new());
    for key in keys {
        store.insert(key).expect("duplicate test key");
    }
    let hub = Arc::new(EventHub::new(config.streams.channel_capacity));
    for channel in &config.streams.channels {
        hub.register(channel.clone());
    }
    let auth = Arc::new(
        AuthGate::new(true, Arc::clone(&store) as Arc<dyn KeyStore>).with_post_auth(check),
    );
    Arc::new(ServerResources::new(Arc::new(config), store, hub, auth))
}

/// The full router around the given resources
pub fn app(resources: &Arc<ServerResources>) -> axum::Router {
    GatewayServer::build_router(resources)
}
