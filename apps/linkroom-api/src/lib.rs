pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod permissions;
pub mod rooms;
pub mod routes;
pub mod store;

use std::sync::Arc;

use config::Config;
use db::kv::KeyValueStore;
use gateway::fanout::GatewayBroadcast;
use gateway::notify::Notifier;
use rooms::RoomService;
use store::DynRoomStore;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: DynRoomStore,
    pub kv: Arc<dyn KeyValueStore>,
    pub config: Arc<Config>,
    pub broadcast: GatewayBroadcast,
    pub rooms: Arc<RoomService>,
}

impl AppState {
    /// Wire the room service and its notifier to one broadcast hub.
    pub fn new(store: DynRoomStore, kv: Arc<dyn KeyValueStore>, config: Config) -> Self {
        let broadcast = GatewayBroadcast::new();
        let notifier = Notifier::new(store.clone(), broadcast.clone());
        let rooms = Arc::new(RoomService::new(store.clone(), notifier));

        Self {
            store,
            kv,
            config: Arc::new(config),
            broadcast,
            rooms,
        }
    }
}
