//! Route gateway.
//!
//! Every sibling module exports a subrouter; this module merges them and
//! binds the shared `(PgPool, Config)` state.

use axum::Router;
use sqlx::PgPool;

use crate::Config;

mod devices;
mod health;
mod heating_table;
mod meta_entries;
mod residences;
mod rooms;
mod root;
mod temperatures;
mod thermostats;
mod users;

/// Path prefixes of the nested resources. Handlers below them extract every
/// captured key and resolve the chain through [`crate::hierarchy`].
const RESIDENCE: &str = "/residence/{residence}";
const ROOM: &str = "/residence/{residence}/room/{room}";
const THERMOSTAT: &str = "/residence/{residence}/room/{room}/thermostat/{thermostat}";

// ---

pub fn router(pool: PgPool, config: Config) -> Router {
    // ---
    Router::new()
        .merge(root::router())
        .merge(residences::router())
        .merge(users::router())
        .merge(rooms::router())
        .merge(thermostats::router())
        .merge(temperatures::router())
        .merge(meta_entries::router())
        .merge(heating_table::router())
        .merge(devices::router())
        .merge(health::router())
        .with_state((pool, config))
}
