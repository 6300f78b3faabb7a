use crate::{
    auth::AuthKeys,
    config::Credentials,
    services::{kv_index::KvIndex, object_store::ObjectStore, worker::JobQueue},
};

/// Shared state carried by the router to every handler.
///
/// All clients are constructed explicitly in `main` and injected here;
/// there are no ambient singletons.
#[derive(Clone)]
pub struct AppState {
    pub store: ObjectStore,
    pub index: KvIndex,
    pub auth: AuthKeys,
    pub credentials: Credentials,
    pub jobs: JobQueue,
}
