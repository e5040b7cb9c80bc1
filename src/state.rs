use crate::client::PersistenceClient;
use crate::store::Backend;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<PersistenceClient<Backend>>,
}

impl AppState {
    pub fn new(client: PersistenceClient<Backend>) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}
