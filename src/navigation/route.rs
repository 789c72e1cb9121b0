use crate::session::SessionStore;
use tracing::{error, info};

/// Where the app opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialRoute {
    Login,
    Main,
}

/// Main app with a complete session, login otherwise (including when the
/// store cannot be read)
pub async fn initial_route(store: &dyn SessionStore) -> InitialRoute {
    let route = match store.get().await {
        Ok(Some(_)) => InitialRoute::Main,
        Ok(None) => InitialRoute::Login,
        Err(e) => {
            error!("Error checking session: {}", e);
            InitialRoute::Login
        }
    };

    info!("Initial route: {:?}", route);
    route
}
