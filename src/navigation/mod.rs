//! In-memory navigation state
//!
//! Nothing here is persisted or touches the network apart from the initial
//! route check, which only reads the session store.

mod drilldown;
mod route;
mod tabs;

pub use drilldown::{LogsView, PlayersView};
pub use route::{initial_route, InitialRoute};
pub use tabs::{NavigationState, Tab, View};
