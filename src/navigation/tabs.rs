use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Top-level tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    Players,
    #[default]
    Recorder,
    Logs,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Players, Tab::Recorder, Tab::Logs];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Players => "Players",
            Tab::Recorder => "Recorder",
            Tab::Logs => "Logs",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|t| t.title().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown tab: {}", s))
    }
}

/// What currently fills the content area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Tab(Tab),
    /// The profile overlay, drawn in place of the active tab
    Overlay,
}

/// Tab bar plus profile overlay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    active_tab: Tab,
    overlay_visible: bool,
    previous_tab: Tab,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn previous_tab(&self) -> Tab {
        self.previous_tab
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn select_tab(&mut self, tab: Tab) {
        debug!("Tab selected: {}", tab);
        self.previous_tab = tab;
        self.active_tab = tab;
        self.overlay_visible = false;
    }

    pub fn open_overlay(&mut self) {
        debug!("Profile overlay opened over {}", self.active_tab);
        self.previous_tab = self.active_tab;
        self.overlay_visible = true;
    }

    pub fn close_overlay(&mut self) {
        debug!("Profile overlay closed, back to {}", self.previous_tab);
        self.overlay_visible = false;
        self.active_tab = self.previous_tab;
    }

    pub fn visible_view(&self) -> View {
        if self.overlay_visible {
            View::Overlay
        } else {
            View::Tab(self.active_tab)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_recorder() {
        let nav = NavigationState::new();
        assert_eq!(nav.visible_view(), View::Tab(Tab::Recorder));
        assert!(!nav.overlay_visible());
    }

    #[test]
    fn test_tab_parsing() {
        assert_eq!("logs".parse::<Tab>().unwrap(), Tab::Logs);
        assert_eq!("Players".parse::<Tab>().unwrap(), Tab::Players);
        assert!("profile".parse::<Tab>().is_err());
    }
}
