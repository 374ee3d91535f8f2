//! Screen lifecycle domain events

use serde::{Deserialize, Serialize};

use crate::types::ScreenId;

/// Events published around the officially-recognized lifecycle methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScreenEvent {
    /// The screen completed its one-time initialization
    Initialized {
        /// The screen's tracking handle
        screen: ScreenId,
    },
    /// The screen's view finished loading
    ViewReady {
        /// The screen's tracking handle
        screen: ScreenId,
    },
    /// The screen became active
    Activated {
        /// The screen's tracking handle
        screen: ScreenId,
    },
    /// The screen was deactivated, possibly for good
    Deactivated {
        /// The screen's tracking handle
        screen: ScreenId,
        /// Whether the deactivation closes the screen
        was_closed: bool,
    },
    /// The screen was closed
    Closed {
        /// The screen's tracking handle
        screen: ScreenId,
        /// Dialog result, when the screen was shown as a dialog
        dialog_result: Option<bool>,
    },
}

impl ScreenEvent {
    /// The screen the event concerns
    pub fn screen(&self) -> ScreenId {
        match self {
            Self::Initialized { screen }
            | Self::ViewReady { screen }
            | Self::Activated { screen }
            | Self::Deactivated { screen, .. }
            | Self::Closed { screen, .. } => *screen,
        }
    }
}
