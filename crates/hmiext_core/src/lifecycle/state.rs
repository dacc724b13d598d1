/// Application lifecycle state, ordered by HMI presence strength.
///
/// `Disconnected < NotRunning < Background < Limited < Active`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub enum ApplicationState {
    #[default]
    Disconnected,
    NotRunning,
    Background,
    Limited,
    Active,
}

/// Internal, compact IDs used for error payloads and the atomic state gate.
impl ApplicationState {
    pub const fn id(self) -> u8 {
        match self {
            ApplicationState::Disconnected => 0,
            ApplicationState::NotRunning => 1,
            ApplicationState::Background => 2,
            ApplicationState::Limited => 3,
            ApplicationState::Active => 4,
        }
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(ApplicationState::Disconnected),
            1 => Some(ApplicationState::NotRunning),
            2 => Some(ApplicationState::Background),
            3 => Some(ApplicationState::Limited),
            4 => Some(ApplicationState::Active),
            _ => None,
        }
    }

    /// True once a session exists (anything but `Disconnected`).
    pub const fn is_connected(self) -> bool {
        !matches!(self, ApplicationState::Disconnected)
    }

    /// True for the launched states (`Background`, `Limited`, `Active`).
    pub const fn is_launched(self) -> bool {
        matches!(
            self,
            ApplicationState::Background | ApplicationState::Limited | ApplicationState::Active
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationState::Disconnected => "Disconnected",
            ApplicationState::NotRunning => "NotRunning",
            ApplicationState::Background => "Background",
            ApplicationState::Limited => "Limited",
            ApplicationState::Active => "Active",
        }
    }
}

/// Canonical list of all application states, in presence order.
pub const ALL_STATES: [ApplicationState; 5] = [
    ApplicationState::Disconnected,
    ApplicationState::NotRunning,
    ApplicationState::Background,
    ApplicationState::Limited,
    ApplicationState::Active,
];

/// Head unit's visibility classification of the application.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum HmiLevel {
    None,
    Background,
    Limited,
    Full,
}

impl HmiLevel {
    /// The application state a head unit reporting this level implies.
    pub const fn application_state(self) -> ApplicationState {
        match self {
            HmiLevel::None => ApplicationState::NotRunning,
            HmiLevel::Background => ApplicationState::Background,
            HmiLevel::Limited => ApplicationState::Limited,
            HmiLevel::Full => ApplicationState::Active,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            HmiLevel::None => "none",
            HmiLevel::Background => "background",
            HmiLevel::Limited => "limited",
            HmiLevel::Full => "full",
        }
    }
}

/// Whether the application's audio is currently heard.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum AudioStreamingState {
    Audible,
    Attenuated,
    #[default]
    NotAudible,
}

impl AudioStreamingState {
    pub const fn label(self) -> &'static str {
        match self {
            AudioStreamingState::Audible => "audible",
            AudioStreamingState::Attenuated => "attenuated",
            AudioStreamingState::NotAudible => "not_audible",
        }
    }
}

/// Foreground interaction mode on the head unit.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum SystemContext {
    #[default]
    Main,
    VoiceRecognition,
    Menu,
    HmiObscured,
    Alert,
}

impl SystemContext {
    pub const fn label(self) -> &'static str {
        match self {
            SystemContext::Main => "main",
            SystemContext::VoiceRecognition => "vr",
            SystemContext::Menu => "menu",
            SystemContext::HmiObscured => "hmi_obscured",
            SystemContext::Alert => "alert",
        }
    }
}
