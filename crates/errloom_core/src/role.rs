//! Ego (speaker role) type.

use serde::{Deserialize, Serialize};

/// The active speaker of a fragment.
///
/// Roles are free-form so that callers can introduce custom speakers; the
/// absent role stands for the default system voice. The name `"system"`
/// always normalizes to the absent role, so `Ego::named("system")` equals
/// [`Ego::system`].
///
/// # Examples
///
/// ```
/// use errloom_core::Ego;
///
/// assert_eq!(Ego::user().chat_role(), "user");
/// assert_eq!(Ego::system().chat_role(), "system");
/// assert_eq!(Ego::named("critic").name(), Some("critic"));
/// assert_eq!(Ego::from("system"), Ego::system());
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub struct Ego(Option<String>);

impl Ego {
    /// Chat role used for the absent (system) ego.
    pub const SYSTEM: &'static str = "system";
    /// Name of the user ego.
    pub const USER: &'static str = "user";
    /// Name of the assistant ego.
    pub const ASSISTANT: &'static str = "assistant";

    /// The default ego, active before any role switch.
    pub fn system() -> Self {
        Self(None)
    }

    pub fn user() -> Self {
        Self(Some(Self::USER.to_string()))
    }

    pub fn assistant() -> Self {
        Self(Some(Self::ASSISTANT.to_string()))
    }

    /// A custom ego with an arbitrary name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::from(Some(name.into()))
    }

    /// The ego name, or `None` for the default ego.
    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Whether this is the default (unnamed) ego.
    pub fn is_system(&self) -> bool {
        self.0.is_none()
    }

    /// Role string used when projecting to chat messages.
    pub fn chat_role(&self) -> &str {
        self.0.as_deref().unwrap_or(Self::SYSTEM)
    }
}

impl std::fmt::Display for Ego {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.chat_role())
    }
}

impl From<&str> for Ego {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<Option<&str>> for Ego {
    fn from(name: Option<&str>) -> Self {
        Self::from(name.map(str::to_string))
    }
}

impl From<Option<String>> for Ego {
    fn from(name: Option<String>) -> Self {
        Self(name.filter(|n| n != Self::SYSTEM))
    }
}

impl From<Ego> for Option<String> {
    fn from(ego: Ego) -> Self {
        ego.0
    }
}
