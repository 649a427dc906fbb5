use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Hosting platform a page belongs to.
#[derive(
    Deserialize,
    Serialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    TikTok,
    Facebook,
    YouTube,
    Instagram,
    Twitter,
    Twitch,
    #[default]
    Generic,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Platform::Generic)
    }
}
