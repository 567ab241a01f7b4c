//! Named keep-policy presets

use super::*;
use serde::{Deserialize, Serialize};

/// Predefined filtering setups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Every gate on (default)
    Strict,
    /// Every gate off; keeps all parseable records
    All,
    /// Strict plus a domain-validated policy OID
    Dv,
    /// Strict plus an organization-validated policy OID
    Ov,
    /// Strict plus an extended-validation policy OID
    Ev,
    /// Trust gates off, organization stage on
    Untrusted,
}

impl Preset {
    /// All presets, in display order
    pub const ALL: [Preset; 6] = [
        Preset::Strict,
        Preset::All,
        Preset::Dv,
        Preset::Ov,
        Preset::Ev,
        Preset::Untrusted,
    ];

    /// Convert preset to full configuration
    pub fn into_config(self) -> Config {
        let mut config = Config {
            preset: Some(self),
            ..Config::default()
        };

        match self {
            Preset::Strict => {}
            Preset::All => {
                config.keep.keep_without_alt_names = true;
                config.keep.keep_without_organization = true;
                config.keep.keep_invalid = true;
                config.keep.keep_browser_untrusted = true;
                config.keep.keep_self_signed = true;
            }
            Preset::Dv | Preset::Ov | Preset::Ev => {
                config.keep.policy = self.policy_class().map(|c| c.to_string());
            }
            Preset::Untrusted => {
                config.keep.keep_invalid = true;
                config.keep.keep_browser_untrusted = true;
                config.keep.keep_self_signed = true;
            }
        }

        config
    }

    fn policy_class(self) -> Option<PolicyClass> {
        match self {
            Preset::Dv => Some(PolicyClass::Dv),
            Preset::Ov => Some(PolicyClass::Ov),
            Preset::Ev => Some(PolicyClass::Ev),
            _ => None,
        }
    }

    /// Preset name
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Strict => "strict",
            Preset::All => "all",
            Preset::Dv => "dv",
            Preset::Ov => "ov",
            Preset::Ev => "ev",
            Preset::Untrusted => "untrusted",
        }
    }

    /// Preset description
    pub fn description(&self) -> &'static str {
        match self {
            Preset::Strict => "Valid, browser-trusted, CA-signed, with an organization (default)",
            Preset::All => "Keep every record that parses",
            Preset::Dv => "Strict, issued under a DV policy",
            Preset::Ov => "Strict, issued under an OV policy",
            Preset::Ev => "Strict, issued under an EV policy",
            Preset::Untrusted => "Ignore validity and trust, still require an organization",
        }
    }

    /// Parse preset from name string
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse()
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "strict" | "default" => Ok(Preset::Strict),
            "all" | "none" => Ok(Preset::All),
            "dv" => Ok(Preset::Dv),
            "ov" => Ok(Preset::Ov),
            "ev" => Ok(Preset::Ev),
            "untrusted" => Ok(Preset::Untrusted),
            _ => Err(Error::config_value("preset", format!("Unknown preset: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_is_default_policy() {
        let config = Preset::Strict.into_config();
        assert_eq!(config.keep, KeepPolicy::default());
        assert_eq!(config.preset, Some(Preset::Strict));
    }

    #[test]
    fn test_all_preset() {
        let keep = Preset::All.into_config().keep;
        assert!(keep.keep_without_alt_names);
        assert!(keep.keep_without_organization);
        assert!(keep.keep_invalid);
        assert!(keep.keep_browser_untrusted);
        assert!(keep.keep_self_signed);
        assert_eq!(keep.policy, None);
    }

    #[test]
    fn test_class_presets() {
        assert_eq!(Preset::Ev.into_config().keep.policy.as_deref(), Some("EV"));
        assert_eq!(Preset::Dv.into_config().keep.policy.as_deref(), Some("DV"));
        assert!(!Preset::Ov.into_config().keep.keep_invalid);
    }

    #[test]
    fn test_every_preset_validates() {
        for preset in Preset::ALL {
            preset.into_config().validate().unwrap();
        }
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!("EV".parse::<Preset>().unwrap(), Preset::Ev);
        assert_eq!(Preset::from_name("default").unwrap(), Preset::Strict);
        assert!("mode9".parse::<Preset>().is_err());
        assert_eq!(Preset::Untrusted.to_string(), "untrusted");
    }
}
