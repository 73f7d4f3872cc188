use std::{fmt, str::FromStr};

use thiserror::Error;

/// Expression used when a custom rate is requested without one.
pub const DEFAULT_CUSTOM_EXPRESSION: &str = "2*t";

/// Tank capacity used when none is given.
pub const DEFAULT_CAPACITY: f64 = 50.0;

/// A named inflow profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FlowPreset {
    /// `R(t) = 5`.
    #[default]
    Constant,
    /// `R(t) = 2t`.
    Increasing,
    /// `R(t) = 10 - t`.
    Decreasing,
    /// A user-supplied expression.
    Custom,
}

/// Error returned when parsing an unknown preset name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown flow preset `{0}` (expected constant, increasing, decreasing or custom)")]
pub struct UnknownPreset(pub String);

impl FlowPreset {
    /// Every preset, in display order.
    pub const ALL: [Self; 4] = [
        Self::Constant,
        Self::Increasing,
        Self::Decreasing,
        Self::Custom,
    ];

    /// Returns the rate expression, or `None` for [`FlowPreset::Custom`].
    #[must_use]
    pub fn expression(self) -> Option<&'static str> {
        match self {
            Self::Constant => Some("5"),
            Self::Increasing => Some("2*t"),
            Self::Decreasing => Some("10 - t"),
            Self::Custom => None,
        }
    }

    /// Returns the expression to solve, using `custom` for
    /// [`FlowPreset::Custom`] and falling back to
    /// [`DEFAULT_CUSTOM_EXPRESSION`].
    #[must_use]
    pub fn resolve<'a>(self, custom: Option<&'a str>) -> &'a str {
        self.expression()
            .unwrap_or_else(|| custom.unwrap_or(DEFAULT_CUSTOM_EXPRESSION))
    }

    /// Returns a human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Constant => "Constant Flow",
            Self::Increasing => "Increasing Flow",
            Self::Decreasing => "Decreasing Flow",
            Self::Custom => "Custom Function",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for FlowPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FlowPreset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == name)
            .ok_or_else(|| UnknownPreset(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expressions() {
        assert_eq!(FlowPreset::Constant.expression(), Some("5"));
        assert_eq!(FlowPreset::Increasing.expression(), Some("2*t"));
        assert_eq!(FlowPreset::Decreasing.expression(), Some("10 - t"));
        assert_eq!(FlowPreset::Custom.expression(), None);
    }

    #[test]
    fn resolve_prefers_preset_then_custom_then_default() {
        assert_eq!(FlowPreset::Constant.resolve(Some("t^2")), "5");
        assert_eq!(FlowPreset::Custom.resolve(Some("t^2")), "t^2");
        assert_eq!(FlowPreset::Custom.resolve(None), "2*t");
    }

    #[test]
    fn parses_names() {
        assert_eq!("constant".parse(), Ok(FlowPreset::Constant));
        assert_eq!(" Decreasing ".parse(), Ok(FlowPreset::Decreasing));
        assert_eq!(
            "sawtooth".parse::<FlowPreset>(),
            Err(UnknownPreset("sawtooth".into()))
        );
        for preset in FlowPreset::ALL {
            assert_eq!(preset.to_string().parse(), Ok(preset));
        }
    }

    #[test]
    fn every_preset_compiles() {
        for preset in FlowPreset::ALL {
            let expr = preset.resolve(None);
            assert!(tankfill_expr::RateFunction::compile(expr).is_ok(), "{expr}");
        }
    }
}
