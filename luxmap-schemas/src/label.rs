use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An experimental lighting condition, encoded as a suffix token in measurement filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MeasurementLabel {
    #[serde(rename = "100A")]
    Blue100,
    #[serde(rename = "100V")]
    Red100,
    #[serde(rename = "100B")]
    White100,
    #[serde(rename = "0A")]
    Blue15,
    #[serde(rename = "0B")]
    White15,
    #[serde(rename = "0V")]
    Red15,
    #[serde(rename = "0T")]
    Rbw15,
    #[serde(rename = "99100")]
    Rbw100,
}

/// A two-stop colour ramp, as `(r, g, b)` bytes for the low and high end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gradient {
    pub low: (u8, u8, u8),
    pub high: (u8, u8, u8),
}

impl Gradient {
    pub const FALLBACK: Gradient = Gradient {
        low: (200, 200, 200),
        high: (80, 80, 80),
    };
}

impl MeasurementLabel {
    /// Classification priority. The `100x` tokens come before their `0x`
    /// counterparts since `0A.` is also a substring of `100A.`.
    pub const ALL: [MeasurementLabel; 8] = [
        MeasurementLabel::Blue100,
        MeasurementLabel::Red100,
        MeasurementLabel::White100,
        MeasurementLabel::Blue15,
        MeasurementLabel::White15,
        MeasurementLabel::Red15,
        MeasurementLabel::Rbw15,
        MeasurementLabel::Rbw100,
    ];

    /// Order used when picking a surface colour ramp from a free-form group name.
    pub const GRADIENT_ORDER: [MeasurementLabel; 8] = [
        MeasurementLabel::Rbw100,
        MeasurementLabel::Rbw15,
        MeasurementLabel::White100,
        MeasurementLabel::White15,
        MeasurementLabel::Red100,
        MeasurementLabel::Red15,
        MeasurementLabel::Blue100,
        MeasurementLabel::Blue15,
    ];

    /// Order used when picking a surface legend name from a free-form group name.
    pub const LEGEND_ORDER: [MeasurementLabel; 8] = [
        MeasurementLabel::Rbw100,
        MeasurementLabel::Rbw15,
        MeasurementLabel::Red100,
        MeasurementLabel::White100,
        MeasurementLabel::Blue100,
        MeasurementLabel::Red15,
        MeasurementLabel::White15,
        MeasurementLabel::Blue15,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            MeasurementLabel::Blue100 => "100A",
            MeasurementLabel::Red100 => "100V",
            MeasurementLabel::White100 => "100B",
            MeasurementLabel::Blue15 => "0A",
            MeasurementLabel::White15 => "0B",
            MeasurementLabel::Red15 => "0V",
            MeasurementLabel::Rbw15 => "0T",
            MeasurementLabel::Rbw100 => "99100",
        }
    }

    pub fn legend_name(&self) -> &'static str {
        match self {
            MeasurementLabel::Blue100 => "B100%",
            MeasurementLabel::Red100 => "R100%",
            MeasurementLabel::White100 => "W100%",
            MeasurementLabel::Blue15 => "B15%",
            MeasurementLabel::White15 => "W15%",
            MeasurementLabel::Red15 => "R15%",
            MeasurementLabel::Rbw15 => "RBW15%",
            MeasurementLabel::Rbw100 => "RBW100%",
        }
    }

    pub fn gradient(&self) -> Gradient {
        let (low, high) = match self {
            MeasurementLabel::Rbw100 => ((120, 81, 169), (186, 104, 200)),
            MeasurementLabel::Rbw15 => ((103, 58, 183), (179, 136, 255)),
            MeasurementLabel::White100 => ((80, 80, 80), (220, 220, 220)),
            MeasurementLabel::White15 => ((120, 120, 120), (240, 240, 240)),
            MeasurementLabel::Red100 => ((183, 28, 28), (255, 138, 128)),
            MeasurementLabel::Red15 => ((229, 57, 53), (255, 205, 210)),
            MeasurementLabel::Blue100 => ((13, 71, 161), (100, 181, 246)),
            MeasurementLabel::Blue15 => ((21, 101, 192), (144, 202, 249)),
        };
        Gradient { low, high }
    }

    /// Finds the first label of `order` whose token occurs anywhere in `name`.
    pub fn find_in(order: &[MeasurementLabel], name: &str) -> Option<MeasurementLabel> {
        order.iter().copied().find(|label| name.contains(label.token()))
    }
}

impl fmt::Display for MeasurementLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for MeasurementLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.token() == s)
            .ok_or_else(|| format!("unknown measurement label '{}'", s))
    }
}

/// Legend name for a spectral group directory: exact token match, otherwise the name itself.
pub fn spectral_legend_name(group: &str) -> String {
    group
        .parse::<MeasurementLabel>()
        .map(|label| label.legend_name().to_string())
        .unwrap_or_else(|_| group.to_string())
}

/// Legend name for a surface group: first token contained in the name, otherwise the name itself.
pub fn surface_legend_name(group: &str) -> String {
    MeasurementLabel::find_in(&MeasurementLabel::LEGEND_ORDER, group)
        .map(|label| label.legend_name().to_string())
        .unwrap_or_else(|| group.to_string())
}

/// Colour ramp for a surface group, falling back to a neutral grey ramp.
pub fn surface_gradient(group: &str) -> Gradient {
    MeasurementLabel::find_in(&MeasurementLabel::GRADIENT_ORDER, group)
        .map(|label| label.gradient())
        .unwrap_or(Gradient::FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip_through_from_str() {
        for label in MeasurementLabel::ALL {
            assert_eq!(label.token().parse::<MeasurementLabel>(), Ok(label));
        }
        assert!("50A".parse::<MeasurementLabel>().is_err());
    }

    #[test]
    fn find_in_prefers_full_power_tokens() {
        let order = MeasurementLabel::GRADIENT_ORDER;
        assert_eq!(MeasurementLabel::find_in(&order, "ESPD_100A"), Some(MeasurementLabel::Blue100));
        assert_eq!(MeasurementLabel::find_in(&order, "run_0A"), Some(MeasurementLabel::Blue15));
        assert_eq!(MeasurementLabel::find_in(&order, "control"), None);
    }

    #[test]
    fn legend_and_gradient_lookups_use_their_own_order() {
        // 0B comes before 100V when picking a ramp, after it when naming
        assert_eq!(surface_legend_name("100V_0B"), "R100%");
        assert_eq!(surface_gradient("100V_0B"), MeasurementLabel::White15.gradient());
        assert_eq!(surface_legend_name("100A_0V"), "B100%");
        assert_eq!(surface_gradient("100A_0V"), MeasurementLabel::Red15.gradient());
    }

    #[test]
    fn legend_names_fall_back_to_group_name() {
        assert_eq!(spectral_legend_name("0T"), "RBW15%");
        assert_eq!(spectral_legend_name("dark"), "dark");
        // spectral lookup is exact, surface lookup is by substring
        assert_eq!(spectral_legend_name("trial_0T"), "trial_0T");
        assert_eq!(surface_legend_name("trial_0T"), "RBW15%");
        assert_eq!(surface_gradient("dark"), Gradient::FALLBACK);
    }
}
