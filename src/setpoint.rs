use serde::{Deserialize, Serialize};

/// Mechanism units per inch of carriage travel.
pub const INCH: f64 = 0.0254;

const ZERO: f64 = 0.0;
const GROUND: f64 = 0.0;
const HIGH_GROUND: f64 = 0.60;
const STOW: f64 = 0.31;
const EJECT: f64 = STOW + 2.0 * INCH;
const PROCESSOR: f64 = 0.0;
const L1: f64 = 2.63;
const SECONDARY_L1: f64 = L1 + 8.0 * INCH;
const L2: f64 = 4.016 + 4.0 * INCH;
const L3: f64 = 7.257 - 4.0 * INCH;
const L4: f64 = 9.757 + 0.3 * INCH;
const NET: f64 = 9.31 + 4.0 * INCH;
const LOWER_REEF: f64 = 2.0;
const UPPER_REEF: f64 = 4.5 - 3.0 * INCH;

/// Named target heights for the elevator carriage.
///
/// Positions are fixed at compile time; derived entries (e.g. [`Setpoint::Eject`])
/// are resolved from their base constant at definition, never at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setpoint {
    /// Lowest carriage position.
    Zero,
    /// Ground algae intake.
    Ground,
    /// Raised ground intake.
    HighGround,
    /// Home position, also the coral intake height.
    Stow,
    /// Slightly above stow to eject a stuck coral.
    Eject,
    /// Processor scoring height.
    Processor,
    /// L1 scoring height.
    L1,
    /// L1 with a coral already on the branch.
    SecondaryL1,
    /// L2 scoring height.
    L2,
    /// L3 scoring height.
    L3,
    /// L4 scoring height.
    L4,
    /// Net scoring height.
    Net,
    /// Algae intake from the lower reef.
    LowerReef,
    /// Algae intake from the upper reef.
    UpperReef,
}

impl Setpoint {
    pub const ALL: [Setpoint; 14] = [
        Setpoint::Zero,
        Setpoint::Ground,
        Setpoint::HighGround,
        Setpoint::Stow,
        Setpoint::Eject,
        Setpoint::Processor,
        Setpoint::L1,
        Setpoint::SecondaryL1,
        Setpoint::L2,
        Setpoint::L3,
        Setpoint::L4,
        Setpoint::Net,
        Setpoint::LowerReef,
        Setpoint::UpperReef,
    ];

    /// Target height in mechanism units.
    pub const fn position(self) -> f64 {
        match self {
            Setpoint::Zero => ZERO,
            Setpoint::Ground => GROUND,
            Setpoint::HighGround => HIGH_GROUND,
            Setpoint::Stow => STOW,
            Setpoint::Eject => EJECT,
            Setpoint::Processor => PROCESSOR,
            Setpoint::L1 => L1,
            Setpoint::SecondaryL1 => SECONDARY_L1,
            Setpoint::L2 => L2,
            Setpoint::L3 => L3,
            Setpoint::L4 => L4,
            Setpoint::Net => NET,
            Setpoint::LowerReef => LOWER_REEF,
            Setpoint::UpperReef => UPPER_REEF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_offsets_resolve_from_base_constants() {
        assert_eq!(Setpoint::Eject.position(), 0.31 + 2.0 * 0.0254);
        assert_eq!(Setpoint::SecondaryL1.position(), 2.63 + 8.0 * 0.0254);
        assert_eq!(Setpoint::UpperReef.position(), 4.5 - 3.0 * 0.0254);
        assert_eq!(Setpoint::Net.position(), 9.31 + 4.0 * 0.0254);
    }

    #[test]
    fn wire_names_are_snake_case() {
        let json = serde_json::to_string(&Setpoint::SecondaryL1).unwrap();
        assert_eq!(json, r#""secondary_l1""#);
        let parsed: Setpoint = serde_json::from_str(r#""high_ground""#).unwrap();
        assert_eq!(parsed, Setpoint::HighGround);
    }

    #[test]
    fn table_is_ordered_within_travel() {
        for s in Setpoint::ALL {
            assert!(s.position() >= 0.0, "{s:?} below zero");
            assert!(s.position() <= 10.0, "{s:?} beyond travel");
        }
    }
}
