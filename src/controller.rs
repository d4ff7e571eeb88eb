//! # AI controller options.
//!
//! The host's `setOption(option, value)` accepts a different value type for every option and a
//! different option set per unit domain. Here each domain is its own enum and each variant
//! carries only the value type that option accepts, so an illegal pair cannot be built.
//!
//! ## Example
//! ```rust
//! use dcs_bridge::controller::{AirOption, AirRoe, ControllerOption};
//!
//! let opt: ControllerOption = AirOption::Roe(AirRoe::WeaponHold).into();
//! assert_eq!(opt.code(), 0);
//! assert_eq!(opt.value(), serde_json::json!(4));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::bridge::Bridge;
use crate::error::BridgeError;

/// Unit or group whose AI controller is addressed. Wire form `{"unit": name}` / `{"group": name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Controlled {
    Unit(String),
    Group(String),
}

/// Rules of engagement for ground and naval units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Roe {
    OpenFire = 2,
    ReturnFire = 3,
    WeaponHold = 4,
}

/// Rules of engagement for aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirRoe {
    WeaponFree = 0,
    OpenFireWeaponFree = 1,
    OpenFire = 2,
    ReturnFire = 3,
    WeaponHold = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOnThreat {
    NoReaction = 0,
    PassiveDefence = 1,
    EvadeFire = 2,
    BypassAndEscape = 3,
    AllowAbortMission = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadarUsing {
    Never = 0,
    ForAttackOnly = 1,
    ForSearchIfRequired = 2,
    ForContinuousSearch = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlareUsing {
    Never = 0,
    AgainstFiredMissile = 1,
    WhenFlyingInSamWez = 2,
    WhenFlyingNearEnemies = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcmUsing {
    NeverUse = 0,
    UseIfOnlyLockByRadar = 1,
    UseIfDetectedLockByRadar = 2,
    AlwaysUse = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissileAttack {
    MaxRange = 0,
    NezRange = 1,
    HalfWayRmaxNez = 2,
    TargetThreatEst = 3,
    RandomRange = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Auto = 0,
    Green = 1,
    Red = 2,
}

/// Options for aircraft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AirOption {
    Roe(AirRoe),
    ReactionOnThreat(ReactionOnThreat),
    RadarUsing(RadarUsing),
    FlareUsing(FlareUsing),
    /// Formation code.
    Formation(u32),
    RtbOnBingo(bool),
    Silence(bool),
    /// Weapon flag mask.
    RtbOnOutOfAmmo(u64),
    EcmUsing(EcmUsing),
    ProhibitAa(bool),
    ProhibitJett(bool),
    ProhibitAb(bool),
    ProhibitAg(bool),
    MissileAttack(MissileAttack),
    ProhibitWpPassReport(bool),
    /// Target attribute mask.
    RadioUsageContact(u64),
    RadioUsageEngage(u64),
    RadioUsageKill(u64),
    JettTanksIfEmpty(bool),
    ForcedAttack(bool),
}

impl AirOption {
    pub fn code(&self) -> u8 {
        match self {
            AirOption::Roe(_) => 0,
            AirOption::ReactionOnThreat(_) => 1,
            AirOption::RadarUsing(_) => 3,
            AirOption::FlareUsing(_) => 4,
            AirOption::Formation(_) => 5,
            AirOption::RtbOnBingo(_) => 6,
            AirOption::Silence(_) => 7,
            AirOption::RtbOnOutOfAmmo(_) => 10,
            AirOption::EcmUsing(_) => 13,
            AirOption::ProhibitAa(_) => 14,
            AirOption::ProhibitJett(_) => 15,
            AirOption::ProhibitAb(_) => 16,
            AirOption::ProhibitAg(_) => 17,
            AirOption::MissileAttack(_) => 18,
            AirOption::ProhibitWpPassReport(_) => 19,
            AirOption::RadioUsageContact(_) => 21,
            AirOption::RadioUsageEngage(_) => 22,
            AirOption::RadioUsageKill(_) => 23,
            AirOption::JettTanksIfEmpty(_) => 25,
            AirOption::ForcedAttack(_) => 26,
        }
    }

    pub fn value(&self) -> Value {
        match *self {
            AirOption::Roe(v) => json!(v as u8),
            AirOption::ReactionOnThreat(v) => json!(v as u8),
            AirOption::RadarUsing(v) => json!(v as u8),
            AirOption::FlareUsing(v) => json!(v as u8),
            AirOption::EcmUsing(v) => json!(v as u8),
            AirOption::MissileAttack(v) => json!(v as u8),
            AirOption::Formation(n) => json!(n),
            AirOption::RtbOnOutOfAmmo(mask)
            | AirOption::RadioUsageContact(mask)
            | AirOption::RadioUsageEngage(mask)
            | AirOption::RadioUsageKill(mask) => json!(mask),
            AirOption::RtbOnBingo(b)
            | AirOption::Silence(b)
            | AirOption::ProhibitAa(b)
            | AirOption::ProhibitJett(b)
            | AirOption::ProhibitAb(b)
            | AirOption::ProhibitAg(b)
            | AirOption::ProhibitWpPassReport(b)
            | AirOption::JettTanksIfEmpty(b)
            | AirOption::ForcedAttack(b) => json!(b),
        }
    }
}

/// Options for ground units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundOption {
    Roe(Roe),
    Formation(u32),
    /// Seconds to disperse for after coming under attack.
    DisperseOnAttack(u32),
    AlarmState(AlarmState),
    EngageAirWeapons(bool),
    /// Percent of maximum engagement range, `0..=100`.
    AcEngagementRangeRestriction(u8),
    /// Metres.
    RestrictAaaMin(f64),
    RestrictTargets(u32),
    /// Metres.
    RestrictAaaMax(f64),
}

impl GroundOption {
    pub fn code(&self) -> u8 {
        match self {
            GroundOption::Roe(_) => 0,
            GroundOption::Formation(_) => 5,
            GroundOption::DisperseOnAttack(_) => 8,
            GroundOption::AlarmState(_) => 9,
            GroundOption::EngageAirWeapons(_) => 20,
            GroundOption::AcEngagementRangeRestriction(_) => 24,
            GroundOption::RestrictAaaMin(_) => 27,
            GroundOption::RestrictTargets(_) => 28,
            GroundOption::RestrictAaaMax(_) => 29,
        }
    }

    pub fn value(&self) -> Value {
        match *self {
            GroundOption::Roe(v) => json!(v as u8),
            GroundOption::AlarmState(v) => json!(v as u8),
            GroundOption::Formation(n)
            | GroundOption::DisperseOnAttack(n)
            | GroundOption::RestrictTargets(n) => json!(n),
            GroundOption::EngageAirWeapons(b) => json!(b),
            GroundOption::AcEngagementRangeRestriction(pct) => json!(pct.min(100)),
            GroundOption::RestrictAaaMin(m) | GroundOption::RestrictAaaMax(m) => json!(m),
        }
    }
}

/// Options for ships.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavalOption {
    Roe(Roe),
}

impl NavalOption {
    pub fn code(&self) -> u8 {
        match self {
            NavalOption::Roe(_) => 0,
        }
    }

    pub fn value(&self) -> Value {
        match *self {
            NavalOption::Roe(v) => json!(v as u8),
        }
    }
}

/// An option from any domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerOption {
    Air(AirOption),
    Ground(GroundOption),
    Naval(NavalOption),
}

impl ControllerOption {
    /// Host option code.
    pub fn code(&self) -> u8 {
        match self {
            ControllerOption::Air(o) => o.code(),
            ControllerOption::Ground(o) => o.code(),
            ControllerOption::Naval(o) => o.code(),
        }
    }

    /// Host option value.
    pub fn value(&self) -> Value {
        match self {
            ControllerOption::Air(o) => o.value(),
            ControllerOption::Ground(o) => o.value(),
            ControllerOption::Naval(o) => o.value(),
        }
    }
}

impl From<AirOption> for ControllerOption {
    fn from(o: AirOption) -> Self {
        ControllerOption::Air(o)
    }
}

impl From<GroundOption> for ControllerOption {
    fn from(o: GroundOption) -> Self {
        ControllerOption::Ground(o)
    }
}

impl From<NavalOption> for ControllerOption {
    fn from(o: NavalOption) -> Self {
        ControllerOption::Naval(o)
    }
}

/// Sets one AI option on a unit or group.
pub async fn set_option(
    bridge: &Bridge,
    controller: &Controlled,
    option: impl Into<ControllerOption>,
) -> Result<(), BridgeError> {
    let option = option.into();
    debug!(?controller, ?option, "setting controller option");
    bridge
        .invoke(
            "controllerSetOption",
            Some(json!({
                "controller": controller,
                "option": option.code(),
                "value": option.value(),
            })),
        )
        .await?;
    Ok(())
}

/// Turns a unit's or group's AI on or off.
pub async fn set_enabled(
    bridge: &Bridge,
    controller: &Controlled,
    enabled: bool,
) -> Result<(), BridgeError> {
    bridge
        .invoke(
            "controllerSetOnOff",
            Some(json!({ "controller": controller, "value": enabled })),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHost;

    #[test]
    fn test_codes_and_values() {
        let cases: Vec<(ControllerOption, u8, Value)> = vec![
            (AirOption::ReactionOnThreat(ReactionOnThreat::EvadeFire).into(), 1, json!(2)),
            (AirOption::ProhibitAb(true).into(), 16, json!(true)),
            (AirOption::MissileAttack(MissileAttack::NezRange).into(), 18, json!(1)),
            (AirOption::ForcedAttack(false).into(), 26, json!(false)),
            (GroundOption::AlarmState(AlarmState::Red).into(), 9, json!(2)),
            (GroundOption::AcEngagementRangeRestriction(150).into(), 24, json!(100)),
            (GroundOption::RestrictAaaMax(3000.0).into(), 29, json!(3000.0)),
            (NavalOption::Roe(Roe::ReturnFire).into(), 0, json!(3)),
        ];
        for (opt, code, value) in cases {
            assert_eq!(opt.code(), code, "{opt:?}");
            assert_eq!(opt.value(), value, "{opt:?}");
        }
    }

    #[tokio::test]
    async fn test_set_option_and_enabled_payloads() {
        let host = MockHost::new();
        let bridge = host.bridge();
        let sam = Controlled::Group("SA-10".into());

        set_option(&bridge, &sam, GroundOption::AlarmState(AlarmState::Green))
            .await
            .unwrap();
        set_enabled(&bridge, &Controlled::Unit("Ship-1".into()), false)
            .await
            .unwrap();

        assert_eq!(
            host.calls_to("controllerSetOption")[0],
            json!({"controller": {"group": "SA-10"}, "option": 9, "value": 1})
        );
        assert_eq!(
            host.calls_to("controllerSetOnOff")[0],
            json!({"controller": {"unit": "Ship-1"}, "value": false})
        );
    }
}
