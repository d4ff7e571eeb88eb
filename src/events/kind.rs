//! # Host event kinds.
//!
//! [`EventKind`] mirrors the host's numeric event codes (`0..=38`). It serializes as the bare
//! code, which is what `createEventProducer` filters and incoming notifications (`id`) use.

use serde::{Deserialize, Serialize};

/// Classification of host events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EventKind {
    Invalid = 0,
    Shot = 1,
    Hit = 2,
    TakeOff = 3,
    Land = 4,
    Crash = 5,
    Ejection = 6,
    Refueling = 7,
    Dead = 8,
    PilotDead = 9,
    BaseCaptured = 10,
    MissionStart = 11,
    MissionEnd = 12,
    TookControl = 13,
    RefuelingStop = 14,
    Birth = 15,
    HumanFailure = 16,
    DetailedFailure = 17,
    EngineStartup = 18,
    EngineShutdown = 19,
    PlayerEnterUnit = 20,
    PlayerLeaveUnit = 21,
    PlayerComment = 22,
    ShootingStart = 23,
    ShootingEnd = 24,
    MarkAdded = 25,
    MarkChange = 26,
    MarkRemoved = 27,
    Kill = 28,
    Score = 29,
    UnitLost = 30,
    LandingAfterEjection = 31,
    /// Host spelling kept.
    ParatrooperLending = 32,
    DiscardChairAfterEjection = 33,
    WeaponAdd = 34,
    TriggerZone = 35,
    LandingQualityMark = 36,
    Bda = 37,
    Max = 38,
}

impl EventKind {
    /// Every kind, in code order.
    pub const ALL: [EventKind; 39] = [
        EventKind::Invalid,
        EventKind::Shot,
        EventKind::Hit,
        EventKind::TakeOff,
        EventKind::Land,
        EventKind::Crash,
        EventKind::Ejection,
        EventKind::Refueling,
        EventKind::Dead,
        EventKind::PilotDead,
        EventKind::BaseCaptured,
        EventKind::MissionStart,
        EventKind::MissionEnd,
        EventKind::TookControl,
        EventKind::RefuelingStop,
        EventKind::Birth,
        EventKind::HumanFailure,
        EventKind::DetailedFailure,
        EventKind::EngineStartup,
        EventKind::EngineShutdown,
        EventKind::PlayerEnterUnit,
        EventKind::PlayerLeaveUnit,
        EventKind::PlayerComment,
        EventKind::ShootingStart,
        EventKind::ShootingEnd,
        EventKind::MarkAdded,
        EventKind::MarkChange,
        EventKind::MarkRemoved,
        EventKind::Kill,
        EventKind::Score,
        EventKind::UnitLost,
        EventKind::LandingAfterEjection,
        EventKind::ParatrooperLending,
        EventKind::DiscardChairAfterEjection,
        EventKind::WeaponAdd,
        EventKind::TriggerZone,
        EventKind::LandingQualityMark,
        EventKind::Bda,
        EventKind::Max,
    ];

    /// Numeric host code.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Looks a kind up by its host code.
    #[inline]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Returns `true` for the mark panel kinds (`MarkAdded`, `MarkChange`, `MarkRemoved`).
    pub fn is_mark(self) -> bool {
        matches!(
            self,
            EventKind::MarkAdded | EventKind::MarkChange | EventKind::MarkRemoved
        )
    }
}

impl From<EventKind> for u8 {
    fn from(kind: EventKind) -> Self {
        kind.code()
    }
}

impl TryFrom<u8> for EventKind {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        EventKind::from_code(code).ok_or_else(|| format!("unknown event kind {code}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_table_order() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(usize::from(kind.code()), i);
        }
        assert_eq!(EventKind::from_code(37), Some(EventKind::Bda));
        assert_eq!(EventKind::from_code(39), None);
    }

    #[test]
    fn test_serde_uses_code() {
        assert_eq!(serde_json::to_string(&EventKind::Birth).unwrap(), "15");
        assert_eq!(
            serde_json::from_str::<EventKind>("28").unwrap(),
            EventKind::Kill
        );
        assert!(serde_json::from_str::<EventKind>("120").is_err());
    }
}
