//! Well-known columns of the crash dataset.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Columns the crash report relies on, by their cleaned names.
///
/// Implements `AsRef<str>`, so a variant can be passed anywhere a column
/// name is resolved against a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrashColumn {
    DateOfCrash,
    Age,
    Gender,
    District,
    DayOfWeek,
    BloodAlcohol,
    Speed,
    Deceased,
    VehiclesInvolved,
    Year,
    /// Derived: "yes"/"no" from `Blood.alcohol`
    AlcoholInSystem,
    /// Derived: bucketed `Age`
    AgeRange,
}

impl CrashColumn {
    /// Every well-known column, source columns first.
    pub const ALL: [CrashColumn; 12] = [
        CrashColumn::DateOfCrash,
        CrashColumn::Age,
        CrashColumn::Gender,
        CrashColumn::District,
        CrashColumn::DayOfWeek,
        CrashColumn::BloodAlcohol,
        CrashColumn::Speed,
        CrashColumn::Deceased,
        CrashColumn::VehiclesInvolved,
        CrashColumn::Year,
        CrashColumn::AlcoholInSystem,
        CrashColumn::AgeRange,
    ];

    /// Column name after cleaning.
    pub fn name(self) -> &'static str {
        match self {
            CrashColumn::DateOfCrash => "Date.of.crash",
            CrashColumn::Age => "Age",
            CrashColumn::Gender => "Gender",
            CrashColumn::District => "District",
            CrashColumn::DayOfWeek => "Day.of.Week",
            CrashColumn::BloodAlcohol => "Blood.alcohol",
            CrashColumn::Speed => "speed",
            CrashColumn::Deceased => "no.deceased",
            CrashColumn::VehiclesInvolved => "no.vehicles.involved",
            CrashColumn::Year => "year",
            CrashColumn::AlcoholInSystem => "alcohol_in_system",
            CrashColumn::AgeRange => "age_range",
        }
    }

    /// Column name as it appears in the source workbook, when it differs.
    pub fn source_name(self) -> &'static str {
        match self {
            CrashColumn::Deceased => "#.deceased",
            CrashColumn::VehiclesInvolved => "#.vehicles.involved",
            other => other.name(),
        }
    }

    /// Whether the column is computed rather than loaded.
    pub fn is_derived(self) -> bool {
        matches!(self, CrashColumn::AlcoholInSystem | CrashColumn::AgeRange)
    }
}

impl AsRef<str> for CrashColumn {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl std::fmt::Display for CrashColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CrashColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CrashColumn::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s || c.source_name() == s)
            .ok_or_else(|| format!("Unknown crash column: {}", s))
    }
}
