use std::fmt::Debug;

use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::barangay::zip_code_for;
use crate::spec::form::{Derivation, FormSpec};
use crate::store::FieldStore;
use crate::value::FieldValue;

/// Source of "today" for age derivation and validation.
pub trait Clock: Debug + Send + Sync {
    fn today(&self) -> Date;
}

/// Wall clock shifted to a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Clock for a whole-hour offset; out-of-range values fall back to UTC.
    pub fn with_offset_hours(hours: i8) -> Self {
        Self::new(UtcOffset::from_hms(hours, 0, 0).unwrap_or(UtcOffset::UTC))
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::with_offset_hours(8)
    }
}

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().to_offset(self.offset).date()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

/// Parses `YYYY-MM-DD`, also accepting a trailing time part (`YYYY-MM-DDT...`).
pub fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    let date_part = raw.get(..10)?;
    if raw.len() > 10 && !raw[10..].starts_with('T') && !raw[10..].starts_with(' ') {
        return None;
    }
    let mut parts = date_part.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}

/// Whole years elapsed between `birthday` and `today`.
pub fn age_on(birthday: Date, today: Date) -> i32 {
    let mut age = today.year() - birthday.year();
    if (today.month() as u8, today.day()) < (birthday.month() as u8, birthday.day()) {
        age -= 1;
    }
    age
}

/// Age for a raw birthday value, `None` when absent, unparseable or in the future.
pub fn age_from_birthday(raw: &str, today: Date) -> Option<i64> {
    let birthday = parse_date(raw)?;
    let age = age_on(birthday, today);
    (age >= 0).then_some(i64::from(age))
}

/// Recomputes every derivation of the form and returns the updated record.
pub fn derive_all(spec: &FormSpec, fields: &FieldStore, today: Date) -> FieldStore {
    let mut derived = fields.clone();
    for derivation in &spec.derivations {
        apply(derivation, &mut derived, today);
    }
    derived
}

/// Recomputes only the derivations fed by `changed`.
pub fn derive_for(spec: &FormSpec, fields: &FieldStore, changed: &str, today: Date) -> FieldStore {
    let mut derived = fields.clone();
    for derivation in spec
        .derivations
        .iter()
        .filter(|derivation| derivation.source() == changed)
    {
        apply(derivation, &mut derived, today);
    }
    derived
}

// A cleared or unparseable source leaves the previous derived value in place.
fn apply(derivation: &Derivation, fields: &mut FieldStore, today: Date) {
    match derivation {
        Derivation::AgeFromBirthday { source, target } => {
            if let Some(age) = age_from_birthday(fields.text(source), today) {
                fields.set(target.clone(), FieldValue::Integer(age));
            }
        }
        Derivation::ZipFromBarangay { source, target } => {
            if let Some(zip) = zip_code_for(fields.text(source)) {
                fields.set(target.clone(), FieldValue::text(zip));
            }
        }
    }
}
