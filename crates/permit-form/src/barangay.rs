//! Pasig City barangays and their postal codes.

use crate::spec::field::ChoiceOption;

pub const BARANGAYS: &[(&str, &str)] = &[
    ("Bagong Ilog", "1600"),
    ("Bagong Katipunan", "1600"),
    ("Bambang", "1600"),
    ("Buting", "1600"),
    ("Caniogan", "1606"),
    ("Dela Paz", "1600"),
    ("Kalawaan", "1600"),
    ("Kapasigan", "1600"),
    ("Kapitolyo", "1603"),
    ("Malinao", "1600"),
    ("Manggahan", "1611"),
    ("Maybunga", "1607"),
    ("Oranbo", "1600"),
    ("Palatiw", "1600"),
    ("Pinagbuhatan", "1602"),
    ("Pineda", "1600"),
    ("Rosario", "1609"),
    ("Sagad", "1600"),
    ("San Antonio", "1600"),
    ("San Joaquin", "1601"),
    ("San Jose", "1600"),
    ("San Miguel", "1600"),
    ("San Nicolas", "1600"),
    ("Santa Cruz", "1600"),
    ("Santa Lucia", "1608"),
    ("Santa Rosa", "1600"),
    ("Santo Tomas", "1600"),
    ("Santolan", "1610"),
    ("Ugong", "1604"),
    ("Green Park", "1612"),
];

pub fn zip_code_for(barangay: &str) -> Option<&'static str> {
    BARANGAYS
        .iter()
        .find(|(name, _)| *name == barangay)
        .map(|(_, zip)| *zip)
}

pub fn barangay_choices() -> Vec<ChoiceOption> {
    BARANGAYS
        .iter()
        .map(|(name, _)| ChoiceOption::plain(*name))
        .collect()
}
