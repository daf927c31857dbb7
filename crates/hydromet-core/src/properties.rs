// hydromet-core/src/properties.rs
// ============================================================================
// Module: Property Lists
// Description: Ordered name/value property collections on model objects.
// Purpose: Carry free-form per-entity settings persisted to property tables.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Several entities carry open-ended name/value properties (platform
//! properties, platform sensor properties, routing spec properties). Names
//! are matched case-insensitively, following the behavior of the legacy
//! property tables; insertion order is preserved so generated rows are
//! deterministic.

// ============================================================================
// SECTION: Types
// ============================================================================

/// A single name/value property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name; compared case-insensitively.
    pub name: String,
    /// Property value.
    pub value: String,
}

impl Property {
    /// Creates a property from name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered property collection.
pub type PropertyList = Vec<Property>;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the value of the named property, matching case-insensitively.
#[must_use]
pub fn get<'a>(list: &'a [Property], name: &str) -> Option<&'a str> {
    list.iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(|p| p.value.as_str())
}

/// Sets the named property, replacing an existing case-insensitive match.
pub fn set(list: &mut PropertyList, name: &str, value: &str) {
    if let Some(existing) = list.iter_mut().find(|p| p.name.eq_ignore_ascii_case(name)) {
        existing.value = value.to_string();
    } else {
        list.push(Property::new(name, value));
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::Property;
    use super::get;
    use super::set;

    #[test]
    fn set_replaces_case_insensitive_match() {
        let mut list = vec![Property::new("Timeout", "30")];
        set(&mut list, "TIMEOUT", "60");
        assert_eq!(list.len(), 1);
        assert_eq!(get(&list, "timeout"), Some("60"));
    }

    #[test]
    fn set_appends_new_name() {
        let mut list = Vec::new();
        set(&mut list, "debug", "true");
        assert_eq!(get(&list, "DEBUG"), Some("true"));
        assert_eq!(get(&list, "missing"), None);
    }
}
