use serde::Serialize;

/// A selectable country in the assessment corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

/// Origin countries the platform currently serves.
pub const ORIGINS: &[Country] = &[
    Country { code: "IN", name: "India", flag: "🇮🇳" },
    Country { code: "CN", name: "China", flag: "🇨🇳" },
    Country { code: "PH", name: "Philippines", flag: "🇵🇭" },
    Country { code: "MX", name: "Mexico", flag: "🇲🇽" },
    Country { code: "BR", name: "Brazil", flag: "🇧🇷" },
    Country { code: "NG", name: "Nigeria", flag: "🇳🇬" },
    Country { code: "PK", name: "Pakistan", flag: "🇵🇰" },
    Country { code: "BD", name: "Bangladesh", flag: "🇧🇩" },
];

/// Supported destination countries.
pub const DESTINATIONS: &[Country] = &[
    Country { code: "CA", name: "Canada", flag: "🇨🇦" },
    Country { code: "US", name: "USA", flag: "🇺🇸" },
    Country { code: "AU", name: "Australia", flag: "🇦🇺" },
];

pub fn origin(code: &str) -> Option<&'static Country> {
    ORIGINS.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

pub fn destination(code: &str) -> Option<&'static Country> {
    DESTINATIONS
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
}
