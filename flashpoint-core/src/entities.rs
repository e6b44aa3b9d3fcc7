//! Canonical conflict entities
//!
//! A static, ordered catalogue of the conflict zones the engine tracks.
//! Order is significant: the resolver evaluates patterns top to bottom and
//! the first match wins, so more specific names precede the shorter names
//! they contain (South Sudan before Sudan, Kashmir before India/Pakistan).

use serde::Serialize;

/// Conflict-index tier of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictTier {
    /// Top tier of the conflict index
    Extreme,
    /// Second tier of the conflict index
    High,
    /// Tracked flashpoint outside the index
    Watch,
}

/// A trackable entity with stable identity and reference coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalEntity {
    /// Stable id (kebab-case)
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Case-insensitive match pattern for free-text mentions
    #[serde(skip)]
    pub pattern: &'static str,
    /// Reference latitude
    pub lat: f64,
    /// Reference longitude
    pub lon: f64,
    /// ISO 3166-1 numeric code, when the entity is a country
    pub country_code: Option<&'static str>,
    pub tier: ConflictTier,
}

/// Default entity catalogue, in resolution priority order
pub static CONFLICT_ZONES: &[CanonicalEntity] = &[
    CanonicalEntity {
        id: "kashmir",
        name: "Kashmir",
        pattern: r"\bkashmir",
        lat: 33.8,
        lon: 76.5,
        country_code: None,
        tier: ConflictTier::Watch,
    },
    CanonicalEntity {
        id: "palestine",
        name: "Palestine",
        pattern: r"\bpalestin|\bgaza\b|\bwest\s+bank\b",
        lat: 31.4,
        lon: 34.4,
        country_code: Some("275"),
        tier: ConflictTier::Extreme,
    },
    CanonicalEntity {
        id: "myanmar",
        name: "Myanmar",
        pattern: r"\bmyanmar\b|\bburma\b",
        lat: 19.7,
        lon: 96.1,
        country_code: Some("104"),
        tier: ConflictTier::Extreme,
    },
    CanonicalEntity {
        id: "syria",
        name: "Syria",
        pattern: r"\bsyria",
        lat: 34.8,
        lon: 38.5,
        country_code: Some("760"),
        tier: ConflictTier::Extreme,
    },
    CanonicalEntity {
        id: "mexico",
        name: "Mexico",
        pattern: r"\bmexic",
        lat: 23.6,
        lon: -102.6,
        country_code: Some("484"),
        tier: ConflictTier::Extreme,
    },
    CanonicalEntity {
        id: "nigeria",
        name: "Nigeria",
        pattern: r"\bnigeria",
        lat: 9.1,
        lon: 8.7,
        country_code: Some("566"),
        tier: ConflictTier::Extreme,
    },
    CanonicalEntity {
        id: "ecuador",
        name: "Ecuador",
        pattern: r"\becuador",
        lat: -1.8,
        lon: -78.2,
        country_code: Some("218"),
        tier: ConflictTier::Extreme,
    },
    CanonicalEntity {
        id: "brazil",
        name: "Brazil",
        pattern: r"\bbrazil",
        lat: -14.2,
        lon: -51.9,
        country_code: Some("076"),
        tier: ConflictTier::Extreme,
    },
    CanonicalEntity {
        id: "haiti",
        name: "Haiti",
        pattern: r"\bhaiti",
        lat: 18.9,
        lon: -72.3,
        country_code: Some("332"),
        tier: ConflictTier::Extreme,
    },
    CanonicalEntity {
        id: "south-sudan",
        name: "South Sudan",
        pattern: r"\bsouth\s*sudan",
        lat: 6.9,
        lon: 31.3,
        country_code: Some("728"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "sudan",
        name: "Sudan",
        pattern: r"\bsudan",
        lat: 15.5,
        lon: 30.0,
        country_code: Some("729"),
        tier: ConflictTier::Extreme,
    },
    CanonicalEntity {
        id: "pakistan",
        name: "Pakistan",
        pattern: r"\bpakistan",
        lat: 30.4,
        lon: 69.3,
        country_code: Some("586"),
        tier: ConflictTier::Extreme,
    },
    CanonicalEntity {
        id: "cameroon",
        name: "Cameroon",
        pattern: r"\bcameroon",
        lat: 3.8,
        lon: 11.5,
        country_code: Some("120"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "central-african-republic",
        name: "Central African Republic",
        pattern: r"\bcentral\s*african\s*republic\b",
        lat: 6.6,
        lon: 20.9,
        country_code: Some("140"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "dr-congo",
        name: "DR Congo",
        pattern: r"\bdrc\b|\bdemocratic\s+republic\s+of\s+(?:the\s+)?congo\b|\bcongo\b",
        lat: -4.0,
        lon: 21.8,
        country_code: Some("180"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "ukraine",
        name: "Ukraine",
        pattern: r"\bukrain",
        lat: 48.4,
        lon: 31.2,
        country_code: Some("804"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "colombia",
        name: "Colombia",
        pattern: r"\bcolombia|\bcolumbia\b",
        lat: 4.7,
        lon: -74.1,
        country_code: Some("170"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "yemen",
        name: "Yemen",
        pattern: r"\byemen|\bhouthi|\bhuthi",
        lat: 15.5,
        lon: 48.5,
        country_code: Some("887"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "india",
        name: "India",
        pattern: r"\bindia\b",
        lat: 20.6,
        lon: 79.0,
        country_code: Some("356"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "guatemala",
        name: "Guatemala",
        pattern: r"\bguatemala",
        lat: 15.8,
        lon: -90.2,
        country_code: Some("320"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "somalia",
        name: "Somalia",
        pattern: r"\bsomali|\bal[\s-]?shabaab\b",
        lat: 5.2,
        lon: 46.2,
        country_code: Some("706"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "lebanon",
        name: "Lebanon",
        pattern: r"\bleban|\bhezbollah\b",
        lat: 33.9,
        lon: 35.5,
        country_code: Some("422"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "russia",
        name: "Russia",
        pattern: r"\brussia",
        lat: 61.5,
        lon: 105.3,
        country_code: Some("643"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "bangladesh",
        name: "Bangladesh",
        pattern: r"\bbangladesh",
        lat: 23.7,
        lon: 90.4,
        country_code: Some("050"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "ethiopia",
        name: "Ethiopia",
        pattern: r"\bethiopia|\btigray\b|\bamhara\b",
        lat: 9.0,
        lon: 40.5,
        country_code: Some("231"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "iraq",
        name: "Iraq",
        pattern: r"\biraq",
        lat: 33.3,
        lon: 44.4,
        country_code: Some("368"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "kenya",
        name: "Kenya",
        pattern: r"\bkenya",
        lat: -1.3,
        lon: 36.8,
        country_code: Some("404"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "honduras",
        name: "Honduras",
        pattern: r"\bhondura",
        lat: 15.2,
        lon: -86.2,
        country_code: Some("340"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "mali",
        name: "Mali",
        pattern: r"\bmali\b|\bmalian\b|\bsahel\b",
        lat: 12.7,
        lon: -8.0,
        country_code: Some("466"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "jamaica",
        name: "Jamaica",
        pattern: r"\bjamaica",
        lat: 18.1,
        lon: -77.3,
        country_code: Some("388"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "burundi",
        name: "Burundi",
        pattern: r"\bburundi",
        lat: -3.4,
        lon: 29.9,
        country_code: Some("108"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "philippines",
        name: "Philippines",
        pattern: r"\bphilippine|\bfilipino",
        lat: 12.9,
        lon: 122.0,
        country_code: Some("608"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "afghanistan",
        name: "Afghanistan",
        pattern: r"\bafghan",
        lat: 34.5,
        lon: 69.2,
        country_code: Some("004"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "trinidad-and-tobago",
        name: "Trinidad and Tobago",
        pattern: r"\btrinidad\b",
        lat: 10.7,
        lon: -61.5,
        country_code: Some("780"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "venezuela",
        name: "Venezuela",
        pattern: r"\bvenezuela",
        lat: 6.4,
        lon: -66.6,
        country_code: Some("862"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "libya",
        name: "Libya",
        pattern: r"\bliby",
        lat: 26.3,
        lon: 17.2,
        country_code: Some("434"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "niger",
        name: "Niger",
        pattern: r"\bniger\b",
        lat: 17.6,
        lon: 8.1,
        country_code: Some("562"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "burkina-faso",
        name: "Burkina Faso",
        pattern: r"\bburkina\b",
        lat: 12.4,
        lon: -1.6,
        country_code: Some("854"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "puerto-rico",
        name: "Puerto Rico",
        pattern: r"\bpuerto\s*ric",
        lat: 18.2,
        lon: -66.6,
        country_code: Some("630"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "mozambique",
        name: "Mozambique",
        pattern: r"\bmozambique",
        lat: -18.7,
        lon: 35.5,
        country_code: Some("508"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "iran",
        name: "Iran",
        pattern: r"\biran\b|\biranian\b",
        lat: 32.0,
        lon: 53.0,
        country_code: Some("364"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "uganda",
        name: "Uganda",
        pattern: r"\buganda",
        lat: 1.4,
        lon: 32.3,
        country_code: Some("800"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "israel",
        name: "Israel",
        pattern: r"\bisrael",
        lat: 31.8,
        lon: 35.2,
        country_code: Some("376"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "peru",
        name: "Peru",
        pattern: r"\bperu\b|\bperuvian\b",
        lat: -9.2,
        lon: -75.0,
        country_code: Some("604"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "ghana",
        name: "Ghana",
        pattern: r"\bghana",
        lat: 7.9,
        lon: -1.0,
        country_code: Some("288"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "indonesia",
        name: "Indonesia",
        pattern: r"\bindonesia",
        lat: -0.8,
        lon: 113.9,
        country_code: Some("360"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "chile",
        name: "Chile",
        pattern: r"\bchile\b|\bchilean\b",
        lat: -35.7,
        lon: -71.5,
        country_code: Some("152"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "south-africa",
        name: "South Africa",
        pattern: r"\bsouth\s*africa\b",
        lat: -30.6,
        lon: 22.9,
        country_code: Some("710"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "nepal",
        name: "Nepal",
        pattern: r"\bnepal",
        lat: 28.4,
        lon: 84.1,
        country_code: Some("524"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "belize",
        name: "Belize",
        pattern: r"\bbelize",
        lat: 17.2,
        lon: -88.5,
        country_code: Some("084"),
        tier: ConflictTier::High,
    },
    CanonicalEntity {
        id: "chad",
        name: "Chad",
        pattern: r"\bchad\b|\bchadian\b",
        lat: 15.5,
        lon: 18.7,
        country_code: Some("148"),
        tier: ConflictTier::High,
    },
];

/// Look up an entity by id
pub fn entity_by_id(id: &str) -> Option<&'static CanonicalEntity> {
    CONFLICT_ZONES.iter().find(|e| e.id == id)
}

/// Entities in a given tier, in table order
pub fn entities_in_tier(tier: ConflictTier) -> impl Iterator<Item = &'static CanonicalEntity> {
    CONFLICT_ZONES.iter().filter(move |e| e.tier == tier)
}

/// Long-running conflicts whose scores persist through quiet windows
pub static SEED_ENTITY_IDS: &[&str] = &[
    "ukraine",
    "sudan",
    "palestine",
    "yemen",
    "dr-congo",
    "ethiopia",
    "myanmar",
    "haiti",
    "somalia",
    "burkina-faso",
];
