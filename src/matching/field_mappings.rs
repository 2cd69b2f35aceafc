use crate::matching::field_model::FieldKind;
use crate::matching::field_model::FieldKind::{Email, Radio, Select, Tel, Text, Textarea, Url};
use crate::matching::normalize::normalize_text;

// ============================================================================
// Synonym Dictionary
// ============================================================================

/// One profile key and the label phrases that ask for it.
///
/// Synonyms are stored pre-normalized. `priority` is carried for callers
/// that want it; matching resolves purely by declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub profile_key: &'static str,
    pub synonyms: &'static [&'static str],
    pub kinds: &'static [FieldKind],
    pub priority: u32,
}

impl FieldMapping {
    /// Whether a field of `kind` may be filled from this mapping.
    pub fn accepts(&self, kind: FieldKind) -> bool {
        self.kinds.iter().any(|k| {
            *k == kind || (*k == FieldKind::Text && !kind.is_specially_typed())
        })
    }

    /// Whether this mapping asks a yes/no question.
    pub fn is_yes_no(&self) -> bool {
        YES_NO_KEYS.contains(&self.profile_key)
    }
}

/// Declaration order is significant: the first mapping that matches wins.
pub const FIELD_MAPPINGS: &[FieldMapping] = &[
    // Personal information
    FieldMapping {
        profile_key: "personal.firstName",
        synonyms: &[
            "first name",
            "firstname",
            "given name",
            "givenname",
            "legal first name",
            "forename",
            "first",
        ],
        kinds: &[Text],
        priority: 100,
    },
    FieldMapping {
        profile_key: "personal.lastName",
        synonyms: &[
            "last name",
            "lastname",
            "surname",
            "family name",
            "familyname",
            "legal last name",
            "last",
        ],
        kinds: &[Text],
        priority: 100,
    },
    FieldMapping {
        profile_key: "personal.email",
        synonyms: &[
            "email",
            "email address",
            "emailaddress",
            "work email",
            "personal email",
            "contact email",
        ],
        kinds: &[Email, Text],
        priority: 100,
    },
    FieldMapping {
        profile_key: "personal.phone",
        synonyms: &[
            "phone",
            "phone number",
            "phonenumber",
            "telephone",
            "tel",
            "mobile",
            "mobile number",
            "cell",
            "cell phone",
            "contact number",
            "primary phone",
        ],
        kinds: &[Tel, Text],
        priority: 95,
    },
    // Address
    FieldMapping {
        profile_key: "personal.address.street",
        synonyms: &[
            "street",
            "street address",
            "address",
            "address line 1",
            "address1",
            "addressline1",
            "street line 1",
            "home address",
            "residential address",
        ],
        kinds: &[Text, Textarea],
        priority: 80,
    },
    FieldMapping {
        profile_key: "personal.address.city",
        synonyms: &["city", "town", "municipality", "citytown"],
        kinds: &[Text],
        priority: 80,
    },
    FieldMapping {
        profile_key: "personal.address.state",
        synonyms: &[
            "state",
            "province",
            "stateprovince",
            "region",
            "state province",
            "stateregion",
        ],
        kinds: &[Text, Select],
        priority: 80,
    },
    FieldMapping {
        profile_key: "personal.address.country",
        synonyms: &["country", "countryregion", "nation", "country of residence"],
        kinds: &[Text, Select],
        priority: 80,
    },
    FieldMapping {
        profile_key: "personal.address.postalCode",
        synonyms: &[
            "postal code",
            "postalcode",
            "zip",
            "zip code",
            "zipcode",
            "pincode",
            "pin code",
            "postcode",
            "post code",
        ],
        kinds: &[Text],
        priority: 80,
    },
    // Links
    FieldMapping {
        profile_key: "personal.linkedInUrl",
        synonyms: &[
            "linkedin",
            "linkedin url",
            "linkedin profile",
            "linkedin link",
            "linkedin address",
        ],
        kinds: &[Text, Url],
        priority: 70,
    },
    FieldMapping {
        profile_key: "personal.portfolioUrl",
        synonyms: &[
            "portfolio",
            "portfolio url",
            "portfolio link",
            "website",
            "personal website",
            "personal site",
        ],
        kinds: &[Text, Url],
        priority: 60,
    },
    FieldMapping {
        profile_key: "personal.githubUrl",
        synonyms: &["github", "github url", "github profile", "github link"],
        kinds: &[Text, Url],
        priority: 60,
    },
    // Work authorization
    FieldMapping {
        profile_key: "workAuth.authorizedToWork",
        synonyms: &[
            "authorized to work",
            "authorizedtowork",
            "work authorization",
            "legally authorized",
            "eligible to work",
            "right to work",
            "legally eligible to work",
            "authorized to work in",
            "lawfully authorized",
        ],
        kinds: &[Radio, Select],
        priority: 90,
    },
    FieldMapping {
        profile_key: "workAuth.requiresSponsorship",
        synonyms: &[
            "sponsorship",
            "require sponsorship",
            "requires sponsorship",
            "visa sponsorship",
            "need sponsorship",
            "require visa",
            "immigration sponsorship",
            "work visa",
            "will you now or in the future require sponsorship",
        ],
        kinds: &[Radio, Select],
        priority: 90,
    },
    FieldMapping {
        profile_key: "workAuth.noticePeriod",
        synonyms: &[
            "notice period",
            "noticeperiod",
            "notice",
            "current notice period",
            "resignation notice",
            "how much notice",
        ],
        kinds: &[Text, Select],
        priority: 50,
    },
    FieldMapping {
        profile_key: "workAuth.willingToRelocate",
        synonyms: &[
            "relocate",
            "willing to relocate",
            "relocation",
            "open to relocation",
            "able to relocate",
        ],
        kinds: &[Radio, Select],
        priority: 50,
    },
];

const YES_NO_KEYS: &[&str] = &[
    "workAuth.authorizedToWork",
    "workAuth.requiresSponsorship",
    "workAuth.willingToRelocate",
];

// ============================================================================
// Yes/no answers
// ============================================================================

pub const YES_PATTERNS: &[&str] = &["yes", "true", "y", "1", "affirmative"];
pub const NO_PATTERNS: &[&str] = &["no", "false", "n", "0", "negative"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNoAnswer {
    Yes,
    No,
}

impl YesNoAnswer {
    /// Interpret an already-normalized value as an answer.
    pub fn from_normalized(value: &str) -> Option<YesNoAnswer> {
        if YES_PATTERNS.contains(&value) {
            Some(YesNoAnswer::Yes)
        } else if NO_PATTERNS.contains(&value) {
            Some(YesNoAnswer::No)
        } else {
            None
        }
    }

    pub fn patterns(self) -> &'static [&'static str] {
        match self {
            YesNoAnswer::Yes => YES_PATTERNS,
            YesNoAnswer::No => NO_PATTERNS,
        }
    }
}

/// True when the label carries a synonym of a yes/no mapping.
pub fn is_yes_no_question(label_text: &str) -> bool {
    let normalized = normalize_text(label_text);
    if normalized.is_empty() {
        return false;
    }
    FIELD_MAPPINGS
        .iter()
        .filter(|m| m.is_yes_no())
        .any(|m| m.synonyms.iter().any(|syn| normalized.contains(syn)))
}

pub fn mapping_for(profile_key: &str) -> Option<&'static FieldMapping> {
    FIELD_MAPPINGS.iter().find(|m| m.profile_key == profile_key)
}
