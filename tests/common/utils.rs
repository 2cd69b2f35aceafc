use std::path::PathBuf;

use apply_copilot::profile::profile_model::{
    Address, PersonalInfo, UserProfile, WorkAuthorization, YesNo,
};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

pub fn sample_profile() -> UserProfile {
    UserProfile {
        personal: PersonalInfo {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "555-0100".into(),
            address: Address {
                street: "12 St James's Square".into(),
                city: "London".into(),
                state: "".into(),
                country: "United Kingdom".into(),
                postal_code: "SW1Y 4JH".into(),
            },
            linked_in_url: "https://linkedin.com/in/ada".into(),
            portfolio_url: "".into(),
            github_url: "https://github.com/ada".into(),
        },
        work_auth: WorkAuthorization {
            authorized_to_work: YesNo::Yes,
            requires_sponsorship: YesNo::No,
            notice_period: "".into(),
            willing_to_relocate: YesNo::Unanswered,
        },
        last_updated: 0,
    }
}
