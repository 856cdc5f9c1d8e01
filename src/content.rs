//! Fixed marketing content served by the FAQ and authority endpoints.

use crate::models::{AuthoritySignals, Badge, FaqItem, FaqResponse, PressMention};

const FAQ: [(&str, &str); 4] = [
    (
        "Why invest in premium water treatment?",
        "For health, taste, and protection. Our systems reduce chlorine, heavy metals, PFAS, and scale—preserving skin and hair, extending appliance life, and elevating everyday wellness.",
    ),
    (
        "How do you design the right system for my home?",
        "We begin with a water profile assessment, discuss lifestyle needs (spa/showers, tea/coffee, infant needs), evaluate pipework and space, then tailor a whole-home and drinking water solution.",
    ),
    (
        "What ongoing care is required?",
        "Most systems require only scheduled media changes or cartridge replacements. We provide concierge service and reminders, with optional annual wellness checks.",
    ),
    (
        "Do your systems remove PFAS and lead?",
        "Yes—our multi-stage filtration and certified media target PFAS, lead, and other contaminants. We select components with third‑party certifications and provide transparent performance specs.",
    ),
];

const BADGES: [(&str, &str); 3] = [
    ("Certified Water Specialist", "WQA"),
    ("Licensed & Insured", "State"),
    ("5‑Star Client Reviews", "Verified"),
];

const PRESS: [(&str, u16); 2] = [("Wellness Journal", 2024), ("Home & Design", 2023)];

pub fn faq() -> FaqResponse {
    FaqResponse {
        items: FAQ
            .iter()
            .map(|(q, a)| FaqItem {
                q: q.to_string(),
                a: a.to_string(),
            })
            .collect(),
    }
}

pub fn authority() -> AuthoritySignals {
    AuthoritySignals {
        badges: BADGES
            .iter()
            .map(|(label, issuer)| Badge {
                label: label.to_string(),
                issuer: issuer.to_string(),
            })
            .collect(),
        press: PRESS
            .iter()
            .map(|(name, year)| PressMention {
                name: name.to_string(),
                year: *year,
            })
            .collect(),
    }
}
