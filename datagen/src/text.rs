//! Realistic-looking names and mail addresses for generated users.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

const FIRST_NAMES: &[&str] = &[
    "Aisha", "Alejandro", "Amelia", "Andre", "Anna", "Benjamin", "Camille", "Carlos", "Chen",
    "Chloe", "Daniel", "David", "Elena", "Emma", "Fatima", "Gabriel", "Grace", "Hamza", "Hannah",
    "Hiroshi", "Ines", "Isaac", "Jack", "James", "Julia", "Karim", "Laura", "Leila", "Liam",
    "Lucas", "Maria", "Mateo", "Mei", "Mohamed", "Nadia", "Noah", "Olivia", "Omar", "Priya",
    "Rachel", "Rafael", "Samir", "Sara", "Sofia", "Thomas", "Victor", "Yasmine", "Youssef",
    "Zoe", "O'Neil",
];

const LAST_NAMES: &[&str] = &[
    "Alaoui", "Anderson", "Bennani", "Brown", "Chen", "Clark", "Da Silva", "Dubois", "El Amrani",
    "Fernandez", "Garcia", "Gonzalez", "Harris", "Hernandez", "Ito", "Jackson", "Johnson", "Kim",
    "Lee", "Lopez", "Martin", "Martinez", "Miller", "Moore", "Nguyen", "O'Brien", "Patel",
    "Perez", "Robinson", "Rodriguez", "Rossi", "Sanchez", "Schmidt", "Smith", "Tanaka", "Taylor",
    "Thomas", "Thompson", "Walker", "White", "Williams", "Wilson", "Young", "Zhang",
];

const MAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "proton.me",
    "icloud.com",
];

/// Source of plausible free-text field values.
///
/// Values only need to look realistic; uniqueness is "good enough" rather
/// than guaranteed, callers that need hard uniqueness derive values from ids.
pub trait TextProvider {
    fn full_name(&mut self, rng: &mut dyn RngCore) -> String;

    /// An address loosely derived from `full_name`
    fn email(&mut self, rng: &mut dyn RngCore, full_name: &str) -> String;
}

/// Word-list backed [`TextProvider`]
#[derive(Debug, Default, Clone, Copy)]
pub struct NameBank;

impl TextProvider for NameBank {
    fn full_name(&mut self, rng: &mut dyn RngCore) -> String {
        let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
        let last = LAST_NAMES.choose(rng).copied().unwrap_or("Doe");
        format!("{first} {last}")
    }

    fn email(&mut self, rng: &mut dyn RngCore, full_name: &str) -> String {
        let local: String = full_name
            .to_lowercase()
            .split_whitespace()
            .map(|part| part.chars().filter(char::is_ascii_alphanumeric).collect::<String>())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(".");
        let suffix: u32 = rng.gen_range(0..100_000);
        let domain = MAIL_DOMAINS.choose(rng).copied().unwrap_or("example.com");
        format!("{local}{suffix}@{domain}")
    }
}
