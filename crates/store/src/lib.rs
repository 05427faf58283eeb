//! # pharmhand Store
//!
//! The read-only in-memory dataset of users and medications, loaded once
//! at process start and never mutated. Lookups are the only operations:
//! user ids match after trimming, medication names match after trimming
//! and case folding. Because nothing writes, the store needs no locking
//! and is shared between requests behind an `Arc`.

use serde::{Deserialize, Serialize};

/// A pharmacy customer with the medications they hold a prescription for.
///
/// Prescription names preserve their stored case and match medication
/// records case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub prescriptions: Vec<String>,
}

impl User {
    /// Whether this user holds a prescription for the given canonical
    /// medication name.
    pub fn holds_prescription_for(&self, canonical_name: &str) -> bool {
        let wanted = canonical_name.trim().to_lowercase();
        self.prescriptions
            .iter()
            .any(|p| p.trim().to_lowercase() == wanted)
    }
}

/// Label-style structured dosage guidance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DosageInstruction {
    pub dose_amount: String,
    pub frequency: String,
    pub max_daily: String,
}

/// A medication record. `name` is the unique, case-insensitive key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub active_ingredient: String,
    pub requires_prescription: bool,
    pub dosage_instruction: DosageInstruction,
    pub usage_instructions: String,
    pub safety_instructions: String,
    pub stock: u32,
}

/// The in-memory lookup store.
pub struct LookupStore {
    users: Vec<User>,
    medications: Vec<Medication>,
}

impl LookupStore {
    pub fn new(users: Vec<User>, medications: Vec<Medication>) -> Self {
        Self { users, medications }
    }

    /// Find a user by identifier. The identifier is trimmed before
    /// matching; an empty identifier never matches.
    pub fn find_user(&self, user_id: &str) -> Option<&User> {
        let wanted = user_id.trim();
        if wanted.is_empty() {
            return None;
        }
        self.users.iter().find(|u| u.user_id == wanted)
    }

    /// Find a medication by name, case-insensitively, ignoring leading
    /// and trailing whitespace. An empty name never matches.
    pub fn find_medication(&self, name: &str) -> Option<&Medication> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.medications
            .iter()
            .find(|m| m.name.to_lowercase() == wanted)
    }

    /// The built-in retail dataset.
    pub fn seeded() -> Self {
        Self::new(seed_users(), seed_medications())
    }
}

fn seed_users() -> Vec<User> {
    let user = |user_id: &str, name: &str, prescriptions: &[&str]| User {
        user_id: user_id.into(),
        name: name.into(),
        prescriptions: prescriptions.iter().map(|p| p.to_string()).collect(),
    };

    vec![
        user("u001", "Einat Shvartz", &["Amoxicillin", "Metformin"]),
        user("u002", "Guy Lurya", &[]),
        user("u003", "Noa Kasher", &["Amoxicillin"]),
        user("u004", "Amit Wiez", &[]),
        user("u005", "Lea London", &["Metformin"]),
        user("u006", "Maya Rubin", &[]),
        user("u007", "Tamar Levi", &["Amoxicillin"]),
        user("u008", "Tair Cohen", &[]),
        user("u009", "Nicole Kaplan", &["Metformin"]),
        user("u010", "Omri Paz", &[]),
    ]
}

fn seed_medications() -> Vec<Medication> {
    vec![
        Medication {
            name: "Paracetamol".into(),
            active_ingredient: "Acetaminophen".into(),
            requires_prescription: false,
            dosage_instruction: DosageInstruction {
                dose_amount: "500 mg".into(),
                frequency: "every 4–6 hours".into(),
                max_daily: "Do not exceed 4,000 mg in 24 hours (label guidance).".into(),
            },
            usage_instructions: "Take with water. Follow the package directions.".into(),
            safety_instructions: "Do not use if you are allergic to acetaminophen. \
                Avoid combining with other products containing acetaminophen. \
                Follow the label and consult a healthcare professional for personal medical advice."
                .into(),
            stock: 42,
        },
        Medication {
            name: "Ibuprofen".into(),
            active_ingredient: "Ibuprofen".into(),
            requires_prescription: false,
            dosage_instruction: DosageInstruction {
                dose_amount: "200–400 mg".into(),
                frequency: "every 6–8 hours".into(),
                max_daily: "Do not exceed 1,200 mg in 24 hours unless directed by a clinician (label guidance).".into(),
            },
            usage_instructions:
                "Take with food or milk to reduce stomach upset. Follow the package directions."
                    .into(),
            safety_instructions: "Do not use if you are allergic to ibuprofen/NSAIDs. \
                May increase risk of stomach bleeding; follow label warnings. \
                Consult a healthcare professional for pregnancy/medical conditions or personal medical advice."
                .into(),
            stock: 18,
        },
        Medication {
            name: "Amoxicillin".into(),
            active_ingredient: "Amoxicillin".into(),
            requires_prescription: true,
            dosage_instruction: DosageInstruction {
                dose_amount: "As prescribed".into(),
                frequency: "As prescribed".into(),
                max_daily: "As prescribed".into(),
            },
            usage_instructions:
                "Prescription-only. Take exactly as prescribed. Complete the full course if instructed."
                    .into(),
            safety_instructions: "Do not use if you have a penicillin allergy. \
                Follow the prescriber’s directions and consult a healthcare professional for side effects or concerns."
                .into(),
            stock: 10,
        },
        Medication {
            name: "Cetirizine".into(),
            active_ingredient: "Cetirizine".into(),
            requires_prescription: false,
            dosage_instruction: DosageInstruction {
                dose_amount: "10 mg".into(),
                frequency: "once daily".into(),
                max_daily: "Do not exceed 10 mg in 24 hours (label guidance).".into(),
            },
            usage_instructions:
                "May be taken with or without food. Follow the package directions.".into(),
            safety_instructions: "Do not use if you are allergic to cetirizine. \
                May cause drowsiness in some people; follow label warnings. \
                Consult a healthcare professional for pregnancy/breastfeeding or personal medical advice."
                .into(),
            stock: 0,
        },
        Medication {
            name: "Metformin".into(),
            active_ingredient: "Metformin".into(),
            requires_prescription: true,
            dosage_instruction: DosageInstruction {
                dose_amount: "As prescribed".into(),
                frequency: "As prescribed".into(),
                max_daily: "As prescribed".into(),
            },
            usage_instructions:
                "Prescription-only. Take with meals as prescribed to reduce stomach upset.".into(),
            safety_instructions: "Do not use if you are allergic to metformin. \
                Follow the prescriber’s directions and consult a healthcare professional for side effects or concerns."
                .into(),
            stock: 6,
        },
    ]
}
