//! Drug safety advisor.
//!
//! Produces ranked, advisory-only warnings for a prescription's drug list:
//! allergy conflicts, duplicate therapy within risky categories, and known
//! pairwise interactions. Never fails and never blocks a dispense; unknown
//! drug names simply produce no matches.

mod interactions;

pub use interactions::{interaction_table, InteractionRule, DUPLICATE_RISK_CATEGORIES};

use serde::{Deserialize, Serialize};

/// Warning severity, ordered critical-first so a plain sort ranks output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Major,
    Moderate,
    Minor,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Moderate => "moderate",
            Severity::Minor => "minor",
        }
    }
}

/// What kind of safety issue a warning describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Interaction,
    Allergy,
    Duplicate,
    Contraindication,
}

/// A single advisory warning. Ephemeral: computed per check, displayed,
/// discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafetyWarning {
    pub severity: Severity,
    pub kind: WarningKind,
    /// The one or two drug names involved
    pub drugs: Vec<String>,
    pub description: String,
    pub recommendation: String,
}

/// One drug line as seen by the advisor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrescribedDrug {
    pub name: String,
    /// Therapeutic category, when the inventory record has one
    pub category: Option<String>,
}

impl PrescribedDrug {
    pub fn new(name: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            name: name.into(),
            category: category.map(|c| c.to_string()),
        }
    }
}

/// Run all safety checks over a prescription's drugs and the patient's
/// known allergies. Output is sorted critical-first; an empty list means
/// "all clear".
pub fn check_safety(drugs: &[PrescribedDrug], allergies: &[String]) -> Vec<SafetyWarning> {
    let mut warnings = Vec::new();

    warnings.extend(allergy_warnings(drugs, allergies));
    warnings.extend(duplicate_warnings(drugs));
    warnings.extend(interaction_warnings(drugs));

    // Stable sort: ties keep detection order, critical always surfaces first.
    warnings.sort_by_key(|w| w.severity);
    warnings
}

/// Case-insensitive substring match in either direction.
///
/// Allergy free-text and drug names share no controlled vocabulary, so
/// substring matching catches brand/generic overlap at the cost of known
/// false positives. Deliberately conservative.
fn allergy_warnings(drugs: &[PrescribedDrug], allergies: &[String]) -> Vec<SafetyWarning> {
    let mut warnings = Vec::new();

    for drug in drugs {
        let drug_lower = drug.name.to_lowercase();
        for allergy in allergies {
            let allergy_lower = allergy.trim().to_lowercase();
            if allergy_lower.is_empty() {
                continue;
            }
            if drug_lower.contains(&allergy_lower) || allergy_lower.contains(&drug_lower) {
                warnings.push(SafetyWarning {
                    severity: Severity::Critical,
                    kind: WarningKind::Allergy,
                    drugs: vec![drug.name.clone()],
                    description: format!(
                        "{} conflicts with recorded allergy \"{}\"",
                        drug.name,
                        allergy.trim()
                    ),
                    recommendation: "Do not dispense without prescriber confirmation".into(),
                });
            }
        }
    }

    warnings
}

/// One warning per risky category holding two or more distinct drugs.
fn duplicate_warnings(drugs: &[PrescribedDrug]) -> Vec<SafetyWarning> {
    let mut warnings = Vec::new();

    for risky in DUPLICATE_RISK_CATEGORIES {
        let mut offenders: Vec<&str> = Vec::new();
        for drug in drugs {
            let Some(category) = drug.category.as_deref() else {
                continue;
            };
            if normalize_category(category) != *risky {
                continue;
            }
            if !offenders
                .iter()
                .any(|name| name.eq_ignore_ascii_case(&drug.name))
            {
                offenders.push(&drug.name);
            }
        }
        if offenders.len() >= 2 {
            warnings.push(SafetyWarning {
                severity: Severity::Moderate,
                kind: WarningKind::Duplicate,
                drugs: vec![offenders[0].to_string(), offenders[1].to_string()],
                description: format!(
                    "{} and {} are both {} therapy",
                    offenders[0], offenders[1], risky
                ),
                recommendation: "Confirm duplicate therapy in this category is intended".into(),
            });
        }
    }

    warnings
}

/// Check every pair of drugs against the static interaction table.
fn interaction_warnings(drugs: &[PrescribedDrug]) -> Vec<SafetyWarning> {
    let table = interaction_table();
    let generics: Vec<String> = drugs.iter().map(|d| generic_name(&d.name)).collect();
    let mut warnings = Vec::new();

    for i in 0..drugs.len() {
        for j in (i + 1)..drugs.len() {
            let rule = lookup_rule(&table, &generics[i], &generics[j])
                .or_else(|| lookup_rule(&table, &generics[j], &generics[i]));
            if let Some(rule) = rule {
                warnings.push(SafetyWarning {
                    severity: rule.severity,
                    kind: WarningKind::Interaction,
                    drugs: vec![drugs[i].name.clone(), drugs[j].name.clone()],
                    description: rule.description.to_string(),
                    recommendation: rule.recommendation.to_string(),
                });
            }
        }
    }

    warnings
}

fn lookup_rule<'t>(
    table: &'t std::collections::HashMap<&'static str, Vec<InteractionRule>>,
    a: &str,
    b: &str,
) -> Option<&'t InteractionRule> {
    table.get(a)?.iter().find(|rule| rule.with == b)
}

/// Reduce a display name to its generic form by dropping dose tokens
/// ("500mg", "5ml") and dosage-form words.
pub fn generic_name(name: &str) -> String {
    const FORM_WORDS: &[&str] = &[
        "tablet",
        "tablets",
        "tab",
        "tabs",
        "capsule",
        "capsules",
        "caplet",
        "caplets",
        "syrup",
        "suspension",
        "injection",
        "cream",
        "ointment",
        "drops",
    ];
    const UNIT_WORDS: &[&str] = &["mg", "ml", "g", "mcg", "iu", "%"];

    name.to_lowercase()
        .split_whitespace()
        .filter(|token| {
            !FORM_WORDS.contains(token)
                && !UNIT_WORDS.contains(token)
                && !token.starts_with(|c: char| c.is_ascii_digit())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase and strip a trailing plural 's' so "NSAIDs" groups with "nsaid".
fn normalize_category(category: &str) -> String {
    let lower = category.trim().to_lowercase();
    lower.strip_suffix('s').map(str::to_string).unwrap_or(lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drug(name: &str, category: Option<&str>) -> PrescribedDrug {
        PrescribedDrug::new(name, category)
    }

    #[test]
    fn test_allergy_substring_match() {
        let warnings = check_safety(
            &[drug("Penicillin V", None)],
            &["penicillin".to_string()],
        );

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].severity, Severity::Critical);
        assert_eq!(warnings[0].kind, WarningKind::Allergy);
        assert_eq!(warnings[0].drugs, vec!["Penicillin V".to_string()]);
    }

    #[test]
    fn test_allergy_match_is_bidirectional() {
        // Allergy text longer than the drug name also matches
        let warnings = check_safety(
            &[drug("Aspirin", None)],
            &["aspirin and other salicylates".to_string()],
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Allergy);
    }

    #[test]
    fn test_blank_allergy_ignored() {
        let warnings = check_safety(&[drug("Aspirin", None)], &["  ".to_string()]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_duplicate_nsaids_single_warning() {
        let warnings = check_safety(
            &[
                drug("Ibuprofen 400mg", Some("NSAID")),
                drug("Diclofenac 50mg", Some("NSAID")),
            ],
            &[],
        );

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].severity, Severity::Moderate);
        assert_eq!(warnings[0].kind, WarningKind::Duplicate);
    }

    #[test]
    fn test_third_duplicate_adds_no_extra_warning() {
        // Multiplicity contract: one warning per offending category,
        // naming the first two drugs found.
        let warnings = check_safety(
            &[
                drug("Ibuprofen", Some("NSAID")),
                drug("Diclofenac", Some("NSAIDs")),
                drug("Naproxen", Some("nsaid")),
            ],
            &[],
        );

        let duplicates: Vec<_> = warnings
            .iter()
            .filter(|w| w.kind == WarningKind::Duplicate)
            .collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(
            duplicates[0].drugs,
            vec!["Ibuprofen".to_string(), "Diclofenac".to_string()]
        );
    }

    #[test]
    fn test_non_risky_category_not_flagged() {
        let warnings = check_safety(
            &[
                drug("Cetirizine", Some("Antihistamine")),
                drug("Loratadine", Some("Antihistamine")),
            ],
            &[],
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_interaction_found_despite_dose_tokens() {
        let warnings = check_safety(
            &[
                drug("Warfarin 5mg Tablet", None),
                drug("Aspirin 75mg Tablet", None),
            ],
            &[],
        );

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Interaction);
        assert_eq!(warnings[0].severity, Severity::Major);
        assert_eq!(
            warnings[0].drugs,
            vec!["Warfarin 5mg Tablet".to_string(), "Aspirin 75mg Tablet".to_string()]
        );
    }

    #[test]
    fn test_interaction_lookup_is_order_independent() {
        // Table stores the rule under "warfarin"; listing aspirin first
        // must still find it.
        let warnings = check_safety(&[drug("Aspirin", None), drug("Warfarin", None)], &[]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Interaction);
    }

    #[test]
    fn test_severity_ordering() {
        // moderate, critical, major detection order; output is critical, major, moderate
        let warnings = check_safety(
            &[
                drug("Quinine Tablet", None),
                drug("Digoxin Tablet", None),     // moderate interaction
                drug("Sildenafil 50mg", None),
                drug("Isosorbide Dinitrate", None), // critical interaction
                drug("Warfarin", None),
                drug("Metronidazole 400mg", None), // major interaction
            ],
            &[],
        );

        let severities: Vec<Severity> = warnings.iter().map(|w| w.severity).collect();
        let mut sorted = severities.clone();
        sorted.sort();
        assert_eq!(severities, sorted);
        assert_eq!(severities[0], Severity::Critical);
        assert_eq!(*severities.last().unwrap(), Severity::Moderate);
    }

    #[test]
    fn test_unknown_drugs_all_clear() {
        let warnings = check_safety(
            &[drug("Obscurol", None), drug("Placebozine", Some("Vitamin"))],
            &[],
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_empty_input_all_clear() {
        assert!(check_safety(&[], &[]).is_empty());
    }

    #[test]
    fn test_generic_name_reduction() {
        assert_eq!(generic_name("Warfarin 5mg Tablet"), "warfarin");
        assert_eq!(generic_name("Amoxicillin 500mg Capsules"), "amoxicillin");
        assert_eq!(
            generic_name("Artemether-Lumefantrine 80/480 Tablets"),
            "artemether-lumefantrine"
        );
        assert_eq!(generic_name("Hydrocortisone Cream"), "hydrocortisone");
    }
}
