//! Static drug-interaction reference data.
//!
//! A small curated table of known pairwise interactions keyed by generic
//! name. Read-only; built once per advisor.

use std::collections::HashMap;

use super::Severity;

/// One known interaction with another drug.
#[derive(Debug, Clone, Copy)]
pub struct InteractionRule {
    /// Generic name of the interacting drug
    pub with: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub recommendation: &'static str,
}

/// Drug categories risky to duplicate within one prescription.
pub const DUPLICATE_RISK_CATEGORIES: &[&str] = &[
    "analgesic",
    "nsaid",
    "antibiotic",
    "antihypertensive",
    "antidiabetic",
    "antimalarial",
];

/// Known pairwise interactions, keyed by lowercase generic name.
pub fn interaction_table() -> HashMap<&'static str, Vec<InteractionRule>> {
    let mut map: HashMap<&'static str, Vec<InteractionRule>> = HashMap::new();

    map.insert(
        "warfarin",
        vec![
            InteractionRule {
                with: "aspirin",
                severity: Severity::Major,
                description: "Combined anticoagulant and antiplatelet effect greatly increases bleeding risk",
                recommendation: "Avoid combination; if unavoidable, monitor INR closely",
            },
            InteractionRule {
                with: "ibuprofen",
                severity: Severity::Major,
                description: "NSAIDs potentiate warfarin and irritate gastric mucosa, raising GI bleed risk",
                recommendation: "Prefer paracetamol for analgesia in anticoagulated patients",
            },
            InteractionRule {
                with: "diclofenac",
                severity: Severity::Major,
                description: "NSAIDs potentiate warfarin and irritate gastric mucosa, raising GI bleed risk",
                recommendation: "Prefer paracetamol for analgesia in anticoagulated patients",
            },
            InteractionRule {
                with: "metronidazole",
                severity: Severity::Major,
                description: "Metronidazole inhibits warfarin metabolism, raising INR",
                recommendation: "Reduce warfarin dose and monitor INR during the course",
            },
            InteractionRule {
                with: "ciprofloxacin",
                severity: Severity::Moderate,
                description: "Fluoroquinolones may enhance warfarin's anticoagulant effect",
                recommendation: "Monitor INR within 3-5 days of starting the antibiotic",
            },
        ],
    );

    map.insert(
        "aspirin",
        vec![
            InteractionRule {
                with: "ibuprofen",
                severity: Severity::Moderate,
                description: "Ibuprofen competes with aspirin at COX-1 and can blunt its antiplatelet effect",
                recommendation: "Separate dosing or use an alternative analgesic",
            },
            InteractionRule {
                with: "methotrexate",
                severity: Severity::Major,
                description: "Salicylates reduce renal clearance of methotrexate, risking toxicity",
                recommendation: "Avoid combination at antirheumatic methotrexate doses",
            },
        ],
    );

    map.insert(
        "lisinopril",
        vec![
            InteractionRule {
                with: "spironolactone",
                severity: Severity::Moderate,
                description: "ACE inhibitor plus potassium-sparing diuretic risks hyperkalemia",
                recommendation: "Monitor serum potassium and renal function",
            },
            InteractionRule {
                with: "ibuprofen",
                severity: Severity::Moderate,
                description: "NSAIDs blunt the antihypertensive effect and stress renal perfusion",
                recommendation: "Monitor blood pressure and renal function with sustained use",
            },
        ],
    );

    map.insert(
        "sildenafil",
        vec![
            InteractionRule {
                with: "isosorbide dinitrate",
                severity: Severity::Critical,
                description: "PDE5 inhibitors with nitrates cause severe, refractory hypotension",
                recommendation: "Absolute contraindication; do not co-prescribe",
            },
            InteractionRule {
                with: "glyceryl trinitrate",
                severity: Severity::Critical,
                description: "PDE5 inhibitors with nitrates cause severe, refractory hypotension",
                recommendation: "Absolute contraindication; do not co-prescribe",
            },
        ],
    );

    map.insert(
        "clarithromycin",
        vec![InteractionRule {
            with: "simvastatin",
            severity: Severity::Major,
            description: "CYP3A4 inhibition raises statin levels, risking rhabdomyolysis",
            recommendation: "Suspend the statin for the antibiotic course or switch macrolide",
        }],
    );

    map.insert(
        "tramadol",
        vec![InteractionRule {
            with: "amitriptyline",
            severity: Severity::Major,
            description: "Additive serotonergic effect and lowered seizure threshold",
            recommendation: "Avoid combination or use lowest effective doses with monitoring",
        }],
    );

    map.insert(
        "artemether-lumefantrine",
        vec![
            InteractionRule {
                with: "erythromycin",
                severity: Severity::Major,
                description: "Additive QT prolongation with macrolides",
                recommendation: "Avoid combination; choose a non-macrolide antibiotic",
            },
            InteractionRule {
                with: "ketoconazole",
                severity: Severity::Moderate,
                description: "CYP3A4 inhibition raises lumefantrine exposure",
                recommendation: "Monitor for QT prolongation; no dose adjustment usually needed",
            },
        ],
    );

    map.insert(
        "quinine",
        vec![InteractionRule {
            with: "digoxin",
            severity: Severity::Moderate,
            description: "Quinine reduces digoxin clearance, raising serum levels",
            recommendation: "Monitor digoxin levels and for toxicity",
        }],
    );

    map
}
