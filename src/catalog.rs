//! Reference catalog — the fixed set of test panels the lab offers.
//!
//! Each panel lists its fields in display order, grouped under section
//! headings. The table is process-wide and immutable; adding a panel means
//! adding an entry to `PANELS`.

use serde::Serialize;

/// Panel used when a submission names a test type we do not know.
pub const DEFAULT_TEST_TYPE: &str = "CBC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TestFieldSpec {
    pub id: &'static str,
    pub display_name: &'static str,
    pub unit: &'static str,
    pub reference_range: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TestGroup {
    pub label: &'static str,
    pub fields: &'static [TestFieldSpec],
}

/// One orderable test type with its printed title and department.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TestPanel {
    pub code: &'static str,
    pub title: &'static str,
    pub department: &'static str,
    pub groups: &'static [TestGroup],
}

impl TestPanel {
    pub fn fields(&self) -> impl Iterator<Item = &'static TestFieldSpec> {
        self.groups.iter().flat_map(|g| g.fields.iter())
    }

    pub fn field(&self, id: &str) -> Option<&'static TestFieldSpec> {
        self.fields().find(|f| f.id == id)
    }
}

/// Result of resolving a test-type code, remembering whether we fell back.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPanel {
    pub panel: &'static TestPanel,
    pub fell_back: bool,
}

const fn f(
    id: &'static str,
    display_name: &'static str,
    unit: &'static str,
    reference_range: &'static str,
) -> TestFieldSpec {
    TestFieldSpec {
        id,
        display_name,
        unit,
        reference_range,
    }
}

const fn g(label: &'static str, fields: &'static [TestFieldSpec]) -> TestGroup {
    TestGroup { label, fields }
}

pub static PANELS: &[TestPanel] = &[
    TestPanel {
        code: "CBC",
        title: "COMPLETE BLOOD COUNT (CBC)",
        department: "HAEMATOLOGY",
        groups: &[
            g("Hematology", &[
                f("hemoglobin", "HEMOGLOBIN", "g/dL", "11-16"),
                f("totalRbcCount", "TOTAL RBC COUNT", "million/cumm", "4.5 - 5.5"),
                f("hematocrit", "HEMATOCRIT VALUE, HCT", "%", "40 - 50"),
            ]),
            g("RBC Indices", &[
                f("mcv", "MEAN CORPUSCULAR VOLUME, MCV", "fL", "83 - 101"),
                f("mch", "MEAN CORPUSCULAR HEMOGLOBIN, MCH", "pg", "27 - 32"),
                f("mchc", "MEAN CORPUSCULAR HEMOGLOBIN CONCENTRATION, MCHC", "g/dL", "31.5 - 34.5"),
                f("rdwCv", "RED CELL DISTRIBUTION WIDTH, RDW-CV", "%", "11.6 - 14.0"),
            ]),
            g("WBC Count", &[
                f("totalLeukocyteCount", "TOTAL LEUKOCYTE COUNT", "cumm", "4000 - 11000"),
            ]),
            g("Differential Leucocyte Count", &[
                f("neutrophils", "NEUTROPHILS", "%", "40 - 80"),
                f("lymphocytes", "LYMPHOCYTES", "%", "20 - 40"),
                f("eosinophils", "EOSINOPHILS", "%", "1 - 6"),
                f("monocytes", "MONOCYTES", "%", "2 - 10"),
                f("basophils", "BASOPHILS", "%", "< 2"),
            ]),
            g("Platelets", &[
                f("plateletCount", "PLATELET COUNT", "lakhs/cumm", "1.5 - 4.1"),
                f("mpv", "MEAN PLATELET VOLUME, MPV", "fL", "7.5 - 11.5"),
            ]),
        ],
    },
    TestPanel {
        code: "LFT",
        title: "LIVER FUNCTION TEST (LFT)",
        department: "BIOCHEMISTRY",
        groups: &[
            g("Bilirubin", &[
                f("serumBilirubinTotal", "SERUM BILIRUBIN (TOTAL)", "mg/dL", "0.2 - 1.2 mg/dL"),
                f("serumBilirubinDirect", "SERUM BILIRUBIN (DIRECT)", "mg/dL", "0 - 0.3 mg/dL"),
                f("serumBilirubinIndirect", "SERUM BILIRUBIN (INDIRECT)", "mg/dL", "0.2 - 1 mg/dL"),
            ]),
            g("Liver Enzymes", &[
                f("sgptAlt", "SGPT (ALT)", "U/L", "5 - 40 U/L"),
                f("sgotAst", "SGOT (AST)", "U/L", "5 - 40 U/L"),
                f("serumAlkalinePhosphatase", "SERUM ALKALINE PHOSPHATASE", "U/L", "44 - 147 U/L"),
                f("ggt", "GAMMA GLUTAMYL TRANSFERASE (GGT)", "U/L", "9 - 48 U/L"),
            ]),
            g("Proteins", &[
                f("serumProtein", "SERUM PROTEIN", "g/dL", "6.4 - 8.3 g/dL"),
                f("serumAlbumin", "SERUM ALBUMIN", "g/dL", "3.5 - 5.2 g/dL"),
                f("globulin", "GLOBULIN", "g/dL", "1.8 - 3.6 g/dL"),
                f("agRatio", "A/G RATIO", "", "1.1 - 2.1"),
            ]),
        ],
    },
    TestPanel {
        code: "BloodSugar",
        title: "BLOOD SUGAR",
        department: "BIOCHEMISTRY",
        groups: &[
            g("Blood Glucose", &[
                f("fastingBloodSugar", "FASTING BLOOD SUGAR (FBS)", "mg/dL", "70 - 110"),
                f("postPrandialBloodSugar", "POST PRANDIAL BLOOD SUGAR (PPBS)", "mg/dL", "70 - 140"),
                f("randomBloodSugar", "RANDOM BLOOD SUGAR (RBS)", "mg/dL", "70 - 140"),
            ]),
            g("Urine Sugar", &[
                f("urineSugarFasting", "URINE SUGAR (FASTING)", "", "Negative"),
                f("urineSugarPostPrandial", "URINE SUGAR (PP)", "", "Negative"),
            ]),
        ],
    },
    TestPanel {
        code: "Renal",
        title: "RENAL FUNCTION TEST (RFT)",
        department: "BIOCHEMISTRY",
        groups: &[
            g("Kidney Markers", &[
                f("bloodUrea", "BLOOD UREA", "mg/dL", "15 - 45"),
                f("bun", "BLOOD UREA NITROGEN (BUN)", "mg/dL", "7 - 20"),
                f("serumCreatinine", "SERUM CREATININE", "mg/dL", "0.6 - 1.3"),
                f("serumUricAcid", "SERUM URIC ACID", "mg/dL", "3.5 - 7.2"),
            ]),
            g("Electrolytes", &[
                f("sodium", "SODIUM (NA+)", "mmol/L", "135 - 145"),
                f("potassium", "POTASSIUM (K+)", "mmol/L", "3.5 - 5.1"),
                f("chloride", "CHLORIDE (CL-)", "mmol/L", "98 - 107"),
            ]),
        ],
    },
    TestPanel {
        code: "Lipid",
        title: "LIPID PROFILE",
        department: "BIOCHEMISTRY",
        groups: &[
            g("Cholesterol", &[
                f("totalCholesterol", "TOTAL CHOLESTEROL", "mg/dL", "< 200"),
                f("hdlCholesterol", "HDL CHOLESTEROL", "mg/dL", "40 - 60"),
                f("ldlCholesterol", "LDL CHOLESTEROL", "mg/dL", "< 100"),
                f("vldlCholesterol", "VLDL CHOLESTEROL", "mg/dL", "5 - 40"),
            ]),
            g("Triglycerides", &[
                f("triglycerides", "SERUM TRIGLYCERIDES", "mg/dL", "< 150"),
            ]),
            g("Risk Ratios", &[
                f("tcHdlRatio", "TOTAL CHOLESTEROL / HDL RATIO", "", "3.5 - 5.0"),
                f("ldlHdlRatio", "LDL / HDL RATIO", "", "1.5 - 3.5"),
            ]),
        ],
    },
    TestPanel {
        code: "TFT",
        title: "THYROID FUNCTION TEST (TFT)",
        department: "BIOCHEMISTRY",
        groups: &[
            g("Thyroid Hormones", &[
                f("t3", "TRIIODOTHYRONINE, T3", "ng/mL", "0.8 - 2.0"),
                f("t4", "THYROXINE, T4", "ug/dL", "5.1 - 14.1"),
            ]),
            g("Pituitary", &[
                f("tsh", "THYROID STIMULATING HORMONE, TSH", "uIU/mL", "0.27 - 4.2"),
            ]),
            g("Free Hormones", &[
                f("ft3", "FREE T3, FT3", "pg/mL", "2.0 - 4.4"),
                f("ft4", "FREE T4, FT4", "ng/dL", "0.93 - 1.7"),
            ]),
        ],
    },
    TestPanel {
        code: "Urine",
        title: "URINE ROUTINE EXAMINATION",
        department: "CLINICAL PATHOLOGY",
        groups: &[
            g("Physical Examination", &[
                f("urineColour", "COLOUR", "", "Pale Yellow"),
                f("urineAppearance", "APPEARANCE", "", "Clear"),
                f("urineSpecificGravity", "SPECIFIC GRAVITY", "", "1.005 - 1.030"),
                f("urinePh", "PH", "", "4.5 - 8.0"),
            ]),
            g("Chemical Examination", &[
                f("urineProtein", "PROTEIN", "", "Negative"),
                f("urineGlucose", "GLUCOSE", "", "Negative"),
                f("urineKetones", "KETONE BODIES", "", "Negative"),
                f("urineBilirubin", "BILIRUBIN", "", "Negative"),
            ]),
            g("Microscopic Examination", &[
                f("pusCells", "PUS CELLS", "/hpf", "0 - 5"),
                f("epithelialCells", "EPITHELIAL CELLS", "/hpf", "0 - 5"),
                f("urineRbc", "RED BLOOD CELLS", "/hpf", "0 - 2"),
                f("casts", "CASTS", "", "Absent"),
                f("crystals", "CRYSTALS", "", "Absent"),
            ]),
        ],
    },
    TestPanel {
        code: "Electrolytes",
        title: "SERUM ELECTROLYTES",
        department: "BIOCHEMISTRY",
        groups: &[
            g("Electrolytes", &[
                f("sodium", "SODIUM (NA+)", "mmol/L", "135 - 145"),
                f("potassium", "POTASSIUM (K+)", "mmol/L", "3.5 - 5.1"),
                f("chloride", "CHLORIDE (CL-)", "mmol/L", "98 - 107"),
                f("bicarbonate", "BICARBONATE (HCO3-)", "mmol/L", "22 - 29"),
            ]),
            g("Minerals", &[
                f("serumCalcium", "SERUM CALCIUM", "mg/dL", "8.5 - 10.5"),
                f("serumPhosphorus", "SERUM PHOSPHORUS", "mg/dL", "2.5 - 4.5"),
                f("serumMagnesium", "SERUM MAGNESIUM", "mg/dL", "1.7 - 2.2"),
            ]),
        ],
    },
    TestPanel {
        code: "HbA1c",
        title: "GLYCOSYLATED HAEMOGLOBIN (HbA1c)",
        department: "BIOCHEMISTRY",
        groups: &[
            g("Glycated Haemoglobin", &[
                f("hba1c", "HBA1C", "%", "4.0 - 5.6"),
                f("estimatedAverageGlucose", "ESTIMATED AVERAGE GLUCOSE (EAG)", "mg/dL", "68 - 114"),
            ]),
        ],
    },
    TestPanel {
        code: "Iron",
        title: "IRON STUDIES",
        department: "BIOCHEMISTRY",
        groups: &[
            g("Iron Profile", &[
                f("serumIron", "SERUM IRON", "ug/dL", "60 - 170"),
                f("tibc", "TOTAL IRON BINDING CAPACITY (TIBC)", "ug/dL", "250 - 450"),
                f("transferrinSaturation", "TRANSFERRIN SATURATION", "%", "20 - 50"),
                f("serumFerritin", "SERUM FERRITIN", "ng/mL", "20 - 250"),
            ]),
        ],
    },
    TestPanel {
        code: "Vitamins",
        title: "VITAMIN PROFILE",
        department: "BIOCHEMISTRY",
        groups: &[
            g("Vitamins", &[
                f("vitaminD", "25-HYDROXY VITAMIN D", "ng/mL", "30 - 100"),
                f("vitaminB12", "VITAMIN B12", "pg/mL", "211 - 911"),
                f("serumFolate", "SERUM FOLATE", "ng/mL", "3 - 17"),
            ]),
        ],
    },
    TestPanel {
        code: "Cardiac",
        title: "CARDIAC MARKERS",
        department: "BIOCHEMISTRY",
        groups: &[
            g("Cardiac Enzymes", &[
                f("cpkTotal", "CREATINE PHOSPHOKINASE (CPK)", "U/L", "24 - 195"),
                f("ckMb", "CK-MB", "U/L", "0 - 25"),
                f("ldh", "LACTATE DEHYDROGENASE (LDH)", "U/L", "140 - 280"),
            ]),
            g("Troponin", &[
                f("troponinI", "TROPONIN I", "ng/mL", "< 0.04"),
            ]),
        ],
    },
    TestPanel {
        code: "Coagulation",
        title: "COAGULATION PROFILE",
        department: "HAEMATOLOGY",
        groups: &[
            g("Clotting Times", &[
                f("bleedingTime", "BLEEDING TIME (BT)", "min", "1 - 5"),
                f("clottingTime", "CLOTTING TIME (CT)", "min", "4 - 10"),
            ]),
            g("Prothrombin", &[
                f("prothrombinTime", "PROTHROMBIN TIME (PT)", "sec", "11 - 13.5"),
                f("inr", "INR", "", "0.8 - 1.2"),
                f("aptt", "ACTIVATED PARTIAL THROMBOPLASTIN TIME (APTT)", "sec", "25 - 35"),
            ]),
        ],
    },
    TestPanel {
        code: "ESR",
        title: "ERYTHROCYTE SEDIMENTATION RATE (ESR)",
        department: "HAEMATOLOGY",
        groups: &[
            g("Sedimentation", &[
                f("esr", "ESR (WESTERGREN METHOD)", "mm/hr", "0 - 20"),
            ]),
        ],
    },
    TestPanel {
        code: "CRP",
        title: "C-REACTIVE PROTEIN (CRP)",
        department: "SEROLOGY",
        groups: &[
            g("Inflammatory Markers", &[
                f("crp", "C-REACTIVE PROTEIN (CRP)", "mg/L", "< 6"),
                f("hsCrp", "HIGH SENSITIVITY CRP (HS-CRP)", "mg/L", "0 - 3"),
            ]),
        ],
    },
    TestPanel {
        code: "Widal",
        title: "WIDAL TEST (SLIDE METHOD)",
        department: "SEROLOGY",
        groups: &[
            g("Salmonella Antibodies", &[
                f("typhiO", "S. TYPHI O", "", "< 1:80"),
                f("typhiH", "S. TYPHI H", "", "< 1:80"),
                f("paratyphiAH", "S. PARATYPHI AH", "", "< 1:80"),
                f("paratyphiBH", "S. PARATYPHI BH", "", "< 1:80"),
            ]),
        ],
    },
    TestPanel {
        code: "Serology",
        title: "SEROLOGY SCREEN",
        department: "SEROLOGY",
        groups: &[
            g("Infectious Markers", &[
                f("hiv", "HIV I & II", "", "Non Reactive"),
                f("hbsag", "HBSAG", "", "Non Reactive"),
                f("antiHcv", "ANTI HCV", "", "Non Reactive"),
                f("vdrl", "VDRL", "", "Non Reactive"),
            ]),
            g("Autoimmune", &[
                f("raFactor", "RHEUMATOID FACTOR (RA)", "IU/mL", "<14 IU/mL"),
                f("asoTitre", "ASO TITRE", "IU/mL", "< 200 IU/mL"),
            ]),
        ],
    },
    TestPanel {
        code: "BloodGroup",
        title: "BLOOD GROUPING & RH TYPING",
        department: "IMMUNOHAEMATOLOGY",
        groups: &[
            g("Blood Group", &[
                f("aboGroup", "ABO GROUP", "", "A / B / AB / O"),
                f("rhType", "RH TYPE", "", "Positive / Negative"),
            ]),
        ],
    },
];

/// Strict lookup by test-type code (case-insensitive).
pub fn panel(code: &str) -> Option<&'static TestPanel> {
    let code = code.trim();
    PANELS.iter().find(|p| p.code.eq_ignore_ascii_case(code))
}

/// The CBC panel, used as the fallback shape.
pub fn default_panel() -> &'static TestPanel {
    &PANELS[0]
}

/// Lookup that never fails: unknown codes resolve to the CBC panel.
pub fn resolve(code: &str) -> ResolvedPanel {
    match panel(code) {
        Some(panel) => ResolvedPanel {
            panel,
            fell_back: false,
        },
        None => {
            tracing::warn!(test_type = code, "Unknown test type, using {DEFAULT_TEST_TYPE} layout");
            ResolvedPanel {
                panel: default_panel(),
                fell_back: true,
            }
        }
    }
}

/// Ordered groups for a test type, CBC's when the code is unknown.
pub fn groups_for(code: &str) -> &'static [TestGroup] {
    resolve(code).panel.groups
}

pub fn codes() -> impl Iterator<Item = &'static str> {
    PANELS.iter().map(|p| p.code)
}

/// Field spec for `field_id` within a known test type.
pub fn field(code: &str, field_id: &str) -> Option<&'static TestFieldSpec> {
    panel(code)?.field(field_id)
}
