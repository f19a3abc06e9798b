//! 内置规则目录数据

use crate::models::{AllergyRule, HealthRule};
use crate::severity::{AllergySeverity, ConditionSeverity};

pub(crate) fn health_rules() -> Vec<HealthRule> {
    vec![
        HealthRule::new(
            "diabetes",
            &[
                "sugar",
                "high fructose corn syrup",
                "dextrose",
                "maltose",
                "sucrose",
                "glucose",
                "fructose",
                "lactose",
                "maltodextrin",
                "corn syrup",
                "agave nectar",
                "honey",
                "maple syrup",
            ],
            &[
                "Monitor blood sugar levels after consumption",
                "Consider sugar-free alternatives",
                "Limit portion sizes",
                "Pair with protein to slow sugar absorption",
            ],
            ConditionSeverity::High,
        ),
        HealthRule::new(
            "hypertension",
            &[
                "sodium",
                "salt",
                "monosodium glutamate",
                "msg",
                "sodium nitrate",
                "sodium nitrite",
                "sodium benzoate",
                "sodium phosphate",
                "sodium citrate",
            ],
            &[
                "Choose low-sodium alternatives",
                "Rinse canned foods to reduce sodium",
                "Use herbs and spices instead of salt",
                "Monitor daily sodium intake",
            ],
            ConditionSeverity::High,
        ),
        HealthRule::new(
            "heart disease",
            &[
                "trans fat",
                "hydrogenated oil",
                "partially hydrogenated",
                "saturated fat",
                "cholesterol",
                "sodium",
            ],
            &[
                "Choose heart-healthy alternatives",
                "Limit saturated and trans fats",
                "Increase fiber intake",
                "Monitor cholesterol levels",
            ],
            ConditionSeverity::High,
        ),
        HealthRule::new(
            "celiac disease",
            &[
                "wheat",
                "gluten",
                "barley",
                "rye",
                "malt",
                "modified food starch",
                "hydrolyzed vegetable protein",
            ],
            &[
                "Choose certified gluten-free products",
                "Read labels carefully for hidden gluten",
                "Avoid cross-contamination",
                "Consider certified gluten-free alternatives",
            ],
            ConditionSeverity::High,
        ),
        HealthRule::new(
            "lactose intolerance",
            &[
                "milk",
                "lactose",
                "whey",
                "casein",
                "cream",
                "butter",
                "cheese",
                "yogurt",
                "milk solids",
            ],
            &[
                "Choose lactose-free alternatives",
                "Consider plant-based milk options",
                "Use lactase enzyme supplements",
                "Monitor for digestive symptoms",
            ],
            ConditionSeverity::Medium,
        ),
    ]
}

pub(crate) fn allergy_rules() -> Vec<AllergyRule> {
    const ANAPHYLACTIC: &[&str] = &["Hives", "Swelling", "Difficulty breathing", "Anaphylaxis"];

    vec![
        AllergyRule::new(
            "peanuts",
            &["peanut", "arachis", "groundnut", "monkey nut"],
            ANAPHYLACTIC,
            AllergySeverity::Severe,
        ),
        AllergyRule::new(
            "tree nuts",
            &["almond", "walnut", "cashew", "pecan", "pistachio", "macadamia"],
            ANAPHYLACTIC,
            AllergySeverity::Severe,
        ),
        AllergyRule::new(
            "dairy",
            &["milk", "cheese", "yogurt", "cream", "butter", "casein", "whey"],
            &["Digestive issues", "Skin reactions", "Respiratory problems"],
            AllergySeverity::Moderate,
        ),
        AllergyRule::new(
            "eggs",
            &["egg", "albumin", "ovalbumin", "lysozyme"],
            &["Hives", "Digestive issues", "Respiratory problems"],
            AllergySeverity::Moderate,
        ),
        AllergyRule::new(
            "soy",
            &["soy", "soya", "soybean", "tofu", "tempeh", "miso"],
            &["Digestive issues", "Skin reactions", "Respiratory problems"],
            AllergySeverity::Moderate,
        ),
        AllergyRule::new(
            "shellfish",
            &["shrimp", "crab", "lobster", "oyster", "clam", "mussel"],
            ANAPHYLACTIC,
            AllergySeverity::Severe,
        ),
    ]
}
