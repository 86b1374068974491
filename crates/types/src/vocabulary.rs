//! Closed clinical vocabularies.
//!
//! Each vocabulary maps one-to-one onto a set of wire codes used by the knowledge-base YAML
//! files, patient payloads and the history log. The mapping is written once per enum through
//! [`vocabulary!`], which also provides `Display`, `FromStr` and serde support that go through
//! the wire code.

/// Error returned when a wire code does not belong to a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VocabularyError {
    #[error("unknown {kind} code: '{code}'")]
    Unknown { kind: &'static str, code: String },
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every member of the vocabulary, in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Stable wire code.
            pub fn code(self) -> &'static str {
                match self {
                    $( $name::$variant => $code ),+
                }
            }

            /// Parse from a wire code, returning `None` for anything outside the vocabulary.
            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    $( $code => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.code())
            }
        }

        impl std::str::FromStr for $name {
            type Err = VocabularyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_code(s.trim()).ok_or_else(|| VocabularyError::Unknown {
                    kind: $kind,
                    code: s.to_string(),
                })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.code())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse::<$name>().map_err(serde::de::Error::custom)
            }
        }
    };
}

vocabulary! {
    /// Presenting symptoms and clinical signs.
    ///
    /// The first block is what a field form collects; the second block holds the
    /// more specific signs referenced as pathognomonic findings in the knowledge base.
    pub enum Symptom ("symptom") {
        Fever => "fever",
        LowGradeFever => "low_grade_fever",
        HighFever => "high_fever",
        ProlongedFever => "prolonged_fever",
        Headache => "headache",
        SevereHeadache => "severe_headache",
        Myalgia => "myalgia",
        Arthralgia => "arthralgia",
        SevereArthralgia => "severe_arthralgia",
        Nausea => "nausea",
        Vomiting => "vomiting",
        Diarrhoea => "diarrhoea",
        Cough => "cough",
        DryCough => "dry_cough",
        PersistentCough => "persistent_cough",
        BreathingDifficulty => "breathing_difficulty",
        ChestPain => "chest_pain",
        Chills => "chills",
        Sweating => "sweating",
        NightSweats => "night_sweats",
        Fatigue => "fatigue",
        SkinRash => "skin_rash",
        Conjunctivitis => "conjunctivitis",
        AbdominalPain => "abdominal_pain",
        Dehydration => "dehydration",
        Seizures => "seizures",
        Jaundice => "jaundice",
        BloodyStool => "bloody_stool",
        DarkUrine => "dark_urine",
        Sputum => "sputum",
        BloodySputum => "bloody_sputum",
        WeightLoss => "weight_loss",
        LossOfSmell => "loss_of_smell",
        LossOfTaste => "loss_of_taste",
        NeckStiffness => "neck_stiffness",
        Confusion => "confusion",
        EnlargedSpleen => "enlarged_spleen",
        EnlargedLiver => "enlarged_liver",
        Anaemia => "anaemia",
        RetroOrbitalPain => "retro_orbital_pain",
        Haemorrhage => "haemorrhage",
        Oliguria => "oliguria",

        MucusInStool => "mucus_in_stool",
        Tenesmus => "tenesmus",
        CyclicFever => "cyclic_fever",
        Splenomegaly => "splenomegaly",
        Hepatomegaly => "hepatomegaly",
        Petechiae => "petechiae",
        PositiveTourniquetTest => "positive_tourniquet_test",
        Dyspnoea => "dyspnoea",
        ProgressiveDyspnoea => "progressive_dyspnoea",
        Cyanosis => "cyanosis",
        ChestIndrawing => "chest_indrawing",
        SymmetricArthralgia => "symmetric_arthralgia",
        JointSwelling => "joint_swelling",
        MorningStiffness => "morning_stiffness",
        NonPurulentConjunctivitis => "non_purulent_conjunctivitis",
        PruriticRash => "pruritic_rash",
        ProgressiveJaundice => "progressive_jaundice",
        GumBleeding => "gum_bleeding",
        Acholia => "acholia",
        Choluria => "choluria",
        CoughOverThreeWeeks => "cough_over_three_weeks",
        Haemoptysis => "haemoptysis",
        ProgressiveWasting => "progressive_wasting",
        Pancytopenia => "pancytopenia",
        Haematuria => "haematuria",
        Dysuria => "dysuria",
        PositiveKernigSign => "positive_kernig_sign",
        PositiveBrudzinskiSign => "positive_brudzinski_sign",
        Chagoma => "chagoma",
        RomanaSign => "romana_sign",
        Lymphadenopathy => "lymphadenopathy",
    }
}

vocabulary! {
    /// Recent climatic or environmental exposure reported for the patient.
    pub enum ClimateEvent ("climatic event") {
        Floods => "floods",
        HeavyRain => "heavy_rain",
        Drought => "drought",
        HeatWave => "heat_wave",
        Heat => "heat",
        Cold => "cold",
        Humidity => "humidity",
        HeatHumidity => "heat_humidity",
        Storms => "storms",
        LowHumidity => "low_humidity",
        Monsoon => "monsoon",
        Crowding => "crowding",
        PoorVentilation => "poor_ventilation",
        LackOfSanitation => "lack_of_sanitation",
        RuralAreas => "rural_areas",
        UrbanAreas => "urban_areas",
        EndemicAreas => "endemic_areas",
        PrecariousHousing => "precarious_housing",
        WaterContact => "water_contact",
        RiverProximity => "river_proximity",
        PigFarming => "pig_farming",
        BirdProximity => "bird_proximity",
        LiveAnimalMarkets => "live_animal_markets",
    }
}

vocabulary! {
    /// Population tags a disease entry lists as being at elevated risk.
    pub enum RiskGroup ("risk group") {
        Infants => "infants",
        UnderFives => "under_fives",
        Children => "children",
        Adolescents => "adolescents",
        YoungAdults => "young_adults",
        Adults => "adults",
        Elderly => "elderly",
        PregnantWomen => "pregnant_women",
        WomenOfChildbearingAge => "women_of_childbearing_age",
        AdultMen => "adult_men",
        Malnourished => "malnourished",
        Immunocompromised => "immunocompromised",
        Comorbidities => "comorbidities",
        Unvaccinated => "unvaccinated",
        NonImmune => "non_immune",
        RuralWorkers => "rural_workers",
        RuralResidents => "rural_residents",
        RuralChildren => "rural_children",
        RiversideDwellers => "riverside_dwellers",
        Fishermen => "fishermen",
        Herders => "herders",
        Washerwomen => "washerwomen",
        UrbanWorkers => "urban_workers",
        UrbanCommunities => "urban_communities",
        PoultryWorkers => "poultry_workers",
        CoastalCommunities => "coastal_communities",
        CommunitiesWithoutSanitation => "communities_without_sanitation",
        PrecariousHousingResidents => "precarious_housing_residents",
        Travellers => "travellers",
        Refugees => "refugees",
        LowIncome => "low_income",
    }
}

impl RiskGroup {
    /// Groups defined by where or how people live and work rather than by physiology.
    ///
    /// Membership cannot be derived from the patient record; the caller's
    /// vulnerable-population flag stands in for it.
    pub fn is_exposure_group(self) -> bool {
        matches!(
            self,
            RiskGroup::NonImmune
                | RiskGroup::RuralWorkers
                | RiskGroup::RuralResidents
                | RiskGroup::RuralChildren
                | RiskGroup::RiversideDwellers
                | RiskGroup::Fishermen
                | RiskGroup::Herders
                | RiskGroup::Washerwomen
                | RiskGroup::UrbanWorkers
                | RiskGroup::UrbanCommunities
                | RiskGroup::PoultryWorkers
                | RiskGroup::CoastalCommunities
                | RiskGroup::CommunitiesWithoutSanitation
                | RiskGroup::PrecariousHousingResidents
                | RiskGroup::Travellers
                | RiskGroup::Refugees
                | RiskGroup::LowIncome
        )
    }
}

vocabulary! {
    /// Relevant entries of the patient's medical history.
    pub enum MedicalCondition ("medical condition") {
        Diabetes => "diabetes",
        Hypertension => "hypertension",
        HeartDisease => "heart_disease",
        LungDisease => "lung_disease",
        Immunosuppression => "immunosuppression",
        Malnutrition => "malnutrition",
        Hiv => "hiv",
        Cancer => "cancer",
        Tuberculosis => "tuberculosis",
        Hepatitis => "hepatitis",
        KidneyDisease => "kidney_disease",
        Pregnancy => "pregnancy",
        Breastfeeding => "breastfeeding",
        IncompleteVaccination => "incomplete_vaccination",
        SickContact => "sick_contact",
    }
}

vocabulary! {
    /// Geographic regions with a dedicated knowledge base.
    pub enum Region ("region") {
        BrazilNorth => "brazil_north",
        SubSaharanAfrica => "sub_saharan_africa",
        SouthAsia => "south_asia",
    }
}

vocabulary! {
    /// Patient sex as recorded at triage.
    pub enum Sex ("sex") {
        Male => "male",
        Female => "female",
        Unspecified => "unspecified",
    }
}

vocabulary! {
    /// Intrinsic severity tier of a disease.
    pub enum Severity ("severity") {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

vocabulary! {
    /// Regional prevalence tier of a disease.
    pub enum Prevalence ("prevalence") {
        Low => "low",
        Medium => "medium",
        High => "high",
        VeryHigh => "very_high",
    }
}

vocabulary! {
    /// Triage urgency tier. Ordered from least to most urgent.
    pub enum UrgencyLevel ("urgency") {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Critical => "CRITICAL",
    }
}

impl From<Severity> for UrgencyLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => UrgencyLevel::Low,
            Severity::Medium => UrgencyLevel::Medium,
            Severity::High => UrgencyLevel::High,
            Severity::Critical => UrgencyLevel::Critical,
        }
    }
}
