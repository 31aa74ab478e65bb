// ---------------------------------------------------------------------------
// ParsedField
// ---------------------------------------------------------------------------

/// Outcome of normalizing one raw field: a typed value or nothing at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedField<T> {
    Valid(T),
    Invalid,
}

impl<T> ParsedField<T> {
    pub fn valid(self) -> Option<T> {
        match self {
            Self::Valid(v) => Some(v),
            Self::Invalid => None,
        }
    }
}

impl<T> From<Option<T>> for ParsedField<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Valid(v),
            None => Self::Invalid,
        }
    }
}

/// A parsed `systolic/diastolic` reading in mmHg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: u32,
}

// ---------------------------------------------------------------------------
// CategoryResult
// ---------------------------------------------------------------------------

/// Score contributed by one risk category.
///
/// An invalid result always carries a score of zero; the fields are private
/// so the pair cannot be built any other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryResult {
    score: u8,
    valid: bool,
}

impl CategoryResult {
    pub fn scored(score: u8) -> Self {
        Self { score, valid: true }
    }

    pub fn invalid() -> Self {
        Self {
            score: 0,
            valid: false,
        }
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// The three independent risk dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskCategory {
    BloodPressure,
    Temperature,
    Age,
}

impl RiskCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskCategory::BloodPressure => "blood_pressure",
            RiskCategory::Temperature => "temperature",
            RiskCategory::Age => "age",
        }
    }
}

// ---------------------------------------------------------------------------
// PatientAssessment
// ---------------------------------------------------------------------------

/// Per-patient scoring outcome. Derived on the fly, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientAssessment {
    pub patient_id: String,
    pub total_score: u8,
    pub blood_pressure: CategoryResult,
    pub temperature: CategoryResult,
    pub age: CategoryResult,
    /// Parsed temperature in °F, kept for fever classification.
    pub temperature_f: Option<f64>,
}

impl PatientAssessment {
    pub fn categories(&self) -> [(RiskCategory, CategoryResult); 3] {
        [
            (RiskCategory::BloodPressure, self.blood_pressure),
            (RiskCategory::Temperature, self.temperature),
            (RiskCategory::Age, self.age),
        ]
    }

    pub fn all_valid(&self) -> bool {
        self.categories().iter().all(|(_, r)| r.is_valid())
    }

    pub fn invalid_categories(&self) -> Vec<RiskCategory> {
        self.categories()
            .into_iter()
            .filter(|(_, r)| !r.is_valid())
            .map(|(c, _)| c)
            .collect()
    }
}
