//! Patient record model: validation of untrusted input and derived
//! health metrics.
//!
//! `bmi` and `verdict` are pure functions of `height`/`weight`. They are
//! recomputed on every read and never persisted, so they can never go
//! stale after an update.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The six base-field keys accepted from clients. Anything else in a
/// request body (including `id` on updates, `bmi`, `verdict`) is ignored.
const FIELD_KEYS: [&str; 6] = ["name", "city", "age", "gender", "height", "weight"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// BMI category. Serialized with the capitalized variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Underweight,
    Normal,
    Obese,
}

/// The stored shape of a record: everything except the id (which is the
/// storage key) and the derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientFields {
    pub name: String,
    pub city: String,
    pub age: u32,
    pub gender: Gender,
    pub height: f64,
    pub weight: f64,
}

impl PatientFields {
    /// Body mass index, rounded to two decimal places.
    pub fn bmi(&self) -> f64 {
        ((self.weight / (self.height * self.height)) * 100.0).round() / 100.0
    }

    pub fn verdict(&self) -> Verdict {
        let bmi = self.bmi();
        if bmi < 18.5 {
            Verdict::Underweight
        } else if bmi < 25.0 {
            Verdict::Normal
        } else if bmi < 30.0 {
            // The 25-30 band reports Normal, not Overweight. Kept as the
            // upstream dataset labels it.
            Verdict::Normal
        } else {
            Verdict::Obese
        }
    }

    /// Validate an untrusted JSON body into a full set of base fields,
    /// collecting a violation for every bad field rather than stopping
    /// at the first.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let Some(obj) = value.as_object() else {
            return Err(ValidationError::single("body", "expected a JSON object"));
        };

        let mut violations = Vec::new();

        let name = string_field(obj, "name", &mut violations);
        let city = string_field(obj, "city", &mut violations);

        let age = match obj.get("age") {
            None => {
                violations.push(Violation::new("age", "field required"));
                None
            }
            Some(v) => match v.as_i64() {
                Some(n) if n > 0 && n < 120 => Some(n as u32),
                Some(n) => {
                    violations.push(Violation::new(
                        "age",
                        format!("{n} is out of range, expected 0 < age < 120"),
                    ));
                    None
                }
                None => {
                    violations.push(Violation::new("age", "must be an integer"));
                    None
                }
            },
        };

        let gender = match obj.get("gender") {
            None => {
                violations.push(Violation::new("gender", "field required"));
                None
            }
            Some(Value::String(s)) => match s.as_str() {
                "male" => Some(Gender::Male),
                "female" => Some(Gender::Female),
                "other" => Some(Gender::Other),
                _ => {
                    violations.push(Violation::new(
                        "gender",
                        "must be one of: male, female, other",
                    ));
                    None
                }
            },
            Some(_) => {
                violations.push(Violation::new("gender", "must be a string"));
                None
            }
        };

        let height = positive_number_field(obj, "height", &mut violations);
        let weight = positive_number_field(obj, "weight", &mut violations);

        match (name, city, age, gender, height, weight) {
            (Some(name), Some(city), Some(age), Some(gender), Some(height), Some(weight))
                if violations.is_empty() =>
            {
                Ok(Self {
                    name,
                    city,
                    age,
                    gender,
                    height,
                    weight,
                })
            }
            _ => Err(ValidationError { violations }),
        }
    }

    /// Apply a partial update: overlay the base-field keys present in
    /// `patch` onto this record, then re-validate the merged shape as a
    /// whole. Any violation fails the entire update.
    pub fn merge_update(&self, patch: &Value) -> Result<Self, ValidationError> {
        let Some(patch) = patch.as_object() else {
            return Err(ValidationError::single("body", "expected a JSON object"));
        };

        let mut merged = json!({
            "name": self.name,
            "city": self.city,
            "age": self.age,
            "gender": self.gender,
            "height": self.height,
            "weight": self.weight,
        });
        if let Some(base) = merged.as_object_mut() {
            for key in FIELD_KEYS {
                if let Some(v) = patch.get(key) {
                    base.insert(key.to_string(), v.clone());
                }
            }
        }

        Self::from_value(&merged)
    }
}

/// A full record: caller-assigned id plus the stored fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patient {
    pub id: String,
    #[serde(flatten)]
    pub fields: PatientFields,
}

impl Patient {
    /// Validate an untrusted creation body, which must also carry the id.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let mut violations = Vec::new();

        let id = match value.get("id") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::String(_)) => {
                violations.push(Violation::new("id", "must be a non-empty string"));
                None
            }
            Some(_) => {
                violations.push(Violation::new("id", "must be a string"));
                None
            }
            None => {
                violations.push(Violation::new("id", "field required"));
                None
            }
        };

        let fields = match PatientFields::from_value(value) {
            Ok(fields) => Some(fields),
            Err(err) => {
                violations.extend(err.violations);
                None
            }
        };

        match (id, fields) {
            (Some(id), Some(fields)) => Ok(Self { id, fields }),
            _ => Err(ValidationError { violations }),
        }
    }

    /// Serializable view including the derived fields.
    pub fn view(&self) -> PatientView<'_> {
        PatientView::new(&self.id, &self.fields)
    }
}

/// Output shape of a record: id, base fields, and the derived metrics
/// computed at serialization time.
#[derive(Debug, Serialize)]
pub struct PatientView<'a> {
    pub id: &'a str,
    #[serde(flatten)]
    pub fields: &'a PatientFields,
    pub bmi: f64,
    pub verdict: Verdict,
}

impl<'a> PatientView<'a> {
    pub fn new(id: &'a str, fields: &'a PatientFields) -> Self {
        Self {
            id,
            fields,
            bmi: fields.bmi(),
            verdict: fields.verdict(),
        }
    }
}

/// One violated field constraint.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every field constraint violated by an input body, not just the first.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation::new(field, message)],
        }
    }
}

fn string_field(
    obj: &serde_json::Map<String, Value>,
    key: &'static str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::String(_)) => {
            violations.push(Violation::new(key, "must be a non-empty string"));
            None
        }
        Some(_) => {
            violations.push(Violation::new(key, "must be a string"));
            None
        }
        None => {
            violations.push(Violation::new(key, "field required"));
            None
        }
    }
}

fn positive_number_field(
    obj: &serde_json::Map<String, Value>,
    key: &'static str,
    violations: &mut Vec<Violation>,
) -> Option<f64> {
    match obj.get(key) {
        None => {
            violations.push(Violation::new(key, "field required"));
            None
        }
        Some(v) => match v.as_f64() {
            Some(n) if n > 0.0 => Some(n),
            Some(n) => {
                violations.push(Violation::new(key, format!("{n} must be greater than 0")));
                None
            }
            None => {
                violations.push(Violation::new(key, "must be a number"));
                None
            }
        },
    }
}
