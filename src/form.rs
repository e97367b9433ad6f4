//! Describes the input form that collects a record from a user: the fields,
//! their bounds or choices, and their captions in English and Kurdish.

use crate::align::Record;
use crate::dataset::{Column, Table, Value};
use crate::error::{Error, Result};
use crate::label::Language;

/// Columns that are always a Male/Female choice.
const FIXED_GENDER: &str = "Gender";

/// Columns shown as a choice over the values seen in the dataset. Other
/// numeric columns are bounded number inputs.
const CHOICE_COLUMNS: [&str; 8] = [
    "LearningStyle",
    "Motivation",
    "Discussions",
    "Extracurricular",
    "Resources",
    "Internet",
    "EduTech",
    "StressLevel",
];

/// How a field is entered.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// An integer in the range ['min', 'max'].
    Number { min: i64, max: i64, default: i64 },
    /// One of 'options'. The first option is the default.
    Choice { options: Vec<Value> },
}

/// A single field of the form.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
}

impl FieldSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn default_value(&self) -> Option<Value> {
        match &self.kind {
            FieldKind::Number { default, .. } => {
                Some(Value::Number(*default as f64))
            }
            FieldKind::Choice { options } => options.first().cloned(),
        }
    }

    /// The label shown next to the field.
    pub fn caption(&self, lang: Language) -> String {
        match caption(&self.name, lang) {
            Some(text) => text.to_string(),
            None => format!("{}:", self.name),
        }
    }

    /// The label of the option 'val' of this field.
    pub fn option_label(&self, val: &Value, lang: Language) -> String {
        let code = match val {
            Value::Number(num) if num.fract() == 0.0 => *num as i64,
            _ => return val.to_string(),
        };
        option_label(&self.name, code, lang).unwrap_or_else(|| val.to_string())
    }

    /// Check that 'val' is a legal value of this field.
    pub fn check(&self, val: &Value) -> Result<()> {
        let legal = match (&self.kind, val) {
            (FieldKind::Number { min, max, .. }, Value::Number(num)) => {
                *num >= *min as f64 && *num <= *max as f64
            }
            (FieldKind::Number { .. }, Value::Category(_)) => false,
            (FieldKind::Choice { options }, val) => {
                options.iter().any(|opt| same_choice(opt, val))
            }
        };
        if legal {
            Ok(())
        } else {
            Err(Error::InvalidValue {
                column: self.name.clone(),
                value: val.to_string(),
            })
        }
    }
}

/// The fields of the form, in training column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSpec {
    fields: Vec<FieldSpec>,
}

impl FormSpec {
    /// Derive one field per column of 'features', a table that holds only
    /// the feature columns.
    pub fn from_table(features: &Table) -> Self {
        let fields = features
            .columns()
            .iter()
            .map(|col| FieldSpec {
                name: col.name().to_string(),
                kind: field_kind(col),
            })
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check every value of 'record' against its field.
    pub fn check(&self, record: &Record) -> Result<()> {
        for name in record.names() {
            let field = self.field(name).ok_or_else(|| {
                Error::SchemaMismatch(format!("unknown feature '{}'", name))
            })?;
            let exact = match (field.kind(), record.text(name)) {
                (FieldKind::Choice { options }, Some(text)) => {
                    options.iter().any(|opt| opt.as_category() == text)
                }
                _ => false,
            };
            if let (false, Some(val)) = (exact, record.get(name)) {
                field.check(val)?;
            }
        }
        Ok(())
    }
}

/// Returns true if 'val' selects the option 'opt'. Numbers match by value,
/// also against options that are numeric-looking text.
fn same_choice(opt: &Value, val: &Value) -> bool {
    match (opt, val) {
        (Value::Category(label), Value::Number(num)) => {
            Value::parse(label) == Value::Number(*num)
        }
        _ => opt == val,
    }
}

fn field_kind(col: &Column) -> FieldKind {
    let name = col.name();
    if name == FIXED_GENDER && col.is_numeric() {
        let options = vec![Value::Number(0.0), Value::Number(1.0)];
        return FieldKind::Choice { options };
    }
    if !col.is_numeric() || CHOICE_COLUMNS.contains(&name) {
        return FieldKind::Choice {
            options: col.distinct(),
        };
    }
    let trunc = |val: Option<f64>| val.unwrap_or_default().trunc() as i64;
    FieldKind::Number {
        min: trunc(col.min()),
        max: trunc(col.max()),
        default: trunc(col.mean()),
    }
}

fn caption(name: &str, lang: Language) -> Option<&'static str> {
    let (en, ku) = match name {
        "Gender" => ("Gender:", "جێندەر:"),
        "Age" => ("Age:", "تەمەن:"),
        "LearningStyle" => ("Learning Style:", "شێوازی فێربوون:"),
        "Motivation" => ("Motivation Level:", "ئاستی هاندان:"),
        "StudyHours" => {
            ("Study Hours per Week:", "کاتژمێرەکانی خوێندن لە هەفتەیەکدا:")
        }
        "Attendance" => ("Attendance Rate (%):", "ڕێژەی بەشداریکردن (%):"),
        "AssignmentCompletion" => (
            "Assignment Completion Rate (%):",
            "ڕێژەی تەواوکردنی ئەرکەکان (%):",
        ),
        "OnlineCourses" => {
            ("Number of Online Courses:", "ژمارەی کۆرسە ئۆنلاینەکان:")
        }
        "Discussions" => {
            ("Participate in Discussions:", "بەشداری لە گفتوگۆکاندا:")
        }
        "Extracurricular" => (
            "Extracurricular Activities:",
            "بەشداری لە چالاکییەکانی دەرەوە:",
        ),
        "Resources" => {
            ("Resource Access Level:", "ئاستی دەستگەیشتن بە سەرچاوەکان:")
        }
        "Internet" => ("Internet Access:", "دەستگەیشتن بە ئینتەرنێت:"),
        "EduTech" => (
            "Use Educational Technology:",
            "بەکارهێنانی تەکنەلۆژیای پەروەردەیی:",
        ),
        "StressLevel" => ("Stress Level:", "ئاستی فشاری دەروونی:"),
        _ => return None,
    };
    Some(match lang {
        Language::English => en,
        Language::Kurdish => ku,
    })
}

fn option_label(name: &str, code: i64, lang: Language) -> Option<String> {
    let pick = |en: &str, ku: &str| match lang {
        Language::English => en.to_string(),
        Language::Kurdish => ku.to_string(),
    };

    let label = match name {
        "Gender" => match code {
            0 => pick("Male", "نێر"),
            1 => pick("Female", "مێ"),
            _ => return None,
        },
        "LearningStyle" => match code {
            0 => pick("Visual", "بینراو"),
            1 => pick("Auditory", "بیستن"),
            2 => pick("Kinesthetic", "دەست"),
            3 => pick("Reading/Writing", "خوێندنەوە/نووسین"),
            _ => pick(&format!("Style {}", code), &format!("شێواز {}", code)),
        },
        "Motivation" | "Resources" | "StressLevel" => match code {
            0 => pick("Low", "نزم"),
            1 => pick("Medium", "مامناوەند"),
            2 => pick("High", "بەرز"),
            _ => pick(&format!("Level {}", code), &format!("ئاست {}", code)),
        },
        "Discussions" | "Extracurricular" | "Internet" | "EduTech" => {
            match code {
                0 => pick("No", "نەخێر"),
                1 => pick("Yes", "بەڵێ"),
                _ => pick("Unknown", "نەزانراو"),
            }
        }
        _ => return None,
    };
    Some(label)
}

/// Fixed phrases used when presenting a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    ExamScore,
    OutOf100,
    Level,
    Status,
    CheckFields,
}

impl Phrase {
    pub fn text(&self, lang: Language) -> &'static str {
        match (self, lang) {
            (Phrase::ExamScore, Language::English) => "Exam Score",
            (Phrase::ExamScore, Language::Kurdish) => "نمرە",
            (Phrase::OutOf100, Language::English) => "out of 100",
            (Phrase::OutOf100, Language::Kurdish) => "لە ١٠٠",
            (Phrase::Level, Language::English) => "Level",
            (Phrase::Level, Language::Kurdish) => "ئاست",
            (Phrase::Status, Language::English) => "Status",
            (Phrase::Status, Language::Kurdish) => "دۆخ",
            (Phrase::CheckFields, Language::English) => {
                "Please make sure all fields are filled correctly."
            }
            (Phrase::CheckFields, Language::Kurdish) => {
                "تکایە دڵنیا ببەوە کە هەموو خانەکان بە دروستی پڕکراونەتەوە."
            }
        }
    }
}
