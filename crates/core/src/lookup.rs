//! Reference vocabularies managed by admins (degrees, faculties, ...).
//!
//! All kinds share one `lookup_values` table keyed by `kind`. At most one
//! value per kind may be the default.

define_text_enum! {
    /// Kind of lookup vocabulary. The text doubles as the URL path segment.
    LookupKind ("lookup kind") {
        Degree = "degree",
        Faculty = "faculty",
        AcademicYear = "academic-year",
        Semester = "semester",
        City = "city",
        Language = "language",
        Specialty = "specialty",
    }
}

impl LookupKind {
    /// Entity name used in `NotFound` errors.
    pub fn entity_name(self) -> &'static str {
        match self {
            Self::Degree => "Degree",
            Self::Faculty => "Faculty",
            Self::AcademicYear => "Academic year",
            Self::Semester => "Semester",
            Self::City => "City",
            Self::Language => "Language",
            Self::Specialty => "Specialty",
        }
    }
}

/// Maximum length of a lookup value name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of a lookup value code.
pub const MAX_CODE_LENGTH: usize = 20;
