//! Lead types, statuses, and the rules of lead-to-student conversion.

use crate::error::CoreError;
use crate::types::DbId;

define_text_enum! {
    /// Who the lead is: a prospective student or a recruiting agent.
    LeadType ("lead type") {
        Student = "Student",
        Agent = "Agent",
    }
}

define_text_enum! {
    /// Sales pipeline status of a lead.
    LeadStatus ("lead status") {
        New = "New",
        Contacted = "Contacted",
        Qualified = "Qualified",
        Converted = "Converted",
        Lost = "Lost",
    }
}

/// Keys written into `students.metadata` by a conversion.
pub mod metadata_keys {
    pub const CONVERTED_FROM_LEAD_ID: &str = "converted_from_lead_id";
    pub const CONVERTED_FROM_LEAD_CODE: &str = "converted_from_lead_code";
    pub const SOURCE: &str = "source";
    pub const PREFERRED_PROGRAM: &str = "preferred_program";
    pub const PREFERRED_DEGREE: &str = "preferred_degree";
    pub const PREFERRED_INTAKE: &str = "preferred_intake";
}

/// Split a full name into `(first_name, last_name)` at the first whitespace run.
///
/// Everything after the first token stays in the last name, so
/// `"Maria de la Cruz"` becomes `("Maria", "de la Cruz")`. A single token
/// yields an empty last name.
pub fn split_full_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim_start().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

/// Check the preconditions for converting a lead into a student.
///
/// - The lead must be of type `Student` (agents are never converted).
/// - The lead must not be `Converted` or already point at a student. The
///   status alone is enough: the student link outlives the student row.
/// - The lead must carry a non-blank name to derive the student's name from.
pub fn ensure_convertible(
    lead_type: LeadType,
    status: LeadStatus,
    converted_to_student_id: Option<DbId>,
    full_name: &str,
) -> Result<(), CoreError> {
    if lead_type != LeadType::Student {
        return Err(CoreError::Validation(format!(
            "Invalid lead type '{lead_type}': only Student leads can be converted"
        )));
    }
    match (status, converted_to_student_id) {
        (_, Some(student_id)) => {
            return Err(CoreError::Conflict(format!(
                "Lead has already been converted to student {student_id}"
            )));
        }
        (LeadStatus::Converted, None) => {
            return Err(CoreError::Conflict(
                "Lead has already been converted".to_string(),
            ));
        }
        _ => {}
    }
    if full_name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Lead has no name to convert".to_string(),
        ));
    }
    Ok(())
}

/// Check that an update to a lead respects the conversion rules.
///
/// `Converted` is only reachable through the conversion workflow, and a
/// converted lead keeps its status and type.
pub fn ensure_update_allowed(
    converted: bool,
    requested_status: Option<LeadStatus>,
    requested_type: Option<LeadType>,
    current_status: LeadStatus,
    current_type: LeadType,
) -> Result<(), CoreError> {
    if converted {
        let status_changes = requested_status.is_some_and(|s| s != current_status);
        let type_changes = requested_type.is_some_and(|t| t != current_type);
        if status_changes || type_changes {
            return Err(CoreError::Conflict(
                "Lead has already been converted; its status and type are fixed".to_string(),
            ));
        }
        return Ok(());
    }
    if requested_status == Some(LeadStatus::Converted) {
        return Err(CoreError::Validation(
            "Use the convert operation to mark a lead as Converted".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn splits_two_token_name() {
        assert_eq!(
            split_full_name("Ahmed Ali"),
            ("Ahmed".to_string(), "Ali".to_string())
        );
    }

    #[test]
    fn keeps_compound_surname_together() {
        assert_eq!(
            split_full_name("Maria de la Cruz"),
            ("Maria".to_string(), "de la Cruz".to_string())
        );
    }

    #[test]
    fn single_token_has_empty_last_name() {
        assert_eq!(split_full_name("Madonna"), ("Madonna".to_string(), String::new()));
    }

    #[test]
    fn surrounding_and_repeated_whitespace_is_ignored() {
        assert_eq!(
            split_full_name("  Ahmed    Ali  "),
            ("Ahmed".to_string(), "Ali".to_string())
        );
    }

    #[test]
    fn agent_lead_is_not_convertible() {
        assert_matches!(
            ensure_convertible(LeadType::Agent, LeadStatus::New, None, "Agency Rep"),
            Err(CoreError::Validation(msg)) => assert!(msg.contains("Invalid lead type"))
        );
    }

    #[test]
    fn converted_lead_is_not_convertible_again() {
        assert_matches!(
            ensure_convertible(LeadType::Student, LeadStatus::Converted, Some(12), "Ahmed Ali"),
            Err(CoreError::Conflict(msg)) => assert!(msg.contains("already been converted"))
        );
    }

    #[test]
    fn converted_status_without_student_link_is_not_convertible() {
        assert_matches!(
            ensure_convertible(LeadType::Student, LeadStatus::Converted, None, "Ahmed Ali"),
            Err(CoreError::Conflict(msg)) => assert!(msg.contains("already been converted"))
        );
    }

    #[test]
    fn blank_name_is_not_convertible() {
        assert_matches!(
            ensure_convertible(LeadType::Student, LeadStatus::Qualified, None, "   "),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn fresh_student_lead_is_convertible() {
        assert!(ensure_convertible(LeadType::Student, LeadStatus::Qualified, None, "Ahmed Ali").is_ok());
    }

    #[test]
    fn cannot_set_converted_through_update() {
        let result = ensure_update_allowed(
            false,
            Some(LeadStatus::Converted),
            None,
            LeadStatus::Qualified,
            LeadType::Student,
        );
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn converted_lead_keeps_status_and_type() {
        let status_change = ensure_update_allowed(
            true,
            Some(LeadStatus::Lost),
            None,
            LeadStatus::Converted,
            LeadType::Student,
        );
        assert_matches!(status_change, Err(CoreError::Conflict(_)));

        let type_change = ensure_update_allowed(
            true,
            None,
            Some(LeadType::Agent),
            LeadStatus::Converted,
            LeadType::Student,
        );
        assert_matches!(type_change, Err(CoreError::Conflict(_)));
    }

    #[test]
    fn converted_lead_accepts_unchanged_values() {
        let result = ensure_update_allowed(
            true,
            Some(LeadStatus::Converted),
            Some(LeadType::Student),
            LeadStatus::Converted,
            LeadType::Student,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn status_parses_from_stored_text() {
        assert_eq!("Qualified".parse::<LeadStatus>().unwrap(), LeadStatus::Qualified);
        assert!("qualified".parse::<LeadStatus>().is_err());
    }
}
