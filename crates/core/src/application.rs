//! Application statuses.

define_text_enum! {
    /// Review status of a student's application.
    ApplicationStatus ("application status") {
        Draft = "Draft",
        Submitted = "Submitted",
        UnderReview = "Under Review",
        Accepted = "Accepted",
        Rejected = "Rejected",
        Withdrawn = "Withdrawn",
    }
}

impl ApplicationStatus {
    /// Whether the application has reached a final decision.
    pub fn is_final(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Withdrawn)
    }
}
