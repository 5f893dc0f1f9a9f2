#![deny(unsafe_code)]

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("unknown domain '{code}' (supported: {supported})")]
    UnknownDomain { code: String, supported: String },
}

impl StandardsError {
    pub(crate) fn unknown_domain(code: &str) -> Self {
        Self::UnknownDomain {
            code: code.to_string(),
            supported: crate::registry::StandardDomain::ALL
                .iter()
                .map(|domain| domain.code())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
