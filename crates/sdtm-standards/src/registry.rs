#![deny(unsafe_code)]

//! Catalogue of the built-in export definitions.

use std::fmt;
use std::str::FromStr;

use crate::error::StandardsError;

/// A built-in SDTM domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardDomain {
    Dm,
    Ae,
    Cm,
}

impl StandardDomain {
    pub const ALL: &'static [StandardDomain] =
        &[StandardDomain::Dm, StandardDomain::Ae, StandardDomain::Cm];

    pub fn code(self) -> &'static str {
        match self {
            StandardDomain::Dm => "DM",
            StandardDomain::Ae => "AE",
            StandardDomain::Cm => "CM",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StandardDomain::Dm => "Demographics",
            StandardDomain::Ae => "Adverse Events",
            StandardDomain::Cm => "Concomitant/Prior Medications",
        }
    }

    /// Record types walked from the root, in order.
    pub fn path(self) -> &'static [&'static str] {
        match self {
            StandardDomain::Dm => &[crate::common::STUDY, crate::common::PARTICIPANT],
            StandardDomain::Ae => &[
                crate::common::STUDY,
                crate::common::PARTICIPANT,
                crate::ae::RECORD_TYPE,
            ],
            StandardDomain::Cm => &[
                crate::common::STUDY,
                crate::common::PARTICIPANT,
                crate::cm::RECORD_TYPE,
            ],
        }
    }
}

impl fmt::Display for StandardDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for StandardDomain {
    type Err = StandardsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        StandardDomain::ALL
            .iter()
            .copied()
            .find(|domain| domain.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| StandardsError::unknown_domain(code))
    }
}
