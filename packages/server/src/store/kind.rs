use std::fmt;
use std::str::FromStr;

/// The singleton content kinds the admin dashboard can edit.
///
/// One enum variant per kind keeps the store generic: all kinds share the
/// `page`/`section` table family and one reconcile implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageKind {
    Homepage,
    Safe,
    Precise,
    Personal,
    FirstVisit,
    PatientInstructions,
}

impl PageKind {
    pub const ALL: &[PageKind] = &[
        PageKind::Homepage,
        PageKind::Safe,
        PageKind::Precise,
        PageKind::Personal,
        PageKind::FirstVisit,
        PageKind::PatientInstructions,
    ];

    /// URL/database slug for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Homepage => "homepage",
            Self::Safe => "safe",
            Self::Precise => "precise",
            Self::Personal => "personal",
            Self::FirstVisit => "first-visit",
            Self::PatientInstructions => "patient-instructions",
        }
    }

    /// Media-host folder for uploads belonging to this kind.
    pub fn media_folder(&self) -> String {
        format!("pages/{}", self.as_str())
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PageKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}
