/// Restoration options chosen by the user
///
/// This struct holds every parameter that steers the prompt sent to the
/// generative model. The two enums are closed value sets, so an invalid
/// main request or gender is unrepresentable.

use std::fmt;

/// The primary restoration style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainRequest {
    /// Sharp, clear, high-quality output with enhanced details
    HighQuality,
    /// Preserve the original character, only remove damage and noise
    Original,
    /// Recreate the face with high detail
    DetailedFace,
    /// Close-up portrait framing, face is the main focus
    Portrait,
    /// Landscape / scenery photo without a subject
    Scenery,
}

impl MainRequest {
    /// All choices, in the order they appear in the control panel
    pub const ALL: [MainRequest; 5] = [
        MainRequest::HighQuality,
        MainRequest::Original,
        MainRequest::DetailedFace,
        MainRequest::Portrait,
        MainRequest::Scenery,
    ];
}

impl fmt::Display for MainRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MainRequest::HighQuality => "High-quality restoration",
            MainRequest::Original => "Keep the original character",
            MainRequest::DetailedFace => "Detailed face recreation",
            MainRequest::Portrait => "Close-up portrait",
            MainRequest::Scenery => "Scenery (no subject)",
        };
        write!(f, "{}", label)
    }
}

/// Subject gender hint for the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    NotSpecified,
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::NotSpecified, Gender::Male, Gender::Female];
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::NotSpecified => "Not specified",
            Gender::Male => "Male",
            Gender::Female => "Female",
        };
        write!(f, "{}", label)
    }
}

/// Everything the user selected in the control panel
///
/// `age` and `additional_request` are free text and deliberately unvalidated;
/// empty means "omit the corresponding clause from the prompt".
#[derive(Debug, Clone, PartialEq)]
pub struct RestorationOptions {
    pub main_request: MainRequest,
    pub gender: Gender,
    pub age: String,
    pub keep_id: bool,
    pub remake_hair: bool,
    pub remake_clothes: bool,
    pub additional_request: String,
}

impl Default for RestorationOptions {
    fn default() -> Self {
        Self {
            main_request: MainRequest::HighQuality,
            gender: Gender::NotSpecified,
            age: String::new(),
            keep_id: true,
            remake_hair: false,
            remake_clothes: false,
            additional_request: String::new(),
        }
    }
}

impl RestorationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether every field is still at its default value
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_defaults() {
        let options = RestorationOptions::default();

        assert_eq!(options.main_request, MainRequest::HighQuality);
        assert_eq!(options.gender, Gender::NotSpecified);
        assert!(options.age.is_empty());
        assert!(options.keep_id);
        assert!(!options.remake_hair);
        assert!(!options.remake_clothes);
        assert!(options.additional_request.is_empty());
        assert!(options.is_default());
    }

    #[test]
    fn test_single_field_edit_preserves_the_rest() {
        let mut options = RestorationOptions::default();
        options.gender = Gender::Female;

        assert!(!options.is_default());
        assert_eq!(options.main_request, MainRequest::HighQuality);
        assert!(options.keep_id);
    }
}
