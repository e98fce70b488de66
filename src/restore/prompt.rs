/// Prompt construction
///
/// Maps the selected options to the natural-language instruction sent to the
/// model alongside the photo. Pure and deterministic: the same options always
/// produce the same string, and the clause order is fixed so outputs stay
/// reproducible.

use crate::state::options::{Gender, MainRequest, RestorationOptions};

/// Wording of the main-request clause, one entry per selectable style
fn mode_clause(request: MainRequest) -> &'static str {
    match request {
        MainRequest::HighQuality => {
            "Restore to a very high quality, sharp, and clear image. Enhance details and fix colors."
        }
        MainRequest::Original => {
            "Restore the photo while preserving its original character and feel as much as possible. Focus on removing damage and noise."
        }
        MainRequest::DetailedFace => {
            "Focus on recreating the face with high detail. Enhance eyes, skin texture, and fine features."
        }
        MainRequest::Portrait => {
            "Restore as a close-up portrait. The face should be the main focus."
        }
        MainRequest::Scenery => {
            "This is a landscape or scenery photo. Restore colors, remove damage, and enhance the overall view."
        }
    }
}

/// Build the full instruction string for one restoration request.
///
/// Optional clauses are omitted entirely when their option is off or empty;
/// the closing no-watermark clause is always the final segment.
pub fn build_prompt(options: &RestorationOptions) -> String {
    let mut prompt = String::from("Please restore this old and damaged photo. ");

    prompt.push_str(mode_clause(options.main_request));
    prompt.push(' ');

    match options.gender {
        Gender::NotSpecified => {}
        Gender::Male => prompt.push_str("The subject is a male. "),
        Gender::Female => prompt.push_str("The subject is a female. "),
    }

    if !options.age.is_empty() {
        prompt.push_str(&format!(
            "They are approximately {} years old. ",
            options.age
        ));
    }

    if options.keep_id {
        prompt.push_str(
            "It is crucial to keep all identifying marks like moles, scars, or unique facial features. Do not remove them. ",
        );
    }

    if options.remake_hair {
        prompt.push_str("Recreate the hair to look natural and detailed. ");
    }

    if options.remake_clothes {
        prompt.push_str("Recreate the clothing to look realistic and sharp. ");
    }

    if !options.additional_request.is_empty() {
        prompt.push_str(&format!(
            "Follow these specific user instructions carefully: \"{}\". ",
            options.additional_request
        ));
    }

    prompt.push_str("The output must be only the restored image, with no added text or watermarks.");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOSING: &str =
        "The output must be only the restored image, with no added text or watermarks.";

    #[test]
    fn test_closing_clause_is_always_last() {
        for request in MainRequest::ALL {
            for gender in Gender::ALL {
                let options = RestorationOptions {
                    main_request: request,
                    gender,
                    age: "42".to_string(),
                    keep_id: true,
                    remake_hair: true,
                    remake_clothes: true,
                    additional_request: "smile".to_string(),
                };
                assert!(build_prompt(&options).ends_with(CLOSING));
            }
        }
    }

    #[test]
    fn test_age_clause_omitted_iff_empty() {
        let mut options = RestorationOptions::default();
        assert!(!build_prompt(&options).contains("years old"));

        options.age = "25".to_string();
        assert!(build_prompt(&options).contains("They are approximately 25 years old."));
    }

    #[test]
    fn test_gender_clause_omitted_iff_not_specified() {
        let mut options = RestorationOptions::default();
        assert!(!build_prompt(&options).contains("The subject is a"));

        options.gender = Gender::Male;
        assert!(build_prompt(&options).contains("The subject is a male."));
    }

    #[test]
    fn test_portrait_of_a_woman() {
        let options = RestorationOptions {
            main_request: MainRequest::Portrait,
            gender: Gender::Female,
            age: "30".to_string(),
            keep_id: true,
            remake_hair: false,
            remake_clothes: false,
            additional_request: String::new(),
        };
        let prompt = build_prompt(&options);

        assert!(prompt.contains("close-up portrait"));
        assert!(prompt.contains("female"));
        assert!(prompt.contains("30 years old"));
        assert!(prompt.contains("identifying marks"));
        assert!(!prompt.contains("Recreate the hair"));
        assert!(!prompt.contains("Recreate the clothing"));
    }

    #[test]
    fn test_additional_request_quoted_verbatim() {
        let options = RestorationOptions {
            additional_request: "add a gentle smile, do NOT change the shirt color".to_string(),
            ..RestorationOptions::default()
        };
        let prompt = build_prompt(&options);

        assert!(prompt.contains(
            "Follow these specific user instructions carefully: \"add a gentle smile, do NOT change the shirt color\"."
        ));
    }

    #[test]
    fn test_deterministic() {
        let options = RestorationOptions::default();
        assert_eq!(build_prompt(&options), build_prompt(&options));
    }
}
