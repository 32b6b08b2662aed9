use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

/// Code of the "no translation" entry.
pub const NO_TRANSLATION: &str = "none";

const SUPPORTED: &[Language] = &[
    Language { code: NO_TRANSLATION, name: "None" },
    Language { code: "ar", name: "Arabic" },
    Language { code: "bn", name: "Bengali" },
    Language { code: "zh", name: "Chinese (Simplified)" },
    Language { code: "nl", name: "Dutch" },
    Language { code: "fr", name: "French" },
    Language { code: "de", name: "German" },
    Language { code: "hi", name: "Hindi" },
    Language { code: "it", name: "Italian" },
    Language { code: "ja", name: "Japanese" },
    Language { code: "ko", name: "Korean" },
    Language { code: "pt", name: "Portuguese" },
    Language { code: "ru", name: "Russian" },
    Language { code: "es", name: "Spanish" },
    Language { code: "ta", name: "Tamil" },
    Language { code: "te", name: "Telugu" },
    Language { code: "tr", name: "Turkish" },
    Language { code: "ur", name: "Urdu" },
    Language { code: "vi", name: "Vietnamese" },
];

/// All selectable targets, "none" first, in display order.
pub fn supported_languages() -> &'static [Language] {
    SUPPORTED
}

pub fn find_language(code: &str) -> Option<&'static Language> {
    let code = code.trim();
    SUPPORTED.iter().find(|l| l.code.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_sentinel_plus_eighteen_languages() {
        let langs = supported_languages();
        assert_eq!(langs.len(), 19);
        assert_eq!(langs[0].code, NO_TRANSLATION);
        assert_eq!(langs.iter().filter(|l| l.code == NO_TRANSLATION).count(), 1);
    }

    #[test]
    fn lookup_is_case_insensitive_and_trims() {
        assert_eq!(find_language(" FR ").map(|l| l.name), Some("French"));
        assert!(find_language("xx").is_none());
        assert_eq!(find_language("zh").map(|l| l.name), Some("Chinese (Simplified)"));
    }
}
