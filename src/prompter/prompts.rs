use super::types::{PromptStyle, TargetLanguage};

use serde_json::{json, Value};

const PREAMBLE: &str = "You are an AI-powered multilingual creative assistant.";

const CLOSING: &str = "Ensure your tone is clear, creative, and helpful. The output must be a valid JSON object matching the provided schema.";

const CONSTRUCTIVE_FORMAT: &str = r#"## **Role:**
(Define the role the AI should assume for this task.)
## **Objective:**
(Clearly state the goal or outcome expected.)
## **Context:**
(Provide background, scenario, or constraints for the task.)
## **Instructions:**
### **Instruction 1 :** (First actionable step based on the user's intent)
### **Instruction 2 :** (Second actionable step)
### **Instruction 3 :** (Third actionable step)
(Add further numbered instructions if the idea needs them. Never fewer than three.)
## **Notes:**
- Add clarifications, assumptions, or constraints here.
- Keep output in Markdown format.
- Expand steps or notes if required."#;

/// Step 4 of every instruction. Exactly one of the two branches is emitted.
fn translation_task(target: &TargetLanguage) -> String {
    match target {
        TargetLanguage::None => "4. Do not perform any translation. The 'translatedPrompt' field in the JSON output must be an empty string.".to_string(),
        TargetLanguage::Translate(lang) => format!(
            "4. Translate ONLY the refined English prompt into {name} ({code}), ensuring the translation sounds natural and fluent, as a native {name} speaker would say it. Put the translation in the 'translatedPrompt' field.",
            name = lang.name,
            code = lang.code,
        ),
    }
}

pub fn system_instruction(style: PromptStyle, target: &TargetLanguage) -> String {
    let translation = translation_task(target);

    match style {
        PromptStyle::Constructive => format!(
            r#"{PREAMBLE} Your goal is to transform a user's raw idea into a highly structured, constructive English prompt and then translate it if requested.

Tasks:
1. Detect the input language of the user's idea and report its name in the 'detectedLanguage' field.
2. Understand the core idea.
3. Generate a refined, constructive English prompt in the 'constructiveEnglishPrompt' field using exactly the following Markdown sections, in this order:
{CONSTRUCTIVE_FORMAT}
{translation}

{CLOSING}"#
        ),
        PromptStyle::Standard => format!(
            r#"{PREAMBLE} Your goal is to transform a user's raw idea into a polished, standard English prompt and then translate it if requested.

Tasks:
1. Detect the input language of the user's idea and report its name in the 'detectedLanguage' field.
2. Understand and summarize the core idea.
3. Generate a refined, short, simple, and actionable English prompt based on that idea in the 'constructiveEnglishPrompt' field.
{translation}

{CLOSING}"#
        ),
    }
}

pub fn user_content(idea: &str, target: &TargetLanguage) -> String {
    match target {
        TargetLanguage::None => format!("User Idea: \"{}\"", idea),
        TargetLanguage::Translate(lang) => format!(
            "User Idea: \"{}\"\nTarget Language for Translation: \"{}\"",
            idea, lang.code
        ),
    }
}

/// JSON schema the model must satisfy. All three fields are required strings.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "detectedLanguage": {
                "type": "STRING",
                "description": "The language detected from the user's input text."
            },
            "constructiveEnglishPrompt": {
                "type": "STRING",
                "description": "A refined, constructive, and polished prompt in English based on the user's core idea. The format should match the requested prompt type (Standard or Constructive)."
            },
            "translatedPrompt": {
                "type": "STRING",
                "description": "The translation of the refined English prompt into the specified target language. If no translation is requested, this must be an empty string."
            }
        },
        "required": ["detectedLanguage", "constructiveEnglishPrompt", "translatedPrompt"],
        "propertyOrdering": ["detectedLanguage", "constructiveEnglishPrompt", "translatedPrompt"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompter::languages::supported_languages;

    const NO_TRANSLATION_CLAUSE: &str = "Do not perform any translation";
    const TRANSLATE_CLAUSE: &str = "Translate ONLY the refined English prompt into";

    fn all_targets() -> Vec<TargetLanguage> {
        supported_languages()
            .iter()
            .map(|l| TargetLanguage::from_code(l.code).unwrap())
            .collect()
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("missing {needle:?} in instruction"))
    }

    #[test]
    fn constructive_sections_are_always_in_order() {
        for target in all_targets() {
            let instr = system_instruction(PromptStyle::Constructive, &target);
            let sections = [
                "## **Role:**",
                "## **Objective:**",
                "## **Context:**",
                "## **Instructions:**",
                "### **Instruction 1 :**",
                "### **Instruction 2 :**",
                "### **Instruction 3 :**",
                "## **Notes:**",
            ];
            let positions: Vec<usize> = sections.iter().map(|s| position(&instr, s)).collect();
            assert!(
                positions.windows(2).all(|w| w[0] < w[1]),
                "sections out of order for target {target}"
            );
        }
    }

    #[test]
    fn standard_has_no_section_structure() {
        let instr = system_instruction(PromptStyle::Standard, &TargetLanguage::None);
        assert!(instr.contains("short, simple, and actionable English prompt"));
        assert!(!instr.contains("## **Role:**"));
    }

    #[test]
    fn translation_clause_is_mutually_exclusive() {
        for style in [PromptStyle::Standard, PromptStyle::Constructive] {
            for target in all_targets() {
                let instr = system_instruction(style, &target);
                let forbids = instr.contains(NO_TRANSLATION_CLAUSE);
                let translates = instr.contains(TRANSLATE_CLAUSE);
                assert!(forbids ^ translates, "style {style:?} target {target}");
                assert_eq!(forbids, target.is_none());
                if let TargetLanguage::Translate(lang) = target {
                    assert!(instr.contains(&format!("{} ({})", lang.name, lang.code)));
                    assert!(instr.contains("natural and fluent"));
                } else {
                    assert!(instr.contains("must be an empty string"));
                }
            }
        }
    }

    #[test]
    fn builder_is_deterministic() {
        let fr = TargetLanguage::from_code("fr").unwrap();
        for style in [PromptStyle::Standard, PromptStyle::Constructive] {
            assert_eq!(system_instruction(style, &fr), system_instruction(style, &fr));
        }
    }

    #[test]
    fn user_content_mentions_target_only_when_translating() {
        let idea = "A mobile app for tracking daily water intake";
        assert_eq!(
            user_content(idea, &TargetLanguage::None),
            "User Idea: \"A mobile app for tracking daily water intake\""
        );

        let de = TargetLanguage::from_code("de").unwrap();
        let content = user_content(idea, &de);
        assert!(content.ends_with("\nTarget Language for Translation: \"de\""));
    }

    #[test]
    fn schema_requires_all_three_string_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, ["detectedLanguage", "constructiveEnglishPrompt", "translatedPrompt"]);
        for field in required {
            assert_eq!(schema["properties"][field]["type"], "STRING");
        }
    }
}
