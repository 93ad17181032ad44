//! プロンプト生成モジュール
//!
//! CLI・プロキシサーバ・Web(WASM)で共有されるプロンプト:
//! - NO_MEDICINE_MARKER: 薬剤なし応答の見出し
//! - build_prescription_prompt: 処方箋解析用プロンプト（言語のみ差し込み）

/// 薬剤が見つからない場合にモデルが返す見出し
pub const NO_MEDICINE_MARKER: &str = "NO MEDICINE IDENTIFIED!!";

/// 言語指定の文言（プロンプト末尾）
const LANGUAGE_LINE_PREFIX: &str = "The user's selected language is ";

/// 処方箋解析プロンプト
///
/// 変数は `language` の1つだけ。言語以外の部分は常に同一
///
/// # Arguments
/// * `language` - 説明文の出力言語（"English", "Kannada", "Hindi" など）
pub fn build_prescription_prompt(language: &str) -> String {
    format!(
        r#"You are called DocSnap, an expert in biology and medicines.
You help patients read their prescriptions more easily and are not a medical advisor.
You provide details and information of the same prescription. The user uploads an image of their prescription.
You analyze the image to identify medication details (excluding doctor instructions etc.) and distinguish them with dosage information (mg, tab etc.).
For each medicine, you explain the name (active ingredient and brand name if applicable), dosage, and side effects in the user's preferred language
(including Kannada and Hindi without English translation).
The information should be presented in the following HTML format:

<div class="medicine">
  <h3>Medicine Name: [Medicine Name]</h3>
  <p>Active Ingredient: [Active Ingredient]</p>
  <p>Dosage: [Dosage]</p>
  <p>Side Effects: [Side Effects]</p>
</div>

If the image doesn't contain any medicine name respond:
<div class="medicine">
  <h3>{marker}</h3>
</div>
{prefix}{language}."#,
        marker = NO_MEDICINE_MARKER,
        prefix = LANGUAGE_LINE_PREFIX,
        language = language.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_language() {
        let prompt = build_prescription_prompt("Kannada");
        assert!(prompt.ends_with("The user's selected language is Kannada."));
    }

    #[test]
    fn test_prompt_contains_fixed_fragments() {
        let prompt = build_prescription_prompt("English");
        assert!(prompt.contains(r#"<div class="medicine">"#));
        assert!(prompt.contains("<h3>Medicine Name: [Medicine Name]</h3>"));
        assert!(prompt.contains("<p>Side Effects: [Side Effects]</p>"));
        assert!(prompt.contains(NO_MEDICINE_MARKER));
        assert!(prompt.contains("excluding doctor instructions"));
    }

    #[test]
    fn test_prompt_differs_only_in_language() {
        let english = build_prescription_prompt("English");
        let hindi = build_prescription_prompt("Hindi");
        assert_ne!(english, hindi);

        let english_rest = english.strip_suffix("English.").unwrap();
        let hindi_rest = hindi.strip_suffix("Hindi.").unwrap();
        assert_eq!(english_rest, hindi_rest);
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(
            build_prescription_prompt("Hindi"),
            build_prescription_prompt("Hindi")
        );
    }

    #[test]
    fn test_language_is_trimmed() {
        assert_eq!(
            build_prescription_prompt("  Hindi \n"),
            build_prescription_prompt("Hindi")
        );
    }
}
