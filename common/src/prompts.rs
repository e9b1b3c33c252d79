//! プロンプト生成モジュール
//!
//! - モードごとのスタイル表（同じ "roasting" でもモードで指示文が異なる）
//! - build_*_prompt: モード別の指示ブロック
//! - build_prompt: 検証済みリクエストからの振り分け

use crate::types::{ManualAnswers, Mode, ModeRequest, Style};

/// 回答が空の項目に表示する文言
pub const NOT_PROVIDED: &str = "Not provided";

/// manualモードで参照する回答キーと表示ラベル
pub const MANUAL_QUESTIONS: &[(&str, &str)] = &[
    ("favoriteArtist", "Favorite all-time artist"),
    ("favoriteAlbum", "Favorite album of all time"),
    ("currentSong", "Current favorite song"),
    ("currentArtist", "Current favorite artist"),
    ("guiltyPleasure", "Guilty pleasure"),
    ("genres", "Genres listened to most"),
];

/// モードとスタイルから指示文を取得
///
/// 未知のスタイル名は `Style::from_name` の時点で analytical になる
pub fn style_instruction(mode: Mode, style: Style) -> &'static str {
    match mode {
        Mode::Single => single_style(style),
        Mode::Evolution => evolution_style(style),
        Mode::Battle => battle_style(style),
        Mode::Manual => manual_style(style),
    }
}

fn single_style(style: Style) -> &'static str {
    match style {
        Style::Roasting => "You're a brutally honest music critic. Roast their taste while being funny. Point out basic choices, questionable artists, or lack of diversity. Be savage but entertaining.",
        Style::Encouraging => "You're a supportive music enthusiast. Celebrate their taste! Highlight the good choices, interesting discoveries, and unique aspects. Be genuinely positive.",
        Style::Sarcastic => "You're a playfully sarcastic music snob. Use wit and irony. Make cheeky observations about their choices. Be funny without being mean.",
        Style::Analytical => "You're a music data analyst. Provide deep insights about their listening patterns. Discuss genre diversity, era spread, mainstream vs. indie balance. Be thorough and academic.",
        Style::Podcast => "Create a podcast where Alex and Jordan break down this person's music taste. Script format.",
    }
}

fn evolution_style(style: Style) -> &'static str {
    match style {
        Style::Roasting => "Be brutally honest about their musical journey. Point out if they're getting more basic or if they've actually evolved.",
        Style::Encouraging => "Celebrate their growth! Highlight positive changes and interesting developments in their taste.",
        Style::Sarcastic => "Use wit and irony to comment on their musical evolution (or lack thereof).",
        Style::Analytical => "Provide deep insights about the trends, patterns, and trajectory of their musical taste over time.",
        Style::Podcast => "Create a podcast discussion between Alex and Jordan analyzing how this person's music taste evolved. Script format.",
    }
}

fn battle_style(style: Style) -> &'static str {
    match style {
        Style::Roasting => "Roast both of them! Be savage but funny about who has better (or worse) taste.",
        Style::Encouraging => "Find positives in both tastes while gently declaring a winner.",
        Style::Sarcastic => "Use playful sarcasm to compare their tastes and crown a winner.",
        Style::Analytical => "Provide a thorough, data-driven comparison of their musical sophistication.",
        Style::Podcast => "Create a podcast where Alex and Jordan compare these two tastes head-to-head. Script format.",
    }
}

fn manual_style(style: Style) -> &'static str {
    match style {
        Style::Roasting => "Roast their taste! Be brutally honest and funny about their choices.",
        Style::Encouraging => "Celebrate their taste! Find positives in their choices and be supportive.",
        Style::Sarcastic => "Use playful sarcasm and wit to comment on their music choices.",
        Style::Analytical => "Provide deep analytical insights about their musical preferences and what it reveals.",
        Style::Podcast => "Create a podcast where Alex and Jordan discuss these preferences. Script format.",
    }
}

fn owner_line(user_name: Option<&str>) -> String {
    user_name
        .map(|name| format!("\nThis recap belongs to {name}. Refer to them by name.\n"))
        .unwrap_or_default()
}

/// singleモード（スクリーンショット1枚）のプロンプト
pub fn build_single_prompt(style: Style, user_name: Option<&str>) -> String {
    let style_instruction = style_instruction(Mode::Single, style);
    let owner = owner_line(user_name);

    format!(
        r#"Analyze this music streaming recap/wrapped screenshot and provide:
{owner}
1. A TASTE QUALITY SCORE from 0-100 based on:
   - Musical sophistication and depth
   - Balance of discovery vs. accessibility
   - Genre diversity and interesting combinations
   - Mix of classic/timeless artists with quality current music
   - Overall cultural awareness and taste

2. A fun, detailed analysis in this style: {style_instruction}

The analysis should be 3-4 paragraphs covering:
- Overall impression of their taste (is it good, basic, adventurous?)
- Specific observations about artists/genres shown
- What this says about them as a music listener
- Surprising patterns or standout choices

Format your response EXACTLY like this:
SCORE: [number 0-100]
ANALYSIS: [your detailed analysis]

Remember: {style_instruction}"#
    )
}

/// evolutionモード（複数年のスクリーンショット、古い順）のプロンプト
pub fn build_evolution_prompt(style: Style, image_count: usize, user_name: Option<&str>) -> String {
    let style_instruction = style_instruction(Mode::Evolution, style);
    let owner = owner_line(user_name);

    format!(
        r#"Analyze these {image_count} music streaming recaps from different years (oldest to newest) and provide:
{owner}
1. An OVERALL EVOLUTION SCORE from 0-100 based on:
   - Whether their taste is improving or getting worse
   - Discovery of better/more sophisticated artists
   - Consistency vs. volatility in taste
   - Overall trajectory (leveling up, stagnating, or regressing)

2. A detailed analysis in this style: {style_instruction}

The analysis should cover:
- How their taste has changed over time (better? worse? different?)
- Patterns you notice (getting more adventurous, more basic, etc.)
- Whether they're developing good taste or regressing
- Specific observations about each year
- Overall verdict on their musical journey

Format your response EXACTLY like this:
SCORE: [number 0-100]
ANALYSIS: [your detailed analysis]

Remember: {style_instruction}"#
    )
}

/// battleモード（2人の比較）のプロンプト
pub fn build_battle_prompt(style: Style, name_a: &str, name_b: &str) -> String {
    let style_instruction = style_instruction(Mode::Battle, style);

    format!(
        r#"Compare these two people's music recaps and determine who has better taste.

The first image is {name_a}'s music recap.
The second image is {name_b}'s music recap.

Give BOTH people TASTE QUALITY SCORES from 0-100 based on:
- Musical sophistication
- Artist quality (good choices vs. basic/questionable)
- Balance and cultural awareness
- Overall impressiveness of their taste

Then provide a detailed comparison in this style: {style_instruction}

The analysis should cover:
- Each person's strengths and weaknesses
- Direct comparisons (who has better, more sophisticated taste?)
- Shared tastes vs. unique choices
- Clear declaration of who has "better" taste (even if close)
- Fun observations and zingers
- USE THEIR ACTUAL NAMES ({name_a} and {name_b}) throughout the analysis

Format your response EXACTLY like this:
SCORE_A: [number 0-100 for {name_a}]
SCORE_B: [number 0-100 for {name_b}]
ANALYSIS: [your detailed comparison using {name_a} and {name_b}]

Remember: {style_instruction}"#
    )
}

/// manualモード（テキスト回答）のプロンプト
pub fn build_manual_prompt(
    style: Style,
    answers: &ManualAnswers,
    user_name: Option<&str>,
) -> String {
    let style_instruction = style_instruction(Mode::Manual, style);

    let answers_text = MANUAL_QUESTIONS
        .iter()
        .map(|(key, label)| format!("{}: {}", label, answers.get_or(key, NOT_PROVIDED)))
        .collect::<Vec<_>>()
        .join("\n");

    let subject = user_name
        .map(|name| format!("{name}'s"))
        .unwrap_or_else(|| "This person's".to_string());
    let analysis_hint = user_name
        .map(|name| format!(" using {name}"))
        .unwrap_or_default();

    format!(
        r#"Analyze {subject} music taste based on these answers:

{answers_text}

Provide:

1. A TASTE QUALITY SCORE from 0-100 based on:
   - Musical sophistication and depth of choices
   - Balance between accessible and adventurous
   - Era diversity (timeless classics vs. current favorites)
   - Artist choices (quality over popularity)
   - The guilty pleasure adds personality!
   - Overall cultural awareness

2. A detailed, fun analysis in this style: {style_instruction}

The analysis should cover:
- What their choices reveal about their personality and taste level
- Commentary on their favorite artists/albums (good choices or questionable?)
- Observations about genre preferences
- What the guilty pleasure says about them
- Overall verdict on how good their taste actually is

Format your response EXACTLY like this:
SCORE: [number 0-100]
ANALYSIS: [your detailed analysis{analysis_hint}]

Remember: {style_instruction}"#
    )
}

/// 検証済みリクエストからプロンプトを生成
pub fn build_prompt(style: Style, request: &ModeRequest) -> String {
    match request {
        ModeRequest::Single { user_name, .. } => build_single_prompt(style, user_name.as_deref()),
        ModeRequest::Evolution { images, user_name } => {
            build_evolution_prompt(style, images.len(), user_name.as_deref())
        }
        ModeRequest::Battle { name_a, name_b, .. } => build_battle_prompt(style, name_a, name_b),
        ModeRequest::Manual { answers, user_name } => {
            build_manual_prompt(style, answers, user_name.as_deref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [Mode; 4] = [Mode::Single, Mode::Evolution, Mode::Battle, Mode::Manual];

    // =============================================
    // スタイル表テスト
    // =============================================

    #[test]
    fn test_unknown_style_uses_analytical_entry() {
        for mode in MODES {
            assert_eq!(
                style_instruction(mode, Style::from_name("interpretive-dance")),
                style_instruction(mode, Style::Analytical)
            );
        }
        assert_eq!(
            style_instruction(Mode::Battle, Style::from_name("???")),
            "Provide a thorough, data-driven comparison of their musical sophistication."
        );
    }

    #[test]
    fn test_style_text_differs_per_mode() {
        assert_ne!(
            style_instruction(Mode::Single, Style::Roasting),
            style_instruction(Mode::Battle, Style::Roasting)
        );
        assert_ne!(
            style_instruction(Mode::Evolution, Style::Roasting),
            style_instruction(Mode::Manual, Style::Roasting)
        );
    }

    #[test]
    fn test_every_table_has_podcast() {
        for mode in MODES {
            let text = style_instruction(mode, Style::Podcast);
            assert!(text.contains("Alex and Jordan"), "{mode}: {text}");
        }
    }

    // =============================================
    // プロンプト生成テスト
    // =============================================

    #[test]
    fn test_single_prompt_format_contract() {
        let prompt = build_single_prompt(Style::Sarcastic, None);
        assert!(prompt.contains("SCORE: [number 0-100]"));
        assert!(prompt.contains("ANALYSIS: [your detailed analysis]"));
        assert_eq!(
            prompt.matches(style_instruction(Mode::Single, Style::Sarcastic)).count(),
            2
        );
        assert!(!prompt.contains("belongs to"));
    }

    #[test]
    fn test_single_prompt_with_user_name() {
        let prompt = build_single_prompt(Style::Analytical, Some("Riley"));
        assert!(prompt.contains("This recap belongs to Riley."));
    }

    #[test]
    fn test_evolution_prompt() {
        let prompt = build_evolution_prompt(Style::Encouraging, 3, None);
        assert!(prompt.contains("these 3 music streaming recaps"));
        assert!(prompt.contains("OVERALL EVOLUTION SCORE"));
        assert!(prompt.contains("Celebrate their growth!"));
        assert!(prompt.contains("SCORE: [number 0-100]"));
    }

    #[test]
    fn test_battle_prompt_embeds_names() {
        let prompt = build_battle_prompt(Style::Roasting, "Ana", "Ben");
        assert!(prompt.contains("The first image is Ana's music recap."));
        assert!(prompt.contains("The second image is Ben's music recap."));
        assert!(prompt.contains("USE THEIR ACTUAL NAMES (Ana and Ben)"));
        assert!(prompt.contains("SCORE_A: [number 0-100 for Ana]"));
        assert!(prompt.contains("SCORE_B: [number 0-100 for Ben]"));
        assert!(prompt.contains("ANALYSIS: [your detailed comparison using Ana and Ben]"));
    }

    #[test]
    fn test_manual_prompt_answers() {
        let answers: ManualAnswers = [
            ("favoriteArtist", "Radiohead"),
            ("guiltyPleasure", "ABBA"),
        ]
        .into_iter()
        .collect();

        let prompt = build_manual_prompt(Style::Podcast, &answers, Some("Jo"));
        assert!(prompt.starts_with("Analyze Jo's music taste"));
        assert!(prompt.contains("Favorite all-time artist: Radiohead"));
        assert!(prompt.contains("Guilty pleasure: ABBA"));
        assert!(prompt.contains("Current favorite song: Not provided"));
        assert!(prompt.contains("ANALYSIS: [your detailed analysis using Jo]"));
    }

    #[test]
    fn test_manual_prompt_without_name() {
        let answers: ManualAnswers = [("genres", "jazz")].into_iter().collect();
        let prompt = build_manual_prompt(Style::Analytical, &answers, None);
        assert!(prompt.starts_with("Analyze This person's music taste"));
        assert!(prompt.contains("ANALYSIS: [your detailed analysis]"));
    }
}
