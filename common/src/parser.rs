//! モデル応答パーサー
//!
//! 応答テキストから `SCORE:` / `SCORE_A:` / `SCORE_B:` / `ANALYSIS:` マーカーを
//! 期待順に走査し、スコアと講評を取り出す。
//!
//! マーカーが揃わない場合はエラーにせず、スコア75・講評は応答全文とする。

use crate::types::{AnalysisResult, Mode, DEFAULT_SCORE};

pub const SCORE_MARKER: &str = "SCORE:";
pub const SCORE_A_MARKER: &str = "SCORE_A:";
pub const SCORE_B_MARKER: &str = "SCORE_B:";
pub const ANALYSIS_MARKER: &str = "ANALYSIS:";

/// スコアとして読む先頭文字数
const SCORE_WINDOW: usize = 3;

const SCORED_SEQUENCE: &[&str] = &[SCORE_MARKER, ANALYSIS_MARKER];
const BATTLE_SEQUENCE: &[&str] = &[SCORE_A_MARKER, SCORE_B_MARKER, ANALYSIS_MARKER];

/// モードが期待するマーカー列
pub fn marker_sequence(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Battle => BATTLE_SEQUENCE,
        Mode::Single | Mode::Evolution | Mode::Manual => SCORED_SEQUENCE,
    }
}

/// マーカー走査の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerScan<'a> {
    /// 全マーカーが期待順に見つかった。各マーカー直後から次のマーカー直前（最後は末尾）までの区間
    Complete(Vec<&'a str>),
    /// 全マーカーは存在するが順序が崩れている
    OutOfOrder,
    /// マーカーが欠けている
    Missing(&'static str),
}

/// 走査の状態: 次に探すマーカーの位置と、直前のマーカーの区間開始位置
struct Scanner<'a> {
    text: &'a str,
    markers: &'static [&'static str],
    next: usize,
    cursor: usize,
    region_start: Option<usize>,
    regions: Vec<&'a str>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, markers: &'static [&'static str]) -> Self {
        Self {
            text,
            markers,
            next: 0,
            cursor: 0,
            region_start: None,
            regions: Vec::with_capacity(markers.len()),
        }
    }

    /// 次のマーカーへ進む。見つからなければ None
    fn step(&mut self) -> Option<()> {
        let marker = self.markers[self.next];
        let offset = self.text[self.cursor..].find(marker)?;
        let found_at = self.cursor + offset;

        if let Some(start) = self.region_start {
            self.regions.push(&self.text[start..found_at]);
        }
        self.cursor = found_at + marker.len();
        self.region_start = Some(self.cursor);
        self.next += 1;
        Some(())
    }

    fn run(mut self) -> MarkerScan<'a> {
        while self.next < self.markers.len() {
            if self.step().is_none() {
                let marker = self.markers[self.next];
                return if self.markers.iter().all(|m| self.text.contains(m)) {
                    MarkerScan::OutOfOrder
                } else {
                    MarkerScan::Missing(marker)
                };
            }
        }
        if let Some(start) = self.region_start {
            self.regions.push(&self.text[start..]);
        }
        MarkerScan::Complete(self.regions)
    }
}

/// マーカー列を期待順に走査
pub fn scan_markers<'a>(text: &'a str, markers: &'static [&'static str]) -> MarkerScan<'a> {
    Scanner::new(text, markers).run()
}

/// スコア区間から数値を取り出す
///
/// 先頭の空白を除いた最初の3文字から数字だけを拾い、0〜100に丸める。
/// 数字がなければ None（符号も捨てるので "-5" は 5）。
pub fn extract_score(region: &str) -> Option<u8> {
    let digits: String = region
        .trim_start()
        .chars()
        .take(SCORE_WINDOW)
        .filter(|c| c.is_ascii_digit())
        .collect();

    let value: u32 = digits.parse().ok()?;
    Some(value.min(100) as u8)
}

fn score_or_default(region: &str) -> u8 {
    extract_score(region).unwrap_or(DEFAULT_SCORE)
}

/// モデル応答をモードに応じた結果に変換
///
/// # Examples
/// ```
/// use tastecheck_common::{parse_response, AnalysisResult, Mode};
///
/// let result = parse_response(Mode::Single, "SCORE: 137\nANALYSIS: Great taste.");
/// assert_eq!(result, AnalysisResult::Scored { score: 100, analysis: "Great taste.".into() });
/// ```
pub fn parse_response(mode: Mode, response: &str) -> AnalysisResult {
    let scan = scan_markers(response, marker_sequence(mode));

    match (mode, scan) {
        (Mode::Battle, MarkerScan::Complete(regions)) => AnalysisResult::Battle {
            score_a: score_or_default(regions[0]),
            score_b: score_or_default(regions[1]),
            analysis: regions[2].trim().to_string(),
        },
        (Mode::Battle, _) => AnalysisResult::Battle {
            score_a: DEFAULT_SCORE,
            score_b: DEFAULT_SCORE,
            analysis: response.to_string(),
        },
        (_, MarkerScan::Complete(regions)) => AnalysisResult::Scored {
            score: score_or_default(regions[0]),
            analysis: regions[1].trim().to_string(),
        },
        (_, _) => AnalysisResult::Scored {
            score: DEFAULT_SCORE,
            analysis: response.to_string(),
        },
    }
}
