//! リクエスト・解析結果の型定義
//!
//! - AnalyzeRequest: `POST /analyze` で受け取るJSON（緩い形式）
//! - ModeRequest: モードごとに必須項目を検証済みのリクエスト
//! - AnalysisResult: モードに応じた採点結果

use crate::error::{Error, Result};
use crate::media::ImageAsset;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// マーカーが読めなかった場合のスコア
pub const DEFAULT_SCORE: u8 = 75;

/// モデル呼び出し自体が失敗した場合のスコア
pub const FAILURE_SCORE: u8 = 0;

/// 解析モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Single,
    Evolution,
    Battle,
    Manual,
}

impl Mode {
    /// モデルに渡す最大出力トークン数
    ///
    /// evolution/battle は複数人・複数年の講評になるため多めに取る
    pub fn max_tokens(&self) -> u32 {
        match self {
            Mode::Single | Mode::Manual => 1024,
            Mode::Evolution | Mode::Battle => 1500,
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single" => Ok(Mode::Single),
            "evolution" => Ok(Mode::Evolution),
            "battle" => Ok(Mode::Battle),
            "manual" => Ok(Mode::Manual),
            _ => Err(Error::InvalidRequest("Invalid mode".into())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => write!(f, "single"),
            Mode::Evolution => write!(f, "evolution"),
            Mode::Battle => write!(f, "battle"),
            Mode::Manual => write!(f, "manual"),
        }
    }
}

/// 講評のトーン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Roasting,
    Encouraging,
    Sarcastic,
    #[default]
    Analytical,
    Podcast,
}

impl Style {
    /// スタイル名を解決（未知の名前は analytical 扱い、エラーにはしない）
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "roasting" => Style::Roasting,
            "encouraging" => Style::Encouraging,
            "sarcastic" => Style::Sarcastic,
            "podcast" => Style::Podcast,
            _ => Style::Analytical,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Style::Roasting => "roasting",
            Style::Encouraging => "encouraging",
            Style::Sarcastic => "sarcastic",
            Style::Analytical => "analytical",
            Style::Podcast => "podcast",
        };
        f.write_str(name)
    }
}

/// manualモードの回答
///
/// キーはフロントエンドのフォーム名（favoriteArtist など）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ManualAnswers(BTreeMap<String, String>);

/// 値は文字列以外（数値・真偽値など）も受け付けて文字列化する。`null` は未回答
impl<'de> Deserialize<'de> for ManualAnswers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
        Ok(raw
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect())
    }
}

impl ManualAnswers {
    /// 回答を取得（未回答・空欄は `fallback`）
    pub fn get_or<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.0
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ManualAnswers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// `POST /analyze` のリクエストボディ
///
/// 旧フロントエンドの単数形 `image` も受け付ける
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzeRequest {
    pub mode: Option<String>,
    pub style: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    pub image: Option<String>,
    pub answers: ManualAnswers,
    pub user_name: Option<String>,
    pub name_a: Option<String>,
    pub name_b: Option<String>,
}

/// `null` は未指定と同じ扱い
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 検証済みリクエスト（モードごとに必要な項目だけを持つ）
#[derive(Debug, Clone, PartialEq)]
pub enum ModeRequest {
    Single {
        image: ImageAsset,
        user_name: Option<String>,
    },
    Evolution {
        images: Vec<ImageAsset>,
        user_name: Option<String>,
    },
    Battle {
        first: ImageAsset,
        second: ImageAsset,
        name_a: String,
        name_b: String,
    },
    Manual {
        answers: ManualAnswers,
        user_name: Option<String>,
    },
}

impl ModeRequest {
    pub fn mode(&self) -> Mode {
        match self {
            ModeRequest::Single { .. } => Mode::Single,
            ModeRequest::Evolution { .. } => Mode::Evolution,
            ModeRequest::Battle { .. } => Mode::Battle,
            ModeRequest::Manual { .. } => Mode::Manual,
        }
    }

    pub fn image_count(&self) -> usize {
        match self {
            ModeRequest::Single { .. } => 1,
            ModeRequest::Evolution { images, .. } => images.len(),
            ModeRequest::Battle { .. } => 2,
            ModeRequest::Manual { .. } => 0,
        }
    }
}

/// スタイルと検証済みリクエストの組
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisTask {
    pub style: Style,
    pub request: ModeRequest,
}

const DEFAULT_NAME_A: &str = "Person 1";
const DEFAULT_NAME_B: &str = "Person 2";

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AnalyzeRequest {
    /// JSONボディからパース
    pub fn from_json(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// モードごとの必須項目を検証してタスクに変換
    ///
    /// 失敗時は `Error::InvalidRequest`（モデル呼び出し前に弾く）
    pub fn into_task(self) -> Result<AnalysisTask> {
        let mode: Mode = self.mode.as_deref().unwrap_or("single").parse()?;
        let style = self
            .style
            .as_deref()
            .map(Style::from_name)
            .unwrap_or_default();

        // 後方互換: images が空で image があれば1枚のリストとして扱う
        let mut images = self.images;
        if images.is_empty() {
            if let Some(image) = self.image.filter(|s| !s.is_empty()) {
                images.push(image);
            }
        }
        let mut assets = images.iter().map(|data| ImageAsset::from_base64(data));

        let user_name = non_blank(self.user_name);
        let no_images = || Error::InvalidRequest("No images provided".into());

        let request = match mode {
            Mode::Manual => {
                if self.answers.is_empty() {
                    return Err(Error::InvalidRequest("No answers provided".into()));
                }
                ModeRequest::Manual {
                    answers: self.answers,
                    user_name,
                }
            }
            Mode::Single => ModeRequest::Single {
                image: assets.next().ok_or_else(no_images)?,
                user_name,
            },
            Mode::Evolution => {
                let images: Vec<ImageAsset> = assets.collect();
                if images.is_empty() {
                    return Err(no_images());
                }
                ModeRequest::Evolution { images, user_name }
            }
            Mode::Battle => {
                let first = assets.next().ok_or_else(no_images)?;
                let second = assets.next().ok_or_else(|| {
                    Error::InvalidRequest("Battle mode requires two images".into())
                })?;
                ModeRequest::Battle {
                    first,
                    second,
                    name_a: non_blank(self.name_a).unwrap_or_else(|| DEFAULT_NAME_A.into()),
                    name_b: non_blank(self.name_b).unwrap_or_else(|| DEFAULT_NAME_B.into()),
                }
            }
        };

        Ok(AnalysisTask { style, request })
    }
}

/// 解析結果
///
/// single/evolution/manual は `{score, analysis}`、battle は `{scoreA, scoreB, analysis}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Battle {
        #[serde(rename = "scoreA")]
        score_a: u8,
        #[serde(rename = "scoreB")]
        score_b: u8,
        analysis: String,
    },
    Scored {
        score: u8,
        analysis: String,
    },
}

impl AnalysisResult {
    /// モデル呼び出し失敗時の結果（スコアは0、講評にエラー内容を入れる）
    pub fn provider_failure(mode: Mode, error: &dyn fmt::Display) -> Self {
        match mode {
            Mode::Single => AnalysisResult::Scored {
                score: FAILURE_SCORE,
                analysis: format!(
                    "Sorry, something went wrong analyzing your image. Error: {}",
                    error
                ),
            },
            Mode::Evolution | Mode::Manual => AnalysisResult::Scored {
                score: FAILURE_SCORE,
                analysis: format!("Sorry, something went wrong. Error: {}", error),
            },
            Mode::Battle => AnalysisResult::Battle {
                score_a: FAILURE_SCORE,
                score_b: FAILURE_SCORE,
                analysis: format!("Sorry, something went wrong. Error: {}", error),
            },
        }
    }
}
