//! ビジョンモデルへ送るコンテンツブロック
//!
//! 画像ブロックを入力順に並べ、最後にテキストブロックを1つ置く。
//! manualモードはテキストのみ。

use crate::media::ImageAsset;
use crate::prompts::build_prompt;
use crate::types::{AnalysisTask, Mode, ModeRequest};
use serde::{Deserialize, Serialize};

/// コンテンツブロック（Anthropic Messages API の content 要素）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Image { source: ImageSource },
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

impl From<&ImageAsset> for ContentBlock {
    fn from(asset: &ImageAsset) -> Self {
        ContentBlock::Image {
            source: ImageSource {
                source_type: "base64".to_string(),
                media_type: asset.media_type.to_string(),
                data: asset.data.clone(),
            },
        }
    }
}

/// モデル呼び出し1回分の入力（モデルIDはクライアント側の設定）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionRequest {
    pub mode: Mode,
    pub max_tokens: u32,
    pub content: Vec<ContentBlock>,
}

impl VisionRequest {
    pub fn image_count(&self) -> usize {
        self.content
            .iter()
            .filter(|block| matches!(block, ContentBlock::Image { .. }))
            .count()
    }

    /// 末尾のテキストブロック（プロンプト）
    pub fn prompt(&self) -> Option<&str> {
        self.content.iter().rev().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Image { .. } => None,
        })
    }
}

fn request_images(request: &ModeRequest) -> Vec<&ImageAsset> {
    match request {
        ModeRequest::Single { image, .. } => vec![image],
        ModeRequest::Evolution { images, .. } => images.iter().collect(),
        ModeRequest::Battle { first, second, .. } => vec![first, second],
        ModeRequest::Manual { .. } => Vec::new(),
    }
}

/// タスクからモデル入力を組み立てる
pub fn build_vision_request(task: &AnalysisTask) -> VisionRequest {
    let mode = task.request.mode();
    let prompt = build_prompt(task.style, &task.request);

    let mut content: Vec<ContentBlock> = request_images(&task.request)
        .into_iter()
        .map(ContentBlock::from)
        .collect();
    content.push(ContentBlock::Text { text: prompt });

    VisionRequest {
        mode,
        max_tokens: mode.max_tokens(),
        content,
    }
}
