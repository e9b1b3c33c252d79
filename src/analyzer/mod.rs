//! 解析モジュール
//!
//! モードごとにプロンプトと画像ブロックを組み立て、ビジョンモデルを呼び出し、
//! 応答をパースする。モデル呼び出しの失敗はここで結果（スコア0）に変換する。

pub mod claude_api;

pub use claude_api::ClaudeClient;

use crate::error::Result;
use std::future::Future;
use tastecheck_common::{
    build_vision_request, parse_response, AnalysisResult, AnalysisTask, VisionRequest,
};
use tracing::{debug, info, warn};

/// ビジョン対応の言語モデル（プロンプト + 画像 → テキスト）
pub trait VisionModel: Send + Sync + 'static {
    fn complete(&self, request: &VisionRequest) -> impl Future<Output = Result<String>> + Send;
}

/// 検証済みタスクを解析
///
/// 常に結果を返す。モデル呼び出し失敗はスコア0、応答形式の崩れはスコア75。
pub async fn analyze<M: VisionModel>(model: &M, task: &AnalysisTask) -> AnalysisResult {
    let request = build_vision_request(task);
    let mode = request.mode;

    info!(
        mode = %mode,
        style = %task.style,
        images = request.image_count(),
        max_tokens = request.max_tokens,
        "解析開始"
    );

    match model.complete(&request).await {
        Ok(text) => {
            debug!(mode = %mode, chars = text.len(), "応答受信");
            parse_response(mode, &text)
        }
        Err(e) => {
            warn!(mode = %mode, error = %e, "モデル呼び出し失敗");
            AnalysisResult::provider_failure(mode, &e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TasteCheckError;
    use std::sync::Mutex;
    use tastecheck_common::{ContentBlock, ImageAsset, ManualAnswers, ModeRequest, Style};

    /// 固定応答を返し、受け取ったリクエストを記録するモデル
    struct ScriptedModel {
        reply: std::result::Result<&'static str, &'static str>,
        seen: Mutex<Vec<VisionRequest>>,
    }

    impl ScriptedModel {
        fn replying(text: &'static str) -> Self {
            Self {
                reply: Ok(text),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &'static str) -> Self {
            Self {
                reply: Err(message),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_request(&self) -> VisionRequest {
            self.seen.lock().unwrap().last().cloned().expect("no request recorded")
        }
    }

    impl VisionModel for ScriptedModel {
        async fn complete(&self, request: &VisionRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(message) => Err(TasteCheckError::ApiCall(message.to_string())),
            }
        }
    }

    fn png() -> ImageAsset {
        ImageAsset::from_base64("iVBORw0KGgo=")
    }

    fn single(style: Style) -> AnalysisTask {
        AnalysisTask {
            style,
            request: ModeRequest::Single {
                image: png(),
                user_name: None,
            },
        }
    }

    fn battle(style: Style) -> AnalysisTask {
        AnalysisTask {
            style,
            request: ModeRequest::Battle {
                first: png(),
                second: png(),
                name_a: "Ana".into(),
                name_b: "Ben".into(),
            },
        }
    }

    #[tokio::test]
    async fn test_single_success() {
        let model = ScriptedModel::replying("SCORE: 91\nANALYSIS: Deep cuts everywhere.");
        let result = analyze(&model, &single(Style::Encouraging)).await;

        assert_eq!(
            result,
            AnalysisResult::Scored {
                score: 91,
                analysis: "Deep cuts everywhere.".into(),
            }
        );
        let request = model.last_request();
        assert_eq!(request.max_tokens, 1024);
        assert_eq!(request.image_count(), 1);
    }

    #[tokio::test]
    async fn test_single_failure_scores_zero() {
        let model = ScriptedModel::failing("connection reset");
        let result = analyze(&model, &single(Style::Analytical)).await;

        match result {
            AnalysisResult::Scored { score, analysis } => {
                assert_eq!(score, 0);
                assert!(analysis.starts_with("Sorry, something went wrong analyzing your image."));
                assert!(analysis.contains("connection reset"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_evolution_unparseable_reply() {
        let model = ScriptedModel::replying("What a journey!");
        let task = AnalysisTask {
            style: Style::Sarcastic,
            request: ModeRequest::Evolution {
                images: vec![png(), png(), png()],
                user_name: None,
            },
        };
        let result = analyze(&model, &task).await;

        assert_eq!(
            result,
            AnalysisResult::Scored {
                score: 75,
                analysis: "What a journey!".into(),
            }
        );
        let request = model.last_request();
        assert_eq!(request.max_tokens, 1500);
        assert_eq!(request.image_count(), 3);
    }

    #[tokio::test]
    async fn test_battle_failure_scores_zero() {
        let model = ScriptedModel::failing("overloaded");
        let result = analyze(&model, &battle(Style::Roasting)).await;

        match result {
            AnalysisResult::Battle { score_a, score_b, analysis } => {
                assert_eq!((score_a, score_b), (0, 0));
                assert!(analysis.contains("overloaded"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_battle_prompt_carries_names() {
        let model = ScriptedModel::replying("SCORE_A: 70\nSCORE_B: 72\nANALYSIS: Ben by a hair.");
        let result = analyze(&model, &battle(Style::Podcast)).await;

        assert_eq!(
            result,
            AnalysisResult::Battle {
                score_a: 70,
                score_b: 72,
                analysis: "Ben by a hair.".into(),
            }
        );
        let prompt = model.last_request().prompt().unwrap().to_string();
        assert!(prompt.contains("Ana and Ben"));
        assert!(prompt.contains("Alex and Jordan"));
    }

    #[tokio::test]
    async fn test_manual_sends_text_only() {
        let model = ScriptedModel::replying("SCORE: 58\nANALYSIS: Fine.");
        let answers: ManualAnswers = [("favoriteArtist", "Drake")].into_iter().collect();
        let task = AnalysisTask {
            style: Style::Roasting,
            request: ModeRequest::Manual {
                answers,
                user_name: Some("Lee".into()),
            },
        };
        let result = analyze(&model, &task).await;

        assert_eq!(
            result,
            AnalysisResult::Scored {
                score: 58,
                analysis: "Fine.".into(),
            }
        );
        let request = model.last_request();
        assert_eq!(request.content.len(), 1);
        assert!(matches!(
            &request.content[0],
            ContentBlock::Text { text } if text.contains("Lee's")
        ));
    }
}
