use serde::{Deserialize, Serialize};

/// 比分与历史最佳。引擎从不读取，只由对局与前端维护；
/// 前端把 JSON 存进 `localStorage` 以跨会话保留最佳记录。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScoreState {
    #[serde(default)]
    pub player_score: u32,
    #[serde(default)]
    pub bot_score: u32,
    #[serde(default)]
    pub player_best: u32,
    #[serde(default)]
    pub bot_best: u32,
}

impl ScoreState {
    /// 只恢复最佳记录，本次会话的比分从零开始。
    pub fn with_best(player_best: u32, bot_best: u32) -> Self {
        Self {
            player_best,
            bot_best,
            ..Self::default()
        }
    }

    /// 解析前端保存的比分 JSON，只保留最佳记录。
    pub fn from_saved(json: &str) -> Result<Self, serde_json::Error> {
        let saved: ScoreState = serde_json::from_str(json)?;
        Ok(Self::with_best(saved.player_best, saved.bot_best))
    }

    pub fn record_win(&mut self, human_won: bool) {
        if human_won {
            self.player_score += 1;
            self.player_best = self.player_best.max(self.player_score);
        } else {
            self.bot_score += 1;
            self.bot_best = self.bot_best.max(self.bot_score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_only_grows_past_restored_record() {
        let mut scores = ScoreState::with_best(2, 0);

        scores.record_win(true);
        assert_eq!(scores.player_score, 1);
        assert_eq!(scores.player_best, 2);

        scores.record_win(true);
        scores.record_win(true);
        assert_eq!(scores.player_best, 3);

        scores.record_win(false);
        assert_eq!(scores.bot_score, 1);
        assert_eq!(scores.bot_best, 1);
    }

    #[test]
    fn restores_from_partial_json() {
        let scores: ScoreState =
            serde_json::from_str(r#"{"player_best":4}"#).expect("scores should parse");
        assert_eq!(scores, ScoreState::with_best(4, 0));
    }

    #[test]
    fn saved_scores_keep_only_best() {
        let scores = ScoreState::from_saved(
            r#"{"player_score":3,"bot_score":1,"player_best":5,"bot_best":2}"#,
        )
        .expect("saved scores should parse");
        assert_eq!(scores, ScoreState::with_best(5, 2));

        assert!(ScoreState::from_saved("not json").is_err());
        assert!(ScoreState::from_saved(r#"{"player_best":-1}"#).is_err());
    }
}
